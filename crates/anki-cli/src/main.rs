fn main() {
    std::process::exit(anki_cli::run_cli());
}
