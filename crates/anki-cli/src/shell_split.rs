/// Splits one script line into words the way a shell would, for feeding a
/// script line back through clap as if it were `argv`. Supports single- and
/// double-quoted spans and backslash escapes; this is not a full shell
/// grammar, just enough for the flag/value lines a script's operations use.
pub fn shell_split(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            ' ' | '\t' if !in_word => continue,
            ' ' | '\t' => {
                words.push(std::mem::take(&mut current));
                in_word = false;
            }
            '\'' => {
                in_word = true;
                for c in chars.by_ref() {
                    if c == '\'' {
                        break;
                    }
                    current.push(c);
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') if matches!(chars.peek(), Some('"') | Some('\\')) => {
                            current.push(chars.next().expect("peeked Some"));
                        }
                        Some(c) => current.push(c),
                        None => return Err("unterminated double-quoted string".to_string()),
                    }
                }
            }
            '\\' => {
                in_word = true;
                match chars.next() {
                    Some(c) => current.push(c),
                    None => return Err("trailing backslash with nothing to escape".to_string()),
                }
            }
            c => {
                in_word = true;
                current.push(c);
            }
        }
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_plain_whitespace() {
        let words = shell_split("list --path /models --limit 5").unwrap();
        assert_eq!(words, vec!["list", "--path", "/models", "--limit", "5"]);
    }

    #[test]
    fn keeps_quoted_spans_as_one_word() {
        let words = shell_split(r#"tag-notes --pattern "episode (\d+)" --tag-prefix ep::"#).unwrap();
        assert_eq!(words, vec!["tag-notes", "--pattern", r"episode (\d+)", "--tag-prefix", "ep::"]);
    }

    #[test]
    fn single_quotes_suppress_backslash_handling() {
        let words = shell_split(r"add-field --name 'Extra\Field'").unwrap();
        assert_eq!(words, vec!["add-field", "--name", r"Extra\Field"]);
    }

    #[test]
    fn reports_unterminated_double_quote() {
        let err = shell_split(r#"list --path "unterminated"#).unwrap_err();
        assert!(err.contains("unterminated"));
    }
}
