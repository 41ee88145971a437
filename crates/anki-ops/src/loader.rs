use crate::error::Result;

/// Resolves a named external resource (a file, typically) to its text
/// contents. Kept in this crate so operations and the factory can depend on
/// it without anki-ops depending on anki-engine; `anki-engine`'s
/// `FsResourceLoader` is the only implementation today.
pub trait ResourceLoader {
    fn load(&self, name: &str) -> Result<String>;
}
