use anki_ops::{Error, ResourceLoader, Result};
use std::path::PathBuf;

/// Filesystem-backed `ResourceLoader`: tries `name` as a literal path first
/// (relative to the process's working directory), then each directory in
/// `search_dirs` in order, joined with `name`. Mirrors `ConfigManager`'s and
/// `ScriptManager`'s builtin-then-filesystem resolution, generalized to one
/// directory list rather than two parallel builtin-configs/builtin-scripts
/// directories.
pub struct FsResourceLoader {
    search_dirs: Vec<PathBuf>,
}

impl FsResourceLoader {
    pub fn new(search_dirs: Vec<PathBuf>) -> Self {
        FsResourceLoader { search_dirs }
    }
}

impl ResourceLoader for FsResourceLoader {
    fn load(&self, name: &str) -> Result<String> {
        let direct = PathBuf::from(name);
        if direct.is_file() {
            return std::fs::read_to_string(&direct).map_err(|e| Error::ResourceUnavailable {
                name: name.to_string(),
                reason: e.to_string(),
            });
        }

        for dir in &self.search_dirs {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return std::fs::read_to_string(&candidate).map_err(|e| Error::ResourceUnavailable {
                    name: name.to_string(),
                    reason: e.to_string(),
                });
            }
        }

        Err(Error::ResourceUnavailable {
            name: name.to_string(),
            reason: "not found on disk or in any configured search directory".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_from_search_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("css.txt"), ".card {}").unwrap();
        let loader = FsResourceLoader::new(vec![dir.path().to_path_buf()]);
        assert_eq!(loader.load("css.txt").unwrap(), ".card {}");
    }

    #[test]
    fn reports_unavailable_when_missing_everywhere() {
        let loader = FsResourceLoader::new(vec![]);
        let err = loader.load("does-not-exist.txt").unwrap_err();
        assert!(matches!(err, Error::ResourceUnavailable { .. }));
    }
}
