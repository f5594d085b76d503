//! Index mapping files on local disk.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::IndexName;

/// `{}` is replaced with the index name.
pub const MAPPING_FILE_TEMPLATE: &str = "mapping_{}.json";

/// Reads `mapping_<index>.json` blobs from one directory. The content is never
/// parsed; the search service validates it when the index is created.
#[derive(Debug, Clone)]
pub struct MappingLoader {
    dir: PathBuf,
}

impl MappingLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, index: &IndexName) -> PathBuf {
        self.dir.join(MAPPING_FILE_TEMPLATE.replace("{}", index.as_str()))
    }

    /// Raw mapping bytes, or an empty buffer when no regular file is present.
    pub fn load(&self, index: &IndexName) -> Result<Vec<u8>> {
        let path = self.path_for(index);
        match fs::metadata(&path) {
            Ok(meta) if meta.is_dir() => {
                tracing::debug!(path = %path.display(), "mapping path is a directory, ignoring");
                return Ok(Vec::new());
            }
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no mapping file");
                return Ok(Vec::new());
            }
            Err(source) => return Err(Error::FileRead { path, source }),
        }
        fs::read(&path)
            .map_err(|source| Error::FileRead { path, source })
    }
}
