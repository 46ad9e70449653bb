//! File-backed key-value store for the local cart.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use shopfront_core::cart::KeyValueStore;

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    #[cfg(test)]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl KeyValueStore for FileStore {
    type Error = io::Error;

    /// A file that is not UTF-8 reads as absent, like any other unusable
    /// stored cart.
    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        let path = self.path(key);
        match fs::read(&path) {
            Ok(bytes) => Ok(String::from_utf8(bytes)
                .inspect_err(|_| {
                    tracing::warn!(path = %path.display(), "Ignoring non-UTF-8 cart file");
                })
                .ok()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), Self::Error> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path(key);
        let tmp = path.with_extension("json.tmp");
        write_then_rename(&tmp, &path, value.as_bytes())
    }
}

// Readers never see a half-written file.
fn write_then_rename(tmp: &Path, path: &Path, bytes: &[u8]) -> io::Result<()> {
    fs::write(tmp, bytes)?;
    fs::rename(tmp, path)
}
