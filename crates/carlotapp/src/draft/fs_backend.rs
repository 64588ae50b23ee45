use super::backend::KvBackend;
use crate::error::{CarlotError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Key-value backend storing one `<key>.json` file per key in a directory.
///
/// Keys are restricted to `[A-Za-z0-9._-]` and may not start with a dot, so
/// a key can never escape the directory or collide with temp files.
pub struct FsBackend {
    root: PathBuf,
    max_value_bytes: Option<usize>,
}

impl FsBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_value_bytes: None,
        }
    }

    pub fn with_max_value_bytes(mut self, bytes: usize) -> Self {
        self.max_value_bytes = Some(bytes);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing `key`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(format!("{}.json", key)))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(CarlotError::Io)?;
        }
        Ok(())
    }
}

fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(CarlotError::Store(format!("Invalid storage key: {:?}", key)))
    }
}

impl KvBackend for FsBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(CarlotError::Io)?;
        Ok(Some(content))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let target = self.path_for(key)?;
        if let Some(max) = self.max_value_bytes {
            if value.len() > max {
                return Err(CarlotError::Store(format!(
                    "Quota exceeded: {} of {} bytes",
                    value.len(),
                    max
                )));
            }
        }
        self.ensure_dir()?;

        // Atomic write
        let tmp = self.root.join(format!(".{}-{}.tmp", key, Uuid::new_v4()));
        fs::write(&tmp, value).map_err(CarlotError::Io)?;
        if let Err(err) = fs::rename(&tmp, &target) {
            let _ = fs::remove_file(&tmp);
            return Err(CarlotError::Io(err));
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        if path.exists() {
            fs::remove_file(path).map_err(CarlotError::Io)?;
        }
        Ok(())
    }
}
