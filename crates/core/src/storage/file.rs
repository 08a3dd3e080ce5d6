//! File-backed key/value store.
//!
//! Each key is a JSON file named `{key}.json` in a single directory, which
//! stands in for browser local storage on the device.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use super::{KeyValueStore, StorageError};

/// Store that keeps one file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();

        fs::create_dir_all(&dir)?;

        Ok(Self { dir })
    }

    /// Directory holding the entries.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
            && !key.starts_with('.');

        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(contents) => Ok(Some(contents)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::write(self.path_for(key)?, value)?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)?) {
            Err(error) if error.kind() != io::ErrorKind::NotFound => Err(error.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn values_persist_across_instances() -> TestResult {
        let dir = tempfile::tempdir()?;

        FileStore::open(dir.path())?.set("cart", "[]")?;

        let reopened = FileStore::open(dir.path())?;

        assert_eq!(reopened.get("cart")?, Some("[]".to_string()));
        assert!(dir.path().join("cart.json").exists());

        Ok(())
    }

    #[test]
    fn missing_key_reads_as_none() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = FileStore::open(dir.path())?;

        assert_eq!(store.get("applied_coupon")?, None);

        Ok(())
    }

    #[test]
    fn remove_deletes_file_and_tolerates_absence() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = FileStore::open(dir.path())?;

        store.set("cart", "[]")?;
        store.remove("cart")?;
        store.remove("cart")?;

        assert!(!dir.path().join("cart.json").exists());

        Ok(())
    }

    #[test]
    fn open_creates_nested_directory() -> TestResult {
        let dir = tempfile::tempdir()?;
        let nested = dir.path().join("a").join("b");

        let store = FileStore::open(&nested)?;

        assert!(store.dir().is_dir());

        Ok(())
    }

    #[test]
    fn keys_cannot_escape_directory() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = FileStore::open(dir.path())?;

        for key in ["../cart", "a/b", "", ".hidden"] {
            assert!(
                matches!(store.set(key, "x"), Err(StorageError::InvalidKey(_))),
                "key {key:?} should be rejected"
            );
        }

        Ok(())
    }
}
