//! File-backed cart storage.
//!
//! Each key is stored as `<dir>/<key>.json`. Writes replace the whole file;
//! there is no locking between processes.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use mobile_shop_core::{CartStorage, StorageError};

/// [`CartStorage`] backend that keeps one file per key in a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Store entries under `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::Unavailable(format!("invalid storage key: {key:?}")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl CartStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        fs::write(path, value)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mobile_shop_core::{CART_STORAGE_KEY, CartStore, NewCartItem};
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());

        assert_eq!(storage.get_item(CART_STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn test_set_then_get_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("state").join("cart");
        let mut storage = FileStorage::new(&nested);

        storage.set_item(CART_STORAGE_KEY, "[]").unwrap();

        assert!(nested.join("zara_cart.json").is_file());
        assert_eq!(
            storage.get_item(CART_STORAGE_KEY).unwrap().as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path());

        assert!(matches!(
            storage.set_item("../escape", "x"),
            Err(StorageError::Unavailable(_))
        ));
        assert!(storage.get_item("").is_err());
    }

    #[test]
    fn test_cart_survives_a_new_store() {
        let dir = tempfile::tempdir().unwrap();

        let mut store = CartStore::hydrated(FileStorage::new(dir.path()));
        store.add_item(NewCartItem {
            id: "1".into(),
            name: "Galaxy S24".to_string(),
            price: Decimal::from(1000),
            color: "black".to_string(),
            storage: "128GB".to_string(),
            image_url: None,
        });
        drop(store);

        let reopened = CartStore::hydrated(FileStorage::new(dir.path()));
        assert_eq!(reopened.items().len(), 1);
        assert_eq!(reopened.total_price(), Decimal::from(1000));
    }
}
