use std::{
    fs::{self, OpenOptions, rename, write},
    future::Future,
    path::{Path, PathBuf},
};

use fs2::FileExt;
use uuid::Uuid;

use crate::storage::{KeyValueStore, StorageError};

/// Key-value store keeping one `<key>.json` file per key in a directory.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty() || key.contains(['/', '\\']) || key.contains("..") {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

fn read_value(path: &Path) -> Result<Option<String>, StorageError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StorageError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

fn write_value(path: &Path, value: &str) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StorageError::WriteFailed {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let temp_path = PathBuf::from(format!("{}.tmp.{}", path.display(), Uuid::new_v4()));
    write(&temp_path, value).map_err(|e| StorageError::WriteFailed {
        path: temp_path.clone(),
        source: e,
    })?;

    let lock_file_path = path.with_extension("lock");
    let lock_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&lock_file_path)
        .map_err(|e| StorageError::WriteFailed {
            path: lock_file_path.clone(),
            source: e,
        })?;
    lock_file
        .lock_exclusive()
        .map_err(|e| StorageError::WriteFailed {
            path: lock_file_path,
            source: e,
        })?;

    if let Err(e) = rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(StorageError::WriteFailed {
            path: path.to_path_buf(),
            source: e,
        });
    }

    lock_file.unlock().map_err(|e| StorageError::WriteFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StorageError>> + Send {
        let path = self.path_for(key);
        async move {
            let path = path?;
            tokio::task::spawn_blocking(move || read_value(&path))
                .await
                .map_err(|source| StorageError::TaskFailed { source })?
        }
    }

    fn set(
        &self,
        key: &str,
        value: String,
    ) -> impl Future<Output = Result<(), StorageError>> + Send {
        let path = self.path_for(key);
        async move {
            let path = path?;
            tokio::task::spawn_blocking(move || write_value(&path, &value))
                .await
                .map_err(|source| StorageError::TaskFailed { source })?
        }
    }
}
