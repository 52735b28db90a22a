//! JSON snapshot file backing the embedded store between restarts.

use std::{io::ErrorKind, path::PathBuf};

use tokio::{fs, sync::Mutex};

use crate::dao::{
    models::Document,
    storage::{StorageError, StorageResult},
};

pub(super) struct SnapshotFile {
    path: PathBuf,
    write_gate: Mutex<()>,
}

impl SnapshotFile {
    pub(super) fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_gate: Mutex::new(()),
        }
    }

    pub(super) fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Read every document from disk. A missing file is an empty store.
    pub(super) async fn load(&self) -> StorageResult<Vec<Document>> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(StorageError::unavailable(
                    format!("failed to read snapshot `{}`", self.path.display()),
                    err,
                ));
            }
        };

        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&contents).map_err(|source| StorageError::Serialization { source })
    }

    /// Replace the snapshot with `documents` through a temp file and a rename.
    pub(super) async fn write<F>(&self, collect: F) -> StorageResult<()>
    where
        F: FnOnce() -> Vec<Document>,
    {
        let _gate = self.write_gate.lock().await;
        // Collect under the gate so the last writer always persists the newest state.
        let documents = collect();
        let payload = serde_json::to_vec_pretty(&documents)
            .map_err(|source| StorageError::Serialization { source })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|err| {
                StorageError::unavailable(
                    format!("failed to create snapshot directory `{}`", parent.display()),
                    err,
                )
            })?;
        }

        let tmp_path = self.tmp_path();
        fs::write(&tmp_path, payload).await.map_err(|err| {
            StorageError::unavailable(
                format!("failed to write snapshot `{}`", tmp_path.display()),
                err,
            )
        })?;
        if let Err(err) = fs::rename(&tmp_path, &self.path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StorageError::unavailable(
                format!("failed to replace snapshot `{}`", self.path.display()),
                err,
            ));
        }
        Ok(())
    }

    pub(super) fn tmp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }
}
