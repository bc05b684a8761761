//! JSON document collection on local disk.
//!
//! Layout: `<data_dir>/<database>/<collection>.json`, holding one JSON array
//! of user documents. Every write rewrites the whole collection through a
//! temp file in the same directory followed by a rename, so readers see
//! either the old or the new collection, never a torn one.

use super::UserMirror;
use crate::core::{Result, StoreError, User, UserId};
use async_trait::async_trait;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::debug;

pub struct FileMirror {
    path: PathBuf,
    // Last successfully written collection; writes are computed against it.
    documents: Mutex<Vec<User>>,
}

impl FileMirror {
    /// Open (or create) the collection file, reading whatever it currently holds.
    pub fn open<P: AsRef<Path>>(data_dir: P, database: &str, collection: &str) -> Result<Self> {
        let dir = data_dir.as_ref().join(database);
        fs::create_dir_all(&dir).map_err(|e| {
            StoreError::persistence(format!(
                "failed to create mirror directory {}: {e}",
                dir.display()
            ))
        })?;

        let path = dir.join(format!("{collection}.json"));
        let documents = read_documents(&path)?;
        debug!(path = %path.display(), documents = documents.len(), "opened file mirror");

        Ok(Self {
            path,
            documents: Mutex::new(documents),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, documents: Vec<User>) -> Result<()> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_documents(&path, &documents))
            .await
            .map_err(|e| StoreError::persistence(format!("mirror write task failed: {e}")))?
    }
}

#[async_trait]
impl UserMirror for FileMirror {
    async fn fetch_all(&self) -> Result<Vec<User>> {
        let mut cached = self.documents.lock().await;
        let path = self.path.clone();
        let documents = tokio::task::spawn_blocking(move || read_documents(&path))
            .await
            .map_err(|e| StoreError::persistence(format!("mirror read task failed: {e}")))??;
        *cached = documents.clone();
        Ok(documents)
    }

    async fn insert(&self, user: &User) -> Result<()> {
        let mut cached = self.documents.lock().await;
        let mut next = cached.clone();
        next.push(user.clone());
        self.persist(next.clone()).await?;
        *cached = next;
        Ok(())
    }

    async fn replace(&self, user: &User) -> Result<bool> {
        let mut cached = self.documents.lock().await;
        let Some(idx) = cached.iter().position(|doc| doc.id == user.id) else {
            return Ok(false);
        };
        let mut next = cached.clone();
        next[idx] = user.clone();
        self.persist(next.clone()).await?;
        *cached = next;
        Ok(true)
    }

    async fn delete_by_id(&self, id: UserId) -> Result<bool> {
        let mut cached = self.documents.lock().await;
        let Some(idx) = cached.iter().position(|doc| doc.id == id) else {
            return Ok(false);
        };
        let mut next = cached.clone();
        next.remove(idx);
        self.persist(next.clone()).await?;
        *cached = next;
        Ok(true)
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

fn read_documents(path: &Path) -> Result<Vec<User>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let data = fs::read(path).map_err(|e| {
        StoreError::persistence(format!("failed to read {}: {e}", path.display()))
    })?;
    if data.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    serde_json::from_slice(&data).map_err(|e| {
        StoreError::persistence(format!("failed to decode {}: {e}", path.display()))
    })
}

fn write_documents(path: &Path, documents: &[User]) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| StoreError::persistence("mirror path has no parent directory"))?;
    let serialized = serde_json::to_vec_pretty(documents)?;

    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(&serialized)?;
    temp.flush()?;
    temp.as_file().sync_all()?;
    temp.persist(path)
        .map_err(|e| StoreError::persistence(format!("failed to rename mirror file: {}", e.error)))?;
    Ok(())
}
