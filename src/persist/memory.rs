use super::UserMirror;
use crate::core::{Result, StoreError, User, UserId};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// Process-local mirror, for tests and mirror-less local runs.
///
/// Writes can be made to fail on demand to exercise the store's
/// write-through error paths.
#[derive(Default)]
pub struct InMemoryMirror {
    documents: RwLock<Vec<User>>,
    fail_writes: AtomicBool,
}

impl InMemoryMirror {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents(documents: Vec<User>) -> Self {
        Self {
            documents: RwLock::new(documents),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn documents(&self) -> Vec<User> {
        self.documents.read().await.clone()
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::persistence("mirror rejected write"));
        }
        Ok(())
    }
}

#[async_trait]
impl UserMirror for InMemoryMirror {
    async fn fetch_all(&self) -> Result<Vec<User>> {
        Ok(self.documents.read().await.clone())
    }

    async fn insert(&self, user: &User) -> Result<()> {
        self.check_writable()?;
        self.documents.write().await.push(user.clone());
        Ok(())
    }

    async fn replace(&self, user: &User) -> Result<bool> {
        self.check_writable()?;
        let mut documents = self.documents.write().await;
        let Some(existing) = documents.iter_mut().find(|doc| doc.id == user.id) else {
            return Ok(false);
        };
        *existing = user.clone();
        Ok(true)
    }

    async fn delete_by_id(&self, id: UserId) -> Result<bool> {
        self.check_writable()?;
        let mut documents = self.documents.write().await;
        let Some(idx) = documents.iter().position(|doc| doc.id == id) else {
            return Ok(false);
        };
        documents.remove(idx);
        Ok(true)
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
