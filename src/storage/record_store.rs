use super::table::UserTable;
use crate::core::{Result, StoreError, User, UserId, UserPayload};
use crate::persist::UserMirror;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// The authoritative user collection, shared between request handlers.
///
/// One mutex guards the records and the id counter. Every operation holds it
/// from first read to last write, including the mirror round trip, so no
/// caller ever observes a half-applied change. Mirror writes happen before the
/// in-memory mutation; if the mirror fails, memory is left as it was.
///
/// Updates only reach the mirror when `mirror_updates` is enabled. Otherwise
/// the mirror keeps the record as it was created and a restart loses the edit.
pub struct RecordStore {
    table: Mutex<UserTable>,
    mirror: Option<Arc<dyn UserMirror>>,
    mirror_updates: bool,
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore {
    /// A store with no mirror.
    pub fn new() -> Self {
        Self {
            table: Mutex::new(UserTable::new()),
            mirror: None,
            mirror_updates: false,
        }
    }

    pub fn with_mirror(mirror: Arc<dyn UserMirror>) -> Self {
        Self {
            table: Mutex::new(UserTable::new()),
            mirror: Some(mirror),
            mirror_updates: false,
        }
    }

    pub fn mirror_updates(mut self, enabled: bool) -> Self {
        self.mirror_updates = enabled;
        self
    }

    pub fn mirror(&self) -> Option<&Arc<dyn UserMirror>> {
        self.mirror.as_ref()
    }

    pub async fn len(&self) -> usize {
        self.table.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.table.lock().await.is_empty()
    }

    /// The id the next successful or failed create will consume.
    pub async fn next_id(&self) -> UserId {
        self.table.lock().await.next_id()
    }

    pub async fn list_all(&self) -> Vec<User> {
        self.table.lock().await.list_all()
    }

    pub async fn get(&self, id: UserId) -> Result<User> {
        self.table.lock().await.get(id)
    }

    /// Allocate an id, write the record to the mirror, then insert it.
    ///
    /// The id is consumed even when the mirror write fails, so a write that
    /// reached the mirror before erroring can never collide with a later one.
    pub async fn create(&self, payload: UserPayload) -> Result<User> {
        let mut table = self.table.lock().await;

        let Some(mirror) = &self.mirror else {
            let user = table.create(payload)?;
            debug!(id = user.id, "created user");
            return Ok(user);
        };

        let user = payload.into_user(table.allocate_id()?);
        if let Err(err) = mirror.insert(&user).await {
            error!(id = user.id, error = %err, "mirror insert failed; user not created");
            return Err(err);
        }
        table.insert_allocated(user.clone());
        debug!(id = user.id, "created user");
        Ok(user)
    }

    pub async fn update(&self, id: UserId, payload: UserPayload) -> Result<User> {
        let mut table = self.table.lock().await;

        if self.mirror_updates
            && let Some(mirror) = &self.mirror
        {
            let mut updated = table.get(id)?;
            updated.apply(payload.clone());
            match mirror.replace(&updated).await {
                Ok(true) => {}
                Ok(false) => warn!(id, "user missing from mirror during update"),
                Err(err) => {
                    error!(id, error = %err, "mirror update failed; user left unchanged");
                    return Err(err);
                }
            }
        }

        let user = table.update(id, payload)?;
        debug!(id, "updated user");
        Ok(user)
    }

    /// Remove a user from the mirror, then from memory.
    ///
    /// Ids unknown to memory are `NotFound` without touching the mirror. A
    /// mirror that holds no matching document is logged and memory is still
    /// cleared, since memory is the system of record.
    pub async fn delete(&self, id: UserId) -> Result<()> {
        let mut table = self.table.lock().await;

        if !table.contains(id) {
            return Err(StoreError::NotFound(id));
        }

        if let Some(mirror) = &self.mirror {
            match mirror.delete_by_id(id).await {
                Ok(true) => {}
                Ok(false) => warn!(id, "user missing from mirror during delete"),
                Err(err) => {
                    error!(id, error = %err, "mirror delete failed; user kept");
                    return Err(err);
                }
            }
        }

        table.delete(id)?;
        debug!(id, "deleted user");
        Ok(())
    }

    /// Seed the store with existing records, keeping their ids.
    ///
    /// A batch holding an id with no successor is rejected as a whole.
    pub async fn bulk_load(&self, users: Vec<User>) -> Result<usize> {
        let mut table = self.table.lock().await;
        let offered = users.len();
        for user in &users {
            debug!(id = user.id, name = %user.name, age = user.age, "loading user");
        }
        let loaded = table.bulk_load(users)?;
        if loaded < offered {
            warn!(skipped = offered - loaded, "skipped records with duplicate ids");
        }
        info!(loaded, next_id = table.next_id(), "bulk loaded users");
        Ok(loaded)
    }

    /// Scan the configured mirror and bulk load its documents.
    /// A store without a mirror loads nothing.
    pub async fn load_from_mirror(&self) -> Result<usize> {
        let Some(mirror) = &self.mirror else {
            return Ok(0);
        };
        let users = mirror.fetch_all().await?;
        info!(mirror = %mirror.describe(), documents = users.len(), "fetched mirror");
        self.bulk_load(users).await
    }
}
