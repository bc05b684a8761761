//! Persistence mirror: a durable copy of the user collection.
//!
//! The mirror is never read on the request path. It is scanned once at
//! startup to seed the record store and written through on mutations.
//! Documents are addressed by the user's `id` field.

use crate::core::{Result, User, UserId};
use async_trait::async_trait;

pub mod file;
pub mod memory;
#[cfg(feature = "mongo")]
pub mod mongo;

pub use file::FileMirror;
pub use memory::InMemoryMirror;
#[cfg(feature = "mongo")]
pub use mongo::MongoMirror;

#[async_trait]
pub trait UserMirror: Send + Sync {
    /// Every document in the collection, in stored order.
    async fn fetch_all(&self) -> Result<Vec<User>>;

    async fn insert(&self, user: &User) -> Result<()>;

    /// Overwrite the document with `user.id`. Returns `false` when no
    /// document matched.
    async fn replace(&self, user: &User) -> Result<bool>;

    /// Remove the document with `id`. Returns `false` when no document matched.
    async fn delete_by_id(&self, id: UserId) -> Result<bool>;

    /// Short name used in logs.
    fn describe(&self) -> String;
}
