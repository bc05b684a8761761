// ============================================================================
// userdb Library
// ============================================================================

pub mod config;
pub mod core;
pub mod persist;
pub mod server;
pub mod storage;
pub mod web;

// Re-export main types for convenience
pub use crate::config::{AppConfig, MirrorBackend};
pub use crate::core::{Result, StoreError, User, UserId, UserPayload};
pub use crate::persist::{FileMirror, InMemoryMirror, UserMirror};
#[cfg(feature = "mongo")]
pub use crate::persist::MongoMirror;
pub use crate::server::{UserServer, build_store};
pub use crate::storage::{RecordStore, UserTable};
pub use crate::web::{ApiError, AppState, build_router};
