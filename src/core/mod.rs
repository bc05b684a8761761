pub mod error;
pub mod user;

pub use error::{Result, StoreError};
pub use user::{User, UserId, UserPayload};
