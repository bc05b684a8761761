use serde::{Deserialize, Serialize};

pub type UserId = i64;

/// A stored user record. `id` is assigned by the record store and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub age: i64,
}

/// The mutable part of a user, as accepted on create and update.
///
/// Missing fields decode to their zero value and any `id` in the body is
/// ignored; the store owns id assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPayload {
    pub name: String,
    pub age: i64,
}

impl UserPayload {
    pub fn new(name: impl Into<String>, age: i64) -> Self {
        Self {
            name: name.into(),
            age,
        }
    }

    pub fn into_user(self, id: UserId) -> User {
        User {
            id,
            name: self.name,
            age: self.age,
        }
    }
}

impl User {
    /// Replace the mutable fields, keeping the id.
    pub fn apply(&mut self, payload: UserPayload) {
        self.name = payload.name;
        self.age = payload.age;
    }
}
