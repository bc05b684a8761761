use crate::core::{Result, StoreError, User, UserId, UserPayload};

/// First id handed out by a fresh table.
pub const FIRST_USER_ID: UserId = 1;

/// Unsynchronized user collection plus its id allocator.
///
/// Records are kept in insertion order. `next_id` only ever grows, so an id is
/// never handed out twice even after the record holding it is deleted.
#[derive(Debug, Clone)]
pub struct UserTable {
    users: Vec<User>,
    next_id: UserId,
}

impl Default for UserTable {
    fn default() -> Self {
        Self::new()
    }
}

impl UserTable {
    pub fn new() -> Self {
        Self {
            users: Vec::new(),
            next_id: FIRST_USER_ID,
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn next_id(&self) -> UserId {
        self.next_id
    }

    pub fn list_all(&self) -> Vec<User> {
        self.users.clone()
    }

    pub fn get(&self, id: UserId) -> Result<User> {
        self.position(id)
            .map(|idx| self.users[idx].clone())
            .ok_or(StoreError::NotFound(id))
    }

    pub fn contains(&self, id: UserId) -> bool {
        self.position(id).is_some()
    }

    /// Hand out the next id. The counter advances whether or not the caller
    /// ends up storing a record under it.
    ///
    /// Fails once the id space is exhausted; the counter is left untouched.
    pub fn allocate_id(&mut self) -> Result<UserId> {
        let id = self.next_id;
        self.next_id = successor(id)?;
        Ok(id)
    }

    pub fn create(&mut self, payload: UserPayload) -> Result<User> {
        let id = self.allocate_id()?;
        let user = payload.into_user(id);
        self.users.push(user.clone());
        Ok(user)
    }

    /// Append a record whose id was allocated earlier by `allocate_id`.
    pub fn insert_allocated(&mut self, user: User) {
        debug_assert!(user.id < self.next_id);
        self.users.push(user);
    }

    pub fn update(&mut self, id: UserId, payload: UserPayload) -> Result<User> {
        let idx = self.position(id).ok_or(StoreError::NotFound(id))?;
        let user = &mut self.users[idx];
        user.apply(payload);
        Ok(user.clone())
    }

    pub fn delete(&mut self, id: UserId) -> Result<User> {
        let idx = self.position(id).ok_or(StoreError::NotFound(id))?;
        Ok(self.users.remove(idx))
    }

    /// Append records as-is, keeping their ids, then raise the counter past
    /// the highest loaded id. The counter is never lowered. Records whose id
    /// is already present are skipped; the number appended is returned.
    ///
    /// A record whose id leaves no room for a later one rejects the whole
    /// batch before anything is appended.
    pub fn bulk_load(&mut self, users: impl IntoIterator<Item = User>) -> Result<usize> {
        let users: Vec<User> = users.into_iter().collect();
        let mut next_id = self.next_id;
        for user in &users {
            if user.id >= next_id {
                next_id = successor(user.id)?;
            }
        }

        let before = self.users.len();
        for user in users {
            if self.contains(user.id) {
                continue;
            }
            self.users.push(user);
        }
        self.next_id = next_id;
        Ok(self.users.len() - before)
    }

    fn position(&self, id: UserId) -> Option<usize> {
        self.users.iter().position(|user| user.id == id)
    }
}

fn successor(id: UserId) -> Result<UserId> {
    id.checked_add(1)
        .ok_or_else(|| StoreError::persistence(format!("user id {id} leaves no room for new ids")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: UserId, name: &str, age: i64) -> User {
        User {
            id,
            name: name.to_string(),
            age,
        }
    }

    #[test]
    fn create_assigns_increasing_ids() {
        let mut table = UserTable::new();
        let ann = table.create(UserPayload::new("Ann", 30)).unwrap();
        let bob = table.create(UserPayload::new("Bob", 40)).unwrap();
        assert_eq!(ann.id, 1);
        assert_eq!(bob.id, 2);
        assert_eq!(table.next_id(), 3);
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let mut table = UserTable::new();
        let first = table.create(UserPayload::new("Ann", 30)).unwrap();
        table.delete(first.id).unwrap();
        let second = table.create(UserPayload::new("Bob", 40)).unwrap();
        assert!(second.id > first.id);
    }

    #[test]
    fn delete_preserves_relative_order() {
        let mut table = UserTable::new();
        for name in ["a", "b", "c", "d"] {
            table.create(UserPayload::new(name, 1)).unwrap();
        }
        table.delete(2).unwrap();
        let names: Vec<_> = table.list_all().into_iter().map(|u| u.name).collect();
        assert_eq!(names, vec!["a", "c", "d"]);
    }

    #[test]
    fn missing_ids_report_not_found() {
        let mut table = UserTable::new();
        assert!(table.get(9).unwrap_err().is_not_found());
        assert!(table.update(9, UserPayload::default()).unwrap_err().is_not_found());
        assert!(table.delete(9).unwrap_err().is_not_found());
    }

    #[test]
    fn update_changes_only_mutable_fields() {
        let mut table = UserTable::new();
        let created = table.create(UserPayload::new("Ann", 30)).unwrap();
        let updated = table.update(created.id, UserPayload::new("Ann", 31)).unwrap();
        assert_eq!(updated, user(created.id, "Ann", 31));
        assert_eq!(table.get(created.id).unwrap(), updated);
    }

    #[test]
    fn bulk_load_raises_counter_past_loaded_ids() {
        let mut table = UserTable::new();
        let loaded = table.bulk_load(vec![user(5, "e", 1), user(3, "c", 1)]).unwrap();
        assert_eq!(loaded, 2);
        assert_eq!(table.next_id(), 6);
        assert_eq!(table.create(UserPayload::new("f", 1)).unwrap().id, 6);
    }

    #[test]
    fn bulk_load_skips_duplicate_ids() {
        let mut table = UserTable::new();
        let loaded = table.bulk_load(vec![user(1, "a", 1), user(1, "dup", 2)]).unwrap();
        assert_eq!(loaded, 1);
        assert_eq!(table.get(1).unwrap().name, "a");
    }

    #[test]
    fn bulk_load_never_lowers_counter() {
        let mut table = UserTable::new();
        for _ in 0..10 {
            table.create(UserPayload::new("x", 1)).unwrap();
        }
        table.bulk_load(vec![user(2, "low", 1)]).unwrap();
        assert_eq!(table.next_id(), 11);
    }

    #[test]
    fn bulk_load_rejects_max_id() {
        let mut table = UserTable::new();
        table.create(UserPayload::new("a", 1)).unwrap();

        let err = table
            .bulk_load(vec![user(2, "b", 1), user(i64::MAX, "max", 1)])
            .unwrap_err();
        assert!(matches!(err, StoreError::Persistence(_)));
        // nothing from the rejected batch lands
        assert_eq!(table.len(), 1);
        assert_eq!(table.next_id(), 2);
    }

    #[test]
    fn create_fails_once_ids_run_out() {
        let mut table = UserTable::new();
        table.bulk_load(vec![user(i64::MAX - 1, "last", 1)]).unwrap();
        assert_eq!(table.next_id(), i64::MAX);

        assert!(matches!(
            table.create(UserPayload::new("x", 1)),
            Err(StoreError::Persistence(_))
        ));
        assert!(table.allocate_id().is_err());
        assert_eq!(table.next_id(), i64::MAX);
        assert_eq!(table.len(), 1);
    }
}
