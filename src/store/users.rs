use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::user::User;

/// User records plus a secondary index keyed by email. Uniqueness is
/// decided by the index entry lock, so two concurrent registrations
/// with the same email cannot both win.
#[derive(Default)]
pub struct UserStore {
    inner: DashMap<Uuid, User>,
    emails: DashMap<String, Uuid>,
}

impl UserStore {
    pub fn new() -> Self {
        Self {
            inner: DashMap::new(),
            emails: DashMap::new(),
        }
    }

    pub fn insert(&self, user: User) -> Result<(), AppError> {
        match self.emails.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(AppError::Conflict(format!(
                "email {} is already registered",
                user.email
            ))),
            Entry::Vacant(slot) => {
                slot.insert(user.id);
                self.inner.insert(user.id, user);
                Ok(())
            }
        }
    }

    pub fn get(&self, id: Uuid) -> Option<User> {
        self.inner.get(&id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use uuid::Uuid;

    use super::UserStore;
    use crate::models::user::{Role, User};

    fn user(email: &str) -> User {
        User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            phone: "5550001111".to_string(),
            role: Role::Customer,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let store = UserStore::new();
        store.insert(user("ada@example.com")).unwrap();

        assert!(store.insert(user("ada@example.com")).is_err());
        assert!(store.insert(user("grace@example.com")).is_ok());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn concurrent_registrations_with_same_email_admit_one() {
        let store = Arc::new(UserStore::new());

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.insert(user("ada@example.com")))
            })
            .collect();

        let wins = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|result| result.is_ok())
            .count();

        assert_eq!(wins, 1);
        assert_eq!(store.len(), 1);
    }
}
