use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{Datastore, NewUserRecord, StoreError, StoreResult};
use crate::auth::repo_types::User;
use crate::saved::repo_types::SavedItem;

/// In-process datastore.
///
/// Every write runs its uniqueness checks and the insert under one lock, so
/// the same guarantees hold as with the unique indexes of the PostgreSQL
/// schema.
pub struct MemoryStore {
    ready: AtomicBool,
    inner: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    by_email: HashMap<String, Uuid>,
    by_username: HashMap<String, Uuid>,
    by_token: HashMap<String, Uuid>,
    saved: Vec<SavedItem>,
    saved_keys: HashSet<(Uuid, i64)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            ready: AtomicBool::new(true),
            inner: Mutex::new(Tables::default()),
        }
    }

    /// Simulates the backing store going away or coming back.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    fn tables(&self) -> StoreResult<std::sync::MutexGuard<'_, Tables>> {
        if !self.ready.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }
        self.inner
            .lock()
            .map_err(|_| StoreError::Backend(anyhow::anyhow!("memory store lock poisoned")))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Datastore for MemoryStore {
    async fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn insert_user(&self, rec: NewUserRecord) -> StoreResult<User> {
        let mut t = self.tables()?;
        if t.by_email.contains_key(&rec.email) {
            return Err(StoreError::duplicate("email"));
        }
        if t.by_username.contains_key(&rec.username) {
            return Err(StoreError::duplicate("username"));
        }
        if t.by_token.contains_key(&rec.access_token) {
            return Err(StoreError::duplicate("accessToken"));
        }
        if t.users.contains_key(&rec.id) {
            return Err(StoreError::duplicate("id"));
        }

        let user = User {
            id: rec.id,
            username: rec.username,
            email: rec.email,
            password_hash: rec.password_hash,
            access_token: rec.access_token,
            created_at: OffsetDateTime::now_utc(),
        };
        t.by_email.insert(user.email.clone(), user.id);
        t.by_username.insert(user.username.clone(), user.id);
        t.by_token.insert(user.access_token.clone(), user.id);
        t.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_token(&self, token: &str) -> StoreResult<Option<User>> {
        let t = self.tables()?;
        Ok(t.by_token.get(token).and_then(|id| t.users.get(id)).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let t = self.tables()?;
        Ok(t.by_email.get(email).and_then(|id| t.users.get(id)).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let t = self.tables()?;
        Ok(t
            .by_username
            .get(username)
            .and_then(|id| t.users.get(id))
            .cloned())
    }

    async fn insert_saved_item(&self, user_id: Uuid, listing_id: i64) -> StoreResult<SavedItem> {
        let mut t = self.tables()?;
        if !t.users.contains_key(&user_id) {
            return Err(StoreError::Backend(anyhow::anyhow!(
                "saved item references unknown user {user_id}"
            )));
        }
        if !t.saved_keys.insert((user_id, listing_id)) {
            return Err(StoreError::duplicate("listingId"));
        }
        let item = SavedItem {
            id: Uuid::new_v4(),
            user_id,
            listing_id,
            created_at: OffsetDateTime::now_utc(),
        };
        t.saved.push(item.clone());
        Ok(item)
    }

    async fn list_saved_items(&self, user_id: Uuid) -> StoreResult<Vec<SavedItem>> {
        let t = self.tables()?;
        // `saved` is in insertion order; walking it backwards breaks timestamp ties
        let mut items: Vec<SavedItem> = t
            .saved
            .iter()
            .rev()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn record(n: usize) -> NewUserRecord {
        NewUserRecord {
            id: Uuid::new_v4(),
            username: format!("user{n}"),
            email: format!("user{n}@example.com"),
            password_hash: "$argon2id$fake".into(),
            access_token: format!("token-{n}"),
        }
    }

    #[tokio::test]
    async fn rejects_duplicate_email_username_and_token() {
        let store = MemoryStore::new();
        store.insert_user(record(1)).await.unwrap();

        let mut same_email = record(2);
        same_email.email = "user1@example.com".into();
        let err = store.insert_user(same_email).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { ref field } if field == "email"));

        let mut same_name = record(3);
        same_name.username = "user1".into();
        let err = store.insert_user(same_name).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { ref field } if field == "username"));

        let mut same_token = record(4);
        same_token.access_token = "token-1".into();
        let err = store.insert_user(same_token).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { ref field } if field == "accessToken"));
    }

    #[tokio::test]
    async fn finds_user_by_each_key() {
        let store = MemoryStore::new();
        let user = store.insert_user(record(7)).await.unwrap();

        let by_token = store.find_user_by_token("token-7").await.unwrap().unwrap();
        assert_eq!(by_token.id, user.id);
        let by_email = store
            .find_user_by_email("user7@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, user.id);
        let by_name = store.find_user_by_username("user7").await.unwrap().unwrap();
        assert_eq!(by_name.id, user.id);
        assert!(store.find_user_by_token("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn saved_items_are_unique_per_user_not_global() {
        let store = MemoryStore::new();
        let a = store.insert_user(record(1)).await.unwrap();
        let b = store.insert_user(record(2)).await.unwrap();

        store.insert_saved_item(a.id, 42).await.unwrap();
        assert!(store.insert_saved_item(a.id, 42).await.unwrap_err().is_duplicate());
        store.insert_saved_item(b.id, 42).await.unwrap();

        assert_eq!(store.list_saved_items(a.id).await.unwrap().len(), 1);
        assert_eq!(store.list_saved_items(b.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn lists_newest_first() {
        let store = MemoryStore::new();
        let u = store.insert_user(record(1)).await.unwrap();
        for id in [10, 20, 30] {
            store.insert_saved_item(u.id, id).await.unwrap();
        }
        let ids: Vec<i64> = store
            .list_saved_items(u.id)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.listing_id)
            .collect();
        assert_eq!(ids, vec![30, 20, 10]);
    }

    #[tokio::test]
    async fn concurrent_saves_of_same_pair_admit_exactly_one() {
        let store = Arc::new(MemoryStore::new());
        let u = store.insert_user(record(1)).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.insert_saved_item(u.id, 42).await
            }));
        }
        let mut ok = 0;
        for h in handles {
            match h.await.unwrap() {
                Ok(_) => ok += 1,
                Err(e) => assert!(e.is_duplicate()),
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(store.list_saved_items(u.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unavailable_store_refuses_every_call() {
        let store = MemoryStore::new();
        store.set_ready(false);
        assert!(!store.is_ready().await);
        assert!(matches!(
            store.insert_user(record(1)).await.unwrap_err(),
            StoreError::Unavailable
        ));
        assert!(matches!(
            store.find_user_by_token("x").await.unwrap_err(),
            StoreError::Unavailable
        ));
        store.set_ready(true);
        assert!(store.is_ready().await);
    }
}
