//! InMemoryIdentityDirectory - user サービスの代わりに使う存在確認の実装

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{IdentityError, UserId};
use crate::ports::IdentityDirectory;

#[derive(Default)]
pub struct InMemoryIdentityDirectory {
    users: RwLock<HashSet<UserId>>,
    calls: AtomicUsize,
    unavailable: AtomicBool,
}

impl InMemoryIdentityDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = UserId>) -> Self {
        Self {
            users: RwLock::new(users.into_iter().collect()),
            ..Self::default()
        }
    }

    pub async fn insert(&self, user_id: UserId) {
        self.users.write().await.insert(user_id);
    }

    pub async fn remove(&self, user_id: UserId) {
        self.users.write().await.remove(&user_id);
    }

    /// true の間、すべての問い合わせを `IdentityError::Unavailable` で失敗させる
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityDirectory for InMemoryIdentityDirectory {
    async fn exists(&self, user_id: UserId) -> Result<bool, IdentityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(IdentityError::Unavailable(format!(
                "lookup of {user_id} failed"
            )));
        }
        Ok(self.users.read().await.contains(&user_id))
    }
}
