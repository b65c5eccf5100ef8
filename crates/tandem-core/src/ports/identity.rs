//! IdentityDirectory port - 他サービスが所有するユーザーの存在確認
//!
//! friend サービスが友達関係を作る前に、両端のユーザーが user サービスに存在するかを確認します。

use async_trait::async_trait;

use crate::domain::{IdentityError, UserId};

#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    async fn exists(&self, user_id: UserId) -> Result<bool, IdentityError>;
}
