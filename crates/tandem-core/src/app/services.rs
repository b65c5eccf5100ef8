//! Services - user / friend サービスの操作を Coordinator 呼び出しとして表現する
//!
//! 各サービスは自分のレコード種別の Coordinator を 1 つ持つだけで、
//! Store や broker に直接触れることはありません。

use crate::domain::{
    DualWriteError, Friendship, FriendshipChanges, FriendshipCriteria, FriendshipId, User,
    UserChanges, UserCriteria, UserId,
};

use super::coordinator::DualWriteCoordinator;

/// ユーザーの作成・更新・参照
#[derive(Clone)]
pub struct UserService {
    users: DualWriteCoordinator<User>,
}

impl UserService {
    pub fn new(users: DualWriteCoordinator<User>) -> Self {
        Self { users }
    }

    /// ID が指定されていればその ID で存在確認し、未指定なら Store の採番に任せる
    pub async fn create_user(&self, user: User) -> Result<User, DualWriteError> {
        let existence = user.id.map(UserCriteria::ById);
        self.users.create(user, existence.as_ref()).await
    }

    pub async fn update_user(
        &self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<User, DualWriteError> {
        self.users.update(id, changes).await
    }

    pub async fn find_user(&self, id: UserId) -> Result<Option<User>, DualWriteError> {
        self.users.find(&UserCriteria::ById(id)).await
    }
}

/// 友達関係の追加・削除・参照
#[derive(Clone)]
pub struct FriendService {
    friends: DualWriteCoordinator<Friendship>,
}

impl FriendService {
    pub fn new(friends: DualWriteCoordinator<Friendship>) -> Self {
        Self { friends }
    }

    pub async fn add_friend(
        &self,
        user_id: UserId,
        friend_id: UserId,
    ) -> Result<Friendship, DualWriteError> {
        let pair = FriendshipCriteria::Pair { user_id, friend_id };
        self.friends
            .create(Friendship::new(user_id, friend_id), Some(&pair))
            .await
    }

    pub async fn remove_friend(
        &self,
        user_id: UserId,
        friend_id: UserId,
    ) -> Result<Friendship, DualWriteError> {
        self.friends
            .delete(&FriendshipCriteria::Pair { user_id, friend_id })
            .await
    }

    pub async fn update_friend(
        &self,
        id: FriendshipId,
        changes: &FriendshipChanges,
    ) -> Result<Friendship, DualWriteError> {
        self.friends.update(id, changes).await
    }

    pub async fn find_friend(
        &self,
        id: FriendshipId,
    ) -> Result<Option<Friendship>, DualWriteError> {
        self.friends.find(&FriendshipCriteria::ById(id)).await
    }

    /// `user_id` が追加した友達関係（ID 順）
    pub async fn find_user_friends(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Friendship>, DualWriteError> {
        self.friends
            .find_all(&FriendshipCriteria::ByUser(user_id))
            .await
    }

    pub async fn exists(&self, user_id: UserId, friend_id: UserId) -> Result<bool, DualWriteError> {
        let found = self
            .friends
            .find(&FriendshipCriteria::Pair { user_id, friend_id })
            .await?;
        Ok(found.is_some())
    }
}
