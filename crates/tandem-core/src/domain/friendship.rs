//! Friendship - 2 ユーザー間の友達関係（エッジ）
//!
//! `user_id` / `friend_id` は user サービスが所有するレコードへの外部参照です。
//! 作成前に両方の存在を Identity port で確認し、自分自身との関係は作れません。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{Id, IdMarker};
use super::record::Record;
use super::user::UserId;

/// Identifier of a Friendship edge.
pub type FriendshipId = Id<Friendship>;

/// The domain entity representing a friend relationship between two users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Friendship {
    #[serde(default)]
    pub id: Option<FriendshipId>,
    pub user_id: UserId,
    pub friend_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Friendship {
    pub fn new(user_id: UserId, friend_id: UserId) -> Self {
        Self {
            id: None,
            user_id,
            friend_id,
            created_at: None,
            updated_at: None,
        }
    }

    /// 同じ (user_id, friend_id) の組を指すか
    pub fn is_pair(&self, user_id: UserId, friend_id: UserId) -> bool {
        self.user_id == user_id && self.friend_id == friend_id
    }
}

impl IdMarker for Friendship {
    fn prefix() -> &'static str {
        "friend-"
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FriendshipCriteria {
    ById(FriendshipId),
    /// 自然キー（user_id, friend_id）
    Pair { user_id: UserId, friend_id: UserId },
    /// あるユーザーの全エッジ（find_all 用）
    ByUser(UserId),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendshipChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friend_id: Option<UserId>,
}

impl Record for Friendship {
    type Criteria = FriendshipCriteria;
    type Changes = FriendshipChanges;

    const KIND: &'static str = "friend";
    const REFERENCES_USERS: bool = true;

    fn id(&self) -> Option<FriendshipId> {
        self.id
    }

    fn by_id(id: FriendshipId) -> FriendshipCriteria {
        FriendshipCriteria::ById(id)
    }

    fn matches(&self, criteria: &FriendshipCriteria) -> bool {
        match criteria {
            FriendshipCriteria::ById(id) => self.id == Some(*id),
            FriendshipCriteria::Pair { user_id, friend_id } => self.is_pair(*user_id, *friend_id),
            FriendshipCriteria::ByUser(user_id) => self.user_id == *user_id,
        }
    }

    fn apply(&mut self, changes: &FriendshipChanges) {
        if let Some(user_id) = changes.user_id {
            self.user_id = user_id;
        }
        if let Some(friend_id) = changes.friend_id {
            self.friend_id = friend_id;
        }
    }

    fn set_id(&mut self, id: FriendshipId) {
        self.id = Some(id);
    }

    fn stamp_created(&mut self, now: DateTime<Utc>) {
        self.created_at.get_or_insert(now);
        self.updated_at = Some(now);
    }

    fn stamp_updated(&mut self, now: DateTime<Utc>) {
        self.updated_at = Some(now);
    }

    fn validate(&self) -> Result<(), String> {
        if self.user_id == self.friend_id {
            return Err("a user cannot befriend oneself".to_string());
        }
        Ok(())
    }

    fn references(&self) -> Vec<UserId> {
        vec![self.user_id, self.friend_id]
    }

    fn conflicts_with(&self, other: &Self) -> bool {
        self.is_pair(other.user_id, other.friend_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn edge(user: u64, friend: u64) -> Friendship {
        Friendship::new(UserId::new(user), UserId::new(friend))
    }

    #[test]
    fn self_friendship_is_invalid() {
        let err = edge(1, 1).validate().unwrap_err();
        assert!(err.contains("oneself"));
        assert!(edge(1, 2).validate().is_ok());
    }

    #[test]
    fn both_endpoints_are_references() {
        assert_eq!(edge(1, 2).references(), vec![UserId::new(1), UserId::new(2)]);
    }

    #[rstest]
    #[case::same_pair(edge(1, 2), true)]
    #[case::reversed_pair(edge(2, 1), false)]
    #[case::other_friend(edge(1, 3), false)]
    fn pair_is_a_natural_key(#[case] other: Friendship, #[case] expected: bool) {
        assert_eq!(edge(1, 2).conflicts_with(&other), expected);
    }

    #[rstest]
    #[case::by_user(FriendshipCriteria::ByUser(UserId::new(1)), true)]
    #[case::by_pair(FriendshipCriteria::Pair { user_id: UserId::new(1), friend_id: UserId::new(2) }, true)]
    #[case::by_other_user(FriendshipCriteria::ByUser(UserId::new(2)), false)]
    #[case::by_unassigned_id(FriendshipCriteria::ById(FriendshipId::new(9)), false)]
    fn criteria_matching(#[case] criteria: FriendshipCriteria, #[case] expected: bool) {
        assert_eq!(edge(1, 2).matches(&criteria), expected);
    }
}
