//! Domain identifiers (strongly-typed IDs).
//!
//! # Record ID
//! Store が採番する数値 ID を Phantom type でラップします。
//! `Id<User>` と `Id<Friendship>` はどちらも `u64` ですが、別の型なので混同できません。
//!
//! # CorrelationId
//! 発行イベントに付与する相関 ID は ULID を使用します（時刻でソート可能・分散生成可能）。
//! 生成は `ports::IdGenerator` 経由で行い、テストでは `FixedClock` で時刻部分を固定できます。

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use ulid::Ulid;

/// IdMarker は各 ID 型のマーカー trait
///
/// Display で使うプレフィックス（"user-", "friend-"）を提供します。
pub trait IdMarker: Send + Sync + 'static {
    /// Display で使うプレフィックス（例: "user-"）
    fn prefix() -> &'static str;
}

/// ジェネリック ID 型
///
/// 中身は Store が採番した数値です。wire 上は素の数値としてシリアライズされます
/// （下流のプロジェクションが元のサービスと同じ形で読めるように）。
///
/// # 例
/// ```ignore
/// let user_id: UserId = Id::new(42);
/// let friend_id: FriendshipId = Id::new(42);
/// // user_id と friend_id は異なる型なので、混同できない
/// ```
#[repr(transparent)]
pub struct Id<T: IdMarker> {
    value: u64,
    _marker: PhantomData<fn() -> T>,
}

impl<T: IdMarker> Id<T> {
    pub const fn new(value: u64) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    pub const fn get(&self) -> u64 {
        self.value
    }
}

// derive だと `T: Clone` などの境界が付いてしまうので手書きする
impl<T: IdMarker> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: IdMarker> Copy for Id<T> {}

impl<T: IdMarker> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: IdMarker> Eq for Id<T> {}

impl<T: IdMarker> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T: IdMarker> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: IdMarker> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.value.cmp(&other.value)
    }
}

impl<T: IdMarker> From<u64> for Id<T> {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl<T: IdMarker> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({}{})", T::prefix(), self.value)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.value)
    }
}

impl<T: IdMarker> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.value)
    }
}

impl<'de, T: IdMarker> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u64::deserialize(deserializer).map(Self::new)
    }
}

/// 発行イベントの相関 ID（ULID）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(Ulid);

impl CorrelationId {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }

    pub fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl From<Ulid> for CorrelationId {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "corr-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FriendshipId, UserId};

    #[test]
    fn ids_are_distinct_types() {
        let user = UserId::new(7);
        let friendship = FriendshipId::new(7);

        assert_eq!(user.get(), friendship.get());
        assert_eq!(user.to_string(), "user-7");
        assert_eq!(friendship.to_string(), "friend-7");

        // The whole point: you can't accidentally mix these types.
        // let _: UserId = friendship; // <- does not compile
    }

    #[test]
    fn ids_serialize_as_plain_numbers() {
        let id = UserId::new(42);
        let s = serde_json::to_string(&id).unwrap();
        assert_eq!(s, "42");

        let back: UserId = serde_json::from_str("42").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn correlation_ids_are_sortable() {
        let first = CorrelationId::from(Ulid::from_parts(1_000, 5));
        let second = CorrelationId::from(Ulid::from_parts(2_000, 1));
        assert!(first < second);
        assert!(first.to_string().starts_with("corr-"));
    }

    #[test]
    fn phantom_data_does_not_consume_memory() {
        use std::mem::size_of;
        assert_eq!(size_of::<UserId>(), size_of::<u64>());
        assert_eq!(size_of::<CorrelationId>(), 16);
    }
}
