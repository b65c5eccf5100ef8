//! Domain model (IDs, records, events, errors, outcomes).
//!
//! - ids: Phantom type の数値 ID と相関 ID
//! - record: Store が管理するエンティティの共通 trait
//! - user / friendship: 具体的なレコード
//! - events: broker に発行するドメインイベント
//! - errors / outcome: 失敗の分類と呼び出し側への結果

pub mod errors;
pub mod events;
pub mod friendship;
pub mod ids;
pub mod outcome;
pub mod record;
pub mod user;

pub use self::errors::{BrokerError, DualWriteError, FailureClass, IdentityError, StoreError};
pub use self::events::{DomainEvent, EventKind};
pub use self::friendship::{Friendship, FriendshipChanges, FriendshipCriteria, FriendshipId};
pub use self::ids::{CorrelationId, Id, IdMarker};
pub use self::outcome::{OutcomeKind, WriteOutcome};
pub use self::record::Record;
pub use self::user::{User, UserChanges, UserCriteria, UserId};
