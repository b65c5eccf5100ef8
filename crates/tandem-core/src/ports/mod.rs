//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait は外部システム（ローカル DB, メッセージ broker, user サービス）への
//! インターフェースを提供し、実装の詳細を隠蔽します。
//!
//! # 設計原則
//! - ローカル Store が source of truth（正本）
//! - broker は commit 済みの変更を通知するだけ（Store のトランザクションには参加しない）
//! - Store と broker の間に共有のトランザクションマネージャはない

pub mod clock;
pub mod event_broker;
pub mod id_generator;
pub mod identity;
pub mod record_store;

// 主要な trait を再エクスポート
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::event_broker::{EventBroker, OutboundMessage};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::identity::IdentityDirectory;
pub use self::record_store::RecordStore;
