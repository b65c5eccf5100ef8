//! Impls - 実装（開発用・テスト用）
//!
//! このモジュールには ports の実装を含めます。
//!
//! # 含まれる実装
//! - **InMemoryStore**: 開発用の RecordStore（障害注入・呼び出し回数の記録つき）
//! - **InMemoryBroker**: 受け取ったメッセージを保持する EventBroker
//! - **InMemoryIdentityDirectory**: user サービスの代わりの存在確認
//!
//! # 本番用実装
//! 本番用の実装は別クレートに配置します：
//! - `tandem-pg`: PostgreSQL の RecordStore
//! - `tandem-kafka`: Kafka / RabbitMQ の EventBroker

pub mod inmem_broker;
pub mod inmem_identity;
pub mod inmem_store;

// 主要な型を再エクスポート
pub use self::inmem_broker::{BrokerMode, InMemoryBroker};
pub use self::inmem_identity::InMemoryIdentityDirectory;
pub use self::inmem_store::{InMemoryStore, StoreCalls, StoreOp};
