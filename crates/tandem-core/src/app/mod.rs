//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせてアプリケーションロジックを実装します。
//!
//! # 主要コンポーネント
//! - **DualWriteCoordinator**: Store への書き込み → イベント発行の順序付け
//! - **CoordinatorBuilder**: Coordinator の構築とワイヤリング
//! - **DualWriteConfig**: publish timeout・topic・相関 ID の設定
//! - **UserService / FriendService**: 各サービスの操作

pub mod builder;
pub mod config;
pub mod coordinator;
pub mod services;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, CoordinatorBuilder};
pub use self::config::{ConfigError, DEFAULT_PUBLISH_TIMEOUT_MS, DualWriteConfig};
pub use self::coordinator::DualWriteCoordinator;
pub use self::services::{FriendService, UserService};
