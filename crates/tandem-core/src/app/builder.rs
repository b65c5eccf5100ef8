//! CoordinatorBuilder - Coordinator の構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）
//! - 開発体験の改善（明確なエラーメッセージ）

use std::sync::Arc;

use crate::domain::Record;
use crate::ports::{
    EventBroker, IdGenerator, IdentityDirectory, RecordStore, SystemClock, UlidGenerator,
};

use super::config::DualWriteConfig;
use super::coordinator::DualWriteCoordinator;

/// CoordinatorBuilder は DualWriteCoordinator を構築
///
/// # 使用例
/// ```ignore
/// let friends = CoordinatorBuilder::<Friendship>::new()
///     .store(store)
///     .broker(broker)
///     .identity(directory)
///     .config(DualWriteConfig::from_env()?)
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - Store と broker は必須
/// - 他サービスのユーザーを参照するレコード（`Record::REFERENCES_USERS`）では
///   Identity port も必須。最初の create で気づくのではなく build() で弾く
pub struct CoordinatorBuilder<R: Record> {
    store: Option<Arc<dyn RecordStore<R>>>,
    broker: Option<Arc<dyn EventBroker>>,
    identity: Option<Arc<dyn IdentityDirectory>>,
    id_generator: Option<Arc<dyn IdGenerator>>,
    config: DualWriteConfig,
}

/// BuildError は Coordinator 構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing record store. Call .store() before .build().")]
    MissingStore,

    #[error("Missing event broker. Call .broker() before .build().")]
    MissingBroker,

    #[error("Missing identity directory: {0} records reference users and need .identity().")]
    MissingIdentityDirectory(&'static str),

    #[error("publish_timeout_ms must be greater than zero")]
    ZeroPublishTimeout,
}

impl<R: Record> CoordinatorBuilder<R> {
    pub fn new() -> Self {
        Self {
            store: None,
            broker: None,
            identity: None,
            id_generator: None,
            config: DualWriteConfig::default(),
        }
    }

    pub fn store(mut self, store: Arc<dyn RecordStore<R>>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn broker(mut self, broker: Arc<dyn EventBroker>) -> Self {
        self.broker = Some(broker);
        self
    }

    pub fn identity(mut self, identity: Arc<dyn IdentityDirectory>) -> Self {
        self.identity = Some(identity);
        self
    }

    /// 相関 ID の生成器を差し替える（省略時は SystemClock ベースの ULID）
    pub fn id_generator(mut self, id_generator: Arc<dyn IdGenerator>) -> Self {
        self.id_generator = Some(id_generator);
        self
    }

    pub fn config(mut self, config: DualWriteConfig) -> Self {
        self.config = config;
        self
    }

    /// CoordinatorBuilder を構築して DualWriteCoordinator を生成
    ///
    /// # 検証
    /// - Store / broker が設定されているか
    /// - 参照を持つレコードなら Identity port が設定されているか
    /// - publish timeout が 0 でないか
    pub fn build(self) -> Result<DualWriteCoordinator<R>, BuildError> {
        let store = self.store.ok_or(BuildError::MissingStore)?;
        let broker = self.broker.ok_or(BuildError::MissingBroker)?;
        if R::REFERENCES_USERS && self.identity.is_none() {
            return Err(BuildError::MissingIdentityDirectory(R::KIND));
        }
        if self.config.publish_timeout_ms == 0 {
            return Err(BuildError::ZeroPublishTimeout);
        }

        let id_generator = if self.config.correlation_ids {
            Some(
                self.id_generator
                    .unwrap_or_else(|| Arc::new(UlidGenerator::new(SystemClock))),
            )
        } else {
            None
        };

        Ok(DualWriteCoordinator::from_parts(
            store,
            broker,
            self.identity,
            id_generator,
            self.config.topic_for(R::KIND),
            self.config.publish_timeout(),
        ))
    }
}

impl<R: Record> Default for CoordinatorBuilder<R> {
    fn default() -> Self {
        Self::new()
    }
}
