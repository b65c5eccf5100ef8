//! EventBroker port - ドメインイベントの発行
//!
//! broker は at-least-once の publish と、ack までの待機（タイムアウト付き）だけを提供します。
//! 待つのはトランスポートの ack までで、下流のコンシューマーの処理完了は待ちません。
//!
//! # 実装
//! - `impls::InMemoryBroker`（テスト・デモ用）
//! - 将来: Kafka, RabbitMQ など

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::BrokerError;

/// broker に渡すメッセージ
///
/// payload はエンコード済みの `DomainEvent`（`{ subject, eventKind }`）。
/// key はレコード ID で、パーティショニングに使えるようにしておく。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub topic: String,
    pub key: String,
    pub payload: serde_json::Value,
}

/// EventBroker はメッセージを送り、`timeout` まで ack を待つ
///
/// # エラー
/// - 拒否: `BrokerError::Rejected`
/// - 期限切れ: `BrokerError::Timeout`（拒否と同じく発行失敗として扱われる）
#[async_trait]
pub trait EventBroker: Send + Sync {
    async fn publish(&self, message: OutboundMessage, timeout: Duration)
    -> Result<(), BrokerError>;
}
