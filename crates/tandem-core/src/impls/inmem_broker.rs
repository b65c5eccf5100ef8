//! InMemoryBroker - 開発・テスト用の EventBroker
//!
//! 受け取ったメッセージをそのまま保持します。モードを切り替えることで
//! 拒否（Reject）や ack が返ってこない状態（Stall）を再現できます。

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{BrokerError, DomainEvent, Record};
use crate::ports::{EventBroker, OutboundMessage};

/// broker の振る舞い
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BrokerMode {
    /// すぐに ack を返す
    #[default]
    Accept,
    /// 理由付きで拒否する
    Reject(String),
    /// ack を返さない（呼び出し側の timeout まで待たせる）
    Stall,
}

/// 開発・テスト用の EventBroker 実装
///
/// # 使用例
/// ```ignore
/// let broker = InMemoryBroker::new();
/// broker.set_mode(BrokerMode::Stall).await;
/// ```
#[derive(Default)]
pub struct InMemoryBroker {
    published: RwLock<Vec<OutboundMessage>>,
    mode: RwLock<BrokerMode>,
    attempts: AtomicUsize,
}

impl InMemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: BrokerMode) -> Self {
        Self {
            mode: RwLock::new(mode),
            ..Self::default()
        }
    }

    pub async fn set_mode(&self, mode: BrokerMode) {
        *self.mode.write().await = mode;
    }

    /// ack 済みのメッセージ（受信順）
    pub async fn published(&self) -> Vec<OutboundMessage> {
        self.published.read().await.clone()
    }

    /// `topic` に ack 済みのメッセージを `R` のイベントとしてデコードする
    ///
    /// デコードできないメッセージが 1 つでもあればエラーを返す。
    pub async fn published_events<R: Record>(
        &self,
        topic: &str,
    ) -> Result<Vec<DomainEvent<R>>, serde_json::Error> {
        self.published
            .read()
            .await
            .iter()
            .filter(|message| message.topic == topic)
            .map(|message| serde_json::from_value(message.payload.clone()))
            .collect()
    }

    /// publish が呼ばれた回数（拒否・タイムアウトも含む）
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub async fn clear(&self) {
        self.published.write().await.clear();
    }
}

#[async_trait]
impl EventBroker for InMemoryBroker {
    async fn publish(
        &self,
        message: OutboundMessage,
        timeout: Duration,
    ) -> Result<(), BrokerError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        // ロックを保持したまま待たない
        let mode = self.mode.read().await.clone();
        match mode {
            BrokerMode::Accept => {
                self.published.write().await.push(message);
                Ok(())
            }
            BrokerMode::Reject(reason) => Err(BrokerError::Rejected(reason)),
            BrokerMode::Stall => {
                let _ = tokio::time::timeout(timeout, std::future::pending::<()>()).await;
                Err(BrokerError::Timeout(timeout))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EventKind, User, UserId};

    fn message(topic: &str, user: &User) -> OutboundMessage {
        OutboundMessage {
            topic: topic.to_string(),
            key: "1".to_string(),
            payload: serde_json::to_value(DomainEvent::created(user.clone())).unwrap(),
        }
    }

    #[tokio::test]
    async fn accepted_messages_are_kept_in_order() {
        let broker = InMemoryBroker::new();
        let jane = User::new("Jane", "Doe").with_id(UserId::new(1));
        let john = User::new("John", "Doe").with_id(UserId::new(2));

        broker
            .publish(message("user.events", &jane), Duration::from_secs(1))
            .await
            .unwrap();
        broker
            .publish(message("user.events", &john), Duration::from_secs(1))
            .await
            .unwrap();

        let events = broker.published_events::<User>("user.events").await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].subject(), &jane);
        assert_eq!(events[1].event_kind(), EventKind::Created);
        assert_eq!(broker.attempts(), 2);
    }

    #[tokio::test]
    async fn malformed_payload_on_the_topic_is_an_error() {
        let broker = InMemoryBroker::new();
        let user = User::new("Jane", "Doe").with_id(UserId::new(1));
        broker
            .publish(message("user.events", &user), Duration::from_secs(1))
            .await
            .unwrap();
        broker
            .publish(
                OutboundMessage {
                    topic: "user.events".to_string(),
                    key: "2".to_string(),
                    payload: serde_json::json!({ "subject": { "id": 2 } }),
                },
                Duration::from_secs(1),
            )
            .await
            .unwrap();

        assert!(broker.published_events::<User>("user.events").await.is_err());
        assert!(
            broker
                .published_events::<User>("friend.events")
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn rejected_messages_are_not_kept() {
        let broker = InMemoryBroker::with_mode(BrokerMode::Reject("full".into()));
        let user = User::new("Jane", "Doe").with_id(UserId::new(1));

        let err = broker
            .publish(message("user.events", &user), Duration::from_secs(1))
            .await
            .unwrap_err();

        assert_eq!(err, BrokerError::Rejected("full".into()));
        assert!(broker.published().await.is_empty());
        assert_eq!(broker.attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_broker_times_out_after_the_given_wait() {
        let broker = InMemoryBroker::with_mode(BrokerMode::Stall);
        let user = User::new("Jane", "Doe").with_id(UserId::new(1));
        let started = tokio::time::Instant::now();

        let err = broker
            .publish(message("user.events", &user), Duration::from_millis(500))
            .await
            .unwrap_err();

        assert_eq!(err, BrokerError::Timeout(Duration::from_millis(500)));
        assert!(started.elapsed() >= Duration::from_millis(500));
        assert!(broker.published().await.is_empty());
    }
}
