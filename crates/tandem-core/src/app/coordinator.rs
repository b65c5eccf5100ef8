//! DualWriteCoordinator - ローカル Store への書き込みとイベント発行の順序付け
//!
//! # フロー
//! - **create**: validate → 存在確認（Conflict）→ 参照先確認 → create → 再読み取り → CREATED 発行
//! - **update**: 存在確認（NotFound）→ validate → 参照先確認 → update → 再読み取り → UPDATED 発行
//! - **delete**: 存在確認（NotFound）→ delete → 削除前の状態で REMOVED 発行
//!
//! # 保証
//! - Store の書き込みが失敗したら broker には何も送らない
//! - 発行されるイベントの subject は常に commit 済みの状態（ID 採番済み）
//! - 発行は 1 回だけ試みる。失敗しても Store の変更は取り消さない
//!   （`DualWriteError::is_committed()` が true になる）
//!
//! # 学習ポイント
//! - `Arc<dyn Trait>` で ports を差し替え可能にする
//! - `#[tracing::instrument]` + `Span::record` で後から判明する値をスパンに載せる
//! - `tokio::time::timeout` で外部呼び出しの待ち時間に上限を設ける

use std::sync::Arc;
use std::time::Duration;

use tracing::{Span, error, info, warn};

use crate::domain::{
    BrokerError, DomainEvent, DualWriteError, EventKind, Id, IdentityError, Record, StoreError,
    User,
};
use crate::ports::{EventBroker, IdGenerator, IdentityDirectory, OutboundMessage, RecordStore};

use super::builder::CoordinatorBuilder;

/// レコード種別 `R` の書き込みを Store と broker の両方に反映する
///
/// ロックは持たないため、`Clone` して複数のタスクから同時に使えます。
/// 同じレコードへの並行した create は存在確認と create の間で競合し得ます
/// （最終的な判定は Store の一意制約に任せる）。
pub struct DualWriteCoordinator<R: Record> {
    store: Arc<dyn RecordStore<R>>,
    broker: Arc<dyn EventBroker>,
    identity: Option<Arc<dyn IdentityDirectory>>,
    id_generator: Option<Arc<dyn IdGenerator>>,
    topic: String,
    publish_timeout: Duration,
}

impl<R: Record> Clone for DualWriteCoordinator<R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            broker: Arc::clone(&self.broker),
            identity: self.identity.clone(),
            id_generator: self.id_generator.clone(),
            topic: self.topic.clone(),
            publish_timeout: self.publish_timeout,
        }
    }
}

impl<R: Record> DualWriteCoordinator<R> {
    pub fn builder() -> CoordinatorBuilder<R> {
        CoordinatorBuilder::new()
    }

    pub(crate) fn from_parts(
        store: Arc<dyn RecordStore<R>>,
        broker: Arc<dyn EventBroker>,
        identity: Option<Arc<dyn IdentityDirectory>>,
        id_generator: Option<Arc<dyn IdGenerator>>,
        topic: String,
        publish_timeout: Duration,
    ) -> Self {
        Self {
            store,
            broker,
            identity,
            id_generator,
            topic,
            publish_timeout,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn publish_timeout(&self) -> Duration {
        self.publish_timeout
    }

    /// 新しいレコードを保存し、CREATED を発行する
    ///
    /// `existence` に一致するレコードが既にあれば何も書かずに `Conflict`。
    /// `None` の場合は存在確認を省略する（ID 未指定のユーザーなど、衝突し得ないもの）。
    #[tracing::instrument(
        name = "dual_write.create",
        skip_all,
        fields(kind = R::KIND, record_id, correlation_id)
    )]
    pub async fn create(
        &self,
        record: R,
        existence: Option<&R::Criteria>,
    ) -> Result<R, DualWriteError> {
        if let Err(reason) = record.validate() {
            warn!(%reason, "create rejected");
            return Err(DualWriteError::Invalid {
                kind: R::KIND,
                reason,
            });
        }

        if let Some(criteria) = existence {
            let existing = self
                .store
                .lookup(criteria)
                .await
                .map_err(|source| self.store_failure(source))?;
            if existing.is_some() {
                warn!(?criteria, "create rejected: record already exists");
                return Err(DualWriteError::Conflict { kind: R::KIND });
            }
        }

        self.check_references(&record).await?;

        let created = self
            .store
            .create(record)
            .await
            .map_err(|source| self.store_failure(source))?;
        let id = created.id().ok_or_else(|| {
            self.store_failure(StoreError::Contract(format!(
                "create returned a {} without an id",
                R::KIND
            )))
        })?;
        Span::current().record("record_id", tracing::field::display(id));

        let committed = self.read_back(id).await?;
        self.publish(EventKind::Created, committed).await
    }

    /// 既存レコードに部分更新を適用し、UPDATED を発行する
    ///
    /// 更新後の状態が参照するユーザーも create と同じく Identity port で確認する。
    #[tracing::instrument(
        name = "dual_write.update",
        skip_all,
        fields(kind = R::KIND, record_id = %id, correlation_id)
    )]
    pub async fn update(&self, id: Id<R>, changes: &R::Changes) -> Result<R, DualWriteError> {
        let mut proposed = self
            .store
            .lookup(&R::by_id(id))
            .await
            .map_err(|source| self.store_failure(source))?
            .ok_or_else(|| self.not_found(id.to_string()))?;

        proposed.apply(changes);
        if let Err(reason) = proposed.validate() {
            warn!(%reason, "update rejected");
            return Err(DualWriteError::Invalid {
                kind: R::KIND,
                reason,
            });
        }
        self.check_references(&proposed).await?;

        match self.store.update(id, changes).await {
            Ok(_) => {}
            // 存在確認の後に削除された
            Err(StoreError::NotFound(detail)) => return Err(self.not_found(detail)),
            Err(source) => return Err(self.store_failure(source)),
        }

        let committed = self.read_back(id).await?;
        self.publish(EventKind::Updated, committed).await
    }

    /// `criteria` に一致するレコードを削除し、削除前の状態で REMOVED を発行する
    #[tracing::instrument(
        name = "dual_write.delete",
        skip_all,
        fields(kind = R::KIND, record_id, correlation_id)
    )]
    pub async fn delete(&self, criteria: &R::Criteria) -> Result<R, DualWriteError> {
        let pre_image = self
            .store
            .lookup(criteria)
            .await
            .map_err(|source| self.store_failure(source))?
            .ok_or_else(|| self.not_found(format!("{criteria:?}")))?;
        let id = pre_image.id().ok_or_else(|| {
            self.store_failure(StoreError::Contract(format!(
                "stored {} has no id",
                R::KIND
            )))
        })?;
        Span::current().record("record_id", tracing::field::display(id));

        match self.store.delete(&R::by_id(id)).await {
            Ok(_) => {}
            Err(StoreError::NotFound(detail)) => return Err(self.not_found(detail)),
            Err(source) => return Err(self.store_failure(source)),
        }

        self.publish(EventKind::Removed, pre_image).await
    }

    /// 読み取り専用。イベントは発行しない
    pub async fn find(&self, criteria: &R::Criteria) -> Result<Option<R>, DualWriteError> {
        self.store
            .lookup(criteria)
            .await
            .map_err(|source| self.store_failure(source))
    }

    /// 読み取り専用。イベントは発行しない
    pub async fn find_all(&self, criteria: &R::Criteria) -> Result<Vec<R>, DualWriteError> {
        self.store
            .find_all(criteria)
            .await
            .map_err(|source| self.store_failure(source))
    }

    /// 参照先ユーザーがすべて存在するか確認する
    async fn check_references(&self, record: &R) -> Result<(), DualWriteError> {
        let references = record.references();
        if references.is_empty() {
            return Ok(());
        }
        let Some(identity) = &self.identity else {
            return Err(self.identity_failure(IdentityError::Unavailable(
                "no identity directory configured".to_string(),
            )));
        };

        let mut missing = Vec::new();
        for user_id in references {
            let exists = identity
                .exists(user_id)
                .await
                .map_err(|source| self.identity_failure(source))?;
            if !exists && !missing.contains(&user_id) {
                missing.push(user_id);
            }
        }
        if missing.is_empty() {
            return Ok(());
        }

        let detail = missing
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        warn!(missing = %detail, "write rejected: referenced users do not exist");
        Err(DualWriteError::NotFound {
            kind: User::KIND,
            detail,
        })
    }

    /// commit 直後の状態を ID で読み直す
    async fn read_back(&self, id: Id<R>) -> Result<R, DualWriteError> {
        let source = match self.store.lookup(&R::by_id(id)).await {
            Ok(Some(record)) => return Ok(record),
            Ok(None) => StoreError::ReadAfterWrite(id.to_string()),
            Err(source) => source,
        };
        error!(error = %source, "write committed but could not be read back; no event published");
        Err(DualWriteError::ReadBackFailed {
            record_id: id.to_string(),
            source,
        })
    }

    /// 1 回だけ発行を試みる。成功したら subject をそのまま返す
    async fn publish(&self, event_kind: EventKind, subject: R) -> Result<R, DualWriteError> {
        match self.send(event_kind, &subject).await {
            Ok(()) => {
                info!(
                    event_kind = %event_kind,
                    topic = %self.topic,
                    "write committed and published"
                );
                Ok(subject)
            }
            Err(source) => {
                let record_id = subject
                    .id()
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| R::KIND.to_string());
                error!(
                    event_kind = %event_kind,
                    error = %source,
                    "write committed but event was not published"
                );
                Err(DualWriteError::PublishFailed {
                    record_id,
                    event_kind: event_kind.as_str(),
                    source,
                })
            }
        }
    }

    async fn send(&self, event_kind: EventKind, subject: &R) -> Result<(), BrokerError> {
        let key = subject
            .id()
            .map(|id| id.get().to_string())
            .unwrap_or_default();

        let mut event = DomainEvent::new(event_kind, subject.clone());
        if let Some(generator) = &self.id_generator {
            let correlation_id = generator.generate_correlation_id();
            Span::current().record("correlation_id", tracing::field::display(correlation_id));
            event = event.with_correlation_id(correlation_id);
        }
        let payload =
            serde_json::to_value(&event).map_err(|e| BrokerError::Encode(e.to_string()))?;

        let message = OutboundMessage {
            topic: self.topic.clone(),
            key,
            payload,
        };
        match tokio::time::timeout(
            self.publish_timeout,
            self.broker.publish(message, self.publish_timeout),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(BrokerError::Timeout(self.publish_timeout)),
        }
    }

    fn store_failure(&self, source: StoreError) -> DualWriteError {
        error!(error = %source, "store operation failed; nothing published");
        DualWriteError::Store {
            kind: R::KIND,
            source,
        }
    }

    fn identity_failure(&self, source: IdentityError) -> DualWriteError {
        error!(error = %source, "identity check failed; nothing written");
        DualWriteError::Identity {
            kind: R::KIND,
            source,
        }
    }

    fn not_found(&self, detail: String) -> DualWriteError {
        warn!(%detail, "target record not found");
        DualWriteError::NotFound {
            kind: R::KIND,
            detail,
        }
    }
}
