//! Events - ドメインイベント
//!
//! イベントは `{ kind, subject }` のタグ付き値です。イベント種別ごとの型階層は作らず、
//! 受け取る側は `event_kind` で分岐します。
//!
//! # Wire format
//! ```json
//! { "subject": { "id": 42, "firstName": "Jane", ... }, "eventKind": "CREATED" }
//! ```
//! `correlationId` は付与されている場合のみ出力されます。

use serde::{Deserialize, Serialize};

use super::ids::CorrelationId;
use super::record::Record;

/// 状態遷移の種類
///
/// We serialize as SCREAMING_SNAKE_CASE: CREATED / UPDATED / REMOVED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Created,
    Updated,
    Removed,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Created => "CREATED",
            EventKind::Updated => "UPDATED",
            EventKind::Removed => "REMOVED",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// DomainEvent はレコードの状態遷移を表す不変の値
///
/// - CREATED / UPDATED: `subject` は Store に commit された後の状態（採番済み ID・時刻を含む）
/// - REMOVED: `subject` は削除直前に読んだ状態
///
/// コンストラクタは Coordinator からのみ呼ばれる想定で、
/// リクエストの payload をそのまま subject にする経路はありません。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(deserialize = "R: Record"))]
pub struct DomainEvent<R: Record> {
    subject: R,
    event_kind: EventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    correlation_id: Option<CorrelationId>,
}

impl<R: Record> DomainEvent<R> {
    pub fn new(event_kind: EventKind, subject: R) -> Self {
        Self {
            subject,
            event_kind,
            correlation_id: None,
        }
    }

    pub fn created(subject: R) -> Self {
        Self::new(EventKind::Created, subject)
    }

    pub fn updated(subject: R) -> Self {
        Self::new(EventKind::Updated, subject)
    }

    pub fn removed(subject: R) -> Self {
        Self::new(EventKind::Removed, subject)
    }

    pub fn with_correlation_id(mut self, correlation_id: CorrelationId) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }

    pub fn subject(&self) -> &R {
        &self.subject
    }

    pub fn event_kind(&self) -> EventKind {
        self.event_kind
    }

    pub fn correlation_id(&self) -> Option<CorrelationId> {
        self.correlation_id
    }

    pub fn into_subject(self) -> R {
        self.subject
    }
}
