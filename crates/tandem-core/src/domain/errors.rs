//! Errors - エラー型と分類
//!
//! # 分類
//! - **Conflict**: 作成しようとしたレコードが既に存在する（create のみ）
//! - **NotFound**: 対象レコード、または参照先ユーザーが存在しない
//! - **Invalid**: I/O 前の入力検証で弾かれた（自分自身との友達関係など）
//! - **Store / Identity**: Store への書き込み（または事前・事後の読み取り）や
//!   Identity への問い合わせが失敗した。broker には何も送っていない
//! - **PublishFailed**: Store への書き込みは commit 済みだが、イベント発行を確認できなかった
//!
//! `PublishFailed` は「失敗 = 副作用なし」ではありません。呼び出し側はこのエラーを受け取っても
//! Store 側の変更が残っている前提で扱う必要があります（自動の補償処理は行いません）。

use std::time::Duration;

use thiserror::Error;

/// Store port のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// 一意制約違反（ID の重複、自然キーの重複）
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// 変更対象のレコードが存在しない
    #[error("record not found: {0}")]
    NotFound(String),

    /// 書き込み直後の再読み取りでレコードが見つからない
    #[error("{0} was committed but could not be read back")]
    ReadAfterWrite(String),

    /// Store 側の規約違反（create 後に ID が採番されていない等）
    #[error("store contract violated: {0}")]
    Contract(String),

    /// 接続断・タイムアウトなど
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Broker port のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrokerError {
    /// broker が受け取りを拒否した
    #[error("broker rejected message: {0}")]
    Rejected(String),

    /// 待機時間内に ack が返ってこなかった
    #[error("broker did not acknowledge within {0:?}")]
    Timeout(Duration),

    /// イベントを payload にエンコードできなかった
    #[error("event encoding failed: {0}")]
    Encode(String),

    #[error("broker unavailable: {0}")]
    Unavailable(String),
}

/// Identity port のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("identity service unavailable: {0}")]
    Unavailable(String),
}

/// Coordinator の各操作が返すエラー
#[derive(Debug, Error)]
pub enum DualWriteError {
    #[error("{kind} already exists")]
    Conflict { kind: &'static str },

    #[error("{kind} not found: {detail}")]
    NotFound { kind: &'static str, detail: String },

    #[error("invalid {kind}: {reason}")]
    Invalid { kind: &'static str, reason: String },

    #[error("store failure for {kind}: {source}")]
    Store {
        kind: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("identity check failed for {kind}: {source}")]
    Identity {
        kind: &'static str,
        #[source]
        source: IdentityError,
    },

    /// 書き込みは commit 済みだが再読み取りできず、イベントを組み立てられなかった
    #[error("{record_id} was committed but could not be re-read; no event was published: {source}")]
    ReadBackFailed {
        record_id: String,
        #[source]
        source: StoreError,
    },

    /// commit 済みのレコード `record_id` について、イベント発行に失敗した
    #[error("{record_id} was committed but its {event_kind} event was not published: {source}")]
    PublishFailed {
        record_id: String,
        event_kind: &'static str,
        #[source]
        source: BrokerError,
    },
}

/// 呼び出し側から見た終端状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureClass {
    /// 既に存在する
    Conflict,
    /// 見つからない
    NotFound,
    /// リクエスト自体が不正
    Invalid,
    /// サーバー側の失敗（Store / Identity / Broker）
    Failed,
}

impl DualWriteError {
    pub fn class(&self) -> FailureClass {
        match self {
            DualWriteError::Conflict { .. } => FailureClass::Conflict,
            DualWriteError::NotFound { .. } => FailureClass::NotFound,
            DualWriteError::Invalid { .. } => FailureClass::Invalid,
            DualWriteError::Store { .. }
            | DualWriteError::Identity { .. }
            | DualWriteError::ReadBackFailed { .. }
            | DualWriteError::PublishFailed { .. } => FailureClass::Failed,
        }
    }

    /// Store 側の変更が commit 済みかどうか
    ///
    /// true の場合、操作は失敗扱いでも Store には結果が残っています。
    pub fn is_committed(&self) -> bool {
        matches!(
            self,
            DualWriteError::ReadBackFailed { .. } | DualWriteError::PublishFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::conflict(DualWriteError::Conflict { kind: "user" }, FailureClass::Conflict, false)]
    #[case::not_found(
        DualWriteError::NotFound { kind: "user", detail: "user-1".into() },
        FailureClass::NotFound,
        false
    )]
    #[case::invalid(
        DualWriteError::Invalid { kind: "friend", reason: "self".into() },
        FailureClass::Invalid,
        false
    )]
    #[case::store(
        DualWriteError::Store { kind: "user", source: StoreError::Unavailable("down".into()) },
        FailureClass::Failed,
        false
    )]
    #[case::publish(
        DualWriteError::PublishFailed {
            record_id: "user-1".into(),
            event_kind: "CREATED",
            source: BrokerError::Timeout(Duration::from_millis(10)),
        },
        FailureClass::Failed,
        true
    )]
    fn classification(
        #[case] err: DualWriteError,
        #[case] class: FailureClass,
        #[case] committed: bool,
    ) {
        assert_eq!(err.class(), class);
        assert_eq!(err.is_committed(), committed);
    }

    #[test]
    fn publish_failure_message_names_the_committed_record() {
        let err = DualWriteError::PublishFailed {
            record_id: "friend-7".into(),
            event_kind: "REMOVED",
            source: BrokerError::Rejected("topic closed".into()),
        };
        let msg = err.to_string();
        assert!(msg.contains("friend-7"));
        assert!(msg.contains("REMOVED"));
        assert!(msg.contains("topic closed"));
    }
}
