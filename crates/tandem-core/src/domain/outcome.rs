//! Outcome model: the caller-facing view of a coordinator operation.
//!
//! Handlers map this to transport responses (HTTP status, gRPC code, ...).
//! That mapping lives outside this crate.

use serde::{Deserialize, Serialize};

use super::errors::{DualWriteError, FailureClass};

/// A unified classification of an operation result.
///
/// Serialized as SCREAMING_SNAKE_CASE:
/// SUCCESS / CONFLICT / NOT_FOUND / INVALID / FAILED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeKind {
    Success,
    Conflict,
    NotFound,
    Invalid,
    Failed,
}

/// Terminal state of one create / update / delete.
///
/// - `Success`: the store mutation committed and its event was published.
/// - `Conflict` / `NotFound` / `Invalid`: rejected, nothing was written or published.
/// - `Failed`: server-side failure. `committed` tells whether the store kept the write
///   (publish failed after commit) so callers never read FAILED as "no side effect".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WriteOutcome<R> {
    Success { record: R },
    Conflict { reason: String },
    NotFound { reason: String },
    Invalid { reason: String },
    Failed { reason: String, committed: bool },
}

impl<R> WriteOutcome<R> {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            WriteOutcome::Success { .. } => OutcomeKind::Success,
            WriteOutcome::Conflict { .. } => OutcomeKind::Conflict,
            WriteOutcome::NotFound { .. } => OutcomeKind::NotFound,
            WriteOutcome::Invalid { .. } => OutcomeKind::Invalid,
            WriteOutcome::Failed { .. } => OutcomeKind::Failed,
        }
    }

    pub fn record(&self) -> Option<&R> {
        match self {
            WriteOutcome::Success { record } => Some(record),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, WriteOutcome::Success { .. })
    }
}

impl<R> From<Result<R, DualWriteError>> for WriteOutcome<R> {
    fn from(result: Result<R, DualWriteError>) -> Self {
        match result {
            Ok(record) => WriteOutcome::Success { record },
            Err(err) => {
                let reason = err.to_string();
                match err.class() {
                    FailureClass::Conflict => WriteOutcome::Conflict { reason },
                    FailureClass::NotFound => WriteOutcome::NotFound { reason },
                    FailureClass::Invalid => WriteOutcome::Invalid { reason },
                    FailureClass::Failed => WriteOutcome::Failed {
                        committed: err.is_committed(),
                        reason,
                    },
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BrokerError, StoreError};
    use std::time::Duration;

    #[test]
    fn outcome_kind_serializes_as_required_names() {
        let s = serde_json::to_string(&OutcomeKind::Success).unwrap();
        assert_eq!(s, "\"SUCCESS\"");

        let s = serde_json::to_string(&OutcomeKind::NotFound).unwrap();
        assert_eq!(s, "\"NOT_FOUND\"");

        let s = serde_json::to_string(&OutcomeKind::Failed).unwrap();
        assert_eq!(s, "\"FAILED\"");
    }

    #[test]
    fn success_carries_the_record() {
        let outcome: WriteOutcome<u32> = Ok(7).into();
        assert_eq!(outcome.kind(), OutcomeKind::Success);
        assert_eq!(outcome.record(), Some(&7));
    }

    #[test]
    fn publish_failure_is_failed_but_committed() {
        let err = DualWriteError::PublishFailed {
            record_id: "user-42".into(),
            event_kind: "UPDATED",
            source: BrokerError::Timeout(Duration::from_secs(30)),
        };
        let outcome: WriteOutcome<u32> = Err(err).into();
        assert!(matches!(outcome, WriteOutcome::Failed { committed: true, .. }));
    }

    #[test]
    fn store_failure_is_failed_and_not_committed() {
        let err = DualWriteError::Store {
            kind: "user",
            source: StoreError::Unavailable("connection reset".into()),
        };
        let outcome: WriteOutcome<u32> = Err(err).into();
        assert!(matches!(outcome, WriteOutcome::Failed { committed: false, .. }));
    }

    #[test]
    fn outcome_is_a_tagged_enum() {
        let outcome: WriteOutcome<u32> = WriteOutcome::Conflict {
            reason: "user already exists".into(),
        };
        // Example shape: {"outcome":"CONFLICT","reason":"..."}
        let v = serde_json::to_value(&outcome).unwrap();
        assert_eq!(v["outcome"], "CONFLICT");
        assert_eq!(v["reason"], "user already exists");
    }
}
