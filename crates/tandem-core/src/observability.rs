//! Observability - ログ初期化と結果の集計
//!
//! - `init_tracing`: `TANDEM_LOG`（未設定なら `info`）で EnvFilter を作り、fmt layer に出力
//! - `OutcomeCounts`: WriteOutcome を種別ごとに数える（commit 済みの FAILED は別に数える）

use serde::{Deserialize, Serialize};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::domain::WriteOutcome;

/// ログのフィルタを読む環境変数
pub const LOG_ENV: &str = "TANDEM_LOG";

/// Initialize tracing with env filter.
///
/// 2 回目以降の呼び出しは何もしない。
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounts {
    pub success: usize,
    pub conflict: usize,
    pub not_found: usize,
    pub invalid: usize,
    pub failed: usize,
    /// FAILED のうち Store 側には変更が残っているもの
    pub committed_unpublished: usize,
}

impl OutcomeCounts {
    pub fn record<R>(&mut self, outcome: &WriteOutcome<R>) {
        match outcome {
            WriteOutcome::Success { .. } => self.success += 1,
            WriteOutcome::Conflict { .. } => self.conflict += 1,
            WriteOutcome::NotFound { .. } => self.not_found += 1,
            WriteOutcome::Invalid { .. } => self.invalid += 1,
            WriteOutcome::Failed { committed, .. } => {
                self.failed += 1;
                if *committed {
                    self.committed_unpublished += 1;
                }
            }
        }
    }

    pub fn total(&self) -> usize {
        self.success + self.conflict + self.not_found + self.invalid + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_each_outcome_kind() {
        let outcomes: Vec<WriteOutcome<u32>> = vec![
            WriteOutcome::Success { record: 1 },
            WriteOutcome::Conflict {
                reason: "exists".into(),
            },
            WriteOutcome::Failed {
                reason: "timeout".into(),
                committed: true,
            },
            WriteOutcome::Failed {
                reason: "store down".into(),
                committed: false,
            },
        ];

        let mut counts = OutcomeCounts::default();
        for outcome in &outcomes {
            counts.record(outcome);
        }

        assert_eq!(counts.success, 1);
        assert_eq!(counts.conflict, 1);
        assert_eq!(counts.failed, 2);
        assert_eq!(counts.committed_unpublished, 1);
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn init_tracing_is_idempotent() {
        init_tracing();
        init_tracing();
    }
}
