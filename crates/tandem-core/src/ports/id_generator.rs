//! IdGenerator port - 相関 ID 生成の抽象化
//!
//! レコードの ID は Store が採番するので、ここで作るのは発行イベントの相関 ID だけです。
//!
//! # 実装
//! - **UlidGenerator**: ULID ベース（Clock の時刻 + ランダム部分）

use crate::domain::CorrelationId;
use crate::ports::Clock;
use ulid::Ulid;

/// IdGenerator は分散システムで使える相関 ID を生成
///
/// # Thread Safety
/// - `Send + Sync` を要求（並行する複数の操作から使える）
pub trait IdGenerator: Send + Sync {
    fn generate_correlation_id(&self) -> CorrelationId;
}

/// UlidGenerator は ULID ベースの ID 生成器
///
/// Clock を使って現在時刻ベースの ULID を生成します。
/// テスト時に FixedClock を使えば timestamp 部分が決定的になります。
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_correlation_id(&self) -> CorrelationId {
        let timestamp_ms = self.clock.now().timestamp_millis() as u64;
        let ulid = Ulid::from_parts(timestamp_ms, rand::random());
        CorrelationId::from(ulid)
    }
}
