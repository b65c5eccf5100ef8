//! InMemoryStore - 開発・テスト用の RecordStore
//!
//! # 学習ポイント
//! - tokio::sync::Mutex による排他制御（ロックは 1 操作の中で完結し、await をまたがない）
//! - Store による採番と時刻付与
//! - 障害注入（n 回目の呼び出しを失敗させる）と呼び出し回数の記録

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::domain::{Id, Record, StoreError};
use crate::ports::{Clock, RecordStore, SystemClock};

/// 障害注入の対象となる操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Lookup,
    Create,
    Update,
    Delete,
    FindAll,
}

/// 操作ごとの呼び出し回数（失敗した呼び出しも含む）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreCalls {
    pub lookups: usize,
    pub creates: usize,
    pub updates: usize,
    pub deletes: usize,
    pub find_alls: usize,
}

impl StoreCalls {
    /// 変更系の呼び出し回数
    pub fn mutations(&self) -> usize {
        self.creates + self.updates + self.deletes
    }

    pub fn total(&self) -> usize {
        self.lookups + self.mutations() + self.find_alls
    }
}

/// 予約された障害: `remaining` 回目の呼び出しで `error` を返す
struct ScheduledFailure {
    remaining: usize,
    error: StoreError,
}

struct StoreState<R: Record> {
    /// 全レコード（ID 順）
    rows: BTreeMap<Id<R>, R>,

    /// 次に採番する ID
    next_id: u64,

    failures: HashMap<StoreOp, ScheduledFailure>,

    calls: StoreCalls,
}

impl<R: Record> StoreState<R> {
    fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
            failures: HashMap::new(),
            calls: StoreCalls::default(),
        }
    }

    /// 呼び出しを記録し、予約された障害があれば返す
    fn enter(&mut self, op: StoreOp) -> Result<(), StoreError> {
        match op {
            StoreOp::Lookup => self.calls.lookups += 1,
            StoreOp::Create => self.calls.creates += 1,
            StoreOp::Update => self.calls.updates += 1,
            StoreOp::Delete => self.calls.deletes += 1,
            StoreOp::FindAll => self.calls.find_alls += 1,
        }

        let Some(failure) = self.failures.get_mut(&op) else {
            return Ok(());
        };
        failure.remaining -= 1;
        if failure.remaining > 0 {
            return Ok(());
        }
        match self.failures.remove(&op) {
            Some(failure) => Err(failure.error),
            None => Ok(()),
        }
    }

    /// 呼び出し側が ID を指定した場合はそれを使い、採番カウンタを追い越させる
    fn allocate_id(&mut self, requested: Option<Id<R>>) -> Result<Id<R>, StoreError> {
        match requested {
            Some(id) if self.rows.contains_key(&id) => Err(StoreError::ConstraintViolation(
                format!("{id} already exists"),
            )),
            Some(id) => {
                self.next_id = self.next_id.max(id.get().saturating_add(1));
                Ok(id)
            }
            None => {
                let id = Id::new(self.next_id);
                // u64::MAX まで使い切った後は採番できない
                if self.rows.contains_key(&id) {
                    return Err(StoreError::ConstraintViolation(format!(
                        "no {} ids left to allocate",
                        R::KIND
                    )));
                }
                self.next_id = self.next_id.saturating_add(1);
                Ok(id)
            }
        }
    }

    /// `candidate` が `except` 以外の行と自然キーで衝突するか
    fn natural_key_conflict(&self, candidate: &R, except: Option<Id<R>>) -> Option<Id<R>> {
        self.rows
            .iter()
            .find(|(id, row)| Some(**id) != except && row.conflicts_with(candidate))
            .map(|(id, _)| *id)
    }

    fn first_match(&self, criteria: &R::Criteria) -> Option<Id<R>> {
        self.rows
            .iter()
            .find(|(_, row)| row.matches(criteria))
            .map(|(id, _)| *id)
    }
}

/// 開発・テスト用の RecordStore 実装
///
/// # 実装詳細
/// - BTreeMap<Id<R>, R> でレコードを ID 順に保持
/// - ID は 1 からの連番（呼び出し側指定の ID も受け付ける）
/// - 作成・更新時刻は Clock から取得
///
/// # 使用例
/// ```ignore
/// let store = InMemoryStore::<User>::new();
/// store.fail_next(StoreOp::Create, StoreError::Unavailable("down".into())).await;
/// ```
pub struct InMemoryStore<R: Record> {
    state: Mutex<StoreState<R>>,
    clock: Arc<dyn Clock>,
}

impl<R: Record> InMemoryStore<R> {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(StoreState::new()),
            clock,
        }
    }

    /// 次の `op` 呼び出しを `error` で失敗させる
    pub async fn fail_next(&self, op: StoreOp, error: StoreError) {
        self.fail_on(op, 1, error).await;
    }

    /// `nth` 回目（1 始まり）の `op` 呼び出しを `error` で失敗させる
    pub async fn fail_on(&self, op: StoreOp, nth: usize, error: StoreError) {
        let mut state = self.state.lock().await;
        state.failures.insert(
            op,
            ScheduledFailure {
                remaining: nth.max(1),
                error,
            },
        );
    }

    pub async fn calls(&self) -> StoreCalls {
        self.state.lock().await.calls
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// 全レコード（ID 順）
    pub async fn snapshot(&self) -> Vec<R> {
        self.state.lock().await.rows.values().cloned().collect()
    }

    /// テストの前提データを直接投入する（呼び出し回数には数えない）
    pub async fn seed(&self, mut record: R) -> Result<R, StoreError> {
        let mut state = self.state.lock().await;
        let id = state.allocate_id(record.id())?;
        record.set_id(id);
        record.stamp_created(self.clock.now());
        state.rows.insert(id, record.clone());
        Ok(record)
    }
}

impl<R: Record> Default for InMemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: Record> RecordStore<R> for InMemoryStore<R> {
    async fn lookup(&self, criteria: &R::Criteria) -> Result<Option<R>, StoreError> {
        let mut state = self.state.lock().await;
        state.enter(StoreOp::Lookup)?;
        Ok(state
            .first_match(criteria)
            .and_then(|id| state.rows.get(&id))
            .cloned())
    }

    async fn create(&self, mut record: R) -> Result<R, StoreError> {
        let mut state = self.state.lock().await;
        state.enter(StoreOp::Create)?;

        if let Some(existing) = state.natural_key_conflict(&record, None) {
            return Err(StoreError::ConstraintViolation(format!(
                "{} conflicts with {existing}",
                R::KIND
            )));
        }
        let id = state.allocate_id(record.id())?;
        record.set_id(id);
        record.stamp_created(self.clock.now());
        state.rows.insert(id, record.clone());
        Ok(record)
    }

    async fn update(&self, id: Id<R>, changes: &R::Changes) -> Result<R, StoreError> {
        let mut state = self.state.lock().await;
        state.enter(StoreOp::Update)?;

        let Some(current) = state.rows.get(&id) else {
            return Err(StoreError::NotFound(id.to_string()));
        };
        let mut updated = current.clone();
        updated.apply(changes);
        if let Some(existing) = state.natural_key_conflict(&updated, Some(id)) {
            return Err(StoreError::ConstraintViolation(format!(
                "{id} would conflict with {existing}"
            )));
        }
        updated.stamp_updated(self.clock.now());
        state.rows.insert(id, updated.clone());
        Ok(updated)
    }

    async fn delete(&self, criteria: &R::Criteria) -> Result<R, StoreError> {
        let mut state = self.state.lock().await;
        state.enter(StoreOp::Delete)?;

        state
            .first_match(criteria)
            .and_then(|id| state.rows.remove(&id))
            .ok_or_else(|| StoreError::NotFound(format!("{} matching {criteria:?}", R::KIND)))
    }

    async fn find_all(&self, criteria: &R::Criteria) -> Result<Vec<R>, StoreError> {
        let mut state = self.state.lock().await;
        state.enter(StoreOp::FindAll)?;
        Ok(state
            .rows
            .values()
            .filter(|row| row.matches(criteria))
            .cloned()
            .collect())
    }
}
