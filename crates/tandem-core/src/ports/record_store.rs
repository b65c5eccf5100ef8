//! RecordStore port - サービスが所有するローカルの正本（source of truth）
//!
//! # 実装
//! - `impls::InMemoryStore`（テスト・デモ用）
//! - 本番用（PostgreSQL など）はこのクレートの外に置く
//!
//! # 設計原則
//! - 各書き込みは単体で atomic（1 行単位）。操作をまたいだ atomic 性は仮定しない
//! - メッセージングの関心事（コールバック、commit hook）は持たない
//! - タイムアウトはトランスポート側の責務。タイムアウトは `StoreError::Unavailable` として返す

use async_trait::async_trait;

use crate::domain::{Id, Record, StoreError};

/// RecordStore はレコードの存在確認と単一行の変更を提供する
#[async_trait]
pub trait RecordStore<R: Record>: Send + Sync {
    /// `criteria` に一致するレコードを最大 1 件返す
    async fn lookup(&self, criteria: &R::Criteria) -> Result<Option<R>, StoreError>;

    /// 新規レコードを保存する
    ///
    /// ID・作成時刻が未設定なら Store が割り当てる。
    /// 一意制約に違反する場合は `StoreError::ConstraintViolation`。
    async fn create(&self, record: R) -> Result<R, StoreError>;

    /// 部分更新を適用して、更新後のレコードを返す
    ///
    /// 対象が存在しなければ `StoreError::NotFound`。
    async fn update(&self, id: Id<R>, changes: &R::Changes) -> Result<R, StoreError>;

    /// 一致するレコードを 1 件削除し、削除直前の状態を返す
    ///
    /// 一致するものがなければ `StoreError::NotFound`。
    async fn delete(&self, criteria: &R::Criteria) -> Result<R, StoreError>;

    /// `criteria` に一致するレコードをすべて返す（読み取り専用のクエリ用）
    async fn find_all(&self, criteria: &R::Criteria) -> Result<Vec<R>, StoreError>;
}
