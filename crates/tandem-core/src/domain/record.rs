//! Record trait - Store が管理するエンティティの共通インターフェース
//!
//! # 学習ポイント
//! - Associated Types（`Criteria`, `Changes`）でレコードごとの検索条件・差分を型で表現
//! - Associated Constants（`const KIND`）でトピック名やログのラベルを静的に決める
//! - デフォルト実装付きメソッドで「参照先の検証が必要なレコード」だけ上書きする

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;

use super::ids::{Id, IdMarker};
use super::user::UserId;

/// Record は Store が保持し、Coordinator がイベントとして発行するエンティティ
///
/// # 使用例
/// ```ignore
/// impl Record for User {
///     type Criteria = UserCriteria;
///     type Changes = UserChanges;
///     const KIND: &'static str = "user";
///     ...
/// }
/// ```
///
/// # Trait Bounds
/// - `Serialize`: イベントの `subject` として broker に送るため
/// - `DeserializeOwned`: 下流（テスト含む）がイベントから状態を復元できるため
/// - `IdMarker`: `Id<Self>` をこのレコード専用の ID 型にするため
pub trait Record:
    IdMarker + Clone + PartialEq + fmt::Debug + Serialize + DeserializeOwned
{
    /// lookup / delete / find_all に渡す検索条件
    type Criteria: Clone + fmt::Debug + Send + Sync + 'static;

    /// update に渡す部分更新
    type Changes: Clone + fmt::Debug + Send + Sync + 'static;

    /// レコード種別（例: "user", "friend"）
    const KIND: &'static str;

    /// `references()` が空でないことがあるか（true なら Identity port が必須）
    const REFERENCES_USERS: bool = false;

    /// Store が採番済みなら Some
    fn id(&self) -> Option<Id<Self>>;

    /// 採番済み ID で一意に引くための検索条件
    fn by_id(id: Id<Self>) -> Self::Criteria;

    /// `criteria` に一致するか（in-memory Store 用）
    fn matches(&self, criteria: &Self::Criteria) -> bool;

    /// 部分更新を適用する
    fn apply(&mut self, changes: &Self::Changes);

    /// Store が ID を割り当てる
    fn set_id(&mut self, id: Id<Self>);

    /// 作成時刻が未設定なら設定し、更新時刻を `now` にする
    fn stamp_created(&mut self, now: DateTime<Utc>);

    /// 更新時刻を `now` にする
    fn stamp_updated(&mut self, now: DateTime<Utc>);

    /// I/O を伴わない入力検証
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }

    /// 他サービスが所有するユーザーへの参照（作成前に Identity port で存在確認する）
    fn references(&self) -> Vec<UserId> {
        Vec::new()
    }

    /// ID 以外の一意制約（自然キー）で `other` と衝突するか
    fn conflicts_with(&self, _other: &Self) -> bool {
        false
    }
}
