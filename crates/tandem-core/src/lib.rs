//! tandem-core
//!
//! Core building blocks for services that own a local record store and announce
//! every committed change on a message broker.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, record, user, friendship, events, errors, outcome）
//! - **ports**: 抽象化レイヤー（RecordStore, EventBroker, IdentityDirectory, Clock, IdGenerator）
//! - **app**: アプリケーションロジック（coordinator, builder, config, services）
//! - **impls**: 実装（InMemoryStore など開発・テスト用）
//! - **observability**: tracing の初期化と結果の集計
//!
//! # 順序の保証
//! 書き込みは必ず「Store に commit → イベント発行」の順で行われます。
//! Store の書き込みが失敗した場合、broker には何も送られません。

pub mod app;
pub mod domain;
pub mod impls;
pub mod observability;
pub mod ports;
