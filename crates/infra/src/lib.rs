//! # UserHub インフラ層
//!
//! 外部システムとの接続・通信を担当するインフラストラクチャ層。
//!
//! ## 設計方針
//!
//! このクレートはドメイン層のモデルを外部システムへ接続する具体的な実装を
//! 提供する。外部システムの詳細をカプセル化し、ドメイン層をインフラの
//! 変更から保護する。
//!
//! ## 責務
//!
//! - **データベース接続**: PostgreSQL への接続プール管理とマイグレーション
//! - **リポジトリ実装**: ユーザー永続化の具体実装
//! - **パスワードハッシュ**: Argon2id によるハッシュ化と検証
//! - **チャネル通知**: ユーザー変更イベントのベストエフォート通知
//!
//! ## 依存関係
//!
//! ```text
//! server → infra → domain
//! ```
//!
//! インフラ層は `domain` に依存する。
//! ドメイン層はインフラ層に依存しない（依存性逆転の原則）。
//!
//! ## モジュール構成
//!
//! - [`db`] - PostgreSQL データベース接続管理
//! - [`error`] - インフラ層エラー定義
//! - [`notification`] - チャネル通知クライアント
//! - [`password`] - パスワードハッシュ
//! - [`repository`] - リポジトリ実装

pub mod db;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod notification;
pub mod password;
pub mod repository;

pub use error::InfraError;
pub use password::{Argon2PasswordHasher, PasswordHasher};
