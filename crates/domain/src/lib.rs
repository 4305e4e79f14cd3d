//! # UserHub ドメイン層
//!
//! ユーザー管理サービスの中核となるドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **エンティティ**: 一意の識別子を持つオブジェクト（例: User）
//! - **値オブジェクト**: 生成時にバリデーションを行う不変オブジェクト
//!   （例: Email, Nickname）
//! - **ページネーショントークン**: 一覧取得のカーソルを符号化する
//!   自己完結型コーデック（[`pagination`]）
//! - **ドメインエラー**: ビジネスルール違反を表現するエラー型
//!
//! ## 依存関係の方向
//!
//! ```text
//! server → infra → domain
//! ```
//!
//! ドメイン層はインフラ層（DB、外部サービス）には一切依存しない。
//! これにより、ビジネスロジックの純粋性が保たれる。
//!
//! ## モジュール構成
//!
//! - [`clock`] - 時刻プロバイダの抽象化
//! - [`error`] - ドメイン層で発生するエラーの定義
//! - [`filter`] - 一覧取得の絞り込み条件と許可リスト
//! - [`pagination`] - ページネーショントークンのコーデック
//! - [`password`] - パスワード関連の値オブジェクト
//! - [`user`] - ユーザーエンティティと値オブジェクト

pub mod clock;
pub mod error;
pub mod filter;
pub mod pagination;
pub mod password;
pub mod user;

pub use error::DomainError;
