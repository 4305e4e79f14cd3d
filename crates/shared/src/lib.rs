//! # UserHub 共有ユーティリティ
//!
//! このクレートは、UserHub
//! プロジェクト全体で使用される共通ユーティリティを提供する。
//!
//! ## 設計方針
//!
//! - API 応答の形とロギング初期化など、層をまたぐ横断的関心を配置
//! - ビジネスロジックを含まない純粋なユーティリティのみを配置
//! - 外部クレートへの依存は最小限に抑える

pub mod error_response;
pub mod health;
pub mod list_response;
pub mod observability;

pub use error_response::ErrorResponse;
pub use health::HealthResponse;
pub use list_response::PagedUsersResponse;
