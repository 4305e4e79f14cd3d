//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! ## 設計方針
//!
//! - 各ハンドラはサブモジュールに配置
//! - 親モジュール（この `handler.rs`）で re-export し、フラットな API を提供
//! - ハンドラは薄く保ち、ビジネスロジックはユースケース層に委譲

pub mod health;
pub mod user;

use std::sync::Arc;

use axum::{
   Router,
   routing::{get, put},
};
pub use health::{health_check, readiness_check};
use tower_http::trace::TraceLayer;
pub use user::{UserState, create_user, delete_user, list_users, update_user};

/// ユーザー管理 API のルーターを構築する
///
/// gRPC 側と同じユースケースを共有するため、状態は呼び出し元から受け取る。
pub fn router(state: Arc<UserState>) -> Router {
   Router::new()
      .route("/service/v1/health", get(health_check))
      .route("/service/v1/readiness", get(readiness_check))
      .route("/service/v1/users", get(list_users).post(create_user))
      .route(
         "/service/v1/users/{user_id}",
         put(update_user).delete(delete_user),
      )
      .with_state(state)
      .layer(TraceLayer::new_for_http())
}
