//! # ヘルスチェックハンドラ
//!
//! 死活監視とレディネスチェックのエンドポイントを提供する。

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use userhub_shared::{HealthResponse, health::ReadinessStatus};

use super::UserState;

/// GET /service/v1/health
///
/// プロセスの死活のみを返す。依存サービスには触れない。
pub async fn health_check() -> impl IntoResponse {
   let response = HealthResponse {
      status:  "healthy".to_string(),
      version: env!("CARGO_PKG_VERSION").to_string(),
   };

   (StatusCode::OK, Json(response))
}

/// GET /service/v1/readiness
///
/// データベースへの疎通を確認し、利用不可の場合は 503 を返す。
pub async fn readiness_check(State(state): State<Arc<UserState>>) -> impl IntoResponse {
   let response = state.usecase.readiness().await;

   let status = match response.status {
      ReadinessStatus::Ready => StatusCode::OK,
      ReadinessStatus::NotReady => StatusCode::SERVICE_UNAVAILABLE,
   };

   (status, Json(response))
}
