//! # API エラー定義
//!
//! ユースケース層のエラーと、HTTP / gRPC レスポンスへの変換を定義する。
//!
//! ## ステータス対応表
//!
//! | エラー | HTTP | gRPC |
//! |--------|------|------|
//! | ページトークン・バリデーション・空更新 | 400 | INVALID_ARGUMENT |
//! | 対象ユーザーなし | 404 | NOT_FOUND |
//! | 一意制約違反 | 409 | ALREADY_EXISTS |
//! | それ以外のインフラ障害 | 500 | INTERNAL |
//!
//! 500 系は詳細をクライアントへ返さず、`tracing::error!` で記録する。

use axum::{
   Json,
   http::StatusCode,
   response::{IntoResponse, Response},
};
use thiserror::Error;
use userhub_domain::{DomainError, pagination::PageTokenError};
use userhub_infra::{InfraError, error::InfraErrorKind};
use userhub_shared::ErrorResponse;

/// API 層で発生するエラー
#[derive(Debug, Error)]
pub enum ApiError {
   /// ページトークン・ページングパラメータの誤り
   #[error("{0}")]
   PageToken(#[from] PageTokenError),

   /// ドメイン層のバリデーション・状態エラー
   #[error("{0}")]
   Domain(#[from] DomainError),

   /// インフラ層のエラー
   #[error("{0}")]
   Infra(#[from] InfraError),
}

impl IntoResponse for ApiError {
   fn into_response(self) -> Response {
      let (status, body) = match &self {
         ApiError::PageToken(e) => (
            StatusCode::BAD_REQUEST,
            ErrorResponse::bad_request(e.to_string()),
         ),
         ApiError::Domain(e) => match e {
            DomainError::Validation(_) | DomainError::EmptyUpdate => (
               StatusCode::BAD_REQUEST,
               ErrorResponse::bad_request(e.to_string()),
            ),
            DomainError::NotFound { .. } => (
               StatusCode::NOT_FOUND,
               ErrorResponse::not_found("user not found"),
            ),
            DomainError::Conflict(msg) => {
               (StatusCode::CONFLICT, ErrorResponse::conflict(msg.clone()))
            }
         },
         ApiError::Infra(e) => match e.kind() {
            InfraErrorKind::DuplicateKey { .. } => (
               StatusCode::CONFLICT,
               ErrorResponse::conflict("user already exists"),
            ),
            InfraErrorKind::RowNotFound => (
               StatusCode::NOT_FOUND,
               ErrorResponse::not_found("user not found"),
            ),
            _ => {
               tracing::error!(error = %e, span_trace = %e.span_trace(), "インフラエラー");
               (
                  StatusCode::INTERNAL_SERVER_ERROR,
                  ErrorResponse::internal_error(),
               )
            }
         },
      };

      (status, Json(body)).into_response()
   }
}

impl From<ApiError> for tonic::Status {
   fn from(err: ApiError) -> Self {
      match &err {
         ApiError::PageToken(e) => tonic::Status::invalid_argument(e.to_string()),
         ApiError::Domain(e) => match e {
            DomainError::Validation(_) | DomainError::EmptyUpdate => {
               tonic::Status::invalid_argument(e.to_string())
            }
            DomainError::NotFound { .. } => tonic::Status::not_found("user not found"),
            DomainError::Conflict(msg) => tonic::Status::already_exists(msg.clone()),
         },
         ApiError::Infra(e) => match e.kind() {
            InfraErrorKind::DuplicateKey { .. } => {
               tonic::Status::already_exists("user already exists")
            }
            InfraErrorKind::RowNotFound => tonic::Status::not_found("user not found"),
            _ => {
               tracing::error!(error = %e, span_trace = %e.span_trace(), "インフラエラー");
               tonic::Status::internal("internal error")
            }
         },
      }
   }
}
