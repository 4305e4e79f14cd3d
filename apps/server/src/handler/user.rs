//! # ユーザーハンドラ
//!
//! ユーザー CRUD の HTTP API を提供する。
//!
//! ## エンドポイント
//!
//! - `POST /service/v1/users` - ユーザー作成
//! - `GET /service/v1/users` - ユーザー一覧（絞り込み・ページング付き）
//! - `PUT /service/v1/users/{user_id}` - ユーザー更新
//! - `DELETE /service/v1/users/{user_id}` - ユーザー削除
//!
//! 一覧のクエリパラメータ名（`next_page` / `filter` / `filterBy` /
//! `pagination`）はワイヤ互換性契約の一部。

use std::sync::Arc;

use axum::{
   Json,
   extract::{Path, Query, State},
   http::StatusCode,
   response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use userhub_domain::user::{User, UserDraft, UserId, UserUpdate};
use userhub_shared::PagedUsersResponse;
use uuid::Uuid;

use crate::{
   error::ApiError,
   usecase::{ListUsersInput, UserUseCase},
};

/// ユーザー API の共有状態
pub struct UserState {
   pub usecase: UserUseCase,
}

// --- リクエスト/レスポンス型 ---

/// ユーザー作成リクエスト
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
   pub first_name: String,
   pub last_name:  String,
   pub nickname:   String,
   pub password:   String,
   pub email:      String,
   pub country:    String,
}

/// ユーザー更新リクエスト（全フィールド任意）
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
   pub first_name: Option<String>,
   pub last_name:  Option<String>,
   pub nickname:   Option<String>,
   pub email:      Option<String>,
   pub country:    Option<String>,
   pub password:   Option<String>,
}

/// 一覧のクエリパラメータ
#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
   #[serde(default)]
   pub next_page:  String,
   #[serde(default)]
   pub filter:     String,
   #[serde(default, rename = "filterBy")]
   pub filter_by:  String,
   pub pagination: Option<String>,
}

/// ユーザー DTO
///
/// パスワードハッシュは決して含めない。
#[derive(Debug, Serialize)]
pub struct UserDto {
   pub id:         Uuid,
   pub first_name: String,
   pub last_name:  String,
   pub nickname:   String,
   pub email:      String,
   pub country:    String,
   pub created_at: String,
   pub updated_at: String,
}

impl From<&User> for UserDto {
   fn from(user: &User) -> Self {
      Self {
         id:         *user.id().as_uuid(),
         first_name: user.first_name().to_string(),
         last_name:  user.last_name().to_string(),
         nickname:   user.nickname().as_str().to_string(),
         email:      user.email().as_str().to_string(),
         country:    user.country().to_string(),
         created_at: user.created_at().to_rfc3339(),
         updated_at: user.updated_at().to_rfc3339(),
      }
   }
}

// --- ハンドラ ---

/// POST /service/v1/users
///
/// ## レスポンス
///
/// - `201 Created`: 作成されたユーザー
/// - `400 Bad Request`: バリデーションエラー
/// - `409 Conflict`: メールアドレスまたはニックネームの重複
pub async fn create_user(
   State(state): State<Arc<UserState>>,
   Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
   let draft = UserDraft::new(
      req.first_name,
      req.last_name,
      req.nickname,
      req.email,
      req.country,
      req.password,
   )?;

   let user = state.usecase.create_user(draft).await?;

   Ok((StatusCode::CREATED, Json(UserDto::from(&user))))
}

/// GET /service/v1/users
///
/// `next_page` トークンが有効な場合は他のパラメータより優先される。
///
/// ## レスポンス
///
/// - `200 OK`: `{"users": [...]}`。次ページが残っている場合のみ
///   `next_page` フィールドを含む
/// - `400 Bad Request`: 壊れたトークン、不正な `pagination`、
///   対になっていない絞り込み、許可されていない `filterBy`
pub async fn list_users(
   State(state): State<Arc<UserState>>,
   Query(query): Query<ListUsersQuery>,
) -> Result<impl IntoResponse, ApiError> {
   let (users, next_page) = state
      .usecase
      .list_users(ListUsersInput {
         next_page:  query.next_page,
         filter:     query.filter,
         filter_by:  query.filter_by,
         pagination: query.pagination,
      })
      .await?;

   let response = PagedUsersResponse {
      users: users.iter().map(UserDto::from).collect(),
      next_page,
   };

   Ok((StatusCode::OK, Json(response)))
}

/// PUT /service/v1/users/{user_id}
///
/// ## レスポンス
///
/// - `200 OK`: 更新後のユーザー
/// - `400 Bad Request`: バリデーションエラー、変更のない更新
/// - `404 Not Found`: ユーザーが見つからない
/// - `409 Conflict`: メールアドレスまたはニックネームの重複
pub async fn update_user(
   State(state): State<Arc<UserState>>,
   Path(user_id): Path<Uuid>,
   Json(req): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
   let update = UserUpdate::new(
      req.first_name,
      req.last_name,
      req.nickname,
      req.email,
      req.country,
      req.password,
   )?;

   let user = state
      .usecase
      .update_user(UserId::from_uuid(user_id), update)
      .await?;

   Ok((StatusCode::OK, Json(UserDto::from(&user))))
}

/// DELETE /service/v1/users/{user_id}
///
/// ## レスポンス
///
/// - `204 No Content`: 削除成功
/// - `404 Not Found`: ユーザーが見つからない
pub async fn delete_user(
   State(state): State<Arc<UserState>>,
   Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
   state.usecase.delete_user(UserId::from_uuid(user_id)).await?;

   Ok(StatusCode::NO_CONTENT)
}
