//! tonic UserManager サービス実装。
//!
//! 各メソッドで proto 型 <-> ドメイン型の変換を行い、
//! [`UserUseCase`] に委譲する。エラーは [`ApiError`] 経由で
//! gRPC ステータスコードへ変換される。

use tonic::{Request, Response, Status};
use userhub_domain::user::{User, UserDraft, UserId, UserUpdate};

use crate::{
   error::ApiError,
   proto::usermanager::v1::{
      CreateUserRequest, CreateUserResponse, DeleteUserRequest, DeleteUserResponse,
      ListUsersRequest, ListUsersResponse, UpdateUserRequest, UpdateUserResponse,
      user_manager_server::UserManager,
   },
   usecase::{ListUsersInput, UserUseCase},
};

/// UserManager gRPC サービス
pub struct UserManagerGrpc {
   usecase: UserUseCase,
}

impl UserManagerGrpc {
   pub fn new(usecase: UserUseCase) -> Self {
      Self { usecase }
   }
}

/// ドメインのユーザーを proto 表現へ変換する
///
/// タイムスタンプは RFC 3339 文字列。パスワードハッシュは含めない。
fn to_proto_user(user: &User) -> crate::proto::usermanager::v1::User {
   crate::proto::usermanager::v1::User {
      id:         user.id().to_string(),
      first_name: user.first_name().to_string(),
      last_name:  user.last_name().to_string(),
      nickname:   user.nickname().as_str().to_string(),
      email:      user.email().as_str().to_string(),
      country:    user.country().to_string(),
      created_at: user.created_at().to_rfc3339(),
      updated_at: user.updated_at().to_rfc3339(),
   }
}

/// リクエスト中のユーザー ID を解析する
fn parse_user_id(raw: &str) -> Result<UserId, Status> {
   raw.parse::<UserId>()
      .map_err(|e| Status::from(ApiError::from(e)))
}

#[tonic::async_trait]
impl UserManager for UserManagerGrpc {
   async fn create_user(
      &self,
      request: Request<CreateUserRequest>,
   ) -> Result<Response<CreateUserResponse>, Status> {
      let req = request.into_inner();
      let draft = UserDraft::new(
         req.first_name,
         req.last_name,
         req.nickname,
         req.email,
         req.country,
         req.password,
      )
      .map_err(|e| Status::from(ApiError::from(e)))?;

      let user = self.usecase.create_user(draft).await.map_err(Status::from)?;

      Ok(Response::new(CreateUserResponse {
         user: Some(to_proto_user(&user)),
      }))
   }

   async fn list_users(
      &self,
      request: Request<ListUsersRequest>,
   ) -> Result<Response<ListUsersResponse>, Status> {
      let req = request.into_inner();
      let input = ListUsersInput {
         next_page:  req.next_page,
         filter:     req.filter,
         filter_by:  req.filter_by,
         pagination: req.pagination.map(|p| p.to_string()),
      };

      let (users, next_page) = self.usecase.list_users(input).await.map_err(Status::from)?;

      Ok(Response::new(ListUsersResponse {
         users: users.iter().map(to_proto_user).collect(),
         next_page,
      }))
   }

   async fn update_user(
      &self,
      request: Request<UpdateUserRequest>,
   ) -> Result<Response<UpdateUserResponse>, Status> {
      let req = request.into_inner();
      let id = parse_user_id(&req.id)?;
      let update = UserUpdate::new(
         req.first_name,
         req.last_name,
         req.nickname,
         req.email,
         req.country,
         req.password,
      )
      .map_err(|e| Status::from(ApiError::from(e)))?;

      let user = self
         .usecase
         .update_user(id, update)
         .await
         .map_err(Status::from)?;

      Ok(Response::new(UpdateUserResponse {
         user: Some(to_proto_user(&user)),
      }))
   }

   async fn delete_user(
      &self,
      request: Request<DeleteUserRequest>,
   ) -> Result<Response<DeleteUserResponse>, Status> {
      let id = parse_user_id(&request.into_inner().id)?;

      self.usecase.delete_user(id).await.map_err(Status::from)?;

      Ok(Response::new(DeleteUserResponse {}))
   }
}
