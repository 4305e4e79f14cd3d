//! # テスト用モック実装
//!
//! ユースケース・ハンドラテストで使用するインメモリ実装。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! userhub-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use userhub_domain::{
   filter::Filter,
   user::{User, UserId},
};

use crate::{
   error::InfraError,
   notification::{Channel, ChannelNotifier},
   repository::UserRepository,
};

// ===== InMemoryUserRepository =====

/// インメモリの UserRepository 実装
///
/// PostgreSQL 実装と同じ契約（一意制約、並び順、影響行数の扱い）を
/// メモリ上で再現する。
#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
   users: Arc<Mutex<Vec<User>>>,
}

impl InMemoryUserRepository {
   pub fn new() -> Self {
      Self {
         users: Arc::new(Mutex::new(Vec::new())),
      }
   }

   /// 一意制約を経由せずにユーザーを直接投入する（テストのセットアップ用）
   pub fn seed(&self, user: User) {
      self.users.lock().unwrap().push(user);
   }

   fn matches(user: &User, filter: &Filter) -> bool {
      let actual = match filter.field() {
         "country" => user.country(),
         "first_name" => user.first_name(),
         "last_name" => user.last_name(),
         "nickname" => user.nickname().as_str(),
         "email" => user.email().as_str(),
         _ => return false,
      };
      actual == filter.value()
   }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
   async fn ping(&self) -> Result<(), InfraError> {
      Ok(())
   }

   async fn create(&self, user: &User) -> Result<(), InfraError> {
      let mut users = self.users.lock().unwrap();

      if users.iter().any(|u| u.email() == user.email()) {
         return Err(InfraError::duplicate_key("email_uq"));
      }
      if users.iter().any(|u| u.nickname() == user.nickname()) {
         return Err(InfraError::duplicate_key("nickname_uq"));
      }

      users.push(user.clone());
      Ok(())
   }

   async fn get(&self, id: UserId) -> Result<Option<User>, InfraError> {
      Ok(self
         .users
         .lock()
         .unwrap()
         .iter()
         .find(|u| u.id() == id)
         .cloned())
   }

   async fn list(
      &self,
      limit: Option<i64>,
      offset: i64,
      filter: Option<&Filter>,
   ) -> Result<Vec<User>, InfraError> {
      let users = self.users.lock().unwrap();

      let mut selected: Vec<User> = users
         .iter()
         .filter(|u| filter.is_none_or(|f| Self::matches(u, f)))
         .cloned()
         .collect();
      selected.sort_by(|a, b| b.created_at().cmp(&a.created_at()));

      if let Some(limit) = limit.filter(|l| *l > 0 && offset >= 0) {
         selected = selected
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
      }

      Ok(selected)
   }

   async fn count(&self, filter: Option<&Filter>) -> Result<i64, InfraError> {
      let users = self.users.lock().unwrap();
      let total = users
         .iter()
         .filter(|u| filter.is_none_or(|f| Self::matches(u, f)))
         .count();
      Ok(total as i64)
   }

   async fn update(&self, user: &User) -> Result<(), InfraError> {
      let mut users = self.users.lock().unwrap();

      if users
         .iter()
         .any(|u| u.id() != user.id() && u.email() == user.email())
      {
         return Err(InfraError::duplicate_key("email_uq"));
      }
      if users
         .iter()
         .any(|u| u.id() != user.id() && u.nickname() == user.nickname())
      {
         return Err(InfraError::duplicate_key("nickname_uq"));
      }

      let Some(existing) = users.iter_mut().find(|u| u.id() == user.id()) else {
         return Err(InfraError::row_not_found());
      };
      *existing = user.clone();
      Ok(())
   }

   async fn delete(&self, id: UserId) -> Result<(), InfraError> {
      let mut users = self.users.lock().unwrap();
      let before = users.len();
      users.retain(|u| u.id() != id);

      if users.len() == before {
         return Err(InfraError::row_not_found());
      }
      Ok(())
   }
}

// ===== RecordingChannelNotifier =====

/// 通知を記録するテスト用 ChannelNotifier
///
/// `failing()` で作成すると、記録したうえで常にエラーを返す。
/// ベストエフォート方針（通知失敗が操作を妨げないこと）の検証に使用する。
#[derive(Clone, Default)]
pub struct RecordingChannelNotifier {
   sent: Arc<Mutex<Vec<(Channel, String)>>>,
   fail: bool,
}

impl RecordingChannelNotifier {
   pub fn new() -> Self {
      Self::default()
   }

   /// 常にエラーを返す通知クライアントを作成する
   pub fn failing() -> Self {
      Self {
         sent: Arc::new(Mutex::new(Vec::new())),
         fail: true,
      }
   }

   /// 記録された通知を返す
   pub fn sent(&self) -> Vec<(Channel, String)> {
      self.sent.lock().unwrap().clone()
   }
}

#[async_trait]
impl ChannelNotifier for RecordingChannelNotifier {
   async fn notify(&self, channel: Channel, message: &str) -> Result<(), InfraError> {
      self.sent.lock().unwrap().push((channel, message.to_string()));

      if self.fail {
         return Err(InfraError::notification("simulated failure"));
      }
      Ok(())
   }
}
