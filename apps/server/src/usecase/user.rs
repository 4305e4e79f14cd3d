//! # ユーザーユースケース
//!
//! ユーザー CRUD と一覧取得のビジネスロジック。
//!
//! ## 設計方針
//!
//! - **トランスポート非依存**: HTTP / gRPC のどちらからも同じ経路を通す
//! - **依存の注入**: リポジトリ・ハッシュ器・通知・時計はすべて trait 経由
//! - **通知はベストエフォート**: 送信失敗はログに残すだけで操作は成功させる

use std::sync::Arc;

use userhub_domain::{
   clock::Clock,
   filter::AllowedFilters,
   pagination::{self, PageTokenError},
   user::{User, UserDraft, UserId, UserUpdate},
   DomainError,
};
use userhub_infra::{
   PasswordHasher,
   notification::{Channel, ChannelNotifier},
   repository::UserRepository,
};
use userhub_shared::health::{CheckStatus, ReadinessResponse, ReadinessStatus};

use crate::error::ApiError;

/// ヘルスチェックでデータベース応答を待つ上限
const HEALTH_CHECK_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(3);

/// 一覧取得の生パラメータ
///
/// `pagination` は整数として未解析のまま保持する。有効なトークンが
/// 指定された場合は解析自体が行われないため、遅延評価が必要になる。
#[derive(Debug, Default)]
pub struct ListUsersInput {
   pub next_page:  String,
   pub filter:     String,
   pub filter_by:  String,
   pub pagination: Option<String>,
}

/// ユーザーユースケース
#[derive(Clone)]
pub struct UserUseCase {
   repository:      Arc<dyn UserRepository>,
   password_hasher: Arc<dyn PasswordHasher>,
   notifier:        Arc<dyn ChannelNotifier>,
   clock:           Arc<dyn Clock>,
   allowed_filters: AllowedFilters,
}

impl UserUseCase {
   pub fn new(
      repository: Arc<dyn UserRepository>,
      password_hasher: Arc<dyn PasswordHasher>,
      notifier: Arc<dyn ChannelNotifier>,
      clock: Arc<dyn Clock>,
      allowed_filters: AllowedFilters,
   ) -> Self {
      Self {
         repository,
         password_hasher,
         notifier,
         clock,
         allowed_filters,
      }
   }

   /// ユーザーを作成する
   ///
   /// パスワードをハッシュ化し、ID とタイムスタンプを採番して永続化する。
   /// 成功時は create チャネルへ通知する。
   pub async fn create_user(&self, draft: UserDraft) -> Result<User, ApiError> {
      let password_hash = self.password_hasher.hash(&draft.password)?;
      let user = User::new(UserId::new(), draft, password_hash, self.clock.now());

      self.repository.create(&user).await?;
      self.notify(Channel::Create, &format!("user {}", user.id())).await;

      Ok(user)
   }

   /// 条件に合致するユーザーの一覧を取得する
   ///
   /// トークンと生パラメータからページ選択を解決し、一覧と総件数を取得、
   /// 次ページが残っている場合はトークンを発行して返す。
   pub async fn list_users(
      &self,
      input: ListUsersInput,
   ) -> Result<(Vec<User>, Option<String>), ApiError> {
      let selection = pagination::resolve_page(
         &input.next_page,
         &input.filter,
         &input.filter_by,
         || {
            input
               .pagination
               .as_deref()
               .map(|raw| {
                  raw.parse::<i64>()
                     .map_err(|_| PageTokenError::InvalidPagination)
               })
               .transpose()
         },
         &self.allowed_filters,
         self.clock.as_ref(),
      )?;

      let users = self
         .repository
         .list(selection.limit, selection.offset, selection.filter.as_ref())
         .await?;
      let total = self.repository.count(selection.filter.as_ref()).await?;

      let next_page = pagination::next_page_token(
         selection.limit,
         selection.offset,
         total,
         selection.filter.as_ref(),
         self.clock.as_ref(),
      );

      Ok((users, next_page))
   }

   /// ユーザーを更新する
   ///
   /// パッチのうち現在値と異なるフィールドだけを適用する。
   /// 適用すべき変更がない場合は 400 相当のエラーを返す。
   pub async fn update_user(
      &self,
      id: UserId,
      mut update: UserUpdate,
   ) -> Result<User, ApiError> {
      if update.is_empty() {
         return Err(DomainError::EmptyUpdate.into());
      }

      let user = self
         .repository
         .get(id)
         .await?
         .ok_or_else(|| DomainError::NotFound {
            entity_type: "user",
            id:          id.to_string(),
         })?;

      let new_password_hash = update
         .password
         .take()
         .map(|password| self.password_hasher.hash(&password))
         .transpose()?;

      let updated = user.with_update(update, new_password_hash, self.clock.now())?;

      self.repository.update(&updated).await?;
      self.notify(Channel::Update, &format!("user {}", updated.id())).await;

      Ok(updated)
   }

   /// ユーザーを削除する
   pub async fn delete_user(&self, id: UserId) -> Result<(), ApiError> {
      self.repository.delete(id).await?;
      self.notify(Channel::Delete, &format!("user {}", id)).await;

      Ok(())
   }

   /// 依存サービスの疎通を確認する
   ///
   /// データベースへの ping が 3 秒以内に成功すれば ready。
   pub async fn readiness(&self) -> ReadinessResponse {
      let db_ok = matches!(
         tokio::time::timeout(HEALTH_CHECK_TIMEOUT, self.repository.ping()).await,
         Ok(Ok(()))
      );

      let mut checks = std::collections::HashMap::new();
      checks.insert(
         "database".to_string(),
         if db_ok { CheckStatus::Ok } else { CheckStatus::Error },
      );

      ReadinessResponse {
         status: if db_ok {
            ReadinessStatus::Ready
         } else {
            ReadinessStatus::NotReady
         },
         checks,
      }
   }

   /// ベストエフォートでチャネル通知を送る
   ///
   /// 失敗しても呼び出し元の操作は成功のまま。警告ログのみ残す。
   async fn notify(&self, channel: Channel, message: &str) {
      if let Err(e) = self.notifier.notify(channel, message).await {
         tracing::warn!(
            channel = %channel,
            error = %e,
            "チャネル通知に失敗しました（処理は継続）"
         );
      }
   }
}

#[cfg(test)]
mod tests {
   use chrono::{DateTime, Utc};
   use pretty_assertions::assert_eq;
   use rstest::{fixture, rstest};
   use userhub_domain::clock::FixedClock;
   use userhub_infra::{
      Argon2PasswordHasher,
      mock::{InMemoryUserRepository, RecordingChannelNotifier},
   };

   use super::*;

   #[fixture]
   fn now() -> DateTime<Utc> {
      DateTime::from_timestamp(1_700_000_000, 0).unwrap()
   }

   fn usecase_with(
      repository: InMemoryUserRepository,
      notifier: RecordingChannelNotifier,
      now: DateTime<Utc>,
   ) -> UserUseCase {
      UserUseCase::new(
         Arc::new(repository),
         Arc::new(Argon2PasswordHasher::new()),
         Arc::new(notifier),
         Arc::new(FixedClock::new(now)),
         AllowedFilters::new(["country"]),
      )
   }

   fn draft(nickname: &str, email: &str) -> UserDraft {
      UserDraft::new("Ada", "Lovelace", nickname, email, "UK", "pa55word").unwrap()
   }

   #[rstest]
   #[tokio::test]
   async fn test_作成はパスワードを平文のまま保存しない(now: DateTime<Utc>) {
      let repo = InMemoryUserRepository::new();
      let sut = usecase_with(repo.clone(), RecordingChannelNotifier::new(), now);

      let user = sut.create_user(draft("ada", "ada@example.com")).await.unwrap();

      assert_ne!(user.password_hash().as_str(), "pa55word");
      assert!(user.password_hash().as_str().starts_with("$argon2id$"));
      assert_eq!(user.created_at(), now);
   }

   #[rstest]
   #[tokio::test]
   async fn test_作成はcreateチャネルへ通知する(now: DateTime<Utc>) {
      let notifier = RecordingChannelNotifier::new();
      let sut = usecase_with(InMemoryUserRepository::new(), notifier.clone(), now);

      sut.create_user(draft("ada", "ada@example.com")).await.unwrap();

      let sent = notifier.sent();
      assert_eq!(sent.len(), 1);
      assert_eq!(sent[0].0, Channel::Create);
   }

   #[rstest]
   #[tokio::test]
   async fn test_通知の失敗は操作を妨げない(now: DateTime<Utc>) {
      let sut = usecase_with(
         InMemoryUserRepository::new(),
         RecordingChannelNotifier::failing(),
         now,
      );

      let result = sut.create_user(draft("ada", "ada@example.com")).await;

      assert!(result.is_ok());
   }

   #[rstest]
   #[tokio::test]
   async fn test_一覧はトークンを発行し次ページへ進める(now: DateTime<Utc>) {
      let repo = InMemoryUserRepository::new();
      let sut = usecase_with(repo, RecordingChannelNotifier::new(), now);
      for i in 0..3 {
         sut.create_user(draft(
            &format!("user{i}"),
            &format!("user{i}@example.com"),
         ))
         .await
         .unwrap();
      }

      let (users, next_page) = sut
         .list_users(ListUsersInput {
            pagination: Some("2".to_string()),
            ..ListUsersInput::default()
         })
         .await
         .unwrap();

      assert_eq!(users.len(), 2);
      let token = next_page.expect("次ページのトークンが発行されること");

      // 発行されたトークンで残りの 1 件が取れる
      let (rest, next_page) = sut
         .list_users(ListUsersInput {
            next_page: token,
            ..ListUsersInput::default()
         })
         .await
         .unwrap();
      assert_eq!(rest.len(), 1);
      assert_eq!(next_page, None);
   }

   #[rstest]
   #[tokio::test]
   async fn test_一覧で不正なpaginationはエラー(now: DateTime<Utc>) {
      let sut = usecase_with(
         InMemoryUserRepository::new(),
         RecordingChannelNotifier::new(),
         now,
      );

      let err = sut
         .list_users(ListUsersInput {
            pagination: Some("abc".to_string()),
            ..ListUsersInput::default()
         })
         .await
         .unwrap_err();

      assert_eq!(err.to_string(), "malformed pagination");
   }

   #[rstest]
   #[tokio::test]
   async fn test_空の更新パッチは保存前に拒否される(now: DateTime<Utc>) {
      let sut = usecase_with(
         InMemoryUserRepository::new(),
         RecordingChannelNotifier::new(),
         now,
      );

      let err = sut
         .update_user(UserId::new(), UserUpdate::default())
         .await
         .unwrap_err();

      assert!(matches!(err, ApiError::Domain(DomainError::EmptyUpdate)));
   }

   #[rstest]
   #[tokio::test]
   async fn test_存在しないユーザーの更新はnot_found(now: DateTime<Utc>) {
      let sut = usecase_with(
         InMemoryUserRepository::new(),
         RecordingChannelNotifier::new(),
         now,
      );
      let update = UserUpdate::new(
         None,
         None,
         None,
         None,
         Some("NL".to_string()),
         None,
      )
      .unwrap();

      let err = sut.update_user(UserId::new(), update).await.unwrap_err();

      assert!(matches!(
         err,
         ApiError::Domain(DomainError::NotFound { .. })
      ));
   }

   #[rstest]
   #[tokio::test]
   async fn test_削除はdeleteチャネルへ通知する(now: DateTime<Utc>) {
      let notifier = RecordingChannelNotifier::new();
      let sut = usecase_with(InMemoryUserRepository::new(), notifier.clone(), now);
      let user = sut.create_user(draft("ada", "ada@example.com")).await.unwrap();

      sut.delete_user(user.id()).await.unwrap();

      let sent = notifier.sent();
      assert_eq!(sent.last().unwrap().0, Channel::Delete);
   }

   #[rstest]
   #[tokio::test]
   async fn test_readinessはインメモリリポジトリでreadyを返す(now: DateTime<Utc>) {
      let sut = usecase_with(
         InMemoryUserRepository::new(),
         RecordingChannelNotifier::new(),
         now,
      );

      let response = sut.readiness().await;

      assert_eq!(response.status, ReadinessStatus::Ready);
      assert_eq!(response.checks["database"], CheckStatus::Ok);
   }
}
