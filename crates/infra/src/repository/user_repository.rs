//! # UserRepository
//!
//! ユーザー情報の永続化を担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **動的 WHERE 句**: 絞り込み条件のカラム名は固定の許可リストと
//!   照合してから SQL に埋め込む（SQL インジェクション対策）。
//!   値は常にプレースホルダでバインドする
//! - **実行時クエリ**: 絞り込みカラムが実行時に決まるため、
//!   `sqlx::query` / `query_as` を使用する
//! - **一覧の並び順**: `created_at` の降順で固定

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use userhub_domain::{
   filter::Filter,
   password::PasswordHash,
   user::{Email, Nickname, User, UserId},
};
use uuid::Uuid;

use crate::error::InfraError;

/// 絞り込みに使用できるカラムの許可リスト
///
/// 設定の `ALLOWED_FILTERS` とは独立した最後の防衛線。
/// ここにないカラム名は SQL に到達しない。
const FILTERABLE_COLUMNS: &[&str] = &["country", "first_name", "last_name", "nickname", "email"];

/// ユーザーリポジトリトレイト
///
/// ユーザー情報の永続化操作を定義する。
/// インフラ層で具体的な実装を提供し、ユースケース層から利用する。
#[async_trait]
pub trait UserRepository: Send + Sync {
   /// データベースへの到達性を確認する
   async fn ping(&self) -> Result<(), InfraError>;

   /// ユーザーを新規作成する
   ///
   /// # エラー
   ///
   /// メールアドレスまたはニックネームが既存ユーザーと重複した場合は
   /// `InfraErrorKind::DuplicateKey` を返す。
   async fn create(&self, user: &User) -> Result<(), InfraError>;

   /// ID でユーザーを検索する
   ///
   /// # 戻り値
   ///
   /// - `Ok(Some(user))`: ユーザーが見つかった場合
   /// - `Ok(None)`: ユーザーが見つからない場合
   async fn get(&self, id: UserId) -> Result<Option<User>, InfraError>;

   /// ユーザー一覧を取得する
   ///
   /// `created_at` の降順で返す。`limit` が正かつ `offset` が非負の場合のみ
   /// ページングを適用し、それ以外は全件返す。
   async fn list(
      &self,
      limit: Option<i64>,
      offset: i64,
      filter: Option<&Filter>,
   ) -> Result<Vec<User>, InfraError>;

   /// 絞り込み条件に合致するユーザーの総数を返す
   async fn count(&self, filter: Option<&Filter>) -> Result<i64, InfraError>;

   /// ユーザーの全フィールドを更新する
   ///
   /// # エラー
   ///
   /// - 対象行が存在しない場合は `InfraErrorKind::RowNotFound`
   /// - 一意制約違反の場合は `InfraErrorKind::DuplicateKey`
   async fn update(&self, user: &User) -> Result<(), InfraError>;

   /// ユーザーを削除する
   ///
   /// # エラー
   ///
   /// 対象行が存在しない場合は `InfraErrorKind::RowNotFound` を返す。
   async fn delete(&self, id: UserId) -> Result<(), InfraError>;
}

/// users テーブルの行
#[derive(sqlx::FromRow)]
struct UserRow {
   id:         Uuid,
   first_name: String,
   last_name:  String,
   nickname:   String,
   password:   String,
   email:      String,
   country:    String,
   created_at: DateTime<Utc>,
   updated_at: DateTime<Utc>,
}

fn row_into_user(row: UserRow) -> Result<User, InfraError> {
   Ok(User::from_db(
      UserId::from_uuid(row.id),
      row.first_name,
      row.last_name,
      Nickname::new(row.nickname).map_err(|e| InfraError::unexpected(e.to_string()))?,
      Email::new(row.email).map_err(|e| InfraError::unexpected(e.to_string()))?,
      row.country,
      PasswordHash::new(row.password),
      row.created_at,
      row.updated_at,
   ))
}

/// 絞り込みカラム名を許可リストと照合する
fn filter_column(field: &str) -> Result<&'static str, InfraError> {
   FILTERABLE_COLUMNS
      .iter()
      .find(|c| **c == field)
      .copied()
      .ok_or_else(|| InfraError::invalid_input(format!("column '{field}' is not filterable")))
}

/// PostgreSQL 実装の UserRepository
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
   pool: PgPool,
}

impl PostgresUserRepository {
   /// 新しいリポジトリインスタンスを作成
   pub fn new(pool: PgPool) -> Self {
      Self { pool }
   }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
   async fn ping(&self) -> Result<(), InfraError> {
      sqlx::query("SELECT 1").execute(&self.pool).await?;
      Ok(())
   }

   async fn create(&self, user: &User) -> Result<(), InfraError> {
      sqlx::query(
         r#"
            INSERT INTO users
                (id, first_name, last_name, nickname, password, email, country,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
      )
      .bind(*user.id().as_uuid())
      .bind(user.first_name())
      .bind(user.last_name())
      .bind(user.nickname().as_str())
      .bind(user.password_hash().as_str())
      .bind(user.email().as_str())
      .bind(user.country())
      .bind(user.created_at())
      .bind(user.updated_at())
      .execute(&self.pool)
      .await?;

      Ok(())
   }

   async fn get(&self, id: UserId) -> Result<Option<User>, InfraError> {
      let row = sqlx::query_as::<_, UserRow>(
         r#"
            SELECT
                id,
                first_name,
                last_name,
                nickname,
                password,
                email,
                country,
                created_at,
                updated_at
            FROM users
            WHERE id = $1
            "#,
      )
      .bind(*id.as_uuid())
      .fetch_optional(&self.pool)
      .await?;

      row.map(row_into_user).transpose()
   }

   async fn list(
      &self,
      limit: Option<i64>,
      offset: i64,
      filter: Option<&Filter>,
   ) -> Result<Vec<User>, InfraError> {
      let mut sql = String::from(
         "SELECT id, first_name, last_name, nickname, password, email, country, \
          created_at, updated_at FROM users",
      );

      let mut next_placeholder = 1;
      if let Some(filter) = filter {
         let column = filter_column(filter.field())?;
         sql.push_str(&format!(" WHERE {column} = ${next_placeholder}"));
         next_placeholder += 1;
      }
      sql.push_str(" ORDER BY created_at DESC");

      let paging = limit.filter(|l| *l > 0 && offset >= 0);
      if paging.is_some() {
         sql.push_str(&format!(
            " OFFSET ${} LIMIT ${}",
            next_placeholder,
            next_placeholder + 1
         ));
      }

      let mut query = sqlx::query_as::<_, UserRow>(&sql);
      if let Some(filter) = filter {
         query = query.bind(filter.value().to_owned());
      }
      if let Some(limit) = paging {
         query = query.bind(offset).bind(limit);
      }

      let rows = query.fetch_all(&self.pool).await?;
      rows.into_iter().map(row_into_user).collect()
   }

   async fn count(&self, filter: Option<&Filter>) -> Result<i64, InfraError> {
      let total = match filter {
         Some(filter) => {
            let column = filter_column(filter.field())?;
            sqlx::query_scalar::<_, i64>(&format!(
               "SELECT COUNT(*) FROM users WHERE {column} = $1"
            ))
            .bind(filter.value().to_owned())
            .fetch_one(&self.pool)
            .await?
         }
         None => {
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
               .fetch_one(&self.pool)
               .await?
         }
      };

      Ok(total)
   }

   async fn update(&self, user: &User) -> Result<(), InfraError> {
      let result = sqlx::query(
         r#"
            UPDATE users
            SET first_name = $1,
                last_name = $2,
                nickname = $3,
                password = $4,
                email = $5,
                country = $6,
                updated_at = $7
            WHERE id = $8
            "#,
      )
      .bind(user.first_name())
      .bind(user.last_name())
      .bind(user.nickname().as_str())
      .bind(user.password_hash().as_str())
      .bind(user.email().as_str())
      .bind(user.country())
      .bind(user.updated_at())
      .bind(*user.id().as_uuid())
      .execute(&self.pool)
      .await?;

      if result.rows_affected() == 0 {
         return Err(InfraError::row_not_found());
      }

      Ok(())
   }

   async fn delete(&self, id: UserId) -> Result<(), InfraError> {
      let result = sqlx::query("DELETE FROM users WHERE id = $1")
         .bind(*id.as_uuid())
         .execute(&self.pool)
         .await?;

      if result.rows_affected() == 0 {
         return Err(InfraError::row_not_found());
      }

      Ok(())
   }
}
