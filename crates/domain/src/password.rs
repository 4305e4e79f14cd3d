//! # パスワード
//!
//! パスワード関連の値オブジェクトを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 用途 |
//! |---|------------|------|
//! | [`PlainPassword`] | 平文パスワード | 作成・更新リクエストの入力値 |
//! | [`PasswordHash`] | パスワードハッシュ | 永続化用のハッシュ値 |

use crate::DomainError;

/// 平文パスワード（リクエストの入力値）
///
/// ユーザーが入力したパスワードをラップする。
/// ハッシュ化される前の一時的な存在であり、永続化してはならない。
///
/// # セキュリティ
///
/// Debug 出力ではパスワードの値をマスクする。
#[derive(Clone)]
pub struct PlainPassword(String);

impl std::fmt::Debug for PlainPassword {
   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
      f.debug_tuple("PlainPassword").field(&"[REDACTED]").finish()
   }
}

impl PlainPassword {
   /// パスワードを作成する
   ///
   /// # バリデーション
   ///
   /// 空文字列は `DomainError::Validation` で拒否する。
   pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
      let value = value.into();
      if value.is_empty() {
         return Err(DomainError::Validation("password is required".to_string()));
      }
      Ok(Self(value))
   }

   /// 文字列参照を取得する
   pub fn as_str(&self) -> &str {
      &self.0
   }
}

/// パスワードハッシュ（永続化用）
///
/// Argon2id でハッシュ化されたパスワード文字列をラップする。
/// データベースに保存される形式。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
   /// ハッシュ文字列からインスタンスを作成する
   ///
   /// 主にデータベースからの復元時に使用する。
   pub fn new(hash: impl Into<String>) -> Self {
      Self(hash.into())
   }

   /// 文字列参照を取得する
   pub fn as_str(&self) -> &str {
      &self.0
   }

   /// 所有権を持つ文字列に変換する
   pub fn into_string(self) -> String {
      self.0
   }
}
