//! # ユーザー
//!
//! ユーザーエンティティとそれに関連する値オブジェクトを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 用途 |
//! |---|------------|------|
//! | [`User`] | ユーザー | 永続化されたユーザーの完全な状態 |
//! | [`UserDraft`] | ユーザードラフト | 作成リクエストの検証済み入力 |
//! | [`UserUpdate`] | 更新パッチ | 更新リクエストの検証済み入力（全フィールド任意） |
//!
//! ## 設計方針
//!
//! - **Newtype パターン**: UserId は UUID をラップし、型安全性を確保
//! - **バリデーション**: 値オブジェクトの生成時に検証ロジックを実行
//! - **不変性**: エンティティの変更は新しいインスタンスを返すメソッド経由

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{DomainError, password::{PasswordHash, PlainPassword}};

/// ユーザー ID（一意識別子）
///
/// Newtype パターンで型安全性を確保。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[display("{_0}")]
pub struct UserId(Uuid);

impl UserId {
    /// 新しいユーザー ID を生成する
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// 既存の UUID からユーザー ID を作成する
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 内部の UUID 参照を取得する
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::str::FromStr for UserId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| DomainError::Validation(format!("invalid user id: {}", s)))
    }
}

/// メールアドレス（値オブジェクト）
///
/// 生成時にバリデーションを実行し、不正な値の作成を防ぐ。
/// 大文字小文字の揺れによる重複を防ぐため、取り込み時に小文字へ正規化する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    /// メールアドレスを作成する
    ///
    /// # バリデーション
    ///
    /// - 空文字列ではない
    /// - `local@domain` の形式で両側が非空
    /// - 最大 255 文字
    ///
    /// # エラー
    ///
    /// バリデーションに失敗した場合は `DomainError::Validation` を返す。
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into().to_lowercase();

        if value.is_empty() {
            return Err(DomainError::Validation("email is required".to_string()));
        }

        let Some((local, domain)) = value.split_once('@') else {
            return Err(DomainError::Validation(format!(
                "invalid email format: {}",
                value
            )));
        };

        if local.is_empty() || domain.is_empty() {
            return Err(DomainError::Validation(format!(
                "invalid email format: {}",
                value
            )));
        }

        if value.len() > 255 {
            return Err(DomainError::Validation(
                "email must be at most 255 characters".to_string(),
            ));
        }

        Ok(Self(value))
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

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ニックネーム（値オブジェクト）
///
/// 表示名として使用される、システム全体で一意の識別名。
///
/// # バリデーション規則
///
/// - 1〜32 文字
/// - 先頭と末尾は英数字
/// - 記号は `.` `_` `-` のみ使用可能
/// - 記号の連続は不可（`a..b` や `a._b` は拒否）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nickname(String);

impl Nickname {
    const MAX_LEN: usize = 32;

    /// ニックネームを作成する
    ///
    /// # エラー
    ///
    /// バリデーションに失敗した場合は `DomainError::Validation` を返す。
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        let chars: Vec<char> = value.chars().collect();

        if chars.is_empty() || chars.len() > Self::MAX_LEN {
            return Err(DomainError::Validation(
                "nickname must be 1 to 32 characters".to_string(),
            ));
        }

        let first = chars[0];
        let last = chars[chars.len() - 1];
        if !first.is_ascii_alphanumeric() || !last.is_ascii_alphanumeric() {
            return Err(DomainError::Validation(
                "nickname must start and end with an alphanumeric character".to_string(),
            ));
        }

        let mut prev_special = false;
        for c in chars {
            if c.is_ascii_alphanumeric() {
                prev_special = false;
            } else if matches!(c, '.' | '_' | '-') {
                if prev_special {
                    return Err(DomainError::Validation(
                        "nickname must not contain consecutive special characters"
                            .to_string(),
                    ));
                }
                prev_special = true;
            } else {
                return Err(DomainError::Validation(format!(
                    "nickname contains unsupported character: {}",
                    c
                )));
            }
        }

        Ok(Self(value))
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

impl std::fmt::Display for Nickname {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ユーザーエンティティ
///
/// サービスに登録されたユーザーを表現する。
///
/// # 不変条件
///
/// - `email` はシステム全体で一意
/// - `nickname` はシステム全体で一意
/// - `password_hash` は常にハッシュ済みの値（平文は保持しない）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    first_name: String,
    last_name: String,
    nickname: Nickname,
    email: Email,
    country: String,
    password_hash: PasswordHash,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// 検証済みドラフトから新しいユーザーを作成する
    ///
    /// # 引数
    ///
    /// - `id`: 採番済みのユーザー ID
    /// - `draft`: 検証済みの作成入力
    /// - `password_hash`: ハッシュ化済みパスワード
    /// - `now`: 現在日時（呼び出し元から注入）
    pub fn new(
        id: UserId,
        draft: UserDraft,
        password_hash: PasswordHash,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            first_name: draft.first_name,
            last_name: draft.last_name,
            nickname: draft.nickname,
            email: draft.email,
            country: draft.country,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }

    /// 既存のデータからユーザーを復元する（データベースから取得時）
    #[allow(clippy::too_many_arguments)]
    pub fn from_db(
        id: UserId,
        first_name: String,
        last_name: String,
        nickname: Nickname,
        email: Email,
        country: String,
        password_hash: PasswordHash,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            first_name,
            last_name,
            nickname,
            email,
            country,
            password_hash,
            created_at,
            updated_at,
        }
    }

    // Getter メソッド

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn nickname(&self) -> &Nickname {
        &self.nickname
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// 更新パッチを適用した新しいインスタンスを返す
    ///
    /// 指定されたフィールドのうち、現在値と異なるものだけを変更として扱う。
    /// `new_password_hash` が Some の場合は常に変更とみなす。
    ///
    /// # エラー
    ///
    /// 適用すべき変更がひとつもない場合は `DomainError::EmptyUpdate` を返す。
    pub fn with_update(
        self,
        update: UserUpdate,
        new_password_hash: Option<PasswordHash>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let mut updated = self;
        let mut changed = false;

        if let Some(first_name) = update.first_name
            && first_name != updated.first_name
        {
            updated.first_name = first_name;
            changed = true;
        }
        if let Some(last_name) = update.last_name
            && last_name != updated.last_name
        {
            updated.last_name = last_name;
            changed = true;
        }
        if let Some(nickname) = update.nickname
            && nickname != updated.nickname
        {
            updated.nickname = nickname;
            changed = true;
        }
        if let Some(email) = update.email
            && email != updated.email
        {
            updated.email = email;
            changed = true;
        }
        if let Some(country) = update.country
            && country != updated.country
        {
            updated.country = country;
            changed = true;
        }
        if let Some(hash) = new_password_hash {
            updated.password_hash = hash;
            changed = true;
        }

        if !changed {
            return Err(DomainError::EmptyUpdate);
        }

        updated.updated_at = now;
        Ok(updated)
    }
}

/// ユーザー作成の検証済み入力
///
/// すべてのフィールドが必須。値オブジェクトの生成を通じて
/// バリデーション済みであることを型で保証する。
#[derive(Debug, Clone)]
pub struct UserDraft {
    pub first_name: String,
    pub last_name:  String,
    pub nickname:   Nickname,
    pub email:      Email,
    pub country:    String,
    pub password:   PlainPassword,
}

impl UserDraft {
    /// 生の入力値からドラフトを作成する
    ///
    /// # エラー
    ///
    /// いずれかのフィールドの検証に失敗した場合は
    /// `DomainError::Validation` を返す。
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        nickname: impl Into<String>,
        email: impl Into<String>,
        country: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let first_name = first_name.into();
        if first_name.is_empty() {
            return Err(DomainError::Validation("first_name is required".to_string()));
        }
        let last_name = last_name.into();
        if last_name.is_empty() {
            return Err(DomainError::Validation("last_name is required".to_string()));
        }
        let country = country.into();
        if country.is_empty() {
            return Err(DomainError::Validation("country is required".to_string()));
        }

        Ok(Self {
            first_name,
            last_name,
            nickname: Nickname::new(nickname)?,
            email: Email::new(email)?,
            country,
            password: PlainPassword::new(password)?,
        })
    }
}

/// ユーザー更新の検証済みパッチ
///
/// すべてのフィールドが任意。None は「変更しない」を意味する。
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub first_name: Option<String>,
    pub last_name:  Option<String>,
    pub nickname:   Option<Nickname>,
    pub email:      Option<Email>,
    pub country:    Option<String>,
    pub password:   Option<PlainPassword>,
}

impl UserUpdate {
    /// 生の入力値からパッチを作成する
    ///
    /// 空文字列は「未指定」として None に正規化する。
    pub fn new(
        first_name: Option<String>,
        last_name: Option<String>,
        nickname: Option<String>,
        email: Option<String>,
        country: Option<String>,
        password: Option<String>,
    ) -> Result<Self, DomainError> {
        let normalize = |v: Option<String>| v.filter(|s| !s.is_empty());

        Ok(Self {
            first_name: normalize(first_name),
            last_name:  normalize(last_name),
            nickname:   normalize(nickname).map(Nickname::new).transpose()?,
            email:      normalize(email).map(Email::new).transpose()?,
            country:    normalize(country),
            password:   normalize(password).map(PlainPassword::new).transpose()?,
        })
    }

    /// すべてのフィールドが未指定か判定する
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.nickname.is_none()
            && self.email.is_none()
            && self.country.is_none()
            && self.password.is_none()
    }
}
