//! # インフラ層エラー定義
//!
//! データベースや外部サービスとの通信で発生するエラーを表現する。
//!
//! ## 設計方針
//!
//! - **エラーの変換**: sqlx::Error などをラップ
//! - **ドメインエラーとの分離**: インフラ固有のエラーを明示
//! - **SpanTrace 自動捕捉**: `From` 実装や convenience constructor で
//!   エラー生成時の呼び出し経路を自動記録する
//!
//! ## 構造
//!
//! `std::io::Error` と同じ struct + enum パターンを採用:
//! - [`InfraError`]: エラー種別（[`InfraErrorKind`]）と [`SpanTrace`] を保持するラッパー
//! - [`InfraErrorKind`]: エラーの具体的な種別（Database, DuplicateKey 等）

use std::fmt;

use derive_more::Display;
use thiserror::Error;
use tracing_error::SpanTrace;

/// PostgreSQL の一意制約違反エラーコード
const PG_UNIQUE_VIOLATION: &str = "23505";

/// インフラ層で発生するエラー
///
/// エラー種別（[`InfraErrorKind`]）と [`SpanTrace`]（呼び出し経路）を保持する。
/// `From<sqlx::Error>` 等の変換や convenience constructor でエラーを生成すると、
/// その時点のスパン情報が自動的にキャプチャされる。
///
/// ## パターンマッチ
///
/// エラー種別に応じた処理には [`kind()`](InfraError::kind) を使用する:
///
/// ```ignore
/// match error.kind() {
///     InfraErrorKind::DuplicateKey { constraint } => { /* 409 */ }
///     _ => { /* その他 */ }
/// }
/// ```
#[derive(Display)]
#[display("{kind}")]
pub struct InfraError {
    kind:       InfraErrorKind,
    span_trace: SpanTrace,
}

/// インフラ層エラーの種別
///
/// データベースクエリや外部サービス呼び出しで発生するエラーの具体的な種別。
/// API 層でこのエラー種別に応じて適切な HTTP レスポンスに変換する。
#[derive(Debug, Error)]
pub enum InfraErrorKind {
    /// データベースエラー
    ///
    /// SQL クエリの実行失敗、接続エラーなど。
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    /// 一意制約違反
    ///
    /// メールアドレスやニックネームが既存の行と重複した場合。
    /// API 層で 409 Conflict に変換される。
    #[error("duplicate key: {constraint}")]
    DuplicateKey {
        /// 違反した制約名（例: `email_uq`）
        constraint: String,
    },

    /// 対象の行が存在しない
    ///
    /// 更新・削除で影響行数が 0 だった場合。
    /// API 層で 404 Not Found に変換される。
    #[error("row not found")]
    RowNotFound,

    /// パスワードハッシュ処理エラー
    ///
    /// ハッシュの生成や解析に失敗した場合。
    #[error("password hashing error: {0}")]
    Password(String),

    /// 通知送信エラー
    ///
    /// 通知先への送信が失敗した場合。呼び出し側はベストエフォート方針で
    /// このエラーを無視してよい。
    #[error("notification error: {0}")]
    Notification(String),

    /// クライアント入力エラー
    ///
    /// インフラ層で検出されるが、原因はクライアント入力にある。
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// 予期しないエラー
    ///
    /// 上記に分類できない予期しないエラー。
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

// ===== InfraError のメソッド =====

impl InfraError {
    /// エラー種別を取得する
    pub fn kind(&self) -> &InfraErrorKind {
        &self.kind
    }

    /// SpanTrace を取得する
    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    // ===== Convenience constructors =====

    /// 一意制約違反エラーを生成する
    pub fn duplicate_key(constraint: impl Into<String>) -> Self {
        Self {
            kind:       InfraErrorKind::DuplicateKey {
                constraint: constraint.into(),
            },
            span_trace: SpanTrace::capture(),
        }
    }

    /// 対象行なしエラーを生成する
    pub fn row_not_found() -> Self {
        Self {
            kind:       InfraErrorKind::RowNotFound,
            span_trace: SpanTrace::capture(),
        }
    }

    /// パスワードハッシュ処理エラーを生成する
    pub fn password(msg: impl Into<String>) -> Self {
        Self {
            kind:       InfraErrorKind::Password(msg.into()),
            span_trace: SpanTrace::capture(),
        }
    }

    /// 通知送信エラーを生成する
    pub fn notification(msg: impl Into<String>) -> Self {
        Self {
            kind:       InfraErrorKind::Notification(msg.into()),
            span_trace: SpanTrace::capture(),
        }
    }

    /// クライアント入力エラーを生成する
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self {
            kind:       InfraErrorKind::InvalidInput(msg.into()),
            span_trace: SpanTrace::capture(),
        }
    }

    /// 予期しないエラーを生成する
    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self {
            kind:       InfraErrorKind::Unexpected(msg.into()),
            span_trace: SpanTrace::capture(),
        }
    }
}

// ===== トレイト実装 =====

impl fmt::Debug for InfraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfraError")
            .field("kind", &self.kind)
            .field("span_trace", &self.span_trace)
            .finish()
    }
}

impl std::error::Error for InfraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.kind.source()
    }
}

// ===== From 実装（SpanTrace 自動キャプチャ） =====

impl From<sqlx::Error> for InfraError {
    fn from(source: sqlx::Error) -> Self {
        let kind = match source {
            sqlx::Error::RowNotFound => InfraErrorKind::RowNotFound,
            sqlx::Error::Database(db_err) => {
                if db_err.code().as_deref() == Some(PG_UNIQUE_VIOLATION) {
                    InfraErrorKind::DuplicateKey {
                        constraint: db_err.constraint().unwrap_or("unknown").to_string(),
                    }
                } else {
                    InfraErrorKind::Database(sqlx::Error::Database(db_err))
                }
            }
            other => InfraErrorKind::Database(other),
        };
        Self {
            kind,
            span_trace: SpanTrace::capture(),
        }
    }
}

#[cfg(test)]
mod tests {
    use tracing_subscriber::layer::SubscriberExt as _;

    use super::*;

    /// テスト用に ErrorLayer 付き subscriber を設定する
    fn with_error_layer(f: impl FnOnce()) {
        let subscriber = tracing_subscriber::registry().with(tracing_error::ErrorLayer::default());
        let _guard = tracing::subscriber::set_default(subscriber);
        f();
    }

    // ===== From 実装のテスト =====

    #[test]
    fn test_from_sqlx_errorでspan_traceがキャプチャされる() {
        with_error_layer(|| {
            let span = tracing::info_span!("test_repo", user_id = "U-001");
            let _enter = span.enter();

            let sqlx_err = sqlx::Error::PoolTimedOut;
            let err: InfraError = sqlx_err.into();

            assert!(matches!(err.kind(), InfraErrorKind::Database(_)));
            let trace_str = format!("{}", err.span_trace());
            assert!(
                trace_str.contains("test_repo"),
                "SpanTrace がスパン名を含むこと: {trace_str}",
            );
        });
    }

    #[test]
    fn test_from_row_not_foundはrow_not_foundに変換される() {
        let err: InfraError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err.kind(), InfraErrorKind::RowNotFound));
    }

    // ===== Convenience constructor のテスト =====

    #[test]
    fn test_row_not_foundでspan_traceがキャプチャされる() {
        with_error_layer(|| {
            let span = tracing::info_span!("test_delete");
            let _enter = span.enter();

            let err = InfraError::row_not_found();

            assert!(matches!(err.kind(), InfraErrorKind::RowNotFound));
            let trace_str = format!("{}", err.span_trace());
            assert!(trace_str.contains("test_delete"));
        });
    }

    #[test]
    fn test_passwordエラーを生成できる() {
        let err = InfraError::password("hash parse failed");
        assert!(matches!(
            err.kind(),
            InfraErrorKind::Password(msg) if msg == "hash parse failed"
        ));
    }

    #[test]
    fn test_notificationエラーを生成できる() {
        let err = InfraError::notification("connection refused");
        assert!(matches!(
            err.kind(),
            InfraErrorKind::Notification(msg) if msg == "connection refused"
        ));
    }

    #[test]
    fn test_invalid_inputエラーを生成できる() {
        let err = InfraError::invalid_input("unsupported column");
        assert!(matches!(
            err.kind(),
            InfraErrorKind::InvalidInput(msg) if msg == "unsupported column"
        ));
    }

    #[test]
    fn test_unexpectedエラーを生成できる() {
        let err = InfraError::unexpected("broken row");
        assert!(matches!(
            err.kind(),
            InfraErrorKind::Unexpected(msg) if msg == "broken row"
        ));
    }

    // ===== Display / source のテスト =====

    #[test]
    fn test_displayがinfra_error_kindのメッセージを出力する() {
        let err = InfraError {
            kind:       InfraErrorKind::DuplicateKey {
                constraint: "email_uq".to_string(),
            },
            span_trace: SpanTrace::capture(),
        };
        assert_eq!(format!("{err}"), "duplicate key: email_uq");
    }

    #[test]
    fn test_sourceがinfra_error_kindに委譲する() {
        use std::error::Error;

        let err: InfraError = sqlx::Error::PoolTimedOut.into();

        // Database variant は sqlx::Error を source として持つ
        assert!(err.source().is_some());
    }
}
