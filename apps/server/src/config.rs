//! # サーバー設定
//!
//! 環境変数からユーザー管理サーバーの設定を読み込む。

use std::env;

/// ユーザー管理サーバーの設定
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// バインドアドレス
    pub host: String,
    /// HTTP API のポート番号
    pub http_port: u16,
    /// gRPC API のポート番号
    pub grpc_port: u16,
    /// データベース接続 URL
    pub database_url: String,
    /// 一覧 API の絞り込みに使用できるカラム名
    pub allowed_filters: Vec<String>,
    /// 通知設定
    pub notification: NotificationConfig,
}

/// 通知機能の設定
///
/// `NOTIFICATION_BACKEND` 環境変数で送信バックエンドを切り替える:
/// - `webhook`: 設定された URL へ HTTP POST で送信
/// - `noop`: 送信しない（ログ出力のみ）
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    /// 送信バックエンド（"webhook" | "noop"）
    pub backend:     String,
    /// 通知先 URL（backend=webhook の場合に必須）
    pub webhook_url: Option<String>,
}

impl ServerConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: env::var("HTTP_PORT")
                .expect("HTTP_PORT が設定されていません")
                .parse()
                .expect("HTTP_PORT は有効なポート番号である必要があります"),
            grpc_port: env::var("GRPC_PORT")
                .expect("GRPC_PORT が設定されていません")
                .parse()
                .expect("GRPC_PORT は有効なポート番号である必要があります"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL が設定されていません"),
            allowed_filters: parse_allowed_filters(
                &env::var("ALLOWED_FILTERS").unwrap_or_else(|_| "country".to_string()),
            ),
            notification: NotificationConfig::from_env(),
        })
    }
}

impl NotificationConfig {
    /// 環境変数から通知設定を読み込む
    fn from_env() -> Self {
        Self {
            backend:     env::var("NOTIFICATION_BACKEND").unwrap_or_else(|_| "noop".to_string()),
            webhook_url: env::var("NOTIFICATION_WEBHOOK_URL").ok(),
        }
    }
}

/// カンマ区切りの許可カラム指定を解析する
///
/// 前後の空白を除去し、空要素は無視する。
fn parse_allowed_filters(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
