//! # チャネル通知
//!
//! ユーザーの作成・更新・削除イベントを外部チャネルへ通知する
//! インフラストラクチャモジュール。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `ChannelNotifier` trait で通知送信を抽象化
//! - **2 つの実装**: Webhook（HTTP POST）、Noop（ログ出力のみ）
//! - **環境変数切替**: `NOTIFICATION_BACKEND` でランタイム選択
//! - **ベストエフォート**: 呼び出し側は返されたエラーを無視してよい。
//!   通知の失敗がユーザー操作の成否に影響してはならない

mod noop;
mod webhook;

use async_trait::async_trait;
use derive_more::Display;
pub use noop::NoopChannelNotifier;
pub use webhook::WebhookChannelNotifier;

use crate::InfraError;

/// 通知イベントの種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Channel {
    /// ユーザー作成
    #[display("create")]
    Create,
    /// ユーザー更新
    #[display("update")]
    Update,
    /// ユーザー削除
    #[display("delete")]
    Delete,
}

/// チャネル通知トレイト
///
/// 通知基盤の中核。通知送信の具体的な方法を抽象化する。
/// Webhook / Noop の 2 実装を環境変数で切り替える。
#[async_trait]
pub trait ChannelNotifier: Send + Sync {
    /// イベントを通知する
    async fn notify(&self, channel: Channel, message: &str) -> Result<(), InfraError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channelのdisplay表現() {
        assert_eq!(Channel::Create.to_string(), "create");
        assert_eq!(Channel::Update.to_string(), "update");
        assert_eq!(Channel::Delete.to_string(), "delete");
    }
}
