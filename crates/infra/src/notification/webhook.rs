//! Webhook チャネル通知実装
//!
//! 設定された URL へイベントを JSON で POST する。
//! 送信は 1 秒でタイムアウトし、失敗は呼び出し側がベストエフォート方針で
//! 無視する前提。

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use super::{Channel, ChannelNotifier};
use crate::InfraError;

/// 通知送信のタイムアウト
const NOTIFY_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Serialize)]
struct WebhookPayload<'a> {
    channel: String,
    message: &'a str,
}

/// Webhook チャネル通知（HTTP POST）
#[derive(Debug, Clone)]
pub struct WebhookChannelNotifier {
    client:      reqwest::Client,
    webhook_url: String,
}

impl WebhookChannelNotifier {
    /// 通知クライアントを作成する
    ///
    /// # Errors
    ///
    /// HTTP クライアントの構築に失敗した場合
    pub fn new(webhook_url: impl Into<String>) -> Result<Self, InfraError> {
        let client = reqwest::Client::builder()
            .timeout(NOTIFY_TIMEOUT)
            .build()
            .map_err(|e| InfraError::notification(format!("HTTP クライアント構築に失敗: {e}")))?;

        Ok(Self {
            client,
            webhook_url: webhook_url.into(),
        })
    }
}

#[async_trait]
impl ChannelNotifier for WebhookChannelNotifier {
    async fn notify(&self, channel: Channel, message: &str) -> Result<(), InfraError> {
        let payload = WebhookPayload {
            channel: channel.to_string(),
            message,
        };

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| InfraError::notification(format!("通知送信に失敗: {e}")))?;

        if !response.status().is_success() {
            return Err(InfraError::notification(format!(
                "通知先がエラーを返却: {}",
                response.status()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InfraErrorKind;

    #[tokio::test]
    async fn test_接続できない通知先への送信はエラーを返す() {
        // ポートを確保して即座に閉じ、接続拒否される宛先を作る
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let notifier = WebhookChannelNotifier::new(format!("http://{addr}/hook")).unwrap();

        let result = notifier.notify(Channel::Delete, "user removed").await;

        let err = result.unwrap_err();
        assert!(matches!(err.kind(), InfraErrorKind::Notification(_)));
    }
}
