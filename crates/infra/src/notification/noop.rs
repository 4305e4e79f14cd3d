//! Noop チャネル通知実装
//!
//! 通知を実際に送信せず、ログ出力のみ行う。
//! テスト環境や通知無効化時に使用する。

use async_trait::async_trait;

use super::{Channel, ChannelNotifier};
use crate::InfraError;

/// Noop チャネル通知（ログ出力のみ）
#[derive(Debug, Clone)]
pub struct NoopChannelNotifier;

#[async_trait]
impl ChannelNotifier for NoopChannelNotifier {
    async fn notify(&self, channel: Channel, message: &str) -> Result<(), InfraError> {
        tracing::info!(
            channel = %channel,
            message = %message,
            "Noop: チャネル通知をスキップ"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_notifyがエラーを返さない() {
        let notifier = NoopChannelNotifier;

        let result = notifier
            .notify(Channel::Create, "user ada.lovelace created")
            .await;

        assert!(result.is_ok());
    }
}
