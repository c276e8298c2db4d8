//! 完了通知
//!
//! CompletionResponseを組み立てて1回だけ送信する。送信失敗は呼び出し元へ返す。

use std::collections::BTreeMap;

use super::error::NotificationError;
use crate::domain::{CompletionResponse, LifecycleEvent, ResponseStatus};
use crate::infrastructure::ResponseSender;

/// 呼び出しごとの実行環境情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationContext {
    /// CloudWatch Logsのログストリーム名
    pub log_stream_name: String,
}

impl InvocationContext {
    pub fn new(log_stream_name: impl Into<String>) -> Self {
        Self {
            log_stream_name: log_stream_name.into(),
        }
    }
}

/// 完了通知の送信
pub struct ResponseNotifier<R: ResponseSender> {
    sender: R,
}

impl<R: ResponseSender> ResponseNotifier<R> {
    pub fn new(sender: R) -> Self {
        Self { sender }
    }

    /// 完了通知を送信し、送信した内容を返す
    pub async fn notify(
        &self,
        event: &LifecycleEvent,
        context: &InvocationContext,
        status: ResponseStatus,
        data: BTreeMap<String, String>,
        reason: Option<String>,
        physical_id: Option<String>,
    ) -> Result<CompletionResponse, NotificationError> {
        let response = CompletionResponse::for_event(
            event,
            &context.log_stream_name,
            status,
            data,
            reason,
            physical_id,
        );
        self.sender.send(&event.response_url, &response).await?;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::response_sender::tests::MockResponseSender;
    use serde_json::json;

    fn event() -> LifecycleEvent {
        serde_json::from_value(json!({
            "RequestType": "Create",
            "ResponseURL": "https://example.com/response?sig=1",
            "StackId": "stack-1",
            "RequestId": "req-1",
            "LogicalResourceId": "FrontendDeployment"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_notify_sends_to_response_url() {
        let sender = MockResponseSender::new();
        let notifier = ResponseNotifier::new(sender.clone());

        let response = notifier
            .notify(
                &event(),
                &InvocationContext::new("stream-1"),
                ResponseStatus::Success,
                BTreeMap::new(),
                None,
                None,
            )
            .await
            .unwrap();

        let sent = sender.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "https://example.com/response?sig=1");
        assert_eq!(sent[0].1, response);
        assert_eq!(response.physical_resource_id, "stream-1");
        assert_eq!(response.reason, "See CloudWatch Log Stream: stream-1");
    }

    #[tokio::test]
    async fn test_notify_propagates_send_failure() {
        let sender = MockResponseSender::failing();
        let notifier = ResponseNotifier::new(sender.clone());

        let result = notifier
            .notify(
                &event(),
                &InvocationContext::new("stream-1"),
                ResponseStatus::Failed,
                BTreeMap::new(),
                Some("boom".to_string()),
                None,
            )
            .await;

        assert!(result.is_err());
        assert_eq!(sender.sent().len(), 1);
    }
}
