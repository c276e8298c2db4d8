/// CloudFormationへの完了通知
///
/// ライフサイクルイベント1件につき必ず1件だけ生成し、ResponseURLへPUTする。
use std::collections::BTreeMap;

use serde::Serialize;

use super::lifecycle_event::LifecycleEvent;

/// 完了ステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResponseStatus {
    Success,
    Failed,
}

impl ResponseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseStatus::Success => "SUCCESS",
            ResponseStatus::Failed => "FAILED",
        }
    }
}

/// 完了通知のボディ
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CompletionResponse {
    pub status: ResponseStatus,
    pub reason: String,
    pub physical_resource_id: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    pub no_echo: bool,
    pub data: BTreeMap<String, String>,
}

impl CompletionResponse {
    /// イベントと実行コンテキストから完了通知を組み立てる
    ///
    /// - `reason`未指定時はログストリームへの案内文
    /// - `physical_id`未指定時はイベントのPhysicalResourceId、それも無ければログストリーム名
    pub fn for_event(
        event: &LifecycleEvent,
        log_stream_name: &str,
        status: ResponseStatus,
        data: BTreeMap<String, String>,
        reason: Option<String>,
        physical_id: Option<String>,
    ) -> Self {
        let reason =
            reason.unwrap_or_else(|| format!("See CloudWatch Log Stream: {}", log_stream_name));
        let physical_resource_id = physical_id
            .or_else(|| event.physical_resource_id.clone())
            .unwrap_or_else(|| log_stream_name.to_string());

        Self {
            status,
            reason,
            physical_resource_id,
            stack_id: event.stack_id.clone(),
            request_id: event.request_id.clone(),
            logical_resource_id: event.logical_resource_id.clone(),
            no_echo: false,
            data,
        }
    }

    /// JSONにシリアライズ
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    const LOG_STREAM: &str = "2026/10/16/[$LATEST]0123456789abcdef";

    fn event(physical_id: Option<&str>) -> LifecycleEvent {
        let mut value = json!({
            "RequestType": "Create",
            "ResponseURL": "https://example.com/response",
            "StackId": "stack-1",
            "RequestId": "req-1",
            "LogicalResourceId": "FrontendDeployment",
            "ResourceProperties": {}
        });
        if let Some(id) = physical_id {
            value["PhysicalResourceId"] = json!(id);
        }
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_defaults_reason_and_physical_id_to_log_stream() {
        let response = CompletionResponse::for_event(
            &event(None),
            LOG_STREAM,
            ResponseStatus::Success,
            BTreeMap::new(),
            None,
            None,
        );

        assert_eq!(
            response.reason,
            format!("See CloudWatch Log Stream: {}", LOG_STREAM)
        );
        assert_eq!(response.physical_resource_id, LOG_STREAM);
        assert_eq!(response.stack_id, "stack-1");
        assert_eq!(response.request_id, "req-1");
        assert_eq!(response.logical_resource_id, "FrontendDeployment");
        assert!(!response.no_echo);
    }

    #[test]
    fn test_event_physical_id_is_echoed() {
        let response = CompletionResponse::for_event(
            &event(Some("existing-id")),
            LOG_STREAM,
            ResponseStatus::Success,
            BTreeMap::new(),
            None,
            None,
        );

        assert_eq!(response.physical_resource_id, "existing-id");
    }

    #[test]
    fn test_explicit_values_take_precedence() {
        let response = CompletionResponse::for_event(
            &event(Some("existing-id")),
            LOG_STREAM,
            ResponseStatus::Failed,
            BTreeMap::new(),
            Some("boom".to_string()),
            Some("explicit-id".to_string()),
        );

        assert_eq!(response.reason, "boom");
        assert_eq!(response.physical_resource_id, "explicit-id");
    }

    #[test]
    fn test_json_shape() {
        let mut data = BTreeMap::new();
        data.insert("Message".to_string(), "Frontend deployed".to_string());
        let response = CompletionResponse::for_event(
            &event(None),
            LOG_STREAM,
            ResponseStatus::Success,
            data,
            None,
            None,
        );

        let value: Value = serde_json::from_slice(&response.to_json_bytes().unwrap()).unwrap();

        assert_eq!(value["Status"], "SUCCESS");
        assert_eq!(value["NoEcho"], false);
        assert_eq!(value["PhysicalResourceId"], LOG_STREAM);
        assert_eq!(value["StackId"], "stack-1");
        assert_eq!(value["RequestId"], "req-1");
        assert_eq!(value["LogicalResourceId"], "FrontendDeployment");
        assert_eq!(value["Data"]["Message"], "Frontend deployed");
        assert_eq!(value.as_object().unwrap().len(), 8);
    }

    #[test]
    fn test_failed_status_serialization() {
        assert_eq!(
            serde_json::to_value(ResponseStatus::Failed).unwrap(),
            json!("FAILED")
        );
        assert_eq!(ResponseStatus::Success.as_str(), "SUCCESS");
    }
}
