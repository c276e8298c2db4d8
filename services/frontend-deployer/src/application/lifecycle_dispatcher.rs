//! ライフサイクルイベントのディスパッチ
//!
//! リクエスト種別ごとに処理を振り分け、結果にかかわらず完了通知を1回だけ送る。
//!
//! | 種別 | 処理 | 通知 |
//! |------|------|------|
//! | Create / Update | アセット同期 → キャッシュ無効化 | 成功ならSUCCESS、失敗ならFAILED |
//! | Delete | バケットを空にする（失敗はログのみ） | 常にSUCCESS |
//! | その他 | 何もしない | SUCCESS |

use std::collections::BTreeMap;

use tracing::{Instrument, error, info, info_span, warn};

use super::asset_synchronizer::AssetSynchronizer;
use super::bulk_deleter::BulkDeleter;
use super::cache_invalidator::CacheInvalidator;
use super::error::{DeploymentError, NotificationError};
use super::response_notifier::{InvocationContext, ResponseNotifier};
use crate::domain::{CompletionResponse, LifecycleEvent, RequestType, ResponseStatus};
use crate::infrastructure::{
    AssetSource, CloudFrontOps, IdentityOps, ObjectStoreOps, ResponseSender,
};

pub const DATA_MESSAGE: &str = "Message";
pub const DATA_UPLOADED_COUNT: &str = "UploadedCount";
pub const DATA_INVALIDATION_ID: &str = "InvalidationId";

const MESSAGE_DEPLOYED: &str = "Frontend deployed";
const MESSAGE_CLEANED: &str = "Frontend cleaned";
const MESSAGE_NO_OP: &str = "No-op";

/// 処理成功時に通知へ載せるData
type DispatchOutcome = BTreeMap<String, String>;

/// ライフサイクルイベントのディスパッチャー
pub struct LifecycleDispatcher<S, A, C, I, R>
where
    S: ObjectStoreOps,
    A: AssetSource,
    C: CloudFrontOps,
    I: IdentityOps,
    R: ResponseSender,
{
    synchronizer: AssetSynchronizer<S, A>,
    cleaner: BulkDeleter<S>,
    invalidator: CacheInvalidator<C, I>,
    notifier: ResponseNotifier<R>,
}

impl<S, A, C, I, R> LifecycleDispatcher<S, A, C, I, R>
where
    S: ObjectStoreOps,
    A: AssetSource,
    C: CloudFrontOps,
    I: IdentityOps,
    R: ResponseSender,
{
    pub fn new(
        synchronizer: AssetSynchronizer<S, A>,
        cleaner: BulkDeleter<S>,
        invalidator: CacheInvalidator<C, I>,
        notifier: ResponseNotifier<R>,
    ) -> Self {
        Self {
            synchronizer,
            cleaner,
            invalidator,
            notifier,
        }
    }

    /// イベントを処理して完了通知を送る
    ///
    /// 処理の失敗はFAILED通知に変換する。Errを返すのは通知自体に失敗した場合のみ。
    pub async fn dispatch(
        &self,
        event: &LifecycleEvent,
        context: &InvocationContext,
    ) -> Result<CompletionResponse, NotificationError> {
        let request_type = event.request_type.map(|t| t.as_str()).unwrap_or("<missing>");
        let span = info_span!(
            "lifecycle_event",
            request_type = %request_type,
            request_id = %event.request_id,
            logical_resource_id = %event.logical_resource_id,
            stack_id = %event.stack_id,
        );

        async {
            let (status, data, reason) = match self.execute(event).await {
                Ok(data) => (ResponseStatus::Success, data, None),
                Err(err) => {
                    error!(error = %err, "ライフサイクルイベントの処理に失敗");
                    (ResponseStatus::Failed, BTreeMap::new(), Some(err.to_string()))
                }
            };

            let response = self
                .notifier
                .notify(event, context, status, data, reason, None)
                .await
                .inspect_err(|err| error!(error = %err, "完了通知の送信に失敗"))?;

            info!(
                status = %response.status.as_str(),
                physical_resource_id = %response.physical_resource_id,
                "完了通知を送信しました"
            );
            Ok(response)
        }
        .instrument(span)
        .await
    }

    async fn execute(&self, event: &LifecycleEvent) -> Result<DispatchOutcome, DeploymentError> {
        let request_type = event.request_type()?;
        let target = event.deployment_target()?;

        match request_type {
            RequestType::Create | RequestType::Update => {
                let summary = self
                    .synchronizer
                    .sync(&target.bucket, &event.resource_properties)
                    .await?;
                let invalidation = self.invalidator.invalidate(&target.distribution_id).await?;

                let mut data = outcome(MESSAGE_DEPLOYED);
                data.insert(
                    DATA_UPLOADED_COUNT.to_string(),
                    summary.total_uploaded().to_string(),
                );
                if let Some(id) = invalidation.invalidation_id {
                    data.insert(DATA_INVALIDATION_ID.to_string(), id);
                }
                Ok(data)
            }
            RequestType::Delete => {
                match self.cleaner.delete_all(&target.bucket).await {
                    Ok(summary) => info!(
                        bucket = %target.bucket,
                        deleted = summary.listed,
                        "Delete処理完了"
                    ),
                    // スタック削除を止めないため失敗はログのみ
                    Err(err) => warn!(
                        bucket = %target.bucket,
                        error = %err,
                        "バケットを空にできませんでした。SUCCESSとして通知します"
                    ),
                }
                Ok(outcome(MESSAGE_CLEANED))
            }
            RequestType::Unknown => {
                info!("未対応のリクエスト種別のため何もしません");
                Ok(outcome(MESSAGE_NO_OP))
            }
        }
    }
}

fn outcome(message: &str) -> DispatchOutcome {
    BTreeMap::from([(DATA_MESSAGE.to_string(), message.to_string())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::DEFAULT_CACHE_CONTROL;
    use crate::infrastructure::asset_source::tests::MockAssetSource;
    use crate::infrastructure::cloudfront_ops::tests::MockCloudFrontOps;
    use crate::infrastructure::logging::init_test_logging;
    use crate::infrastructure::response_sender::tests::MockResponseSender;
    use crate::infrastructure::s3_ops::tests::MockObjectStoreOps;
    use crate::infrastructure::sts_ops::tests::MockIdentityOps;
    use serde_json::{Value, json};

    type TestDispatcher = LifecycleDispatcher<
        MockObjectStoreOps,
        MockAssetSource,
        MockCloudFrontOps,
        MockIdentityOps,
        MockResponseSender,
    >;

    struct Fixture {
        store: MockObjectStoreOps,
        cloudfront: MockCloudFrontOps,
        sender: MockResponseSender,
        dispatcher: TestDispatcher,
    }

    fn fixture_with(
        store: MockObjectStoreOps,
        source: MockAssetSource,
        cloudfront: MockCloudFrontOps,
        identity: MockIdentityOps,
        sender: MockResponseSender,
    ) -> Fixture {
        init_test_logging();
        let dispatcher = LifecycleDispatcher::new(
            AssetSynchronizer::new(store.clone(), source, DEFAULT_CACHE_CONTROL),
            BulkDeleter::new(store.clone()),
            CacheInvalidator::new(cloudfront.clone(), identity),
            ResponseNotifier::new(sender.clone()),
        );
        Fixture {
            store,
            cloudfront,
            sender,
            dispatcher,
        }
    }

    fn fixture(store: MockObjectStoreOps) -> Fixture {
        fixture_with(
            store,
            MockAssetSource::new(vec![
                ("index.html", b"<html></html>".to_vec()),
                ("app.js", b"console.log(1)".to_vec()),
            ]),
            MockCloudFrontOps::new(),
            MockIdentityOps::new("123456789012"),
            MockResponseSender::new(),
        )
    }

    fn full_properties() -> Value {
        json!({
            "FrontendBucketName": "b",
            "CloudFrontDistributionId": "d",
            "Region": "us-east-1",
            "CloudFrontDomainName": "app.example.com",
            "CognitoDomainPrefix": "myapp",
            "UserPoolClientId": "abc123",
            "RestApiId": "xyz789"
        })
    }

    fn event(request_type: Option<&str>, properties: Value) -> LifecycleEvent {
        let mut value = json!({
            "ResponseURL": "https://cloudformation-custom-resource-response.s3.amazonaws.com/x?sig=1",
            "StackId": "arn:aws:cloudformation:us-east-1:123456789012:stack/app/1",
            "RequestId": "req-1",
            "LogicalResourceId": "FrontendDeployment",
            "ResourceProperties": properties
        });
        if let Some(request_type) = request_type {
            value["RequestType"] = json!(request_type);
        }
        serde_json::from_value(value).unwrap()
    }

    fn context() -> InvocationContext {
        InvocationContext::new("2026/10/16/[$LATEST]abcdef")
    }

    #[tokio::test]
    async fn test_create_deploys_and_invalidates() {
        let f = fixture(MockObjectStoreOps::new().with_bucket("b"));

        let response = f
            .dispatcher
            .dispatch(&event(Some("Create"), full_properties()), &context())
            .await
            .unwrap();

        assert_eq!(response.status, ResponseStatus::Success);
        assert_eq!(response.data.get("Message").unwrap(), "Frontend deployed");
        assert_eq!(response.data.get("UploadedCount").unwrap(), "3");
        assert_eq!(response.data.get("InvalidationId").unwrap(), "I2J0I21PCUYOIK");
        assert_eq!(response.physical_resource_id, "2026/10/16/[$LATEST]abcdef");

        let config = String::from_utf8(f.store.object("b", "config.js").unwrap().bytes).unwrap();
        assert!(config.contains(
            "apiBaseUrl: \"https://xyz789.execute-api.us-east-1.amazonaws.com/Prod\""
        ));

        let calls = f.cloudfront.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].distribution_id, "d");
        assert_eq!(calls[0].paths, vec!["/*".to_string()]);

        let sent = f.sender.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1.status, ResponseStatus::Success);
    }

    #[tokio::test]
    async fn test_update_behaves_like_create() {
        let f = fixture(MockObjectStoreOps::new().with_bucket("b"));
        let mut event = event(Some("Update"), full_properties());
        event.physical_resource_id = Some("previous-stream".to_string());

        let response = f.dispatcher.dispatch(&event, &context()).await.unwrap();

        assert_eq!(response.status, ResponseStatus::Success);
        assert_eq!(response.physical_resource_id, "previous-stream");
        assert_eq!(f.store.put_log(), vec!["index.html", "app.js", "config.js"]);
        assert_eq!(f.cloudfront.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_config_parameter_fails_without_side_effects() {
        let f = fixture(MockObjectStoreOps::new().with_bucket("b"));
        let mut properties = full_properties();
        properties.as_object_mut().unwrap().remove("RestApiId");

        let response = f
            .dispatcher
            .dispatch(&event(Some("Create"), properties), &context())
            .await
            .unwrap();

        assert_eq!(response.status, ResponseStatus::Failed);
        assert_eq!(response.reason, "Missing required parameter: RestApiId");
        assert!(response.data.is_empty());
        assert!(f.store.put_log().is_empty());
        assert!(f.cloudfront.calls().is_empty());
        assert_eq!(f.sender.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_upload_failure_skips_invalidation() {
        let f = fixture(
            MockObjectStoreOps::new()
                .with_bucket("b")
                .fail_put_on("app.js"),
        );

        let response = f
            .dispatcher
            .dispatch(&event(Some("Create"), full_properties()), &context())
            .await
            .unwrap();

        assert_eq!(response.status, ResponseStatus::Failed);
        assert!(response.reason.contains("app.js"));
        assert!(f.cloudfront.calls().is_empty());
        assert_eq!(f.sender.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_invalidation_failure_is_failed() {
        let f = fixture_with(
            MockObjectStoreOps::new().with_bucket("b"),
            MockAssetSource::new(Vec::new()),
            MockCloudFrontOps::new().failing_on("d"),
            MockIdentityOps::new("123456789012"),
            MockResponseSender::new(),
        );

        let response = f
            .dispatcher
            .dispatch(&event(Some("Create"), full_properties()), &context())
            .await
            .unwrap();

        assert_eq!(response.status, ResponseStatus::Failed);
        assert_eq!(f.store.put_log(), vec!["config.js"]);
    }

    #[tokio::test]
    async fn test_delete_empties_bucket() {
        let f = fixture(MockObjectStoreOps::new().with_objects("b", 2500));

        let response = f
            .dispatcher
            .dispatch(&event(Some("Delete"), full_properties()), &context())
            .await
            .unwrap();

        assert_eq!(response.status, ResponseStatus::Success);
        assert_eq!(response.data.get("Message").unwrap(), "Frontend cleaned");
        assert_eq!(f.store.object_count("b"), 0);
        assert_eq!(f.store.delete_batches(), vec![1000, 1000, 500]);
        assert!(f.store.put_log().is_empty());
        assert!(f.cloudfront.calls().is_empty());
    }

    #[tokio::test]
    async fn test_delete_of_missing_bucket_still_succeeds() {
        let f = fixture(MockObjectStoreOps::new());
        let properties = json!({
            "FrontendBucketName": "gone-bucket",
            "CloudFrontDistributionId": "d"
        });

        let response = f
            .dispatcher
            .dispatch(&event(Some("Delete"), properties), &context())
            .await
            .unwrap();

        assert_eq!(response.status, ResponseStatus::Success);
        assert_eq!(f.sender.sent().len(), 1);
        assert!(f.store.delete_batches().is_empty());
    }

    #[tokio::test]
    async fn test_delete_without_bucket_parameter_fails() {
        let f = fixture(MockObjectStoreOps::new().with_bucket("b"));

        let response = f
            .dispatcher
            .dispatch(
                &event(Some("Delete"), json!({"CloudFrontDistributionId": "d"})),
                &context(),
            )
            .await
            .unwrap();

        assert_eq!(response.status, ResponseStatus::Failed);
        assert_eq!(response.reason, "Missing required parameter: FrontendBucketName");
    }

    #[tokio::test]
    async fn test_unknown_request_type_is_no_op() {
        let f = fixture(MockObjectStoreOps::new().with_objects("b", 3));

        let response = f
            .dispatcher
            .dispatch(&event(Some("Rollback"), full_properties()), &context())
            .await
            .unwrap();

        assert_eq!(response.status, ResponseStatus::Success);
        assert_eq!(response.data.get("Message").unwrap(), "No-op");
        assert_eq!(f.store.object_count("b"), 3);
        assert!(f.store.put_log().is_empty());
        assert!(f.cloudfront.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_request_type_fails() {
        let f = fixture(MockObjectStoreOps::new().with_bucket("b"));

        let response = f
            .dispatcher
            .dispatch(&event(None, full_properties()), &context())
            .await
            .unwrap();

        assert_eq!(response.status, ResponseStatus::Failed);
        assert_eq!(response.reason, "Missing required parameter: RequestType");
    }

    #[tokio::test]
    async fn test_notification_failure_is_returned() {
        let f = fixture_with(
            MockObjectStoreOps::new().with_bucket("b"),
            MockAssetSource::new(Vec::new()),
            MockCloudFrontOps::new(),
            MockIdentityOps::new("123456789012"),
            MockResponseSender::failing(),
        );

        let result = f
            .dispatcher
            .dispatch(&event(Some("Create"), full_properties()), &context())
            .await;

        assert!(result.is_err());
        // 送信は1回のみで再試行しない
        assert_eq!(f.sender.sent().len(), 1);
    }
}
