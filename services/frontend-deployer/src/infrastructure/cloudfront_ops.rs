//! CloudFront操作モジュール
//!
//! デプロイ後のキャッシュ無効化（CreateInvalidation）を提供する。
//! 無効化の完了は待たない。

use async_trait::async_trait;
use aws_sdk_cloudfront::Client as CloudFrontClient;
use aws_sdk_cloudfront::error::DisplayErrorContext;
use aws_sdk_cloudfront::types::{InvalidationBatch, Paths};
use thiserror::Error;
use tracing::{info, warn};

/// CloudFront操作のエラー型
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CloudFrontOpsError {
    /// AWS SDK エラー
    #[error("CloudFront invalidation failed for distribution {distribution_id}: {message}")]
    AwsSdkError {
        distribution_id: String,
        message: String,
    },
    /// リクエスト構築エラー
    #[error("Failed to build CloudFront invalidation request: {0}")]
    RequestBuildError(String),
}

/// キャッシュ無効化の作成結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidationResult {
    pub distribution_id: String,
    /// CloudFrontが払い出した無効化ID
    pub invalidation_id: Option<String>,
    /// 作成時点のステータス（通常はInProgress）
    pub status: Option<String>,
}

/// CloudFront操作トレイト（テスト用の抽象化）
#[async_trait]
pub trait CloudFrontOps: Send + Sync {
    /// キャッシュ無効化を作成する
    ///
    /// # 引数
    /// * `distribution_id` - CloudFrontディストリビューションID
    /// * `caller_reference` - リクエストごとに一意な参照文字列
    /// * `paths` - 無効化するパス
    async fn create_invalidation(
        &self,
        distribution_id: &str,
        caller_reference: &str,
        paths: &[&str],
    ) -> Result<InvalidationResult, CloudFrontOpsError>;
}

/// 実際のAWS CloudFront SDKを使用したCloudFront操作実装
#[derive(Debug, Clone)]
pub struct AwsCloudFrontOps {
    client: CloudFrontClient,
}

impl AwsCloudFrontOps {
    pub fn new(client: CloudFrontClient) -> Self {
        Self { client }
    }

    /// AWS設定からクライアントを作成
    pub fn from_sdk_config(config: &aws_config::SdkConfig) -> Self {
        Self::new(CloudFrontClient::new(config))
    }
}

#[async_trait]
impl CloudFrontOps for AwsCloudFrontOps {
    async fn create_invalidation(
        &self,
        distribution_id: &str,
        caller_reference: &str,
        paths: &[&str],
    ) -> Result<InvalidationResult, CloudFrontOpsError> {
        info!(
            distribution_id = %distribution_id,
            caller_reference = %caller_reference,
            paths = ?paths,
            "CloudFrontキャッシュ無効化開始"
        );

        let paths = Paths::builder()
            .quantity(paths.len() as i32)
            .set_items(Some(paths.iter().map(|p| p.to_string()).collect()))
            .build()
            .map_err(|e| CloudFrontOpsError::RequestBuildError(e.to_string()))?;

        let batch = InvalidationBatch::builder()
            .paths(paths)
            .caller_reference(caller_reference)
            .build()
            .map_err(|e| CloudFrontOpsError::RequestBuildError(e.to_string()))?;

        let output = self
            .client
            .create_invalidation()
            .distribution_id(distribution_id)
            .invalidation_batch(batch)
            .send()
            .await
            .map_err(|e| {
                warn!(
                    distribution_id = %distribution_id,
                    error = %DisplayErrorContext(&e),
                    "CreateInvalidationエラー"
                );
                CloudFrontOpsError::AwsSdkError {
                    distribution_id: distribution_id.to_string(),
                    message: DisplayErrorContext(&e).to_string(),
                }
            })?;

        let invalidation = output.invalidation();
        let result = InvalidationResult {
            distribution_id: distribution_id.to_string(),
            invalidation_id: invalidation.map(|i| i.id().to_string()),
            status: invalidation.map(|i| i.status().to_string()),
        };

        info!(
            distribution_id = %distribution_id,
            invalidation_id = ?result.invalidation_id,
            status = ?result.status,
            "CreateInvalidation成功"
        );
        Ok(result)
    }
}
