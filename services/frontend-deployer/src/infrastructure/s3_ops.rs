//! S3操作モジュール
//!
//! フロントエンドバケットに対する操作を提供する。
//! - オブジェクト一覧のページ取得（ListObjectsV2）
//! - オブジェクトのアップロード（PutObject）
//! - オブジェクトの一括削除（DeleteObjects、Quietモード）

use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use thiserror::Error;
use tracing::{debug, info, warn};

/// ListObjectsV2/DeleteObjectsで扱える最大キー数（S3 APIの上限）
pub const MAX_KEYS_PER_REQUEST: usize = 1000;

/// S3操作のエラー型
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjectStoreOpsError {
    /// 一覧取得の失敗
    #[error("Failed to list objects in bucket {bucket}: {message}")]
    ListFailed { bucket: String, message: String },
    /// アップロードの失敗
    #[error("Failed to upload {key} to bucket {bucket}: {message}")]
    UploadFailed {
        bucket: String,
        key: String,
        message: String,
    },
    /// 一括削除の失敗
    #[error("Failed to delete objects in bucket {bucket}: {message}")]
    DeleteFailed { bucket: String, message: String },
    /// リクエスト構築の失敗
    #[error("Failed to build S3 request: {0}")]
    RequestBuildError(String),
}

/// 一覧取得の1ページ分
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectPage {
    pub keys: Vec<String>,
    /// 続きがある場合のみSome
    pub next_continuation_token: Option<String>,
}

/// 一括削除1回分の結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteBatchResult {
    /// 削除要求したキー数
    pub requested: usize,
    /// S3がキー単位で報告したエラー（"key: message"形式）
    pub errors: Vec<String>,
}

/// S3操作トレイト（テスト用の抽象化）
#[async_trait]
pub trait ObjectStoreOps: Send + Sync {
    /// オブジェクト一覧を1ページ取得する
    ///
    /// # 引数
    /// * `bucket` - バケット名
    /// * `continuation_token` - 前ページが返した継続トークン（初回はNone）
    /// * `max_keys` - 1ページの最大キー数
    async fn list_objects_page(
        &self,
        bucket: &str,
        continuation_token: Option<&str>,
        max_keys: usize,
    ) -> Result<ObjectPage, ObjectStoreOpsError>;

    /// オブジェクトをアップロードする（既存は上書き）
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
        cache_control: &str,
    ) -> Result<(), ObjectStoreOpsError>;

    /// 最大1000件のキーをQuietモードで一括削除する
    async fn delete_objects(
        &self,
        bucket: &str,
        keys: &[String],
    ) -> Result<DeleteBatchResult, ObjectStoreOpsError>;
}

/// 実際のAWS S3 SDKを使用したS3操作実装
#[derive(Debug, Clone)]
pub struct AwsS3Ops {
    client: S3Client,
}

impl AwsS3Ops {
    pub fn new(client: S3Client) -> Self {
        Self { client }
    }

    /// AWS設定からクライアントを作成
    pub fn from_sdk_config(config: &aws_config::SdkConfig) -> Self {
        Self::new(S3Client::new(config))
    }
}

#[async_trait]
impl ObjectStoreOps for AwsS3Ops {
    async fn list_objects_page(
        &self,
        bucket: &str,
        continuation_token: Option<&str>,
        max_keys: usize,
    ) -> Result<ObjectPage, ObjectStoreOpsError> {
        let max_keys = max_keys.min(MAX_KEYS_PER_REQUEST) as i32;

        let output = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .max_keys(max_keys)
            .set_continuation_token(continuation_token.map(str::to_string))
            .send()
            .await
            .map_err(|e| {
                warn!(bucket = %bucket, error = %DisplayErrorContext(&e), "ListObjectsV2エラー");
                ObjectStoreOpsError::ListFailed {
                    bucket: bucket.to_string(),
                    message: DisplayErrorContext(&e).to_string(),
                }
            })?;

        let keys: Vec<String> = output
            .contents()
            .iter()
            .filter_map(|object| object.key().map(str::to_string))
            .collect();

        // IsTruncatedがtrueの場合のみ継続トークンを採用
        let next_continuation_token = if output.is_truncated().unwrap_or(false) {
            output.next_continuation_token().map(str::to_string)
        } else {
            None
        };

        debug!(
            bucket = %bucket,
            key_count = keys.len(),
            truncated = next_continuation_token.is_some(),
            "ListObjectsV2成功"
        );

        Ok(ObjectPage {
            keys,
            next_continuation_token,
        })
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
        cache_control: &str,
    ) -> Result<(), ObjectStoreOpsError> {
        let size = body.len();

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .cache_control(cache_control)
            .send()
            .await
            .map_err(|e| {
                warn!(bucket = %bucket, key = %key, error = %DisplayErrorContext(&e), "PutObjectエラー");
                ObjectStoreOpsError::UploadFailed {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                    message: DisplayErrorContext(&e).to_string(),
                }
            })?;

        debug!(
            bucket = %bucket,
            key = %key,
            content_type = %content_type,
            size = size,
            "PutObject成功"
        );
        Ok(())
    }

    async fn delete_objects(
        &self,
        bucket: &str,
        keys: &[String],
    ) -> Result<DeleteBatchResult, ObjectStoreOpsError> {
        let objects = keys
            .iter()
            .map(|key| ObjectIdentifier::builder().key(key).build())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ObjectStoreOpsError::RequestBuildError(e.to_string()))?;

        let delete = Delete::builder()
            .set_objects(Some(objects))
            .quiet(true)
            .build()
            .map_err(|e| ObjectStoreOpsError::RequestBuildError(e.to_string()))?;

        let output = self
            .client
            .delete_objects()
            .bucket(bucket)
            .delete(delete)
            .send()
            .await
            .map_err(|e| {
                warn!(bucket = %bucket, error = %DisplayErrorContext(&e), "DeleteObjectsエラー");
                ObjectStoreOpsError::DeleteFailed {
                    bucket: bucket.to_string(),
                    message: DisplayErrorContext(&e).to_string(),
                }
            })?;

        // Quietモードでは失敗したキーのみが返る
        let errors: Vec<String> = output
            .errors()
            .iter()
            .map(|error| {
                format!(
                    "{}: {}",
                    error.key().unwrap_or("(unknown)"),
                    error.message().unwrap_or("(no message)")
                )
            })
            .collect();

        info!(
            bucket = %bucket,
            requested = keys.len(),
            error_count = errors.len(),
            "DeleteObjects完了"
        );

        Ok(DeleteBatchResult {
            requested: keys.len(),
            errors,
        })
    }
}
