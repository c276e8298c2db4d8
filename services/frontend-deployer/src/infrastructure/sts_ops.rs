//! STS操作モジュール
//!
//! 呼び出し元アカウントIDの取得（GetCallerIdentity）を提供する。

use async_trait::async_trait;
use aws_sdk_sts::Client as StsClient;
use aws_sdk_sts::error::DisplayErrorContext;
use thiserror::Error;
use tracing::{debug, warn};

/// STS操作のエラー型
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityOpsError {
    #[error("GetCallerIdentity failed: {0}")]
    AwsSdkError(String),
    #[error("GetCallerIdentity returned no account id")]
    MissingAccount,
}

/// アカウント情報取得トレイト（テスト用の抽象化）
#[async_trait]
pub trait IdentityOps: Send + Sync {
    /// 呼び出し元のAWSアカウントIDを取得する
    async fn account_id(&self) -> Result<String, IdentityOpsError>;
}

/// 実際のAWS STS SDKを使用した実装
#[derive(Debug, Clone)]
pub struct AwsStsOps {
    client: StsClient,
}

impl AwsStsOps {
    pub fn new(client: StsClient) -> Self {
        Self { client }
    }

    pub fn from_sdk_config(config: &aws_config::SdkConfig) -> Self {
        Self::new(StsClient::new(config))
    }
}

#[async_trait]
impl IdentityOps for AwsStsOps {
    async fn account_id(&self) -> Result<String, IdentityOpsError> {
        let output = self
            .client
            .get_caller_identity()
            .send()
            .await
            .map_err(|e| {
                warn!(error = %DisplayErrorContext(&e), "GetCallerIdentityエラー");
                IdentityOpsError::AwsSdkError(DisplayErrorContext(&e).to_string())
            })?;

        let account = output
            .account()
            .map(str::to_string)
            .ok_or(IdentityOpsError::MissingAccount)?;

        debug!(account = %account, "GetCallerIdentity成功");
        Ok(account)
    }
}
