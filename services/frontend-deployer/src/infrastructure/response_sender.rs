// ResponseSender - CloudFormation完了通知の送信
//
// ResponseURL（署名付きS3 URL）へ完了通知をPUTする。
// 署名付きURLはContent-Typeも署名対象のため、content-typeは空文字で送る。
// 再試行はしない。

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use thiserror::Error;
use tracing::{error, info};
use url::Url;

use crate::domain::CompletionResponse;

/// 完了通知送信のエラー型
#[derive(Debug, Error)]
pub enum ResponseSendError {
    /// ResponseURLが不正
    #[error("Invalid ResponseURL: {0}")]
    InvalidUrl(String),
    /// シリアライズエラー
    #[error("Failed to serialize completion response: {0}")]
    SerializationError(String),
    /// 送信エラー
    #[error("Failed to send completion response: {0}")]
    NetworkError(String),
    /// 2xx以外の応答
    #[error("Completion response rejected: status={status}, body={body}")]
    UnexpectedStatus { status: u16, body: String },
    /// HTTPクライアント構築エラー
    #[error("Failed to build HTTP client: {0}")]
    ClientBuildError(String),
}

/// 完了通知送信トレイト（テスト用の抽象化）
#[async_trait]
pub trait ResponseSender: Send + Sync {
    /// 完了通知をResponseURLへPUTする
    async fn send(
        &self,
        response_url: &str,
        response: &CompletionResponse,
    ) -> Result<(), ResponseSendError>;
}

/// ログ出力用に署名クエリを除いたURLを返す
pub fn redact_url(url: &Url) -> String {
    format!(
        "{}://{}{}",
        url.scheme(),
        url.host_str().unwrap_or(""),
        url.path()
    )
}

/// reqwestを使用した完了通知の送信
#[derive(Debug, Clone)]
pub struct HttpResponseSender {
    client: Client,
}

impl HttpResponseSender {
    pub fn new() -> Result<Self, ResponseSendError> {
        let client = Client::builder()
            .build()
            .map_err(|e| ResponseSendError::ClientBuildError(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ResponseSender for HttpResponseSender {
    async fn send(
        &self,
        response_url: &str,
        response: &CompletionResponse,
    ) -> Result<(), ResponseSendError> {
        let url =
            Url::parse(response_url).map_err(|e| ResponseSendError::InvalidUrl(e.to_string()))?;
        let target = redact_url(&url);

        let body = response
            .to_json_bytes()
            .map_err(|e| ResponseSendError::SerializationError(e.to_string()))?;
        let content_length = body.len();

        info!(
            target_url = %target,
            status = response.status.as_str(),
            request_id = %response.request_id,
            content_length = content_length,
            "完了通知を送信"
        );

        let http_response = self
            .client
            .put(url)
            .header(CONTENT_TYPE, "")
            .header(CONTENT_LENGTH, content_length)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                error!(target_url = %target, error = %e, "完了通知の送信に失敗");
                ResponseSendError::NetworkError(e.without_url().to_string())
            })?;

        let status = http_response.status();
        if status.is_success() {
            info!(target_url = %target, http_status = %status, "完了通知の送信に成功");
            return Ok(());
        }

        let body = http_response.text().await.unwrap_or_default();
        error!(target_url = %target, http_status = %status, body = %body, "完了通知が拒否された");
        Err(ResponseSendError::UnexpectedStatus {
            status: status.as_u16(),
            body,
        })
    }
}
