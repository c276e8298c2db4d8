/// CloudFormationカスタムリソースのライフサイクルイベント
///
/// オーケストレーター（CloudFormation）から届くCreate/Update/Deleteリクエストを表す。
/// 1回の呼び出しの間は不変として扱う。
use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// フロントエンド配置先バケット名のプロパティキー
pub const FRONTEND_BUCKET_NAME: &str = "FrontendBucketName";
/// CloudFrontディストリビューションIDのプロパティキー
pub const CLOUDFRONT_DISTRIBUTION_ID: &str = "CloudFrontDistributionId";

/// リソースプロパティ取得のエラー型
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
    /// 必須パラメータが欠落
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),
    /// パラメータが文字列ではない
    #[error("Parameter {0} must be a string")]
    InvalidParameter(String),
}

/// ライフサイクル種別
///
/// 未知の値は`Unknown`として受け付け、No-opとして成功応答する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum RequestType {
    Create,
    Update,
    Delete,
    #[serde(other)]
    Unknown,
}

impl RequestType {
    /// ログ出力用の名前
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::Create => "Create",
            RequestType::Update => "Update",
            RequestType::Delete => "Delete",
            RequestType::Unknown => "Unknown",
        }
    }
}

/// ResourcePropertiesマッピング
///
/// CloudFormationはServiceToken等の追加キーも渡すため、任意のキーを保持する。
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct ResourceProperties(BTreeMap<String, Value>);

impl ResourceProperties {
    /// 必須の文字列プロパティを取得
    pub fn require(&self, key: &str) -> Result<&str, PropertyError> {
        match self.0.get(key) {
            None | Some(Value::Null) => Err(PropertyError::MissingParameter(key.to_string())),
            Some(Value::String(value)) => Ok(value.as_str()),
            Some(_) => Err(PropertyError::InvalidParameter(key.to_string())),
        }
    }

    /// 任意の文字列プロパティを取得（未設定ならNone）
    pub fn optional(&self, key: &str) -> Result<Option<&str>, PropertyError> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(value)) => Ok(Some(value.as_str())),
            Some(_) => Err(PropertyError::InvalidParameter(key.to_string())),
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ResourceProperties {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), Value::String(v.into())))
                .collect(),
        )
    }
}

/// 配置対象（バケットとディストリビューション）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentTarget {
    pub bucket: String,
    pub distribution_id: String,
}

/// 受信したライフサイクルイベント
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LifecycleEvent {
    /// 欠落時はディスパッチ時にMissingParameterとして失敗させる
    #[serde(default)]
    pub request_type: Option<RequestType>,
    #[serde(default)]
    pub resource_properties: ResourceProperties,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    #[serde(rename = "ResponseURL")]
    pub response_url: String,
    /// Update/Deleteでのみ送られる
    #[serde(default)]
    pub physical_resource_id: Option<String>,
    #[serde(default)]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub service_token: Option<String>,
}

impl LifecycleEvent {
    /// リクエスト種別を取得
    pub fn request_type(&self) -> Result<RequestType, PropertyError> {
        self.request_type
            .ok_or_else(|| PropertyError::MissingParameter("RequestType".to_string()))
    }

    /// バケット名とディストリビューションIDを取得
    pub fn deployment_target(&self) -> Result<DeploymentTarget, PropertyError> {
        let bucket = self.resource_properties.require(FRONTEND_BUCKET_NAME)?;
        let distribution_id = self.resource_properties.require(CLOUDFRONT_DISTRIBUTION_ID)?;
        Ok(DeploymentTarget {
            bucket: bucket.to_string(),
            distribution_id: distribution_id.to_string(),
        })
    }
}
