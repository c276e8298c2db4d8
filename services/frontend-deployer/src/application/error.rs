/// アプリケーション層のエラー型
///
/// Create/Update経路のエラーはすべて`DeploymentError`にまとめ、
/// 表示文字列をそのままFAILED通知のReasonとして使う。
use thiserror::Error;

use crate::domain::PropertyError;
use crate::infrastructure::{
    AssetSourceError, CloudFrontOpsError, IdentityOpsError, ObjectStoreOpsError,
    ResponseSendError,
};

/// デプロイ（Create/Update）およびプロパティ取得のエラー
#[derive(Debug, Error)]
pub enum DeploymentError {
    /// 必須パラメータの欠落
    #[error(transparent)]
    MissingParameter(#[from] PropertyError),
    /// アセットの読み込み失敗
    #[error(transparent)]
    AssetRead(#[from] AssetSourceError),
    /// アップロード失敗（残りのアップロードは中止）
    #[error(transparent)]
    Upload(#[from] ObjectStoreOpsError),
    /// 無効化の参照文字列に使うアカウントIDの取得失敗
    #[error(transparent)]
    Identity(#[from] IdentityOpsError),
    /// キャッシュ無効化の失敗
    #[error(transparent)]
    Invalidation(#[from] CloudFrontOpsError),
}

/// バケット空化（Delete）のエラー
///
/// Delete経路では握りつぶしてSUCCESSを返すため、呼び出し元でログ出力のみ行う。
#[derive(Debug, Error)]
#[error("Bucket cleanup failed: {0}")]
pub struct CleanupError(#[from] pub ObjectStoreOpsError);

/// 完了通知の送信エラー（Lambdaランタイムまで伝播させる）
#[derive(Debug, Error)]
#[error("Failed to notify CloudFormation: {0}")]
pub struct NotificationError(#[from] pub ResponseSendError);
