//! CloudFrontキャッシュ無効化
//!
//! 生成したconfig.jsを含む全アセットを再取得させるため`/*`を無効化する。

use tracing::info;

use super::error::DeploymentError;
use crate::infrastructure::{CloudFrontOps, IdentityOps, InvalidationResult};

/// 全パスを対象とする無効化パス
pub const INVALIDATION_PATH: &str = "/*";

/// CallerReferenceに付与する乱数のバイト数
const CALLER_REFERENCE_RANDOM_BYTES: usize = 8;

/// アカウントIDと乱数からCallerReferenceを生成する
///
/// 形式: `<account id>-<16桁の16進数>`
pub fn caller_reference(account_id: &str) -> String {
    let random: [u8; CALLER_REFERENCE_RANDOM_BYTES] = rand::random();
    let suffix: String = random.iter().map(|b| format!("{:02x}", b)).collect();
    format!("{}-{}", account_id, suffix)
}

/// キャッシュ無効化
pub struct CacheInvalidator<C: CloudFrontOps, I: IdentityOps> {
    cloudfront: C,
    identity: I,
}

impl<C: CloudFrontOps, I: IdentityOps> CacheInvalidator<C, I> {
    pub fn new(cloudfront: C, identity: I) -> Self {
        Self {
            cloudfront,
            identity,
        }
    }

    /// ディストリビューション全体を無効化する（完了は待たない）
    pub async fn invalidate(
        &self,
        distribution_id: &str,
    ) -> Result<InvalidationResult, DeploymentError> {
        let account_id = self.identity.account_id().await?;
        let reference = caller_reference(&account_id);

        let result = self
            .cloudfront
            .create_invalidation(distribution_id, &reference, &[INVALIDATION_PATH])
            .await?;

        info!(
            distribution_id = %distribution_id,
            invalidation_id = ?result.invalidation_id,
            "キャッシュ無効化を作成しました"
        );
        Ok(result)
    }
}
