//! アセット同期
//!
//! ローカルのアセットを全件アップロードし、最後に生成したconfig.jsをアップロードする。
//! 差分検出はせず、毎回すべて上書きする。ファイルは1件ずつ読んでアップロードし、
//! 最初に失敗した読み込みまたはアップロードで中断する。

use tracing::{debug, info};

use super::error::DeploymentError;
use crate::domain::{
    CONFIG_CONTENT_TYPE, CONFIG_FILE_NAME, ResourceProperties, is_static_asset, render_config_js,
};
use crate::infrastructure::{AssetSource, ObjectStoreOps};

/// 同期結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    /// アップロードした静的ファイル数（config.jsを除く）
    pub static_uploaded: usize,
    /// 対象外としてスキップしたファイル数
    pub skipped: usize,
}

impl SyncSummary {
    /// config.jsを含むアップロード総数
    pub fn total_uploaded(&self) -> usize {
        self.static_uploaded + 1
    }
}

/// アセット同期
pub struct AssetSynchronizer<S: ObjectStoreOps, A: AssetSource> {
    store: S,
    source: A,
    cache_control: String,
}

impl<S: ObjectStoreOps, A: AssetSource> AssetSynchronizer<S, A> {
    pub fn new(store: S, source: A, cache_control: impl Into<String>) -> Self {
        Self {
            store,
            source,
            cache_control: cache_control.into(),
        }
    }

    /// バケットへアセットとconfig.jsをアップロードする
    ///
    /// config.jsはI/Oの前に生成し、パラメータ欠落時はバケットに触れずに失敗する。
    pub async fn sync(
        &self,
        bucket: &str,
        props: &ResourceProperties,
    ) -> Result<SyncSummary, DeploymentError> {
        let config_js = render_config_js(props)?;
        let assets = self.source.list_assets().await?;

        let mut summary = SyncSummary::default();
        for asset in assets {
            if !is_static_asset(asset.file_name()) {
                debug!(key = %asset.key, "アップロード対象外のファイルをスキップ");
                summary.skipped += 1;
                continue;
            }

            let bytes = self.source.read_asset(&asset).await?;
            self.store
                .put_object(
                    bucket,
                    &asset.key,
                    bytes,
                    &asset.content_type,
                    &self.cache_control,
                )
                .await?;
            summary.static_uploaded += 1;
        }

        // 同名の静的ファイルがあっても生成物で必ず上書きする
        self.store
            .put_object(
                bucket,
                CONFIG_FILE_NAME,
                config_js.into_bytes(),
                CONFIG_CONTENT_TYPE,
                &self.cache_control,
            )
            .await?;

        info!(
            bucket = %bucket,
            static_uploaded = summary.static_uploaded,
            skipped = summary.skipped,
            "アセット同期完了"
        );
        Ok(summary)
    }
}
