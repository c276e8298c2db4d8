//! バケットの空化
//!
//! スタック削除時にバケット削除が失敗しないよう、全オブジェクトを削除する。
//! キーは1000件ずつDeleteObjects（Quietモード）に渡す。

use tracing::{info, warn};

use super::error::CleanupError;
use super::object_enumerator::ObjectKeyPager;
use crate::infrastructure::{MAX_KEYS_PER_REQUEST, ObjectStoreOps};

/// 空化処理の結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupSummary {
    /// 列挙したキー数
    pub listed: usize,
    /// DeleteObjectsの呼び出し回数
    pub batches: usize,
    /// S3がキー単位で報告したエラー
    pub key_errors: Vec<String>,
}

/// バケット内の全オブジェクトを削除する
pub struct BulkDeleter<S: ObjectStoreOps> {
    store: S,
}

impl<S: ObjectStoreOps> BulkDeleter<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// 全キーを列挙してからチャンク単位で削除する
    ///
    /// キー単位の削除失敗は検証せずログのみ。呼び出し自体の失敗はそのまま返す。
    pub async fn delete_all(&self, bucket: &str) -> Result<CleanupSummary, CleanupError> {
        let mut pager = ObjectKeyPager::new(&self.store, bucket);
        let keys = pager.collect_all().await?;

        let mut summary = CleanupSummary {
            listed: keys.len(),
            ..CleanupSummary::default()
        };

        for chunk in keys.chunks(MAX_KEYS_PER_REQUEST) {
            let result = self.store.delete_objects(bucket, chunk).await?;
            summary.batches += 1;
            summary.key_errors.extend(result.errors);
        }

        if summary.key_errors.is_empty() {
            info!(
                bucket = %bucket,
                listed = summary.listed,
                batches = summary.batches,
                pages = pager.pages_fetched(),
                "バケットを空にしました"
            );
        } else {
            warn!(
                bucket = %bucket,
                listed = summary.listed,
                batches = summary.batches,
                key_error_count = summary.key_errors.len(),
                first_error = %summary.key_errors[0],
                "一部のオブジェクトを削除できませんでした"
            );
        }

        Ok(summary)
    }
}
