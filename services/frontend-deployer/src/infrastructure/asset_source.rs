//! ローカルアセットツリーの読み込み
//!
//! Lambdaパッケージに同梱されたフロントエンドのディレクトリを再帰的に走査し、
//! 全ファイルを`AssetRecord`として返す。アップロード対象の選別は同期側で行う。
//! ファイルの中身は`read_asset`で1件ずつ読む。

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::asset::{AssetRecord, relative_key};

/// アセット読み込みのエラー型
#[derive(Debug, Error)]
pub enum AssetSourceError {
    #[error("Failed to read asset {path}: {message}")]
    ReadError { path: String, message: String },
}

impl AssetSourceError {
    fn read(path: &Path, error: std::io::Error) -> Self {
        AssetSourceError::ReadError {
            path: path.display().to_string(),
            message: error.to_string(),
        }
    }
}

/// アセット供給トレイト（テスト用の抽象化）
#[async_trait]
pub trait AssetSource: Send + Sync {
    /// アセットルート配下の全ファイルを列挙する（キー順）
    async fn list_assets(&self) -> Result<Vec<AssetRecord>, AssetSourceError>;

    /// 1ファイル分の中身を読み込む
    async fn read_asset(&self, asset: &AssetRecord) -> Result<Vec<u8>, AssetSourceError>;
}

/// ローカルディレクトリをアセットルートとする実装
#[derive(Debug, Clone)]
pub struct LocalAssetDirectory {
    root: PathBuf,
}

impl LocalAssetDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// シンボリックリンクがディレクトリを指しているか
    ///
    /// リンク切れはファイル扱い（読み込み時にエラーになる）。
    async fn links_to_dir(path: &Path) -> bool {
        tokio::fs::metadata(path)
            .await
            .map(|metadata| metadata.is_dir())
            .unwrap_or(false)
    }
}

#[async_trait]
impl AssetSource for LocalAssetDirectory {
    async fn list_assets(&self) -> Result<Vec<AssetRecord>, AssetSourceError> {
        if tokio::fs::metadata(&self.root).await.is_err() {
            warn!(root = %self.root.display(), "アセットディレクトリが存在しません");
            return Ok(Vec::new());
        }

        let mut assets = Vec::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&dir)
                .await
                .map_err(|e| AssetSourceError::read(&dir, e))?;

            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| AssetSourceError::read(&dir, e))?
            {
                let path = entry.path();
                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|e| AssetSourceError::read(&path, e))?;

                if file_type.is_dir() {
                    pending.push(path);
                    continue;
                }
                // ディレクトリへのリンクは辿らない（ファイルへのリンクは対象）
                if file_type.is_symlink() && Self::links_to_dir(&path).await {
                    debug!(path = %path.display(), "ディレクトリへのシンボリックリンクをスキップ");
                    continue;
                }

                let Some(key) = relative_key(&self.root, &path) else {
                    warn!(path = %path.display(), "キーに変換できないファイルをスキップ");
                    continue;
                };
                assets.push(AssetRecord::new(key));
            }
        }

        assets.sort_by(|a, b| a.key.cmp(&b.key));
        debug!(root = %self.root.display(), asset_count = assets.len(), "アセット列挙完了");
        Ok(assets)
    }

    async fn read_asset(&self, asset: &AssetRecord) -> Result<Vec<u8>, AssetSourceError> {
        let path = asset
            .key
            .split('/')
            .fold(self.root.clone(), |path, part| path.join(part));
        tokio::fs::read(&path)
            .await
            .map_err(|e| AssetSourceError::read(&path, e))
    }
}
