/// デプロイヤー設定
///
/// 環境変数からアセットディレクトリとCache-Controlを読み込む。
/// - FRONTEND_ASSET_DIR: アセットルート（任意）
/// - LAMBDA_TASK_ROOT: 未指定時は`$LAMBDA_TASK_ROOT/frontend`
/// - FRONTEND_CACHE_CONTROL: アップロード時のCache-Control（任意）
use std::path::{Path, PathBuf};

use thiserror::Error;

/// アセットルートを上書きする環境変数
pub const ASSET_DIR_ENV: &str = "FRONTEND_ASSET_DIR";
/// Lambdaのデプロイパッケージ展開先
pub const LAMBDA_TASK_ROOT_ENV: &str = "LAMBDA_TASK_ROOT";
/// Cache-Controlを上書きする環境変数
pub const CACHE_CONTROL_ENV: &str = "FRONTEND_CACHE_CONTROL";

/// ハンドラー配置場所からのアセットディレクトリ名
pub const ASSET_DIR_NAME: &str = "frontend";

/// 反復中の変更をすぐ反映させるため短くしている
pub const DEFAULT_CACHE_CONTROL: &str = "max-age=60";

/// 設定のエラー型
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unable to determine the frontend asset directory: {0}")]
    AssetRootUnavailable(String),
}

/// デプロイヤー設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployerConfig {
    asset_root: PathBuf,
    cache_control: String,
}

impl DeployerConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        let asset_root = match std::env::var(ASSET_DIR_ENV) {
            Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => match std::env::var(LAMBDA_TASK_ROOT_ENV) {
                Ok(root) if !root.trim().is_empty() => Path::new(&root).join(ASSET_DIR_NAME),
                _ => Self::executable_dir()?.join(ASSET_DIR_NAME),
            },
        };

        let cache_control = std::env::var(CACHE_CONTROL_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CACHE_CONTROL.to_string());

        Ok(Self {
            asset_root,
            cache_control,
        })
    }

    /// 明示的な値で設定を作成（テスト用）
    #[cfg(test)]
    pub fn new(asset_root: impl Into<PathBuf>, cache_control: impl Into<String>) -> Self {
        Self {
            asset_root: asset_root.into(),
            cache_control: cache_control.into(),
        }
    }

    fn executable_dir() -> Result<PathBuf, ConfigError> {
        let exe = std::env::current_exe()
            .map_err(|e| ConfigError::AssetRootUnavailable(e.to_string()))?;
        exe.parent().map(Path::to_path_buf).ok_or_else(|| {
            ConfigError::AssetRootUnavailable(format!("{} has no parent", exe.display()))
        })
    }

    /// アセットルートを取得
    pub fn asset_root(&self) -> &Path {
        &self.asset_root
    }

    /// Cache-Controlを取得
    pub fn cache_control(&self) -> &str {
        &self.cache_control
    }
}
