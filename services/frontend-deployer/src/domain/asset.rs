/// 静的アセット
///
/// ローカルのアセットツリーを走査して得た1ファイル分の情報。中身はアップロード直前に読む。
/// 相対パスは常に`/`区切りで、S3のオブジェクトキーとしてそのまま使う。
use std::path::{Component, Path};

use super::frontend_config::CONFIG_FILE_NAME;

/// 拡張子から推定できない場合のContent-Type
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// アップロード対象のアセット
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRecord {
    /// アセットルートからの相対パス（`/`区切り）
    pub key: String,
    pub content_type: String,
}

impl AssetRecord {
    /// 相対パスからContent-Typeを推定して作成
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        let content_type = infer_content_type(&key);
        Self { key, content_type }
    }

    /// キー末尾のファイル名
    pub fn file_name(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or(&self.key)
    }
}

/// 静的ファイルとしてアップロードするファイル名か判定する
///
/// ドットで始まるファイルと、生成物で上書きされる`config.js`は除外する。
pub fn is_static_asset(file_name: &str) -> bool {
    !file_name.starts_with('.') && file_name != CONFIG_FILE_NAME
}

/// 拡張子からContent-Typeを推定する
pub fn infer_content_type(key: &str) -> String {
    mime_guess::from_path(key)
        .first_raw()
        .unwrap_or(FALLBACK_CONTENT_TYPE)
        .to_string()
}

/// アセットルートからの相対パスを`/`区切りのキーに変換する
///
/// ルート外のパスや非UTF-8のパスはNone。
pub fn relative_key(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            _ => return None,
        }
    }
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}
