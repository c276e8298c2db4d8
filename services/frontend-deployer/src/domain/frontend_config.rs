//! フロントエンド実行時設定（config.js）の生成
//!
//! スタックパラメータから`window.CLOUDOPS_CONFIG`を代入するスクリプトを組み立てる。
//! 4つのキー（cognitoDomain / clientId / redirectUri / apiBaseUrl）は
//! フロントエンドのコードがそのまま参照するため変更しないこと。

use super::lifecycle_event::{PropertyError, ResourceProperties};

/// 生成した設定ファイルのオブジェクトキー
pub const CONFIG_FILE_NAME: &str = "config.js";

/// 生成した設定ファイルのContent-Type
pub const CONFIG_CONTENT_TYPE: &str = "application/javascript";

/// StageName未指定時のステージ
pub const DEFAULT_STAGE_NAME: &str = "Prod";

/// config.jsに書き出す設定値
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontendConfig {
    pub cognito_domain: String,
    pub client_id: String,
    pub redirect_uri: String,
    pub api_base_url: String,
}

impl FrontendConfig {
    /// ResourcePropertiesから設定値を組み立てる
    ///
    /// # エラー
    /// 必須パラメータが欠落している場合は`PropertyError::MissingParameter`
    pub fn from_properties(props: &ResourceProperties) -> Result<Self, PropertyError> {
        let region = props.require("Region")?;
        let cloudfront_domain = props.require("CloudFrontDomainName")?;
        let domain_prefix = props.require("CognitoDomainPrefix")?;
        let client_id = props.require("UserPoolClientId")?;
        let api_id = props.require("RestApiId")?;
        let stage = props.optional("StageName")?.unwrap_or(DEFAULT_STAGE_NAME);

        Ok(Self {
            cognito_domain: format!("https://{}.auth.{}.amazoncognito.com", domain_prefix, region),
            client_id: client_id.to_string(),
            redirect_uri: format!("https://{}/callback", cloudfront_domain),
            api_base_url: format!(
                "https://{}.execute-api.{}.amazonaws.com/{}",
                api_id, region, stage
            ),
        })
    }

    /// config.jsの内容を出力
    pub fn render(&self) -> String {
        format!(
            "window.CLOUDOPS_CONFIG = {{\n  cognitoDomain: \"{}\",\n  clientId: \"{}\",\n  redirectUri: \"{}\",\n  apiBaseUrl: \"{}\"\n}};\n",
            self.cognito_domain, self.client_id, self.redirect_uri, self.api_base_url
        )
    }
}

/// ResourcePropertiesから直接config.jsを生成する
pub fn render_config_js(props: &ResourceProperties) -> Result<String, PropertyError> {
    FrontendConfig::from_properties(props).map(|config| config.render())
}
