// ドメイン層モジュール
pub mod asset;
pub mod completion_response;
pub mod frontend_config;
pub mod lifecycle_event;

// 再エクスポート
pub use asset::{AssetRecord, FALLBACK_CONTENT_TYPE, infer_content_type, is_static_asset};
pub use completion_response::{CompletionResponse, ResponseStatus};
pub use frontend_config::{
    CONFIG_CONTENT_TYPE, CONFIG_FILE_NAME, DEFAULT_STAGE_NAME, FrontendConfig, render_config_js,
};
pub use lifecycle_event::{
    DeploymentTarget, LifecycleEvent, PropertyError, RequestType, ResourceProperties,
};
