// インフラストラクチャ層モジュール
pub mod asset_source;
pub mod cloudfront_ops;
pub mod config;
pub mod logging;
pub mod response_sender;
pub mod s3_ops;
pub mod sts_ops;

// 再エクスポート
pub use asset_source::{AssetSource, AssetSourceError, LocalAssetDirectory};
pub use cloudfront_ops::{AwsCloudFrontOps, CloudFrontOps, CloudFrontOpsError, InvalidationResult};
pub use config::{ConfigError, DEFAULT_CACHE_CONTROL, DeployerConfig};
pub use logging::init_logging;
pub use response_sender::{HttpResponseSender, ResponseSendError, ResponseSender};
pub use s3_ops::{
    AwsS3Ops, DeleteBatchResult, MAX_KEYS_PER_REQUEST, ObjectPage, ObjectStoreOps,
    ObjectStoreOpsError,
};
pub use sts_ops::{AwsStsOps, IdentityOps, IdentityOpsError};
