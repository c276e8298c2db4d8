// アプリケーション層モジュール
pub mod asset_synchronizer;
pub mod bulk_deleter;
pub mod cache_invalidator;
pub mod error;
pub mod lifecycle_dispatcher;
pub mod object_enumerator;
pub mod response_notifier;

// 再エクスポート
pub use asset_synchronizer::{AssetSynchronizer, SyncSummary};
pub use bulk_deleter::{BulkDeleter, CleanupSummary};
pub use cache_invalidator::{CacheInvalidator, INVALIDATION_PATH, caller_reference};
pub use error::{CleanupError, DeploymentError, NotificationError};
pub use lifecycle_dispatcher::LifecycleDispatcher;
pub use object_enumerator::ObjectKeyPager;
pub use response_notifier::{InvocationContext, ResponseNotifier};
