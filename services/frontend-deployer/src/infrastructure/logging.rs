/// ログ基盤モジュール
///
/// CloudWatch Logs向けにJSON形式の構造化ログを出力する。
use std::sync::Once;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Lambda環境向けのログサブスクライバーを初期化する
///
/// `RUST_LOG`が未設定ならinfoレベル。複数回呼び出しても初回のみ初期化する。
pub fn init_logging() {
    INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .flatten_event(true)
            // ディスパッチ時のspan（request_id等）を各行に含める
            .with_current_span(true)
            .with_span_list(false);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .init();
    });
}

/// テスト用のログサブスクライバーを初期化する（人間が読みやすい形式）
#[cfg(test)]
pub fn init_test_logging() {
    static TEST_INIT: Once = Once::new();

    TEST_INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_test_writer()
            .with_target(true)
            .compact();

        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_test_logging_idempotent() {
        init_test_logging();
        init_test_logging();
    }

    #[test]
    fn test_request_span_fields() {
        init_test_logging();

        let span = tracing::info_span!(
            "lifecycle",
            request_type = "Create",
            request_id = "req-1",
            logical_resource_id = "FrontendDeployment"
        );
        let _guard = span.enter();

        tracing::info!(bucket = "b", uploaded = 3, "アセット同期完了");
        tracing::warn!(bucket = "gone-bucket", "バケット空化に失敗（削除は継続）");
    }
}
