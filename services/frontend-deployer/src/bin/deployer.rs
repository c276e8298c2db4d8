/// フロントエンド配置用カスタムリソースLambda関数
///
/// CloudFormationのライフサイクルイベントを受け取り、
/// Create/Updateで静的アセットとconfig.jsをS3へ配置してCloudFrontを無効化、
/// Deleteでバケットを空にする。結果は必ずResponseURLへ通知する。
use frontend_deployer::application::{
    AssetSynchronizer, BulkDeleter, CacheInvalidator, InvocationContext, LifecycleDispatcher,
    ResponseNotifier,
};
use frontend_deployer::domain::LifecycleEvent;
use frontend_deployer::infrastructure::{
    AwsCloudFrontOps, AwsS3Ops, AwsStsOps, DeployerConfig, HttpResponseSender,
    LocalAssetDirectory, init_logging,
};
use lambda_runtime::{Error, LambdaEvent, service_fn};
use tracing::{error, info};

type Dispatcher = LifecycleDispatcher<
    AwsS3Ops,
    LocalAssetDirectory,
    AwsCloudFrontOps,
    AwsStsOps,
    HttpResponseSender,
>;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // 構造化ログを初期化
    init_logging();

    let config = DeployerConfig::from_env().inspect_err(|err| {
        error!(error = %err, "設定読み込み失敗");
    })?;

    // AWSクライアントはwarm start時に再利用する
    let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let s3 = AwsS3Ops::from_sdk_config(&sdk_config);
    let source = LocalAssetDirectory::new(config.asset_root());

    info!(
        asset_root = %source.root().display(),
        cache_control = %config.cache_control(),
        "フロントエンド配置関数を初期化"
    );

    let dispatcher: Dispatcher = LifecycleDispatcher::new(
        AssetSynchronizer::new(s3.clone(), source, config.cache_control()),
        BulkDeleter::new(s3),
        CacheInvalidator::new(
            AwsCloudFrontOps::from_sdk_config(&sdk_config),
            AwsStsOps::from_sdk_config(&sdk_config),
        ),
        ResponseNotifier::new(HttpResponseSender::new()?),
    );
    let dispatcher = &dispatcher;

    let func = service_fn(move |event: LambdaEvent<LifecycleEvent>| async move {
        handler(dispatcher, event).await
    });
    lambda_runtime::run(func).await?;
    Ok(())
}

/// Lambda関数のメインハンドラー
///
/// 処理の成否はCloudFormationへの通知で伝え、ここでErrを返すのは通知に失敗した場合のみ。
async fn handler(dispatcher: &Dispatcher, event: LambdaEvent<LifecycleEvent>) -> Result<(), Error> {
    let (payload, context) = event.into_parts();
    let invocation = InvocationContext::new(context.env_config.log_stream.clone());

    dispatcher.dispatch(&payload, &invocation).await?;
    Ok(())
}
