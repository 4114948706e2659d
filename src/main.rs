use alb_lambda_adapter::config::AdapterConfig;
use alb_lambda_adapter::handler::Adapter;
use alb_lambda_adapter::models::AlbTargetGroupRequest;
use alb_lambda_adapter::service::EchoHandler;
use lambda_runtime::tracing::info;
use lambda_runtime::{Error, LambdaEvent, service_fn};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Use Lambda runtime's built-in tracing subscriber for CloudWatch Logs
    lambda_runtime::tracing::init_default_subscriber();

    let config = AdapterConfig::from_env()?;
    info!(base_path = %config.base_path, "Starting ALB adapter");

    let adapter = Adapter::new(EchoHandler).with_base_path(&config.base_path);
    let adapter = &adapter;

    lambda_runtime::run(service_fn(
        move |event: LambdaEvent<AlbTargetGroupRequest>| async move {
            adapter.function_handler(event).await
        },
    ))
    .await
}
