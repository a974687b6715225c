use bedrock_actions_core::contract::ActionResponse;
use bedrock_actions_core::registry::OperationRegistry;
use bedrock_actions_lambda::adapters::clock::SystemClock;
use bedrock_actions_lambda::config::RuntimeConfig;
use bedrock_actions_lambda::handlers::action::handle_raw_event;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

async fn handle_request(
    event: LambdaEvent<Value>,
    registry: &OperationRegistry,
) -> Result<ActionResponse, Error> {
    info!(
        event_name = "action.invocation.started",
        request_id = %event.context.request_id,
        "lambda invocation started"
    );
    handle_raw_event(event.payload, registry, &SystemClock).map_err(Error::from)
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .json()
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let config = RuntimeConfig::from_env()?;
    let registry = config.variant.registry();
    info!(
        event_name = "action.runtime.started",
        variant = %config.variant,
        action_group = config.variant.action_group_name(),
        operations = ?registry.paths().collect::<Vec<_>>(),
        "action handler starting"
    );

    let registry = &registry;
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        handle_request(event, registry).await
    }))
    .await
}
