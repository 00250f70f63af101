use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use stamp_ledger_lambda::adapters::dynamodb::DynamoCounterStore;
use stamp_ledger_lambda::config::LedgerConfig;
use stamp_ledger_lambda::handlers::ledger::{handle_ledger_event, ApiGatewayResponse};
use stamp_ledger_lambda::telemetry;

async fn handle_request(
    event: LambdaEvent<Value>,
    store: &DynamoCounterStore,
) -> Result<ApiGatewayResponse, Error> {
    Ok(handle_ledger_event(event.payload, store))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = LedgerConfig::from_env()?;
    telemetry::init(config.log_format);

    let store = DynamoCounterStore::connect(&config).await;
    tracing::info!(
        component = "stamp_ledger",
        event = "runtime_started",
        table_name = store.table_name(),
    );

    let store = &store;
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        handle_request(event, store).await
    }))
    .await
}
