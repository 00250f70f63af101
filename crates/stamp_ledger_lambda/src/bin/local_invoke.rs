use std::fs;
use std::io::Read;
use std::path::PathBuf;

use clap::Parser;
use serde_json::Value;
use stamp_ledger_lambda::adapters::counter_store::CounterStore;
use stamp_ledger_lambda::adapters::dynamodb::DynamoCounterStore;
use stamp_ledger_lambda::adapters::memory::InMemoryCounterStore;
use stamp_ledger_lambda::config::LedgerConfig;
use stamp_ledger_lambda::handlers::ledger::handle_ledger_event;
use stamp_ledger_lambda::runtime::record::{StampKey, StampRecord};
use stamp_ledger_lambda::telemetry;

type CliError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Parser)]
#[command(
    name = "local_invoke",
    about = "Run a single stamp ledger event outside Lambda and print the response",
    long_about = "Reads one event (direct-invoke or API Gateway shaped) from --event, --json\n\
                  or stdin, dispatches it through the ledger handler and prints the\n\
                  response. Uses DynamoDB unless --in-memory is given."
)]
struct Cli {
    /// Path to a JSON event file
    #[arg(long, conflicts_with = "json")]
    event: Option<PathBuf>,
    /// Inline JSON event
    #[arg(long)]
    json: Option<String>,
    /// Use a process-local store instead of DynamoDB
    #[arg(long)]
    in_memory: bool,
    /// Seed the in-memory store with STORE:CUSTOMER=STAMPS (repeatable)
    #[arg(long, value_parser = parse_seed, requires = "in_memory")]
    seed: Vec<StampRecord>,
    /// DynamoDB table name, overriding STAMP_TABLE_NAME
    #[arg(long)]
    table_name: Option<String>,
}

fn parse_seed(raw: &str) -> Result<StampRecord, String> {
    let (key, stamps) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected STORE:CUSTOMER=STAMPS, got '{raw}'"))?;
    let (store_id, customer_id) = key
        .split_once(':')
        .ok_or_else(|| format!("expected STORE:CUSTOMER before '=', got '{key}'"))?;
    let stamps = stamps
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|value| *value >= 0)
        .ok_or_else(|| format!("stamps must be a non-negative integer, got '{stamps}'"))?;
    Ok(StampRecord::new(
        StampKey::new(store_id.trim(), customer_id.trim()),
        stamps,
    ))
}

fn read_event(cli: &Cli) -> Result<Value, CliError> {
    let text = match (&cli.event, &cli.json) {
        (Some(path), _) => fs::read_to_string(path)
            .map_err(|error| format!("failed to read {}: {error}", path.display()))?,
        (None, Some(inline)) => inline.clone(),
        (None, None) => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    let event = serde_json::from_str::<Value>(&text)
        .map_err(|error| format!("event is not valid JSON: {error}"))?;
    Ok(event)
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let mut config = LedgerConfig::from_env()?;
    if let Some(table_name) = &cli.table_name {
        config.table_name = table_name.clone();
    }
    telemetry::init(config.log_format);

    let event = read_event(&cli)?;

    let dynamo_store;
    let memory_store;
    let store: &dyn CounterStore = if cli.in_memory {
        memory_store = InMemoryCounterStore::with_records(cli.seed.iter().cloned());
        &memory_store
    } else {
        dynamo_store = DynamoCounterStore::connect(&config).await;
        &dynamo_store
    };

    let response = handle_ledger_event(event, store);
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
