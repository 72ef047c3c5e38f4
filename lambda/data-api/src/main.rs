use lambda_http::{run, service_fn, tracing, Error};

mod attr;
mod config;
mod cursor;
mod error;
mod http_handler;
mod id;
mod query;
mod store;

use config::AppConfig;
use http_handler::function_handler;
use store::DynamoStore;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    let app_config = AppConfig::from_env()?;
    let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let client = aws_sdk_dynamodb::Client::new(&sdk_config);
    let store = DynamoStore::new(client, app_config.table_name.clone());

    run(service_fn(|event| {
        function_handler(&store, &app_config, event)
    }))
    .await
}
