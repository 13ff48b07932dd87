use std::sync::Arc;

use rentaldesk_server::{McpServer, ServerConfig};
use rentaldesk_store::{PostgresStore, StoreConfig};
use rentaldesk_tools::create_registry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rentaldesk_observability::init();

    let store_config = StoreConfig::from_env()?;
    let server_config = ServerConfig::from_env()?;

    let pool = store_config.connect().await?;
    let store = Arc::new(PostgresStore::new(pool));

    let registry = create_registry(store, server_config.default_staff_id);
    let server = Arc::new(McpServer::new(registry));

    match server_config.http_addr {
        Some(addr) => rentaldesk_server::http::serve(addr, server).await,
        None => rentaldesk_server::stdio::run(server).await,
    }
}
