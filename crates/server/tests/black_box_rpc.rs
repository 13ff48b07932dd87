//! Black-box test of the HTTP transport: same router as prod, in-memory
//! store, ephemeral port.

use std::sync::Arc;

use serde_json::{json, Value};

use rentaldesk_core::StaffId;
use rentaldesk_server::{http, McpServer};
use rentaldesk_store::InMemoryStore;
use rentaldesk_tools::create_registry;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let store = InMemoryStore::new();
        store.add_film(1, "ACADEMY DINOSAUR", "Documentary", Some(2006));
        store.add_customer(35, "Virginia", "Green", "virginia.green@example.net");
        store.add_staff(1, 1);
        store.add_inventory(402, 1, 1);

        let server = Arc::new(McpServer::new(create_registry(
            Arc::new(store),
            StaffId::new(1),
        )));
        let app = http::router(server);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    async fn rpc(&self, client: &reqwest::Client, body: Value) -> Value {
        client
            .post(format!("{}/rpc", self.base_url))
            .body(body.to_string())
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[tokio::test]
async fn health_endpoint_answers() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/health", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
}

#[tokio::test]
async fn full_rental_flow_over_http() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let init = server
        .rpc(
            &client,
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
        )
        .await;
    assert_eq!(init["result"]["serverInfo"]["name"], "rentaldesk");

    let list = server
        .rpc(&client, json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}))
        .await;
    assert_eq!(list["result"]["tools"].as_array().unwrap().len(), 10);

    // Rent, conflict, return: the guard behaves identically over HTTP.
    let rent = server
        .rpc(
            &client,
            json!({
                "jsonrpc": "2.0", "id": 3, "method": "tools/call",
                "params": {"name": "rent_movie",
                           "arguments": {"customer_id": 35, "inventory_id": 402}}
            }),
        )
        .await;
    assert_eq!(rent["result"]["isError"], false);
    let receipt: Value =
        serde_json::from_str(rent["result"]["content"][0]["text"].as_str().unwrap()).unwrap();
    let rental_id = receipt["rental_id"].as_i64().unwrap();

    let conflict = server
        .rpc(
            &client,
            json!({
                "jsonrpc": "2.0", "id": 4, "method": "tools/call",
                "params": {"name": "rent_movie",
                           "arguments": {"customer_id": 35, "inventory_id": 402}}
            }),
        )
        .await;
    assert_eq!(conflict["result"]["isError"], true);
    let failure: Value =
        serde_json::from_str(conflict["result"]["content"][0]["text"].as_str().unwrap()).unwrap();
    assert_eq!(failure["error"], "already_rented");

    let ret = server
        .rpc(
            &client,
            json!({
                "jsonrpc": "2.0", "id": 5, "method": "tools/call",
                "params": {"name": "return_movie", "arguments": {"rental_id": rental_id}}
            }),
        )
        .await;
    assert_eq!(ret["result"]["isError"], false);
}

#[tokio::test]
async fn notifications_return_no_content() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/rpc", server.base_url))
        .body(json!({"jsonrpc": "2.0", "method": "notifications/initialized"}).to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::NO_CONTENT);
}
