//! End-to-end HTTP flows against in-process backends.
//!
//! The gateway talks to fake users/products/orders services over an
//! in-memory broker, and keeps sessions in the in-memory store.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::http::{header, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use bazaar_core::{endpoints, Order, Product, User};
use bazaar_gateway::{create_router, GatewayConfig, GatewayState};
use bazaar_rpc::{BrokerRpcClient, MemoryBroker, RpcConfig, RpcServer};
use bazaar_session::MemorySessionStore;

#[derive(Default)]
struct Catalogue {
    users: Vec<User>,
    products: Vec<Product>,
    orders: Vec<Order>,
}

type Shared = Arc<Mutex<Catalogue>>;

fn decode<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, String> {
    serde_json::from_slice(body).map_err(|e| e.to_string())
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, String> {
    serde_json::to_vec(value).map_err(|e| e.to_string())
}

async fn serve<F>(server: &RpcServer<MemoryBroker>, data: &Shared, endpoint: &str, handler: F)
where
    F: Fn(&mut Catalogue, &[u8]) -> Result<Vec<u8>, String> + Send + Sync + 'static,
{
    let data = Arc::clone(data);
    server
        .serve(endpoint, move |body: Vec<u8>| {
            let result = handler(&mut data.lock().unwrap(), &body);
            std::future::ready(result)
        })
        .await
        .unwrap();
}

async fn start_backends(broker: &Arc<MemoryBroker>) {
    let server = RpcServer::new(Arc::clone(broker));
    let data = Shared::default();

    serve(&server, &data, endpoints::USERS_CREATE, |data, body| {
        let mut user: User = decode(body)?;
        if data.users.iter().any(|u| u.username == user.username) {
            return Err("User with that username already exist".to_string());
        }
        user.id = format!("u-{}", data.users.len() + 1);
        data.users.push(user.clone());
        encode(&user)
    })
    .await;

    serve(&server, &data, endpoints::USERS_GET_BY_CREDENTIALS, |data, body| {
        let credentials: User = decode(body)?;
        data.users
            .iter()
            .find(|u| u.username == credentials.username && u.password == credentials.password)
            .ok_or_else(|| "user not found".to_string())
            .and_then(encode)
    })
    .await;

    serve(&server, &data, endpoints::USERS_GET_BY_ID, |data, body| {
        let lookup: Value = decode(body)?;
        data.users
            .iter()
            .find(|u| lookup["id"] == u.id.as_str())
            .ok_or_else(|| "user not found".to_string())
            .and_then(encode)
    })
    .await;

    serve(&server, &data, endpoints::PRODUCTS_CREATE, |data, body| {
        let mut product: Product = decode(body)?;
        product.id = format!("p-{}", data.products.len() + 1);
        data.products.push(product.clone());
        encode(&product)
    })
    .await;

    serve(&server, &data, endpoints::PRODUCTS_LIST, |data, _body| {
        encode(&data.products)
    })
    .await;

    serve(&server, &data, endpoints::ORDERS_CREATE, |data, body| {
        let mut order: Order = decode(body)?;
        order.id = format!("o-{}", data.orders.len() + 1);
        data.orders.push(order.clone());
        encode(&order)
    })
    .await;

    serve(&server, &data, endpoints::ORDERS_LIST, |data, body| {
        let query: Value = decode(body)?;
        let mine: Vec<&Order> = data
            .orders
            .iter()
            .filter(|o| query["user_id"] == o.user_id.as_str())
            .collect();
        encode(&mine)
    })
    .await;
}

async fn gateway_with(broker: &Arc<MemoryBroker>, rpc_timeout: Duration) -> TestServer {
    // Same restriction as the binary: every route must use a registered endpoint.
    let config = RpcConfig::with_timeout(rpc_timeout).registered_only();
    let rpc = BrokerRpcClient::connect(Arc::clone(broker), config)
        .await
        .unwrap();
    let state = GatewayState::new(
        Arc::new(rpc),
        Arc::new(MemorySessionStore::new()),
        GatewayConfig::default(),
    );
    TestServer::new(create_router(state)).unwrap()
}

async fn gateway() -> (TestServer, Arc<MemoryBroker>) {
    let broker = Arc::new(MemoryBroker::new());
    start_backends(&broker).await;
    let server = gateway_with(&broker, Duration::from_secs(5)).await;
    (server, broker)
}

fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {token}")).unwrap()
}

async fn register_and_login(server: &TestServer, username: &str, password: &str) -> String {
    server
        .post("/register")
        .json(&json!({ "username": username, "password": password }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .post("/login")
        .json(&json!({ "username": username, "password": password }))
        .await;
    response.assert_status_ok();
    response.json::<Value>()["access_key"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn register_returns_created_user() {
    let (server, _broker) = gateway().await;

    let response = server
        .post("/register")
        .json(&json!({ "username": "u1", "password": "p1" }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body = response.json::<Value>();
    assert_eq!(body["id"], "u-1");
    assert_eq!(body["username"], "u1");
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn empty_credentials_are_rejected_before_dispatch() {
    let (server, broker) = gateway().await;
    let published = broker.published();

    for path in ["/register", "/login"] {
        let response = server
            .post(path)
            .json(&json!({ "username": "u1", "password": "" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<Value>(),
            json!({ "message": "Fields username or password is empty", "status_code": 400 })
        );
    }
    assert_eq!(broker.published(), published);
}

#[tokio::test]
async fn login_then_profile() {
    let (server, _broker) = gateway().await;
    let token = register_and_login(&server, "u1", "p1").await;
    assert_eq!(token.len(), 64);

    let response = server
        .get("/profile")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["id"], "u-1");
    assert_eq!(body["username"], "u1");
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn unknown_token_is_unauthorized() {
    let (server, _broker) = gateway().await;

    let response = server
        .get("/profile")
        .add_header(header::AUTHORIZATION, bearer("not-a-session"))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["status_code"], 401);
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let (server, _broker) = gateway().await;
    server
        .get("/orders")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let (server, _broker) = gateway().await;
    register_and_login(&server, "u1", "p1").await;

    let response = server
        .post("/login")
        .json(&json!({ "username": "u1", "password": "wrong" }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.json::<Value>()["message"],
        "invalid username or password"
    );
}

#[tokio::test]
async fn logout_revokes_the_token() {
    let (server, _broker) = gateway().await;
    let token = register_and_login(&server, "u1", "p1").await;

    server
        .post("/logout")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    server
        .get("/profile")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn orders_belong_to_the_caller() {
    let (server, _broker) = gateway().await;
    let alice = register_and_login(&server, "alice", "p1").await;
    let bob = register_and_login(&server, "bob", "p2").await;

    let response = server
        .post("/orders")
        .add_header(header::AUTHORIZATION, bearer(&alice))
        .json(&json!({ "product_id": "p-1", "quantity": 2, "user_id": "u-2" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let order = response.json::<Order>();
    assert_eq!(order.user_id, "u-1");
    assert_eq!(order.quantity, 2);

    let mine = server
        .get("/orders")
        .add_header(header::AUTHORIZATION, bearer(&alice))
        .await
        .json::<Vec<Order>>();
    assert_eq!(mine.len(), 1);

    let theirs = server
        .get("/orders")
        .add_header(header::AUTHORIZATION, bearer(&bob))
        .await
        .json::<Vec<Order>>();
    assert!(theirs.is_empty());
}

#[tokio::test]
async fn order_without_product_is_rejected() {
    let (server, _broker) = gateway().await;
    let token = register_and_login(&server, "u1", "p1").await;

    server
        .post("/orders")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({ "quantity": 1 }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn products_are_created_and_listed() {
    let (server, _broker) = gateway().await;

    let response = server
        .post("/products")
        .json(&json!({ "name": "Lamp", "description": "Desk lamp", "price": 19.5 }))
        .await;
    response.assert_status(StatusCode::CREATED);
    assert_eq!(response.json::<Product>().id, "p-1");

    let products = server.get("/products").await.json::<Vec<Product>>();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "Lamp");
}

#[tokio::test]
async fn product_without_name_is_rejected() {
    let (server, broker) = gateway().await;
    let published = broker.published();

    let response = server
        .post("/products")
        .json(&json!({ "name": "  ", "price": 3.0 }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["message"], "Please write name");
    assert_eq!(broker.published(), published);
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let (server, _broker) = gateway().await;

    let response = server
        .post("/register")
        .content_type("application/json")
        .text("{\"username\": ")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["status_code"], 400);
}

#[tokio::test]
async fn backend_error_is_an_internal_error() {
    let (server, _broker) = gateway().await;
    register_and_login(&server, "u1", "p1").await;

    let response = server
        .post("/register")
        .json(&json!({ "username": "u1", "password": "other" }))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.json::<Value>();
    assert_eq!(body["status_code"], 500);
    assert!(body["message"].as_str().unwrap().contains("already exist"));
}

#[tokio::test]
async fn silent_backend_times_out() {
    let broker = Arc::new(MemoryBroker::new());
    let server = gateway_with(&broker, Duration::from_millis(100)).await;

    let response = server.get("/products").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.json::<Value>()["message"]
        .as_str()
        .unwrap()
        .contains("timed out"));
}

#[tokio::test]
async fn health_is_public() {
    let (server, _broker) = gateway().await;
    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "healthy");
}
