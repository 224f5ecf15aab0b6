use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    Json, Router,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use saxo_dashboard_bot::api::{
    AuthService, BackendClient, BackendResourceService, ResourceService, TradeSettlement,
};
use saxo_dashboard_bot::entity::{
    AppError, OrderType, ResourceAction, ResourceKind, Session, TradeRequest,
};
use saxo_dashboard_bot::AppConfig;

#[derive(Debug, Clone)]
struct Recorded {
    path: String,
    authorization: Option<String>,
    body: Value,
}

type Log = Arc<Mutex<Vec<Recorded>>>;

async fn stub(
    State(log): State<Log>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    log.lock().unwrap().push(Recorded {
        path: uri.path().to_string(),
        authorization: authorization.clone(),
        body,
    });

    if authorization.as_deref() == Some("expired") {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Session expired" })));
    }

    match uri.path() {
        "/auth/login" => (
            StatusCode::OK,
            Json(json!({
                "message": "Login success",
                "data": { "sessionId": "s-1", "roleId": "2", "fullName": "Ana Admin" }
            })),
        ),
        "/trade/checkout" => (
            StatusCode::OK,
            Json(json!({ "message": "Trade settled", "data": { "transactionId": "tx-9" } })),
        ),
        "/bank/list" => (
            StatusCode::OK,
            Json(json!({
                "data": [
                    { "id": 1, "bankName": "BCA", "accountNumber": "0123", "accountHolder": "PT SAXO" },
                    { "id": 2, "bankName": "Mandiri", "accountNumber": "0456", "accountHolder": "PT SAXO" }
                ]
            })),
        ),
        "/fiat/deposit/approve" => (
            StatusCode::CONFLICT,
            Json(json!({ "message": "Request was already reviewed" })),
        ),
        _ => (StatusCode::NOT_FOUND, Json(json!({ "message": "Not found" }))),
    }
}

async fn spawn_backend() -> (Arc<BackendClient>, Log) {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new().fallback(stub).with_state(log.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = AppConfig {
        backend_url: format!("http://{}", addr),
        ..AppConfig::default()
    };
    (Arc::new(BackendClient::new(config).unwrap()), log)
}

fn session(id: &str) -> Session {
    Session {
        session_id: id.to_string(),
        role_id: "2".to_string(),
        full_name: "Ana Admin".to_string(),
    }
}

fn trade_request() -> TradeRequest {
    TradeRequest {
        trade_type: OrderType::Buy,
        coin_id: "7".to_string(),
        coin_code: "BTC".to_string(),
        amount: Decimal::new(5, 1),
        total_value: Decimal::new(500_000_000, 0),
    }
}

#[tokio::test]
async fn login_unwraps_session_envelope() {
    let (client, log) = spawn_backend().await;

    let session = client.login("ana@saxo.id", "secret").await.unwrap();

    assert_eq!(session.session_id, "s-1");
    assert!(session.role().is_admin());
    let recorded = log.lock().unwrap()[0].clone();
    assert_eq!(recorded.path, "/auth/login");
    assert_eq!(recorded.authorization, None);
    assert_eq!(recorded.body, json!({ "email": "ana@saxo.id", "password": "secret" }));
}

#[tokio::test]
async fn settlement_posts_order_with_session_header() {
    let (client, log) = spawn_backend().await;

    let receipt = client
        .settle(&session("s-1"), &trade_request())
        .await
        .unwrap();

    assert_eq!(receipt.message.as_deref(), Some("Trade settled"));
    assert_eq!(receipt.transaction_id.as_deref(), Some("tx-9"));

    let recorded = log.lock().unwrap().clone();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].path, "/trade/checkout");
    assert_eq!(recorded[0].authorization.as_deref(), Some("s-1"));
    assert_eq!(recorded[0].body["tradeType"], "BUY");
    assert_eq!(recorded[0].body["coinId"], "7");
    assert_eq!(recorded[0].body["coinCode"], "BTC");
    assert_eq!(recorded[0].body["coinNominalExchange"].as_f64(), Some(0.5));
    assert_eq!(
        recorded[0].body["fiatCurrentcyCheckoutTime"].as_f64(),
        Some(500_000_000.0)
    );
}

#[tokio::test]
async fn expired_session_is_unauthorized() {
    let (client, _log) = spawn_backend().await;

    let err = client
        .settle(&session("expired"), &trade_request())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Unauthorized));
}

#[tokio::test]
async fn backend_error_message_is_surfaced() {
    let (client, log) = spawn_backend().await;
    let resources = BackendResourceService::new(client);

    let err = resources
        .review(&session("s-1"), ResourceKind::Deposits, "12", ResourceAction::Approve)
        .await
        .unwrap_err();

    match err {
        AppError::Backend { status, message } => {
            assert_eq!(status, 409);
            assert_eq!(message, "Request was already reviewed");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(log.lock().unwrap()[0].body, json!({ "id": "12" }));
}

#[tokio::test]
async fn resource_list_uses_segment_path() {
    let (client, log) = spawn_backend().await;
    let resources = BackendResourceService::new(client);

    let banks = resources
        .list(&session("s-1"), ResourceKind::Banks)
        .await
        .unwrap();

    assert_eq!(banks.len(), 2);
    assert_eq!(banks[1]["bankName"], "Mandiri");
    assert_eq!(log.lock().unwrap()[0].path, "/bank/list");
}

#[tokio::test]
async fn missing_fields_never_reach_the_backend() {
    let (client, log) = spawn_backend().await;
    let resources = BackendResourceService::new(client);

    let mut fields = serde_json::Map::new();
    fields.insert("bankName".to_string(), json!("BCA"));
    let err = resources
        .add(&session("s-1"), ResourceKind::Banks, fields)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation { .. }));
    assert!(log.lock().unwrap().is_empty());
}
