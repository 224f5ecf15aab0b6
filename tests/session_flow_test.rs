use async_trait::async_trait;
use rust_decimal::Decimal;
use saxo_dashboard_bot::api::{AuthService, MarketService, ResourceService, TradeSettlement};
use saxo_dashboard_bot::entity::{
    AppError, CoinQuote, CountdownDuration, CountdownPhase, OrderType, PendingOrder,
    ResourceAction, ResourceKind, Session, TradeReceipt, TradeRequest,
};
use saxo_dashboard_bot::interactor::OrderTicket;
use saxo_dashboard_bot::services::CountdownObserver;
use saxo_dashboard_bot::{AppConfig, ServiceContainer};
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

const CHAT: i64 = 42;

struct MockAuth {
    role_id: &'static str,
    logouts: AtomicUsize,
}

#[async_trait]
impl AuthService for MockAuth {
    async fn login(&self, email: &str, password: &str) -> Result<Session, AppError> {
        if password != "secret" {
            return Err(AppError::Backend {
                status: 400,
                message: "Wrong email or password".to_string(),
            });
        }
        Ok(Session {
            session_id: format!("session-{}", email),
            role_id: self.role_id.to_string(),
            full_name: "Budi".to_string(),
        })
    }

    async fn logout(&self, _session: &Session) -> Result<(), AppError> {
        self.logouts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn forgot_password(&self, _email: &str) -> Result<(), AppError> {
        Ok(())
    }
}

struct MockMarket;

#[async_trait]
impl MarketService for MockMarket {
    async fn quotes(&self, _session: &Session) -> Result<Vec<CoinQuote>, AppError> {
        Ok(vec![CoinQuote {
            coin_id: "1".to_string(),
            coin_code: "BTC".to_string(),
            name: "Bitcoin".to_string(),
            price_usd: Decimal::new(60_000, 0),
            price_local: Decimal::new(960_000_000, 0),
            percent_change_24h: 1.5,
            local_currency: "IDR".to_string(),
        }])
    }
}

#[derive(Default)]
struct MockResources {
    added: Mutex<Vec<(ResourceKind, Map<String, Value>)>>,
}

#[async_trait]
impl ResourceService for MockResources {
    async fn list(&self, _session: &Session, _kind: ResourceKind) -> Result<Vec<Value>, AppError> {
        Ok(vec![json!({ "id": 1, "bankName": "BCA", "accountNumber": "1", "accountHolder": "PT SAXO" })])
    }

    async fn view(&self, _session: &Session, _kind: ResourceKind, id: &str) -> Result<Value, AppError> {
        Ok(json!({ "id": id }))
    }

    async fn add(
        &self,
        _session: &Session,
        kind: ResourceKind,
        fields: Map<String, Value>,
    ) -> Result<Value, AppError> {
        self.added.lock().unwrap().push((kind, fields.clone()));
        Ok(Value::Object(fields))
    }

    async fn edit(
        &self,
        _session: &Session,
        _kind: ResourceKind,
        _id: &str,
        fields: Map<String, Value>,
    ) -> Result<Value, AppError> {
        Ok(Value::Object(fields))
    }

    async fn review(
        &self,
        _session: &Session,
        _kind: ResourceKind,
        _id: &str,
        _action: ResourceAction,
    ) -> Result<(), AppError> {
        Ok(())
    }
}

#[derive(Default)]
struct CountingSettlement {
    calls: AtomicUsize,
}

#[async_trait]
impl TradeSettlement for CountingSettlement {
    async fn settle(&self, _session: &Session, _request: &TradeRequest) -> Result<TradeReceipt, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(TradeReceipt::default())
    }
}

struct SilentObserver;

#[async_trait]
impl CountdownObserver for SilentObserver {
    async fn on_started(&self, _order: &PendingOrder) {}
    async fn on_tick(&self, _order: &PendingOrder) {}
    async fn on_settling(&self, _order: &PendingOrder) {}
    async fn on_settled(&self, _order: &PendingOrder, _receipt: &TradeReceipt) {}
    async fn on_failed(&self, _order: &PendingOrder, _error: &AppError) {}
    async fn on_unauthorized(&self, _order: &PendingOrder) {}
    async fn on_reload(&self) {}
}

struct Harness {
    services: ServiceContainer,
    auth: Arc<MockAuth>,
    settlement: Arc<CountingSettlement>,
    resources: Arc<MockResources>,
}

fn harness(role_id: &'static str) -> Harness {
    let auth = Arc::new(MockAuth {
        role_id,
        logouts: AtomicUsize::new(0),
    });
    let settlement = Arc::new(CountingSettlement::default());
    let resources = Arc::new(MockResources::default());

    let services = ServiceContainer::with_services(
        AppConfig::default(),
        auth.clone(),
        settlement.clone(),
        Arc::new(MockMarket),
        resources.clone(),
    );

    Harness {
        services,
        auth,
        settlement,
        resources,
    }
}

fn ticket() -> OrderTicket {
    OrderTicket {
        order_type: OrderType::Buy,
        coin_id: "1".to_string(),
        coin_code: "BTC".to_string(),
        amount: Decimal::new(1, 2),
        displayed_price: Decimal::new(960_000_000, 0),
        duration: CountdownDuration::OneMinute,
    }
}

#[tokio::test]
async fn market_requires_a_session() {
    let h = harness("3");

    let err = h.services.market_interactor().get_overview(CHAT).await.unwrap_err();
    assert!(matches!(err, AppError::NotLoggedIn));

    h.services
        .auth_interactor()
        .login(CHAT, "budi@saxo.id", "secret")
        .await
        .unwrap();
    let overview = h.services.market_interactor().get_overview(CHAT).await.unwrap();
    assert_eq!(overview.quotes.len(), 1);
    assert!(overview.trading_enabled);
}

#[tokio::test]
async fn failed_login_keeps_chat_signed_out() {
    let h = harness("3");

    let result = h
        .services
        .auth_interactor()
        .login(CHAT, "budi@saxo.id", "wrong")
        .await;

    assert!(result.is_err());
    assert!(h.services.sessions().get(CHAT).await.is_none());
}

#[tokio::test(start_paused = true)]
async fn running_countdown_hides_trading_and_logout_abandons_it() {
    let h = harness("3");
    h.services
        .auth_interactor()
        .login(CHAT, "budi@saxo.id", "secret")
        .await
        .unwrap();

    h.services
        .countdown_interactor()
        .start_order(CHAT, ticket(), Arc::new(SilentObserver))
        .await
        .unwrap();
    sleep(Duration::from_millis(2500)).await;

    let overview = h.services.market_interactor().get_overview(CHAT).await.unwrap();
    assert!(!overview.trading_enabled);
    let err = h
        .services
        .countdown_interactor()
        .prepare_order(CHAT, "BTC")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::CountdownActive));

    let abandoned = h.services.auth_interactor().logout(CHAT).await.unwrap();
    assert_eq!(abandoned.map(|o| o.coin_code), Some("BTC".to_string()));
    assert_eq!(h.auth.logouts.load(Ordering::SeqCst), 1);

    sleep(Duration::from_secs(120)).await;
    assert_eq!(h.settlement.calls.load(Ordering::SeqCst), 0);
    let (phase, order) = h.services.countdown_interactor().get_status(CHAT).await;
    assert_eq!(phase, CountdownPhase::Idle);
    assert!(order.is_none());
}

#[tokio::test]
async fn members_cannot_list_users() {
    let h = harness("3");
    h.services
        .auth_interactor()
        .login(CHAT, "budi@saxo.id", "secret")
        .await
        .unwrap();

    let err = h
        .services
        .resource_interactor()
        .list(CHAT, ResourceKind::Users)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let banks = h
        .services
        .resource_interactor()
        .list(CHAT, ResourceKind::Banks)
        .await
        .unwrap();
    assert_eq!(banks.len(), 1);
}

#[tokio::test]
async fn member_deposit_request_carries_amount_and_bank() {
    let h = harness("3");
    h.services
        .auth_interactor()
        .login(CHAT, "budi@saxo.id", "secret")
        .await
        .unwrap();

    h.services
        .resource_interactor()
        .request_fiat(CHAT, ResourceKind::Deposits, Decimal::new(250_000, 0), "7")
        .await
        .unwrap();

    let added = h.resources.added.lock().unwrap();
    assert_eq!(added.len(), 1);
    assert_eq!(added[0].0, ResourceKind::Deposits);
    assert_eq!(added[0].1["amount"].as_f64(), Some(250_000.0));
    assert_eq!(added[0].1["bankId"], "7");
}
