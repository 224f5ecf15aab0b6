use async_trait::async_trait;
use rust_decimal::Decimal;
use saxo_dashboard_bot::api::TradeSettlement;
use saxo_dashboard_bot::entity::{
    AppError, CountdownDuration, CountdownPhase, OrderType, PendingOrder, Session, TradeReceipt,
    TradeRequest,
};
use saxo_dashboard_bot::services::{CountdownObserver, CountdownService, SessionStore};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::sleep;

const CHAT: i64 = 1001;

#[derive(Clone, Copy)]
enum Outcome {
    Success,
    BackendDown,
    Unauthorized,
}

struct MockSettlement {
    outcome: Outcome,
    calls: AtomicUsize,
    requests: Mutex<Vec<TradeRequest>>,
}

impl MockSettlement {
    fn new(outcome: Outcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TradeSettlement for MockSettlement {
    async fn settle(
        &self,
        _session: &Session,
        request: &TradeRequest,
    ) -> Result<TradeReceipt, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        match self.outcome {
            Outcome::Success => Ok(TradeReceipt::default()),
            Outcome::BackendDown => Err(AppError::Backend {
                status: 502,
                message: "bad gateway".to_string(),
            }),
            Outcome::Unauthorized => Err(AppError::Unauthorized),
        }
    }
}

#[derive(Default)]
struct RecordingObserver {
    started: AtomicUsize,
    ticks: Mutex<Vec<u64>>,
    settled: AtomicUsize,
    failed: AtomicUsize,
    unauthorized: AtomicUsize,
    reloads: AtomicUsize,
}

#[async_trait]
impl CountdownObserver for RecordingObserver {
    async fn on_started(&self, _order: &PendingOrder) {
        self.started.fetch_add(1, Ordering::SeqCst);
    }

    async fn on_tick(&self, order: &PendingOrder) {
        self.ticks.lock().unwrap().push(order.remaining_seconds);
    }

    async fn on_settling(&self, _order: &PendingOrder) {}

    async fn on_settled(&self, _order: &PendingOrder, _receipt: &TradeReceipt) {
        self.settled.fetch_add(1, Ordering::SeqCst);
    }

    async fn on_failed(&self, _order: &PendingOrder, _error: &AppError) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }

    async fn on_unauthorized(&self, _order: &PendingOrder) {
        self.unauthorized.fetch_add(1, Ordering::SeqCst);
    }

    async fn on_reload(&self) {
        self.reloads.fetch_add(1, Ordering::SeqCst);
    }
}

fn session() -> Session {
    Session {
        session_id: "session-1".to_string(),
        role_id: "3".to_string(),
        full_name: "Member One".to_string(),
    }
}

fn order(coin_code: &str, duration: CountdownDuration) -> PendingOrder {
    PendingOrder::new(
        "1",
        coin_code,
        OrderType::Buy,
        Decimal::new(5, 1),
        Decimal::new(1_000_000, 0),
        duration,
    )
    .unwrap()
}

fn service(settlement: Arc<MockSettlement>, sessions: Arc<SessionStore>) -> CountdownService {
    CountdownService::new(settlement, sessions, Duration::from_secs(2))
}

#[tokio::test(start_paused = true)]
async fn every_duration_settles_after_exactly_its_seconds() {
    for duration in CountdownDuration::ALL {
        let seconds = duration.seconds();
        let settlement = MockSettlement::new(Outcome::Success);
        let service = service(settlement.clone(), Arc::new(SessionStore::new()));
        let observer = Arc::new(RecordingObserver::default());

        let started = service
            .start_countdown(CHAT, session(), order("BTC", duration), observer.clone())
            .await
            .unwrap();
        assert_eq!(started.remaining_seconds, seconds);

        sleep(Duration::from_millis(seconds * 1000 - 500)).await;
        assert_eq!(settlement.calls(), 0, "settled early for {}s", seconds);
        assert_eq!(
            service.phase(CHAT).await,
            CountdownPhase::Counting {
                remaining_seconds: 1
            }
        );

        sleep(Duration::from_secs(1)).await;
        assert_eq!(settlement.calls(), 1, "not settled after {}s", seconds);

        let ticks = observer.ticks.lock().unwrap().clone();
        let expected: Vec<u64> = (1..seconds).rev().collect();
        assert_eq!(ticks, expected);
    }
}

#[tokio::test(start_paused = true)]
async fn settlement_fires_once_and_reloads_after_delay() {
    let settlement = MockSettlement::new(Outcome::Success);
    let service = service(settlement.clone(), Arc::new(SessionStore::new()));
    let observer = Arc::new(RecordingObserver::default());

    service
        .start_countdown(
            CHAT,
            session(),
            order("ETH", CountdownDuration::OneMinute),
            observer.clone(),
        )
        .await
        .unwrap();

    sleep(Duration::from_millis(60_500)).await;
    assert_eq!(observer.settled.load(Ordering::SeqCst), 1);
    assert_eq!(observer.reloads.load(Ordering::SeqCst), 0);
    assert!(!service.is_active(CHAT).await);

    sleep(Duration::from_secs(10)).await;
    assert_eq!(settlement.calls(), 1);
    assert_eq!(observer.reloads.load(Ordering::SeqCst), 1);
    assert_eq!(service.phase(CHAT).await, CountdownPhase::Idle);

    let requests = settlement.requests.lock().unwrap();
    assert_eq!(requests[0].coin_code, "ETH");
    assert_eq!(requests[0].total_value, Decimal::new(500_000, 0));
}

#[tokio::test(start_paused = true)]
async fn non_positive_amount_never_starts() {
    let settlement = MockSettlement::new(Outcome::Success);
    let service = service(settlement.clone(), Arc::new(SessionStore::new()));
    let observer = Arc::new(RecordingObserver::default());

    let mut zero = order("BTC", CountdownDuration::OneMinute);
    zero.amount = Decimal::ZERO;

    let result = service
        .start_countdown(CHAT, session(), zero, observer.clone())
        .await;

    assert!(matches!(result, Err(AppError::InvalidAmount)));
    assert!(!service.is_active(CHAT).await);

    sleep(Duration::from_secs(120)).await;
    assert_eq!(settlement.calls(), 0);
    assert_eq!(observer.started.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn failed_settlement_clears_flag_without_reload() {
    let settlement = MockSettlement::new(Outcome::BackendDown);
    let service = service(settlement.clone(), Arc::new(SessionStore::new()));
    let observer = Arc::new(RecordingObserver::default());

    service
        .start_countdown(
            CHAT,
            session(),
            order("BTC", CountdownDuration::OneMinute),
            observer.clone(),
        )
        .await
        .unwrap();

    sleep(Duration::from_secs(120)).await;

    assert_eq!(settlement.calls(), 1);
    assert!(!service.is_active(CHAT).await);
    assert_eq!(service.phase(CHAT).await, CountdownPhase::FailedIdle);
    assert_eq!(observer.failed.load(Ordering::SeqCst), 1);
    assert_eq!(observer.reloads.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn second_countdown_is_refused_for_any_coin() {
    let settlement = MockSettlement::new(Outcome::Success);
    let service = service(settlement.clone(), Arc::new(SessionStore::new()));
    let observer = Arc::new(RecordingObserver::default());

    service
        .start_countdown(
            CHAT,
            session(),
            order("BTC", CountdownDuration::TwoMinutes),
            observer.clone(),
        )
        .await
        .unwrap();

    for coin in ["BTC", "ETH", "USDT"] {
        let result = service
            .start_countdown(
                CHAT,
                session(),
                order(coin, CountdownDuration::OneMinute),
                observer.clone(),
            )
            .await;
        assert!(matches!(result, Err(AppError::CountdownActive)));
    }

    // Another chat is independent
    assert!(service
        .start_countdown(
            CHAT + 1,
            session(),
            order("ETH", CountdownDuration::OneMinute),
            observer.clone(),
        )
        .await
        .is_ok());

    sleep(Duration::from_secs(130)).await;
    assert_eq!(settlement.calls(), 2);

    // Once settled a new countdown may start
    assert!(service
        .start_countdown(
            CHAT,
            session(),
            order("ETH", CountdownDuration::OneMinute),
            observer,
        )
        .await
        .is_ok());
}

#[tokio::test(start_paused = true)]
async fn abandoned_countdown_never_settles() {
    let settlement = MockSettlement::new(Outcome::Success);
    let service = service(settlement.clone(), Arc::new(SessionStore::new()));
    let observer = Arc::new(RecordingObserver::default());

    service
        .start_countdown(
            CHAT,
            session(),
            order("BTC", CountdownDuration::OneMinute),
            observer.clone(),
        )
        .await
        .unwrap();

    sleep(Duration::from_millis(30_500)).await;
    let abandoned = service.abandon(CHAT).await.unwrap();
    assert_eq!(abandoned.remaining_seconds, 30);
    assert_eq!(service.phase(CHAT).await, CountdownPhase::Idle);

    sleep(Duration::from_secs(120)).await;
    assert_eq!(settlement.calls(), 0);
    assert_eq!(observer.settled.load(Ordering::SeqCst), 0);
    assert!(service.abandon(CHAT).await.is_none());
}

#[tokio::test(start_paused = true)]
async fn unauthorized_settlement_signs_the_chat_out() {
    let settlement = MockSettlement::new(Outcome::Unauthorized);
    let sessions = Arc::new(SessionStore::new());
    sessions.set(CHAT, session()).await;
    let service = service(settlement.clone(), sessions.clone());
    let observer = Arc::new(RecordingObserver::default());

    service
        .start_countdown(
            CHAT,
            session(),
            order("BTC", CountdownDuration::OneMinute),
            observer.clone(),
        )
        .await
        .unwrap();

    sleep(Duration::from_secs(61)).await;

    assert_eq!(settlement.calls(), 1);
    assert!(sessions.get(CHAT).await.is_none());
    assert_eq!(observer.unauthorized.load(Ordering::SeqCst), 1);
    assert_eq!(observer.reloads.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn shutdown_abandons_all_counting_orders() {
    let settlement = MockSettlement::new(Outcome::Success);
    let service = service(settlement.clone(), Arc::new(SessionStore::new()));
    let observer = Arc::new(RecordingObserver::default());

    for chat in [1, 2, 3] {
        service
            .start_countdown(
                chat,
                session(),
                order("BTC", CountdownDuration::ThreeMinutes),
                observer.clone(),
            )
            .await
            .unwrap();
    }

    assert_eq!(service.abandon_all().await, 3);
    sleep(Duration::from_secs(200)).await;
    assert_eq!(settlement.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn overflowing_total_never_starts() {
    let settlement = MockSettlement::new(Outcome::Success);
    let service = service(settlement.clone(), Arc::new(SessionStore::new()));
    let observer = Arc::new(RecordingObserver::default());

    let mut huge = order("BTC", CountdownDuration::OneMinute);
    huge.amount = Decimal::MAX;

    let result = service
        .start_countdown(CHAT, session(), huge, observer.clone())
        .await;

    assert!(matches!(result, Err(AppError::Validation { .. })));
    assert!(!service.is_active(CHAT).await);

    sleep(Duration::from_secs(300)).await;
    assert_eq!(settlement.calls(), 0);
    assert_eq!(observer.started.load(Ordering::SeqCst), 0);
    assert!(service
        .start_countdown(
            CHAT,
            session(),
            order("BTC", CountdownDuration::OneMinute),
            observer,
        )
        .await
        .is_ok());
}

/// Holds the settlement call open until released
#[derive(Default)]
struct HeldSettlement {
    calls: AtomicUsize,
    release: Notify,
}

#[async_trait]
impl TradeSettlement for HeldSettlement {
    async fn settle(
        &self,
        _session: &Session,
        _request: &TradeRequest,
    ) -> Result<TradeReceipt, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.release.notified().await;
        Ok(TradeReceipt::default())
    }
}

#[tokio::test(start_paused = true)]
async fn settling_order_cannot_be_abandoned() {
    let settlement = Arc::new(HeldSettlement::default());
    let service = CountdownService::new(
        settlement.clone(),
        Arc::new(SessionStore::new()),
        Duration::from_secs(2),
    );
    let observer = Arc::new(RecordingObserver::default());

    service
        .start_countdown(
            CHAT,
            session(),
            order("BTC", CountdownDuration::OneMinute),
            observer.clone(),
        )
        .await
        .unwrap();

    sleep(Duration::from_millis(60_500)).await;
    assert_eq!(service.phase(CHAT).await, CountdownPhase::Settling);

    assert!(service.abandon(CHAT).await.is_none());
    assert_eq!(service.abandon_all().await, 0);
    assert_eq!(service.phase(CHAT).await, CountdownPhase::Settling);

    settlement.release.notify_one();
    sleep(Duration::from_secs(1)).await;

    assert_eq!(settlement.calls.load(Ordering::SeqCst), 1);
    assert_eq!(observer.settled.load(Ordering::SeqCst), 1);
    assert_eq!(service.phase(CHAT).await, CountdownPhase::Idle);
}

struct PanickingSettlement;

#[async_trait]
impl TradeSettlement for PanickingSettlement {
    async fn settle(
        &self,
        _session: &Session,
        _request: &TradeRequest,
    ) -> Result<TradeReceipt, AppError> {
        panic!("settlement client crashed");
    }
}

#[tokio::test(start_paused = true)]
async fn crashed_countdown_task_releases_the_chat() {
    let service = CountdownService::new(
        Arc::new(PanickingSettlement),
        Arc::new(SessionStore::new()),
        Duration::from_secs(2),
    );
    let observer = Arc::new(RecordingObserver::default());

    service
        .start_countdown(
            CHAT,
            session(),
            order("BTC", CountdownDuration::OneMinute),
            observer.clone(),
        )
        .await
        .unwrap();

    sleep(Duration::from_secs(61)).await;

    assert!(!service.is_active(CHAT).await);
    assert_eq!(service.phase(CHAT).await, CountdownPhase::FailedIdle);
    assert!(service
        .start_countdown(
            CHAT,
            session(),
            order("ETH", CountdownDuration::OneMinute),
            observer,
        )
        .await
        .is_ok());
}
