use async_trait::async_trait;
use log::{debug, error, info, warn};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::select;
use tokio::sync::{mpsc, Mutex};
use tokio::time::{interval, sleep};

use crate::api::TradeSettlement;
use crate::entity::{AppError, CountdownPhase, PendingOrder, Session, TradeReceipt, TradeRequest};
use crate::services::session_store::SessionStore;
use uuid::Uuid;

/// Receives the progress of one countdown order
#[async_trait]
pub trait CountdownObserver: Send + Sync {
    async fn on_started(&self, order: &PendingOrder);
    async fn on_tick(&self, order: &PendingOrder);
    async fn on_settling(&self, order: &PendingOrder);
    async fn on_settled(&self, order: &PendingOrder, receipt: &TradeReceipt);
    async fn on_failed(&self, order: &PendingOrder, error: &AppError);
    async fn on_unauthorized(&self, order: &PendingOrder);
    /// Fired a fixed delay after a successful settlement
    async fn on_reload(&self);
}

struct Slot {
    order: PendingOrder,
    phase: CountdownPhase,
    stop_tx: mpsc::Sender<()>,
}

/// Runs delayed orders: one active countdown per chat, one timer task per countdown
pub struct CountdownService {
    settlement: Arc<dyn TradeSettlement>,
    sessions: Arc<SessionStore>,
    slots: Arc<Mutex<HashMap<i64, Slot>>>,
    failed: Arc<Mutex<HashSet<i64>>>,
    reload_delay: Duration,
}

impl CountdownService {
    pub fn new(
        settlement: Arc<dyn TradeSettlement>,
        sessions: Arc<SessionStore>,
        reload_delay: Duration,
    ) -> Self {
        Self {
            settlement,
            sessions,
            slots: Arc::new(Mutex::new(HashMap::new())),
            failed: Arc::new(Mutex::new(HashSet::new())),
            reload_delay,
        }
    }

    /// Locks in the order and starts its one-second timer.
    /// Refused while the chat already has a countdown running.
    pub async fn start_countdown(
        &self,
        chat_id: i64,
        session: Session,
        mut order: PendingOrder,
        observer: Arc<dyn CountdownObserver>,
    ) -> Result<PendingOrder, AppError> {
        if order.amount <= Decimal::ZERO {
            return Err(AppError::InvalidAmount);
        }
        order.total_value()?;
        order.remaining_seconds = order.duration.seconds();

        let mut slots = self.slots.lock().await;
        if slots.contains_key(&chat_id) {
            warn!("Chat {} tried to start a second countdown", chat_id);
            return Err(AppError::CountdownActive);
        }
        self.failed.lock().await.remove(&chat_id);

        let (stop_tx, stop_rx) = mpsc::channel::<()>(1);
        slots.insert(
            chat_id,
            Slot {
                order: order.clone(),
                phase: CountdownPhase::Counting {
                    remaining_seconds: order.remaining_seconds,
                },
                stop_tx,
            },
        );

        info!(
            "Countdown {} started for chat {}: {} {} {} @ {} in {}s",
            order.id,
            chat_id,
            order.order_type,
            order.amount,
            order.coin_code,
            order.price_at_order_creation,
            order.remaining_seconds
        );

        let task = CountdownTask {
            chat_id,
            session,
            order: order.clone(),
            observer,
            settlement: self.settlement.clone(),
            sessions: self.sessions.clone(),
            slots: self.slots.clone(),
            failed: self.failed.clone(),
            reload_delay: self.reload_delay,
            release: SlotRelease {
                chat_id,
                order_id: order.id,
                slots: self.slots.clone(),
                failed: self.failed.clone(),
                armed: true,
            },
        };
        tokio::spawn(task.run(stop_rx));

        Ok(order)
    }

    pub async fn phase(&self, chat_id: i64) -> CountdownPhase {
        if let Some(slot) = self.slots.lock().await.get(&chat_id) {
            return slot.phase;
        }
        if self.failed.lock().await.contains(&chat_id) {
            CountdownPhase::FailedIdle
        } else {
            CountdownPhase::Idle
        }
    }

    pub async fn is_active(&self, chat_id: i64) -> bool {
        self.slots.lock().await.contains_key(&chat_id)
    }

    /// Current state of the chat's running order
    pub async fn snapshot(&self, chat_id: i64) -> Option<PendingOrder> {
        self.slots
            .lock()
            .await
            .get(&chat_id)
            .map(|slot| slot.order.clone())
    }

    /// Drops a counting order without contacting the backend.
    /// An order already settling cannot be taken back and is left alone.
    pub async fn abandon(&self, chat_id: i64) -> Option<PendingOrder> {
        let mut slots = self.slots.lock().await;

        match slots.get(&chat_id) {
            Some(slot) if matches!(slot.phase, CountdownPhase::Counting { .. }) => {}
            Some(_) => {
                warn!("Chat {} left while its order was settling", chat_id);
                return None;
            }
            None => return None,
        }

        let slot = slots.remove(&chat_id)?;
        // The task may already be gone; the removed slot stops it either way
        let _ = slot.stop_tx.try_send(());
        warn!(
            "Countdown {} abandoned by chat {} with {}s left, nothing was sent",
            slot.order.id, chat_id, slot.order.remaining_seconds
        );
        Some(slot.order)
    }

    /// Abandons every counting order, used on shutdown
    pub async fn abandon_all(&self) -> usize {
        let chat_ids: Vec<i64> = self.slots.lock().await.keys().copied().collect();

        let mut abandoned = 0;
        for chat_id in chat_ids {
            if self.abandon(chat_id).await.is_some() {
                abandoned += 1;
            }
        }
        abandoned
    }
}

struct CountdownTask {
    chat_id: i64,
    session: Session,
    order: PendingOrder,
    observer: Arc<dyn CountdownObserver>,
    settlement: Arc<dyn TradeSettlement>,
    sessions: Arc<SessionStore>,
    slots: Arc<Mutex<HashMap<i64, Slot>>>,
    failed: Arc<Mutex<HashSet<i64>>>,
    reload_delay: Duration,
    release: SlotRelease,
}

/// Frees the chat's slot when its task ends without settling, panics included.
/// The chat is then reported as `FailedIdle`.
struct SlotRelease {
    chat_id: i64,
    order_id: Uuid,
    slots: Arc<Mutex<HashMap<i64, Slot>>>,
    failed: Arc<Mutex<HashSet<i64>>>,
    armed: bool,
}

impl Drop for SlotRelease {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let (chat_id, order_id) = (self.chat_id, self.order_id);
        let slots = self.slots.clone();
        let failed = self.failed.clone();

        let Ok(handle) = Handle::try_current() else {
            warn!("No runtime to release countdown {} of chat {}", order_id, chat_id);
            return;
        };
        handle.spawn(async move {
            let mut slots = slots.lock().await;
            // Abandoned or finished slots are already gone; a newer order keeps its slot
            if slots.get(&chat_id).map(|slot| slot.order.id) == Some(order_id) {
                slots.remove(&chat_id);
                failed.lock().await.insert(chat_id);
                error!(
                    "Countdown {} of chat {} ended unexpectedly, slot released",
                    order_id, chat_id
                );
            }
        });
    }
}

impl CountdownTask {
    async fn run(mut self, mut stop_rx: mpsc::Receiver<()>) {
        self.observer.on_started(&self.order).await;

        let mut ticker = interval(Duration::from_secs(1));
        // The first tick of an interval completes immediately
        ticker.tick().await;

        loop {
            select! {
                _ = ticker.tick() => {
                    let finished = self.order.tick();

                    if !self.record_tick(finished).await {
                        debug!("Countdown {} no longer registered, stopping", self.order.id);
                        return;
                    }
                    if finished {
                        break;
                    }
                    self.observer.on_tick(&self.order).await;
                }
                _ = stop_rx.recv() => {
                    debug!("Countdown {} stopped", self.order.id);
                    return;
                }
            }
        }

        self.execute_trade().await;
    }

    // Mirrors the tick into the slot. False when the slot was abandoned.
    async fn record_tick(&self, finished: bool) -> bool {
        let mut slots = self.slots.lock().await;

        match slots.get_mut(&self.chat_id) {
            Some(slot) if slot.order.id == self.order.id => {
                slot.order.remaining_seconds = self.order.remaining_seconds;
                slot.phase = if finished {
                    CountdownPhase::Settling
                } else {
                    CountdownPhase::Counting {
                        remaining_seconds: self.order.remaining_seconds,
                    }
                };
                true
            }
            _ => false,
        }
    }

    async fn execute_trade(mut self) {
        self.observer.on_settling(&self.order).await;

        let result = match TradeRequest::try_from(&self.order) {
            Ok(request) => self.settlement.settle(&self.session, &request).await,
            Err(e) => Err(e),
        };

        self.slots.lock().await.remove(&self.chat_id);
        self.release.armed = false;

        match result {
            Ok(receipt) => {
                info!(
                    "Countdown {} settled for chat {}",
                    self.order.id, self.chat_id
                );
                self.observer.on_settled(&self.order, &receipt).await;
                sleep(self.reload_delay).await;
                self.observer.on_reload().await;
            }
            Err(AppError::Unauthorized) => {
                warn!(
                    "Countdown {} rejected as unauthorized, signing chat {} out",
                    self.order.id, self.chat_id
                );
                self.failed.lock().await.insert(self.chat_id);
                self.sessions.clear(self.chat_id).await;
                self.observer.on_unauthorized(&self.order).await;
            }
            Err(e) => {
                error!(
                    "Countdown {} settlement failed for chat {}: {}",
                    self.order.id, self.chat_id, e
                );
                self.failed.lock().await.insert(self.chat_id);
                self.observer.on_failed(&self.order, &e).await;
            }
        }
    }
}
