use async_trait::async_trait;
use log::info;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::api::MarketService;
use crate::entity::{
    AppError, CoinQuote, CountdownDuration, CountdownPhase, OrderType, PendingOrder,
};
use crate::services::{CountdownObserver, CountdownService, SessionStore};

/// Order parameters confirmed by the user
#[derive(Debug, Clone)]
pub struct OrderTicket {
    pub order_type: OrderType,
    pub coin_id: String,
    pub coin_code: String,
    pub amount: Decimal,
    /// Unit price the user was shown, locked for the whole countdown
    pub displayed_price: Decimal,
    pub duration: CountdownDuration,
}

#[async_trait]
pub trait CountdownInteractor: Send + Sync {
    /// Looks up the coin a user wants to trade. Refused while a countdown runs.
    async fn prepare_order(&self, chat_id: i64, coin_code: &str) -> Result<CoinQuote, AppError>;
    async fn start_order(
        &self,
        chat_id: i64,
        ticket: OrderTicket,
        observer: Arc<dyn CountdownObserver>,
    ) -> Result<PendingOrder, AppError>;
    async fn get_status(&self, chat_id: i64) -> (CountdownPhase, Option<PendingOrder>);
    async fn abandon(&self, chat_id: i64) -> Option<PendingOrder>;
}

pub struct CountdownInteractorImpl {
    market_service: Arc<dyn MarketService>,
    sessions: Arc<SessionStore>,
    countdowns: Arc<CountdownService>,
}

impl CountdownInteractorImpl {
    pub fn new(
        market_service: Arc<dyn MarketService>,
        sessions: Arc<SessionStore>,
        countdowns: Arc<CountdownService>,
    ) -> Self {
        Self {
            market_service,
            sessions,
            countdowns,
        }
    }
}

#[async_trait]
impl CountdownInteractor for CountdownInteractorImpl {
    async fn prepare_order(&self, chat_id: i64, coin_code: &str) -> Result<CoinQuote, AppError> {
        let session = self.sessions.require(chat_id).await?;
        if self.countdowns.is_active(chat_id).await {
            return Err(AppError::CountdownActive);
        }

        self.market_service.quote_for(&session, coin_code).await
    }

    async fn start_order(
        &self,
        chat_id: i64,
        ticket: OrderTicket,
        observer: Arc<dyn CountdownObserver>,
    ) -> Result<PendingOrder, AppError> {
        let session = self.sessions.require(chat_id).await?;

        let order = PendingOrder::new(
            &ticket.coin_id,
            &ticket.coin_code,
            ticket.order_type,
            ticket.amount,
            ticket.displayed_price,
            ticket.duration,
        )?;

        info!(
            "Chat {} confirmed {} {} {} over {}",
            chat_id,
            ticket.order_type,
            ticket.amount,
            ticket.coin_code,
            ticket.duration.label()
        );

        self.countdowns
            .start_countdown(chat_id, session, order, observer)
            .await
    }

    async fn get_status(&self, chat_id: i64) -> (CountdownPhase, Option<PendingOrder>) {
        (
            self.countdowns.phase(chat_id).await,
            self.countdowns.snapshot(chat_id).await,
        )
    }

    async fn abandon(&self, chat_id: i64) -> Option<PendingOrder> {
        self.countdowns.abandon(chat_id).await
    }
}
