use anyhow::Result;
use async_trait::async_trait;
use log::{error, info};
use rust_decimal::Decimal;
use std::sync::Arc;

use super::market_presenter::MarketPresenter;
use super::report_error;
use crate::entity::{checked_total, AppError, CoinQuote, OrderType, PendingOrder, TradeReceipt};
use crate::interactor::{AuthInteractor, CountdownInteractor, OrderTicket};
use crate::services::CountdownObserver;
use crate::utils::parse_amount;
use crate::view::countdown_view::CountdownView;

/// Banner edits are throttled to every fifth second, then every second near the end
pub fn should_refresh_banner(remaining_seconds: u64) -> bool {
    remaining_seconds <= 10 || remaining_seconds % 5 == 0
}

#[async_trait]
pub trait CountdownPresenter: Send + Sync {
    /// Returns the quote whose price will be locked, if trading may proceed
    async fn quote_for_order(&self, coin_code: &str) -> Result<Option<CoinQuote>>;
    async fn ask_amount(&self, order_type: OrderType, quote: &CoinQuote) -> Result<()>;
    async fn receive_amount(&self, amount_text: &str) -> Result<Option<Decimal>>;
    /// Returns false when the amount cannot be priced, the user must enter another
    async fn ask_duration(
        &self,
        order_type: OrderType,
        coin_code: &str,
        amount: Decimal,
        price: Decimal,
    ) -> Result<bool>;
    async fn confirm_order(&self, ticket: OrderTicket) -> Result<bool>;
    async fn show_status(&self) -> Result<()>;
    async fn abandon(&self) -> Result<()>;
}

pub struct CountdownPresenterImpl<V> {
    chat_id: i64,
    interactor: Arc<dyn CountdownInteractor>,
    auth: Arc<dyn AuthInteractor>,
    view: Arc<V>,
    reload: Arc<dyn MarketPresenter>,
}

impl<V> CountdownPresenterImpl<V>
where
    V: CountdownView + 'static,
{
    pub fn new(
        chat_id: i64,
        interactor: Arc<dyn CountdownInteractor>,
        auth: Arc<dyn AuthInteractor>,
        view: Arc<V>,
        reload: Arc<dyn MarketPresenter>,
    ) -> Self {
        Self {
            chat_id,
            interactor,
            auth,
            view,
            reload,
        }
    }

    async fn handle_error(&self, error: AppError) -> Result<()> {
        match error {
            AppError::CountdownActive => self.view.display_countdown_active().await,
            AppError::InvalidAmount | AppError::Validation { .. } => {
                self.view.display_invalid_amount(error.to_string()).await
            }
            other => report_error(&*self.view, &*self.auth, self.chat_id, other).await,
        }
    }
}

#[async_trait]
impl<V> CountdownPresenter for CountdownPresenterImpl<V>
where
    V: CountdownView + Send + Sync + 'static,
{
    async fn quote_for_order(&self, coin_code: &str) -> Result<Option<CoinQuote>> {
        match self.interactor.prepare_order(self.chat_id, coin_code).await {
            Ok(quote) => Ok(Some(quote)),
            Err(e) => {
                self.handle_error(e).await?;
                Ok(None)
            }
        }
    }

    async fn ask_amount(&self, order_type: OrderType, quote: &CoinQuote) -> Result<()> {
        self.view.prompt_for_amount(order_type, quote).await
    }

    async fn receive_amount(&self, amount_text: &str) -> Result<Option<Decimal>> {
        match parse_amount(amount_text) {
            Ok(amount) => Ok(Some(amount)),
            Err(e) => {
                self.view.display_invalid_amount(e.to_string()).await?;
                Ok(None)
            }
        }
    }

    async fn ask_duration(
        &self,
        order_type: OrderType,
        coin_code: &str,
        amount: Decimal,
        price: Decimal,
    ) -> Result<bool> {
        match checked_total(price, amount) {
            Ok(total) => {
                self.view
                    .prompt_for_duration(order_type, coin_code, amount, price, total)
                    .await?;
                Ok(true)
            }
            Err(e) => {
                self.view.display_invalid_amount(e.to_string()).await?;
                Ok(false)
            }
        }
    }

    async fn confirm_order(&self, ticket: OrderTicket) -> Result<bool> {
        let observer = Arc::new(CountdownProgress {
            view: self.view.clone(),
            reload: self.reload.clone(),
        });

        match self
            .interactor
            .start_order(self.chat_id, ticket, observer)
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => {
                self.handle_error(e).await?;
                Ok(false)
            }
        }
    }

    async fn show_status(&self) -> Result<()> {
        let (phase, order) = self.interactor.get_status(self.chat_id).await;
        self.view.display_status(phase, order.as_ref()).await
    }

    async fn abandon(&self) -> Result<()> {
        let abandoned = self.interactor.abandon(self.chat_id).await;
        self.view.display_abandoned(abandoned.as_ref()).await
    }
}

/// Forwards countdown progress to the chat
struct CountdownProgress<V> {
    view: Arc<V>,
    reload: Arc<dyn MarketPresenter>,
}

fn log_view_error(what: &str, result: Result<()>) {
    if let Err(e) = result {
        error!("Failed to display {}: {}", what, e);
    }
}

#[async_trait]
impl<V> CountdownObserver for CountdownProgress<V>
where
    V: CountdownView + Send + Sync + 'static,
{
    async fn on_started(&self, order: &PendingOrder) {
        log_view_error("countdown banner", self.view.show_banner(order).await);
    }

    async fn on_tick(&self, order: &PendingOrder) {
        if should_refresh_banner(order.remaining_seconds) {
            log_view_error("countdown banner", self.view.update_banner(order).await);
        }
    }

    async fn on_settling(&self, order: &PendingOrder) {
        log_view_error("settling notice", self.view.display_settling(order).await);
    }

    async fn on_settled(&self, order: &PendingOrder, receipt: &TradeReceipt) {
        log_view_error(
            "settlement confirmation",
            self.view
                .display_settled(order, receipt.message.as_deref())
                .await,
        );
    }

    async fn on_failed(&self, order: &PendingOrder, error: &AppError) {
        log_view_error(
            "settlement failure",
            self.view
                .display_settlement_failed(order, error.to_string())
                .await,
        );
    }

    async fn on_unauthorized(&self, _order: &PendingOrder) {
        log_view_error("session expiry", self.view.display_session_expired().await);
    }

    async fn on_reload(&self) {
        info!("Refreshing market after settlement");
        log_view_error("market refresh", self.reload.show_market().await);
    }
}
