use async_trait::async_trait;
use std::sync::Arc;

use crate::api::MarketService;
use crate::entity::{AppError, CoinQuote};
use crate::services::{CountdownService, SessionStore};

#[derive(Debug)]
pub struct MarketOverview {
    pub quotes: Vec<CoinQuote>,
    /// Trade buttons are hidden while a countdown runs
    pub trading_enabled: bool,
}

#[async_trait]
pub trait MarketInteractor: Send + Sync {
    async fn get_overview(&self, chat_id: i64) -> Result<MarketOverview, AppError>;
}

pub struct MarketInteractorImpl {
    market_service: Arc<dyn MarketService>,
    sessions: Arc<SessionStore>,
    countdowns: Arc<CountdownService>,
}

impl MarketInteractorImpl {
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
impl MarketInteractor for MarketInteractorImpl {
    async fn get_overview(&self, chat_id: i64) -> Result<MarketOverview, AppError> {
        let session = self.sessions.require(chat_id).await?;
        let quotes = self.market_service.quotes(&session).await?;

        Ok(MarketOverview {
            quotes,
            trading_enabled: !self.countdowns.is_active(chat_id).await,
        })
    }
}
