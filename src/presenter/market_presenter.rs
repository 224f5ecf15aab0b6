use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use super::report_error;
use crate::interactor::{AuthInteractor, MarketInteractor};
use crate::view::market_view::MarketView;

#[async_trait]
pub trait MarketPresenter: Send + Sync {
    async fn show_market(&self) -> Result<()>;
}

pub struct MarketPresenterImpl<V> {
    chat_id: i64,
    interactor: Arc<dyn MarketInteractor>,
    auth: Arc<dyn AuthInteractor>,
    view: Arc<V>,
}

impl<V> MarketPresenterImpl<V>
where
    V: MarketView,
{
    pub fn new(
        chat_id: i64,
        interactor: Arc<dyn MarketInteractor>,
        auth: Arc<dyn AuthInteractor>,
        view: Arc<V>,
    ) -> Self {
        Self {
            chat_id,
            interactor,
            auth,
            view,
        }
    }
}

#[async_trait]
impl<V> MarketPresenter for MarketPresenterImpl<V>
where
    V: MarketView + Send + Sync,
{
    async fn show_market(&self) -> Result<()> {
        let loading = self.view.display_loading().await?;

        match self.interactor.get_overview(self.chat_id).await {
            Ok(overview) => self.view.display_market(&overview, loading).await,
            Err(e) => report_error(&*self.view, &*self.auth, self.chat_id, e).await,
        }
    }
}
