use std::sync::Arc;

use log::info;

use crate::api::{
    AuthService, BackendClient, BackendResourceService, CoinMarketCapService, MarketService,
    ResourceService, TradeSettlement,
};
use crate::app_config::AppConfig;
use crate::entity::AppError;
use crate::interactor::{
    AuthInteractor, AuthInteractorImpl, CountdownInteractor, CountdownInteractorImpl,
    MarketInteractor, MarketInteractorImpl, ResourceInteractor, ResourceInteractorImpl,
};
use crate::services::{CountdownService, SessionStore};

/// ServiceContainer provides access to core application dependencies
pub struct ServiceContainer {
    config: AppConfig,

    // Shared state
    sessions: Arc<SessionStore>,
    countdown_service: Arc<CountdownService>,

    // Interactors
    auth_interactor: Arc<dyn AuthInteractor>,
    market_interactor: Arc<dyn MarketInteractor>,
    countdown_interactor: Arc<dyn CountdownInteractor>,
    resource_interactor: Arc<dyn ResourceInteractor>,
}

impl ServiceContainer {
    /// Create a new service container from the loaded configuration
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        info!(
            "Using backend {} with local currency {}",
            config.backend_url, config.local_currency
        );

        let backend = Arc::new(BackendClient::new(config.clone())?);
        let auth_service = backend.clone() as Arc<dyn AuthService>;
        let settlement = backend.clone() as Arc<dyn TradeSettlement>;
        let market_service = Arc::new(CoinMarketCapService::new(backend.clone(), config.clone())?)
            as Arc<dyn MarketService>;
        let resource_service =
            Arc::new(BackendResourceService::new(backend)) as Arc<dyn ResourceService>;

        Ok(Self::with_services(
            config,
            auth_service,
            settlement,
            market_service,
            resource_service,
        ))
    }

    /// Wires interactors around the given services
    pub fn with_services(
        config: AppConfig,
        auth_service: Arc<dyn AuthService>,
        settlement: Arc<dyn TradeSettlement>,
        market_service: Arc<dyn MarketService>,
        resource_service: Arc<dyn ResourceService>,
    ) -> Self {
        let sessions = Arc::new(SessionStore::new());
        let countdown_service = Arc::new(CountdownService::new(
            settlement,
            sessions.clone(),
            config.reload_delay(),
        ));

        let auth_interactor = Arc::new(AuthInteractorImpl::new(
            auth_service,
            sessions.clone(),
            countdown_service.clone(),
        )) as Arc<dyn AuthInteractor>;
        let market_interactor = Arc::new(MarketInteractorImpl::new(
            market_service.clone(),
            sessions.clone(),
            countdown_service.clone(),
        )) as Arc<dyn MarketInteractor>;
        let countdown_interactor = Arc::new(CountdownInteractorImpl::new(
            market_service,
            sessions.clone(),
            countdown_service.clone(),
        )) as Arc<dyn CountdownInteractor>;
        let resource_interactor = Arc::new(ResourceInteractorImpl::new(
            resource_service,
            sessions.clone(),
        )) as Arc<dyn ResourceInteractor>;

        Self {
            config,
            sessions,
            countdown_service,
            auth_interactor,
            market_interactor,
            countdown_interactor,
            resource_interactor,
        }
    }

    // Accessor methods

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn local_currency(&self) -> &str {
        &self.config.local_currency
    }

    pub fn sessions(&self) -> Arc<SessionStore> {
        self.sessions.clone()
    }

    pub fn countdown_service(&self) -> Arc<CountdownService> {
        self.countdown_service.clone()
    }

    pub fn auth_interactor(&self) -> Arc<dyn AuthInteractor> {
        self.auth_interactor.clone()
    }

    pub fn market_interactor(&self) -> Arc<dyn MarketInteractor> {
        self.market_interactor.clone()
    }

    pub fn countdown_interactor(&self) -> Arc<dyn CountdownInteractor> {
        self.countdown_interactor.clone()
    }

    pub fn resource_interactor(&self) -> Arc<dyn ResourceInteractor> {
        self.resource_interactor.clone()
    }
}
