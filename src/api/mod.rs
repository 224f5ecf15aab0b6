pub mod backend_client;
pub mod market_service;
pub mod resource_service;

pub use backend_client::{AuthService, BackendClient, TradeSettlement};
pub use market_service::{CoinMarketCapService, MarketService};
pub use resource_service::{BackendResourceService, ResourceService};
