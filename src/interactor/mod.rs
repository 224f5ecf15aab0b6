pub mod auth_interactor;
pub mod countdown_interactor;
pub mod market_interactor;
pub mod resource_interactor;

pub use auth_interactor::{AuthInteractor, AuthInteractorImpl};
pub use countdown_interactor::{CountdownInteractor, CountdownInteractorImpl, OrderTicket};
pub use market_interactor::{MarketInteractor, MarketInteractorImpl, MarketOverview};
pub use resource_interactor::{ResourceInteractor, ResourceInteractorImpl};
