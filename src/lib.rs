pub mod api;
pub mod app_config;
pub mod commands;
pub mod di;
pub mod entity;
pub mod interactor;
pub mod presenter;
pub mod router;
pub mod services;
pub mod utils;
pub mod view;

use std::sync::Arc;
use teloxide::{dispatching::dialogue::InMemStorage, Bot};

// Re-export commonly used items
pub use app_config::AppConfig;
pub use commands::{BotCommands, MyDialogue};
pub use di::ServiceContainer;
pub use entity::*;
pub use router::{Router, TelegramRouter};
pub use services::CountdownService;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Wires the router, services and dialogue storage for the dispatcher
pub fn create_application(
    bot: Bot,
    config: AppConfig,
) -> Result<
    (
        TelegramRouter,
        Bot,
        Arc<ServiceContainer>,
        Arc<InMemStorage<State>>,
    ),
    AppError,
> {
    let services = Arc::new(ServiceContainer::new(config)?);
    let storage = InMemStorage::<State>::new();
    Ok((TelegramRouter::new(), bot, services, storage))
}
