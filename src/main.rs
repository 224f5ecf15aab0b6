//! SAXO trading bot for Telegram - Main executable
//!
//! Members sign in against the SAXO backend, watch coin prices and place
//! countdown orders whose price is locked now and settled when the timer ends.
//! Admins manage banks, members, wallets and fiat requests from the same chat.
use anyhow::Context;
use dotenv::dotenv;
use log::{info, warn};
use saxo_dashboard_bot::{AppConfig, Router};
use std::env;
use teloxide::{dptree, Bot};

/// Application entry point
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    // Initialize logging with default level of "info"
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    info!(
        "Starting SAXO Telegram Bot v{}",
        saxo_dashboard_bot::VERSION
    );

    // Load and validate environment variables
    let bot_token = env::var("TELEGRAM_BOT_TOKEN")
        .context("TELEGRAM_BOT_TOKEN must be set in environment variables")?;

    let config = AppConfig::from_env().context("Failed to load SAXO_* configuration")?;
    if config.cmc_api_key.is_empty() {
        warn!("SAXO_CMC_API_KEY is not set, market prices will fail to load");
    }

    // Create Telegram bot instance
    let bot = Bot::new(bot_token);

    info!("Initializing bot application...");
    let (router, bot, service_container, storage) =
        saxo_dashboard_bot::create_application(bot, config)
            .context("Failed to initialize services")?;
    let countdown_service = service_container.countdown_service();

    // Get the handler from the router
    let handler = router.setup_handlers();

    // Build dispatcher with dependency injections and control-C handling
    let mut dispatcher = teloxide::dispatching::Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![service_container, storage])
        .enable_ctrlc_handler()
        .build();

    info!("Bot is running! Press Ctrl+C to stop.");
    dispatcher.dispatch().await;

    // Orders still counting are lost with the process, the same as closing the page
    let abandoned = countdown_service.abandon_all().await;
    if abandoned > 0 {
        warn!("Abandoned {} running countdown(s) on shutdown", abandoned);
    }
    info!("Bot stopped");

    Ok(())
}
