use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;

use super::{market_presenter, CommandHandler, MyDialogue};
use crate::di::ServiceContainer;
use crate::presenter::market_presenter::MarketPresenter;

pub struct MarketCommand;

impl CommandHandler for MarketCommand {
    fn command_name() -> &'static str {
        "market"
    }

    fn description() -> &'static str {
        "show coin prices"
    }

    async fn execute(
        bot: Bot,
        msg: Message,
        _args: String,
        _dialogue: Option<MyDialogue>,
        services: Arc<ServiceContainer>,
    ) -> Result<()> {
        market_presenter(&bot, msg.chat.id, &services)
            .show_market()
            .await
    }
}
