use anyhow::Result;
use log::info;
use std::sync::Arc;
use teloxide::{prelude::*, types::ParseMode};

use super::{market_presenter, ui, CommandHandler, MyDialogue};
use crate::di::ServiceContainer;
use crate::presenter::market_presenter::MarketPresenter;

pub struct StartCommand;

impl CommandHandler for StartCommand {
    fn command_name() -> &'static str {
        "start"
    }

    fn description() -> &'static str {
        "start the bot"
    }

    async fn execute(
        bot: Bot,
        msg: Message,
        _args: String,
        _dialogue: Option<MyDialogue>,
        services: Arc<ServiceContainer>,
    ) -> Result<()> {
        let chat_id = msg.chat.id;
        info!("Start command received in chat {}", chat_id);

        match services.auth_interactor().current_session(chat_id.0).await {
            Some(session) => {
                bot.send_message(
                    chat_id,
                    format!("<b>Welcome back, {}!</b>", teloxide::utils::html::escape(&session.full_name)),
                )
                .parse_mode(ParseMode::Html)
                .await?;

                market_presenter(&bot, chat_id, &services)
                    .show_market()
                    .await?;
                ui::MenuCommand::show(&bot, chat_id, &services).await
            }
            None => {
                bot.send_message(
                    chat_id,
                    "<b>Hello!</b> I'm the SAXO trading bot.\n\n\
                    Sign in with /login &lt;email&gt; &lt;password&gt; to see coin prices and place countdown orders.\n\
                    Forgot your password? Use /forgot &lt;email&gt;.",
                )
                .parse_mode(ParseMode::Html)
                .await?;
                Ok(())
            }
        }
    }
}
