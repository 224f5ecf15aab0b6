use anyhow::Result;
use std::sync::Arc;
use teloxide::{prelude::*, utils::command::BotCommands as _};

use super::{BotCommands, CommandHandler, MyDialogue};
use crate::di::ServiceContainer;

pub struct HelpCommand;

impl HelpCommand {
    pub fn text() -> String {
        format!(
            "{}\n\nCountdown orders lock the price you see now and are sent to the exchange when the timer ends. \
            Signing out or abandoning before then cancels the order and nothing is sent.",
            BotCommands::descriptions()
        )
    }
}

impl CommandHandler for HelpCommand {
    fn command_name() -> &'static str {
        "help"
    }

    fn description() -> &'static str {
        "display this help message"
    }

    async fn execute(
        bot: Bot,
        msg: Message,
        _args: String,
        _dialogue: Option<MyDialogue>,
        _services: Arc<ServiceContainer>,
    ) -> Result<()> {
        bot.send_message(msg.chat.id, Self::text()).await?;
        Ok(())
    }
}
