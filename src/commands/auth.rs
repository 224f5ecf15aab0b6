use anyhow::Result;
use log::{info, warn};
use std::sync::Arc;
use teloxide::prelude::*;

use super::{auth_presenter, market_presenter, ui, CommandHandler, MyDialogue};
use crate::di::ServiceContainer;
use crate::entity::State;
use crate::presenter::auth_presenter::{AuthPresenter, LogoutOutcome};
use crate::presenter::market_presenter::MarketPresenter;

pub struct LoginCommand;

impl CommandHandler for LoginCommand {
    fn command_name() -> &'static str {
        "login"
    }

    fn description() -> &'static str {
        "sign in with email and password"
    }

    async fn execute(
        bot: Bot,
        msg: Message,
        args: String,
        _dialogue: Option<MyDialogue>,
        services: Arc<ServiceContainer>,
    ) -> Result<()> {
        let chat_id = msg.chat.id;

        // The password should not stay in the chat history
        if !args.trim().is_empty() {
            if let Err(e) = bot.delete_message(chat_id, msg.id).await {
                warn!("Could not delete login message in chat {}: {}", chat_id, e);
            }
        }

        let signed_in = auth_presenter(&bot, chat_id, &services)
            .login(&args)
            .await?;

        if signed_in {
            info!("Chat {} signed in", chat_id);
            market_presenter(&bot, chat_id, &services)
                .show_market()
                .await?;
            ui::MenuCommand::show(&bot, chat_id, &services).await?;
        }
        Ok(())
    }
}

/// Signs out, asking first when a countdown is running
pub async fn logout(
    bot: &Bot,
    chat_id: ChatId,
    confirmed: bool,
    dialogue: Option<MyDialogue>,
    services: &ServiceContainer,
) -> Result<()> {
    let outcome = auth_presenter(bot, chat_id, services)
        .logout(confirmed)
        .await?;

    if let Some(dialogue) = dialogue {
        match outcome {
            LogoutOutcome::AwaitingConfirmation => {
                dialogue
                    .update(State::AwaitingAbandonConfirmation { logout: true })
                    .await?
            }
            LogoutOutcome::SignedOut | LogoutOutcome::Failed => dialogue.reset().await?,
        }
    }
    Ok(())
}

pub struct LogoutCommand;

impl CommandHandler for LogoutCommand {
    fn command_name() -> &'static str {
        "logout"
    }

    fn description() -> &'static str {
        "sign out"
    }

    async fn execute(
        bot: Bot,
        msg: Message,
        _args: String,
        dialogue: Option<MyDialogue>,
        services: Arc<ServiceContainer>,
    ) -> Result<()> {
        logout(&bot, msg.chat.id, false, dialogue, &services).await
    }
}

pub struct ForgotPasswordCommand;

impl CommandHandler for ForgotPasswordCommand {
    fn command_name() -> &'static str {
        "forgot"
    }

    fn description() -> &'static str {
        "send a password reset email"
    }

    async fn execute(
        bot: Bot,
        msg: Message,
        args: String,
        _dialogue: Option<MyDialogue>,
        services: Arc<ServiceContainer>,
    ) -> Result<()> {
        auth_presenter(&bot, msg.chat.id, &services)
            .forgot_password(&args)
            .await
    }
}

pub struct WhoamiCommand;

impl CommandHandler for WhoamiCommand {
    fn command_name() -> &'static str {
        "whoami"
    }

    fn description() -> &'static str {
        "show your account"
    }

    async fn execute(
        bot: Bot,
        msg: Message,
        _args: String,
        _dialogue: Option<MyDialogue>,
        services: Arc<ServiceContainer>,
    ) -> Result<()> {
        auth_presenter(&bot, msg.chat.id, &services)
            .show_profile()
            .await
    }
}
