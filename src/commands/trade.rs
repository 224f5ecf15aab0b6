use anyhow::Result;
use log::info;
use std::sync::Arc;
use teloxide::prelude::*;

use super::{auth, auth_presenter, countdown_presenter, order_type_command, CommandHandler, MyDialogue};
use crate::di::ServiceContainer;
use crate::entity::{CountdownDuration, OrderType, State};
use crate::interactor::OrderTicket;
use crate::presenter::auth_presenter::AuthPresenter;
use crate::presenter::countdown_presenter::CountdownPresenter;
use crate::utils::{parse_duration, parse_order_args, OrderArgs};

/// Starts the buy/sell flow. Missing arguments are asked for in the dialogue.
pub async fn begin_order(
    bot: &Bot,
    chat_id: ChatId,
    order_type: OrderType,
    args: &str,
    dialogue: &MyDialogue,
    services: &ServiceContainer,
) -> Result<()> {
    let OrderArgs {
        coin_code,
        amount,
        duration,
    } = match parse_order_args(args) {
        Ok(Some(order_args)) => order_args,
        Ok(None) => {
            bot.send_message(
                chat_id,
                format!(
                    "Use: {} <coin> [amount] [seconds], or pick a coin from /market",
                    order_type_command(order_type)
                ),
            )
            .await?;
            return Ok(());
        }
        Err(e) => {
            bot.send_message(chat_id, format!("❌ {}", e)).await?;
            return Ok(());
        }
    };

    let presenter = countdown_presenter(bot, chat_id, services);
    let Some(quote) = presenter.quote_for_order(&coin_code).await? else {
        return Ok(());
    };

    info!(
        "Chat {} started a {} order for {}",
        chat_id, order_type, quote.coin_code
    );

    match (amount, duration) {
        (Some(amount), Some(duration)) => {
            let ticket = OrderTicket {
                order_type,
                coin_id: quote.coin_id,
                coin_code: quote.coin_code,
                amount,
                displayed_price: quote.price_local,
                duration,
            };
            presenter.confirm_order(ticket).await?;
        }
        (Some(amount), None) => {
            if !presenter
                .ask_duration(order_type, &quote.coin_code, amount, quote.price_local)
                .await?
            {
                return Ok(());
            }
            dialogue
                .update(State::AwaitingOrderDuration {
                    order_type,
                    coin_id: quote.coin_id,
                    coin_code: quote.coin_code,
                    displayed_price: quote.price_local,
                    amount,
                })
                .await?;
        }
        (None, _) => {
            presenter.ask_amount(order_type, &quote).await?;
            dialogue
                .update(State::AwaitingOrderAmount {
                    order_type,
                    coin_id: quote.coin_id,
                    coin_code: quote.coin_code,
                    displayed_price: quote.price_local,
                })
                .await?;
        }
    }
    Ok(())
}

pub async fn receive_amount(
    bot: Bot,
    msg: Message,
    state: State,
    dialogue: MyDialogue,
    services: Arc<ServiceContainer>,
) -> Result<()> {
    let State::AwaitingOrderAmount {
        order_type,
        coin_id,
        coin_code,
        displayed_price,
    } = state
    else {
        return Ok(());
    };

    let chat_id = msg.chat.id;
    let presenter = countdown_presenter(&bot, chat_id, &services);
    let Some(amount) = presenter.receive_amount(msg.text().unwrap_or_default()).await? else {
        // Stay in this state until a positive amount arrives
        return Ok(());
    };

    if !presenter
        .ask_duration(order_type, &coin_code, amount, displayed_price)
        .await?
    {
        return Ok(());
    }
    dialogue
        .update(State::AwaitingOrderDuration {
            order_type,
            coin_id,
            coin_code,
            displayed_price,
            amount,
        })
        .await?;
    Ok(())
}

/// Typed alternative to the duration buttons
pub async fn receive_duration(
    bot: Bot,
    msg: Message,
    state: State,
    dialogue: MyDialogue,
    services: Arc<ServiceContainer>,
) -> Result<()> {
    let chat_id = msg.chat.id;
    match parse_duration(msg.text().unwrap_or_default()) {
        Ok(duration) => confirm_duration(&bot, chat_id, state, duration, &dialogue, &services).await,
        Err(e) => {
            bot.send_message(
                chat_id,
                format!("❌ {}\nTap one of the durations above, or /cancel.", e),
            )
            .await?;
            Ok(())
        }
    }
}

pub async fn confirm_duration(
    bot: &Bot,
    chat_id: ChatId,
    state: State,
    duration: CountdownDuration,
    dialogue: &MyDialogue,
    services: &ServiceContainer,
) -> Result<()> {
    let State::AwaitingOrderDuration {
        order_type,
        coin_id,
        coin_code,
        displayed_price,
        amount,
    } = state
    else {
        bot.send_message(chat_id, "No order is waiting for a duration. Pick a coin from /market.")
            .await?;
        return Ok(());
    };

    dialogue.reset().await?;

    let ticket = OrderTicket {
        order_type,
        coin_id,
        coin_code,
        amount,
        displayed_price,
        duration,
    };
    countdown_presenter(bot, chat_id, services)
        .confirm_order(ticket)
        .await?;
    Ok(())
}

pub async fn cancel_entry(bot: &Bot, chat_id: ChatId, dialogue: &MyDialogue) -> Result<()> {
    let entering = matches!(
        dialogue.get().await?,
        Some(State::AwaitingOrderAmount { .. } | State::AwaitingOrderDuration { .. })
    );
    dialogue.reset().await?;

    let text = if entering {
        "Order cancelled, nothing was sent."
    } else {
        "Nothing is being entered. A running countdown is stopped with /abandon."
    };
    bot.send_message(chat_id, text).await?;
    Ok(())
}

fn is_yes(text: &str) -> Option<bool> {
    match text.trim().to_lowercase().as_str() {
        "yes" | "y" | "leave" => Some(true),
        "no" | "n" | "stay" => Some(false),
        _ => None,
    }
}

pub async fn receive_abandon_confirmation(
    bot: Bot,
    msg: Message,
    state: State,
    dialogue: MyDialogue,
    services: Arc<ServiceContainer>,
) -> Result<()> {
    let State::AwaitingAbandonConfirmation { logout } = state else {
        return Ok(());
    };

    match is_yes(msg.text().unwrap_or_default()) {
        Some(confirmed) => {
            resolve_abandon(&bot, msg.chat.id, logout, confirmed, dialogue, &services).await
        }
        None => {
            bot.send_message(msg.chat.id, "Please answer yes or no.")
                .await?;
            Ok(())
        }
    }
}

/// Finishes the leave-or-stay question for `/abandon` and `/logout`
pub async fn resolve_abandon(
    bot: &Bot,
    chat_id: ChatId,
    logout: bool,
    confirmed: bool,
    dialogue: MyDialogue,
    services: &ServiceContainer,
) -> Result<()> {
    if !confirmed {
        dialogue.reset().await?;
        return auth_presenter(bot, chat_id, services).stay().await;
    }

    if logout {
        auth::logout(bot, chat_id, true, Some(dialogue), services).await
    } else {
        dialogue.reset().await?;
        countdown_presenter(bot, chat_id, services).abandon().await
    }
}

pub struct BuyCommand;

impl CommandHandler for BuyCommand {
    fn command_name() -> &'static str {
        "buy"
    }

    fn description() -> &'static str {
        "buy a coin after a countdown"
    }

    async fn execute(
        bot: Bot,
        msg: Message,
        args: String,
        dialogue: Option<MyDialogue>,
        services: Arc<ServiceContainer>,
    ) -> Result<()> {
        let dialogue = dialogue.ok_or_else(|| anyhow::anyhow!("Dialogue context not provided"))?;
        begin_order(&bot, msg.chat.id, OrderType::Buy, &args, &dialogue, &services).await
    }
}

pub struct SellCommand;

impl CommandHandler for SellCommand {
    fn command_name() -> &'static str {
        "sell"
    }

    fn description() -> &'static str {
        "sell a coin after a countdown"
    }

    async fn execute(
        bot: Bot,
        msg: Message,
        args: String,
        dialogue: Option<MyDialogue>,
        services: Arc<ServiceContainer>,
    ) -> Result<()> {
        let dialogue = dialogue.ok_or_else(|| anyhow::anyhow!("Dialogue context not provided"))?;
        begin_order(&bot, msg.chat.id, OrderType::Sell, &args, &dialogue, &services).await
    }
}

pub struct StatusCommand;

impl CommandHandler for StatusCommand {
    fn command_name() -> &'static str {
        "status"
    }

    fn description() -> &'static str {
        "show the running countdown"
    }

    async fn execute(
        bot: Bot,
        msg: Message,
        _args: String,
        _dialogue: Option<MyDialogue>,
        services: Arc<ServiceContainer>,
    ) -> Result<()> {
        countdown_presenter(&bot, msg.chat.id, &services)
            .show_status()
            .await
    }
}

pub struct AbandonCommand;

impl AbandonCommand {
    pub async fn ask(
        bot: &Bot,
        chat_id: ChatId,
        dialogue: &MyDialogue,
        services: &ServiceContainer,
    ) -> Result<()> {
        if auth_presenter(bot, chat_id, services)
            .confirm_abandon()
            .await?
        {
            dialogue
                .update(State::AwaitingAbandonConfirmation { logout: false })
                .await?;
            Ok(())
        } else {
            countdown_presenter(bot, chat_id, services)
                .show_status()
                .await
        }
    }
}

impl CommandHandler for AbandonCommand {
    fn command_name() -> &'static str {
        "abandon"
    }

    fn description() -> &'static str {
        "abandon the running countdown"
    }

    async fn execute(
        bot: Bot,
        msg: Message,
        _args: String,
        dialogue: Option<MyDialogue>,
        services: Arc<ServiceContainer>,
    ) -> Result<()> {
        let dialogue = dialogue.ok_or_else(|| anyhow::anyhow!("Dialogue context not provided"))?;
        Self::ask(&bot, msg.chat.id, &dialogue, &services).await
    }
}
