use anyhow::Result;
use log::{info, warn};
use std::sync::Arc;
use teloxide::prelude::*;

use super::{
    auth, auth_presenter, countdown_presenter, help, market_presenter, resource_presenter, trade,
    ui, MyDialogue,
};
use crate::di::ServiceContainer;
use crate::entity::{CountdownDuration, OrderType, ResourceAction, ResourceKind, State};
use crate::presenter::auth_presenter::AuthPresenter;
use crate::presenter::countdown_presenter::CountdownPresenter;
use crate::presenter::market_presenter::MarketPresenter;
use crate::presenter::resource_presenter::ResourcePresenter;
use crate::utils::parse_order_type;

/// What a button press asks for
#[derive(Debug, Clone, PartialEq)]
pub enum CallbackAction {
    Menu,
    Help,
    Market,
    CountdownStatus,
    Whoami,
    Logout,
    Order(OrderType, String),
    Duration(u64),
    CancelOrder,
    Abandon { confirmed: bool },
    List(ResourceKind),
    Review(ResourceAction, ResourceKind, String),
    Unknown,
}

pub fn parse_callback(data: &str) -> CallbackAction {
    match data {
        "menu" => return CallbackAction::Menu,
        "help" => return CallbackAction::Help,
        "market" => return CallbackAction::Market,
        "countdown_status" => return CallbackAction::CountdownStatus,
        "whoami" => return CallbackAction::Whoami,
        "logout" => return CallbackAction::Logout,
        "cancel_order" => return CallbackAction::CancelOrder,
        "abandon_yes" => return CallbackAction::Abandon { confirmed: true },
        "abandon_no" => return CallbackAction::Abandon { confirmed: false },
        _ => {}
    }

    if let Some((order_type, coin_code)) = parse_order_type(data) {
        return CallbackAction::Order(order_type, coin_code.to_string());
    }

    if let Some(seconds) = data.strip_prefix("duration_") {
        return seconds
            .parse()
            .map(CallbackAction::Duration)
            .unwrap_or(CallbackAction::Unknown);
    }

    if let Some(kind) = data.strip_prefix("list_") {
        return kind
            .parse()
            .map(CallbackAction::List)
            .unwrap_or(CallbackAction::Unknown);
    }

    for (prefix, action) in [
        ("approve_", ResourceAction::Approve),
        ("reject_", ResourceAction::Reject),
    ] {
        if let Some(rest) = data.strip_prefix(prefix) {
            return match rest.split_once('_') {
                Some((kind, id)) if !id.is_empty() => match kind.parse() {
                    Ok(kind) => CallbackAction::Review(action, kind, id.to_string()),
                    Err(_) => CallbackAction::Unknown,
                },
                _ => CallbackAction::Unknown,
            };
        }
    }

    CallbackAction::Unknown
}

// Main callback handler function
pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    dialogue: MyDialogue,
    services: Arc<ServiceContainer>,
) -> Result<()> {
    // Extract the callback data
    let callback_data = match q.data.clone() {
        Some(data) => data,
        None => return Ok(()),
    };

    // Get the chat ID
    let chat_id = match q.message {
        Some(ref msg) => msg.chat().id,
        None => return Ok(()),
    };

    info!("Received callback: {} in chat {}", callback_data, chat_id);

    // Acknowledge the callback query to stop loading animation
    if let Err(err) = bot.answer_callback_query(q.id.clone()).await {
        warn!("Failed to answer callback query: {}", err);
    }

    match parse_callback(&callback_data) {
        CallbackAction::Menu => ui::MenuCommand::show(&bot, chat_id, &services).await?,
        CallbackAction::Help => {
            bot.send_message(chat_id, help::HelpCommand::text()).await?;
        }
        CallbackAction::Market => {
            market_presenter(&bot, chat_id, &services)
                .show_market()
                .await?
        }
        CallbackAction::CountdownStatus => {
            countdown_presenter(&bot, chat_id, &services)
                .show_status()
                .await?
        }
        CallbackAction::Whoami => {
            auth_presenter(&bot, chat_id, &services)
                .show_profile()
                .await?
        }
        CallbackAction::Logout => {
            auth::logout(&bot, chat_id, false, Some(dialogue), &services).await?
        }
        CallbackAction::Order(order_type, coin_code) => {
            dialogue.reset().await?;
            trade::begin_order(&bot, chat_id, order_type, &coin_code, &dialogue, &services)
                .await?
        }
        CallbackAction::Duration(seconds) => match CountdownDuration::from_seconds(seconds) {
            Ok(duration) => {
                let state = dialogue.get().await?.unwrap_or_default();
                trade::confirm_duration(&bot, chat_id, state, duration, &dialogue, &services)
                    .await?
            }
            Err(e) => {
                bot.send_message(chat_id, format!("❌ {}", e)).await?;
            }
        },
        CallbackAction::CancelOrder => trade::cancel_entry(&bot, chat_id, &dialogue).await?,
        CallbackAction::Abandon { confirmed } => {
            let logout = match dialogue.get().await? {
                Some(State::AwaitingAbandonConfirmation { logout }) => logout,
                _ => {
                    bot.send_message(chat_id, "That question has expired.").await?;
                    return Ok(());
                }
            };
            trade::resolve_abandon(&bot, chat_id, logout, confirmed, dialogue, &services).await?
        }
        CallbackAction::List(kind) => {
            resource_presenter(&bot, chat_id, &services)
                .list(&kind.to_string())
                .await?
        }
        CallbackAction::Review(action, kind, id) => {
            resource_presenter(&bot, chat_id, &services)
                .review_record(kind, &id, action)
                .await?
        }
        CallbackAction::Unknown => {
            warn!("Unhandled callback data: {}", callback_data);
        }
    }

    Ok(())
}
