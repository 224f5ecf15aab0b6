use anyhow::Result;
use async_trait::async_trait;
use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, ParseMode},
    utils::html,
    Bot,
};

use super::ErrorView;
use crate::entity::{CountdownPhase, PendingOrder, Session};
use crate::utils::format_remaining;

#[async_trait]
pub trait AuthView: ErrorView {
    async fn display_logged_in(&self, session: &Session) -> Result<()>;
    async fn display_logged_out(&self, abandoned: Option<&PendingOrder>) -> Result<()>;
    async fn display_login_usage(&self) -> Result<()>;
    async fn display_reset_sent(&self, email: &str) -> Result<()>;
    async fn display_profile(&self, session: &Session, phase: CountdownPhase) -> Result<()>;
    /// Leaving now drops the running order; ask first
    async fn prompt_abandon(&self, order: &PendingOrder) -> Result<()>;
    async fn display_stayed(&self) -> Result<()>;
}

pub struct TelegramAuthView {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramAuthView {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }
}

#[async_trait]
impl ErrorView for TelegramAuthView {
    async fn display_error(&self, error_message: String) -> Result<()> {
        self.bot
            .send_message(self.chat_id, format!("❌ {}", error_message))
            .await?;
        Ok(())
    }

    async fn display_session_expired(&self) -> Result<()> {
        self.bot
            .send_message(
                self.chat_id,
                "🔒 Your session has expired. Please sign in again with /login <email> <password>",
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl AuthView for TelegramAuthView {
    async fn display_logged_in(&self, session: &Session) -> Result<()> {
        let keyboard = InlineKeyboardMarkup::new(vec![vec![
            InlineKeyboardButton::callback("📈 Market", "market"),
            InlineKeyboardButton::callback("Help", "help"),
        ]]);

        self.bot
            .send_message(
                self.chat_id,
                format!(
                    "✅ Welcome, <b>{}</b>!\nSigned in as {}.",
                    html::escape(&session.full_name),
                    session.role()
                ),
            )
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboard)
            .await?;
        Ok(())
    }

    async fn display_logged_out(&self, abandoned: Option<&PendingOrder>) -> Result<()> {
        let text = match abandoned {
            Some(order) => format!(
                "Signed out. Your {} {} {} order was abandoned and never sent.",
                order.order_type, order.amount, order.coin_code
            ),
            None => "Signed out.".to_string(),
        };
        self.bot.send_message(self.chat_id, text).await?;
        Ok(())
    }

    async fn display_login_usage(&self) -> Result<()> {
        self.bot
            .send_message(
                self.chat_id,
                "Use the command in this format: /login <email> <password>\n\nForgot your password? /forgot <email>",
            )
            .await?;
        Ok(())
    }

    async fn display_reset_sent(&self, email: &str) -> Result<()> {
        self.bot
            .send_message(
                self.chat_id,
                format!("📧 If {} is registered, a reset link is on its way.", email),
            )
            .await?;
        Ok(())
    }

    async fn display_profile(&self, session: &Session, phase: CountdownPhase) -> Result<()> {
        let countdown = match phase {
            CountdownPhase::Idle => "none".to_string(),
            CountdownPhase::Counting { remaining_seconds } => {
                format!("running, {} left", format_remaining(remaining_seconds))
            }
            CountdownPhase::Settling => "settling".to_string(),
            CountdownPhase::FailedIdle => "none (last settlement failed)".to_string(),
        };

        self.bot
            .send_message(
                self.chat_id,
                format!(
                    "👤 <b>{}</b>\nRole: {}\nCountdown order: {}",
                    html::escape(&session.full_name),
                    session.role(),
                    countdown
                ),
            )
            .parse_mode(ParseMode::Html)
            .await?;
        Ok(())
    }

    async fn prompt_abandon(&self, order: &PendingOrder) -> Result<()> {
        let keyboard = InlineKeyboardMarkup::new(vec![vec![
            InlineKeyboardButton::callback("Leave anyway", "abandon_yes"),
            InlineKeyboardButton::callback("Stay", "abandon_no"),
        ]]);

        self.bot
            .send_message(
                self.chat_id,
                format!(
                    "⚠️ Your {} {} {} order settles in {}.\nIf you leave now the order is lost and nothing is sent. Leave anyway? (yes/no)",
                    order.order_type,
                    order.amount,
                    order.coin_code,
                    format_remaining(order.remaining_seconds)
                ),
            )
            .reply_markup(keyboard)
            .await?;
        Ok(())
    }

    async fn display_stayed(&self) -> Result<()> {
        self.bot
            .send_message(self.chat_id, "Good, your countdown keeps running.")
            .await?;
        Ok(())
    }
}
