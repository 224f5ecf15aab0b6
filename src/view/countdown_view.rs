use anyhow::Result;
use async_trait::async_trait;
use log::warn;
use rust_decimal::Decimal;
use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, MessageId},
    Bot,
};
use tokio::sync::Mutex;

use super::ErrorView;
use crate::entity::{CoinQuote, CountdownDuration, CountdownPhase, OrderType, PendingOrder};
use crate::utils::{format_money, format_remaining};

#[async_trait]
pub trait CountdownView: ErrorView {
    async fn prompt_for_amount(&self, order_type: OrderType, quote: &CoinQuote) -> Result<()>;
    async fn prompt_for_duration(
        &self,
        order_type: OrderType,
        coin_code: &str,
        amount: Decimal,
        price: Decimal,
        total: Decimal,
    ) -> Result<()>;
    async fn display_invalid_amount(&self, error_message: String) -> Result<()>;
    async fn display_countdown_active(&self) -> Result<()>;
    async fn show_banner(&self, order: &PendingOrder) -> Result<()>;
    async fn update_banner(&self, order: &PendingOrder) -> Result<()>;
    async fn display_settling(&self, order: &PendingOrder) -> Result<()>;
    async fn display_settled(&self, order: &PendingOrder, message: Option<&str>) -> Result<()>;
    async fn display_settlement_failed(&self, order: &PendingOrder, error_message: String) -> Result<()>;
    async fn display_status(&self, phase: CountdownPhase, order: Option<&PendingOrder>) -> Result<()>;
    async fn display_abandoned(&self, order: Option<&PendingOrder>) -> Result<()>;
}

pub struct TelegramCountdownView {
    bot: Bot,
    chat_id: ChatId,
    currency: String,
    banner: Mutex<Option<MessageId>>,
}

impl TelegramCountdownView {
    pub fn new(bot: Bot, chat_id: ChatId, currency: &str) -> Self {
        Self {
            bot,
            chat_id,
            currency: currency.to_uppercase(),
            banner: Mutex::new(None),
        }
    }

    fn total_text(&self, order: &PendingOrder) -> String {
        match order.total_value() {
            Ok(total) => format_money(total, &self.currency),
            Err(_) => "out of range".to_string(),
        }
    }

    fn banner_text(&self, order: &PendingOrder) -> String {
        format!(
            "⏳ {} {} {} @ {}\nTotal: {}\nSettles in {}\n\nDo not sign out until it settles, leaving abandons the order.",
            order.order_type,
            order.amount,
            order.coin_code,
            format_money(order.price_at_order_creation, &self.currency),
            self.total_text(order),
            format_remaining(order.remaining_seconds)
        )
    }

    async fn edit_banner(&self, text: String) -> Result<()> {
        let banner = *self.banner.lock().await;

        match banner {
            Some(message_id) => {
                // Telegram rejects edits that change nothing; the banner is cosmetic
                if let Err(e) = self
                    .bot
                    .edit_message_text(self.chat_id, message_id, text)
                    .await
                {
                    warn!("Failed to update countdown banner: {}", e);
                }
            }
            None => {
                let message = self.bot.send_message(self.chat_id, text).await?;
                *self.banner.lock().await = Some(message.id);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ErrorView for TelegramCountdownView {
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
impl CountdownView for TelegramCountdownView {
    async fn prompt_for_amount(&self, order_type: OrderType, quote: &CoinQuote) -> Result<()> {
        self.bot
            .send_message(
                self.chat_id,
                format!(
                    "{} {} ({})\nCurrent price: {}\n\nHow many {} do you want to {}? The price above is locked when the countdown starts.",
                    order_type,
                    quote.coin_code,
                    quote.name,
                    format_money(quote.price_local, &quote.local_currency),
                    quote.coin_code,
                    order_type.to_string().to_lowercase()
                ),
            )
            .await?;
        Ok(())
    }

    async fn prompt_for_duration(
        &self,
        order_type: OrderType,
        coin_code: &str,
        amount: Decimal,
        price: Decimal,
        total: Decimal,
    ) -> Result<()> {
        let buttons: Vec<InlineKeyboardButton> = CountdownDuration::ALL
            .iter()
            .map(|d| {
                InlineKeyboardButton::callback(d.label(), format!("duration_{}", d.seconds()))
            })
            .collect();
        let keyboard = InlineKeyboardMarkup::new(vec![
            buttons,
            vec![InlineKeyboardButton::callback("← Cancel", "cancel_order")],
        ]);

        self.bot
            .send_message(
                self.chat_id,
                format!(
                    "{} {} {} @ {} (total {})\n\nWhen should the order settle?",
                    order_type,
                    amount,
                    coin_code,
                    format_money(price, &self.currency),
                    format_money(total, &self.currency)
                ),
            )
            .reply_markup(keyboard)
            .await?;
        Ok(())
    }

    async fn display_invalid_amount(&self, error_message: String) -> Result<()> {
        self.bot
            .send_message(
                self.chat_id,
                format!("{}\nPlease enter another amount:", error_message),
            )
            .await?;
        Ok(())
    }

    async fn display_countdown_active(&self) -> Result<()> {
        self.bot
            .send_message(
                self.chat_id,
                "⏳ A countdown order is already running. Trading is paused until it settles, see /status.",
            )
            .await?;
        Ok(())
    }

    async fn show_banner(&self, order: &PendingOrder) -> Result<()> {
        let message = self
            .bot
            .send_message(self.chat_id, self.banner_text(order))
            .await?;
        *self.banner.lock().await = Some(message.id);
        Ok(())
    }

    async fn update_banner(&self, order: &PendingOrder) -> Result<()> {
        self.edit_banner(self.banner_text(order)).await
    }

    async fn display_settling(&self, order: &PendingOrder) -> Result<()> {
        self.edit_banner(format!(
            "⌛ Settling {} {} {}...",
            order.order_type, order.amount, order.coin_code
        ))
        .await
    }

    async fn display_settled(&self, order: &PendingOrder, message: Option<&str>) -> Result<()> {
        let mut text = format!(
            "✅ {} order completed.\nAmount: {} {}\nPrice: {}\nTotal: {}",
            order.order_type,
            order.amount,
            order.coin_code,
            format_money(order.price_at_order_creation, &self.currency),
            self.total_text(order)
        );
        if let Some(message) = message {
            text.push_str(&format!("\n{}", message));
        }

        self.edit_banner(text).await
    }

    async fn display_settlement_failed(&self, order: &PendingOrder, error_message: String) -> Result<()> {
        self.edit_banner(format!(
            "❌ {} order for {} {} failed:\n{}\n\nNothing was retried. You can place a new order.",
            order.order_type, order.amount, order.coin_code, error_message
        ))
        .await
    }

    async fn display_status(&self, phase: CountdownPhase, order: Option<&PendingOrder>) -> Result<()> {
        let text = match (phase, order) {
            (CountdownPhase::Counting { .. }, Some(order)) => self.banner_text(order),
            (CountdownPhase::Settling, Some(order)) => format!(
                "⌛ Settling {} {} {}...",
                order.order_type, order.amount, order.coin_code
            ),
            (CountdownPhase::FailedIdle, _) => {
                "No countdown running. The last settlement failed.".to_string()
            }
            _ => "No countdown running.".to_string(),
        };
        self.bot.send_message(self.chat_id, text).await?;
        Ok(())
    }

    async fn display_abandoned(&self, order: Option<&PendingOrder>) -> Result<()> {
        let text = match order {
            Some(order) => format!(
                "Countdown abandoned. Your {} {} {} order was never sent.",
                order.order_type, order.amount, order.coin_code
            ),
            None => "No countdown to abandon.".to_string(),
        };
        self.bot.send_message(self.chat_id, text).await?;
        Ok(())
    }
}
