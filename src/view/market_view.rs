use anyhow::Result;
use async_trait::async_trait;
use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, ParseMode},
    utils::html,
    Bot,
};

use super::ErrorView;
use crate::interactor::MarketOverview;
use crate::utils::format_money;

#[async_trait]
pub trait MarketView: ErrorView {
    async fn display_loading(&self) -> Result<Option<Message>>;
    async fn display_market(&self, overview: &MarketOverview, message: Option<Message>) -> Result<()>;
}

pub struct TelegramMarketView {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramMarketView {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }
}

/// One buy/sell row per coin. Trade buttons disappear while a countdown runs.
pub fn market_keyboard(overview: &MarketOverview) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = Vec::new();

    if overview.trading_enabled {
        for quote in &overview.quotes {
            rows.push(vec![
                InlineKeyboardButton::callback(
                    format!("Buy {}", quote.coin_code),
                    format!("buy_{}", quote.coin_code),
                ),
                InlineKeyboardButton::callback(
                    format!("Sell {}", quote.coin_code),
                    format!("sell_{}", quote.coin_code),
                ),
            ]);
        }
    } else {
        rows.push(vec![InlineKeyboardButton::callback(
            "⏳ Countdown status",
            "countdown_status",
        )]);
    }

    rows.push(vec![InlineKeyboardButton::callback("🔄 Refresh", "market")]);
    InlineKeyboardMarkup::new(rows)
}

#[async_trait]
impl ErrorView for TelegramMarketView {
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
impl MarketView for TelegramMarketView {
    async fn display_loading(&self) -> Result<Option<Message>> {
        let message = self
            .bot
            .send_message(self.chat_id, "Loading market prices...")
            .await?;

        Ok(Some(message))
    }

    async fn display_market(&self, overview: &MarketOverview, message: Option<Message>) -> Result<()> {
        let mut text = String::from("<b>📈 Market</b>\n\n");

        if overview.quotes.is_empty() {
            text.push_str("No tradable coins right now.");
        }
        for quote in &overview.quotes {
            let trend = if quote.percent_change_24h >= 0.0 { "🟢" } else { "🔴" };
            text.push_str(&format!(
                "{} <b>{}</b> ({})\n{} · ${:.2} · {:+.2}% 24h\n\n",
                trend,
                html::escape(&quote.coin_code),
                html::escape(&quote.name),
                format_money(quote.price_local, &quote.local_currency),
                quote.price_usd,
                quote.percent_change_24h
            ));
        }
        if !overview.trading_enabled {
            text.push_str("\n⏳ A countdown order is running, trading is paused until it settles.");
        }

        let keyboard = market_keyboard(overview);

        if let Some(msg) = message {
            self.bot
                .edit_message_text(self.chat_id, msg.id, text)
                .parse_mode(ParseMode::Html)
                .reply_markup(keyboard)
                .await?;
        } else {
            self.bot
                .send_message(self.chat_id, text)
                .parse_mode(ParseMode::Html)
                .reply_markup(keyboard)
                .await?;
        }

        Ok(())
    }
}
