use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup},
    Bot,
};

use super::ErrorView;
use crate::entity::{ResourceAction, ResourceKind, ResourceRow};

#[async_trait]
pub trait ResourceView: ErrorView {
    async fn display_rows(&self, kind: ResourceKind, rows: &[ResourceRow], can_review: bool) -> Result<()>;
    async fn display_record(&self, kind: ResourceKind, record: &Value) -> Result<()>;
    async fn display_saved(&self, kind: ResourceKind, action: ResourceAction, record: &Value) -> Result<()>;
    async fn display_reviewed(&self, kind: ResourceKind, id: &str, action: ResourceAction) -> Result<()>;
    async fn display_usage(&self, usage: &str) -> Result<()>;
}

pub struct TelegramResourceView {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramResourceView {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }
}

fn pretty(record: &Value) -> String {
    serde_json::to_string_pretty(record).unwrap_or_else(|_| record.to_string())
}

#[async_trait]
impl ErrorView for TelegramResourceView {
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
impl ResourceView for TelegramResourceView {
    async fn display_rows(&self, kind: ResourceKind, rows: &[ResourceRow], can_review: bool) -> Result<()> {
        if rows.is_empty() {
            self.bot
                .send_message(self.chat_id, format!("{}: nothing here yet.", kind.title()))
                .await?;
            return Ok(());
        }

        let mut text = format!("{} ({})\n\n", kind.title(), rows.len());
        for row in rows {
            text.push_str(&format!("#{} {}\n", row.id, row.summary));
        }

        let review_rows: Vec<Vec<InlineKeyboardButton>> = if can_review {
            rows.iter()
                .filter(|row| row.reviewable)
                .map(|row| {
                    vec![
                        InlineKeyboardButton::callback(
                            format!("✅ Approve #{}", row.id),
                            format!("approve_{}_{}", kind, row.id),
                        ),
                        InlineKeyboardButton::callback(
                            format!("❌ Reject #{}", row.id),
                            format!("reject_{}_{}", kind, row.id),
                        ),
                    ]
                })
                .collect()
        } else {
            Vec::new()
        };

        if review_rows.is_empty() {
            self.bot.send_message(self.chat_id, text).await?;
        } else {
            self.bot
                .send_message(self.chat_id, text)
                .reply_markup(InlineKeyboardMarkup::new(review_rows))
                .await?;
        }
        Ok(())
    }

    async fn display_record(&self, kind: ResourceKind, record: &Value) -> Result<()> {
        self.bot
            .send_message(
                self.chat_id,
                format!("{}\n\n{}", kind.title(), pretty(record)),
            )
            .await?;
        Ok(())
    }

    async fn display_saved(&self, kind: ResourceKind, action: ResourceAction, record: &Value) -> Result<()> {
        let verb = match action {
            ResourceAction::Add => "added",
            _ => "updated",
        };
        let text = if record.is_null() {
            format!("✅ {} record {}.", kind.title(), verb)
        } else {
            format!("✅ {} record {}.\n\n{}", kind.title(), verb, pretty(record))
        };
        self.bot.send_message(self.chat_id, text).await?;
        Ok(())
    }

    async fn display_reviewed(&self, kind: ResourceKind, id: &str, action: ResourceAction) -> Result<()> {
        let verb = match action {
            ResourceAction::Approve => "approved",
            _ => "rejected",
        };
        self.bot
            .send_message(self.chat_id, format!("{} #{} {}.", kind.title(), id, verb))
            .await?;
        Ok(())
    }

    async fn display_usage(&self, usage: &str) -> Result<()> {
        self.bot.send_message(self.chat_id, usage).await?;
        Ok(())
    }
}
