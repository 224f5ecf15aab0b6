use anyhow::Result;
use std::sync::Arc;
use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup},
};

use super::{CommandHandler, MyDialogue};
use crate::di::ServiceContainer;
use crate::entity::{ResourceKind, Role};

/// Main menu. Signed-out chats only get help; resource lists follow the role.
pub fn main_menu_keyboard(role: Option<Role>) -> InlineKeyboardMarkup {
    let Some(role) = role else {
        return InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
            "Help", "help",
        )]]);
    };

    let mut rows = vec![
        vec![
            InlineKeyboardButton::callback("📈 Market", "market"),
            InlineKeyboardButton::callback("⏳ Countdown", "countdown_status"),
        ],
        vec![
            InlineKeyboardButton::callback("👤 Profile", "whoami"),
            InlineKeyboardButton::callback("🚪 Sign out", "logout"),
        ],
    ];

    let lists: Vec<InlineKeyboardButton> = ResourceKind::ALL
        .iter()
        .filter(|kind| role >= kind.view_role())
        .map(|kind| InlineKeyboardButton::callback(kind.title(), format!("list_{}", kind)))
        .collect();
    for pair in lists.chunks(2) {
        rows.push(pair.to_vec());
    }

    rows.push(vec![InlineKeyboardButton::callback("Help", "help")]);
    InlineKeyboardMarkup::new(rows)
}

pub struct MenuCommand;

impl MenuCommand {
    pub async fn show(bot: &Bot, chat_id: ChatId, services: &ServiceContainer) -> Result<()> {
        let session = services.auth_interactor().current_session(chat_id.0).await;

        let text = match &session {
            Some(session) => format!("Main menu, signed in as {}.", session.full_name),
            None => "You are signed out. Use /login <email> <password> to sign in.".to_string(),
        };

        bot.send_message(chat_id, text)
            .reply_markup(main_menu_keyboard(session.map(|s| s.role())))
            .await?;
        Ok(())
    }
}

impl CommandHandler for MenuCommand {
    fn command_name() -> &'static str {
        "menu"
    }

    fn description() -> &'static str {
        "show the main menu"
    }

    async fn execute(
        bot: Bot,
        msg: Message,
        _args: String,
        _dialogue: Option<MyDialogue>,
        services: Arc<ServiceContainer>,
    ) -> Result<()> {
        Self::show(&bot, msg.chat.id, &services).await
    }
}
