use anyhow::Result;
use log::info;
use std::sync::Arc;
use teloxide::{dispatching::dialogue::InMemStorage, prelude::*};

use crate::di::ServiceContainer;
use crate::entity::{OrderType, ResourceAction, ResourceKind, State};
use crate::presenter::auth_presenter::AuthPresenterImpl;
use crate::presenter::countdown_presenter::CountdownPresenterImpl;
use crate::presenter::market_presenter::MarketPresenterImpl;
use crate::presenter::resource_presenter::ResourcePresenterImpl;
use crate::view::auth_view::TelegramAuthView;
use crate::view::countdown_view::TelegramCountdownView;
use crate::view::market_view::TelegramMarketView;
use crate::view::resource_view::TelegramResourceView;
use teloxide::dispatching::dialogue::Dialogue;

pub mod auth;
pub mod callback;
pub mod fiat;
pub mod help;
pub mod market;
pub mod resource;
pub mod start;
pub mod trade;
pub mod ui;

pub type MyDialogue = Dialogue<State, InMemStorage<State>>;

/// Trait that defines a command handler
pub trait CommandHandler {
    /// The command name in lowercase
    fn command_name() -> &'static str;

    /// The command description for help
    fn description() -> &'static str;

    /// Execute the command with everything after the command name
    async fn execute(
        bot: Bot,
        msg: Message,
        args: String,
        dialogue: Option<MyDialogue>,
        services: Arc<ServiceContainer>,
    ) -> Result<()>;
}

/// Bot Commands enum for teloxide command filter
#[derive(teloxide::utils::command::BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum BotCommands {
    #[command(description = "start the bot and show the main menu")]
    Start,
    #[command(description = "display this help message")]
    Help,
    #[command(description = "show the main menu")]
    Menu,
    #[command(description = "sign in: /login <email> <password>")]
    Login(String),
    #[command(description = "sign out")]
    Logout,
    #[command(description = "send a password reset email: /forgot <email>")]
    Forgot(String),
    #[command(description = "show your account and countdown state")]
    Whoami,
    #[command(description = "show coin prices")]
    Market,
    #[command(description = "buy a coin after a countdown: /buy <coin> [amount] [seconds]")]
    Buy(String),
    #[command(description = "sell a coin after a countdown: /sell <coin> [amount] [seconds]")]
    Sell(String),
    #[command(description = "show the running countdown")]
    Status,
    #[command(description = "abandon the running countdown")]
    Abandon,
    #[command(description = "cancel the order being entered")]
    Cancel,
    #[command(description = "list records: /list <resource>")]
    List(String),
    #[command(description = "show one record: /view <resource> <id>")]
    View(String),
    #[command(description = "create a record: /add <resource> key=value ...")]
    Add(String),
    #[command(description = "update a record: /edit <resource> <id> key=value ...")]
    Edit(String),
    #[command(description = "approve a fiat request: /approve <resource> <id>")]
    Approve(String),
    #[command(description = "reject a fiat request: /reject <resource> <id>")]
    Reject(String),
    #[command(description = "request a fiat deposit: /deposit <amount> <bank id>")]
    Deposit(String),
    #[command(description = "request a fiat withdrawal: /withdraw <amount> <bank id>")]
    Withdraw(String),
}

/// Routes a parsed command to its handler. Any half-entered order is dropped first.
pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: BotCommands,
    dialogue: MyDialogue,
    services: Arc<ServiceContainer>,
) -> Result<()> {
    info!("Command /{} in chat {}", command_label(&cmd), msg.chat.id);
    if cmd != BotCommands::Cancel {
        dialogue.reset().await?;
    }
    let entry = dialogue.clone();
    let dialogue = Some(dialogue);

    match cmd {
        BotCommands::Start => {
            start::StartCommand::execute(bot, msg, String::new(), dialogue, services).await
        }
        BotCommands::Help => {
            help::HelpCommand::execute(bot, msg, String::new(), dialogue, services).await
        }
        BotCommands::Menu => {
            ui::MenuCommand::execute(bot, msg, String::new(), dialogue, services).await
        }
        BotCommands::Login(args) => {
            auth::LoginCommand::execute(bot, msg, args, dialogue, services).await
        }
        BotCommands::Logout => {
            auth::LogoutCommand::execute(bot, msg, String::new(), dialogue, services).await
        }
        BotCommands::Forgot(args) => {
            auth::ForgotPasswordCommand::execute(bot, msg, args, dialogue, services).await
        }
        BotCommands::Whoami => {
            auth::WhoamiCommand::execute(bot, msg, String::new(), dialogue, services).await
        }
        BotCommands::Market => {
            market::MarketCommand::execute(bot, msg, String::new(), dialogue, services).await
        }
        BotCommands::Buy(args) => {
            trade::BuyCommand::execute(bot, msg, args, dialogue, services).await
        }
        BotCommands::Sell(args) => {
            trade::SellCommand::execute(bot, msg, args, dialogue, services).await
        }
        BotCommands::Status => {
            trade::StatusCommand::execute(bot, msg, String::new(), dialogue, services).await
        }
        BotCommands::Abandon => {
            trade::AbandonCommand::execute(bot, msg, String::new(), dialogue, services).await
        }
        BotCommands::Cancel => trade::cancel_entry(&bot, msg.chat.id, &entry).await,
        BotCommands::List(args) => {
            resource::ListCommand::execute(bot, msg, args, dialogue, services).await
        }
        BotCommands::View(args) => {
            resource::ViewCommand::execute(bot, msg, args, dialogue, services).await
        }
        BotCommands::Add(args) => {
            resource::AddCommand::execute(bot, msg, args, dialogue, services).await
        }
        BotCommands::Edit(args) => {
            resource::EditCommand::execute(bot, msg, args, dialogue, services).await
        }
        BotCommands::Approve(args) => {
            resource::review(bot, msg.chat.id, &args, ResourceAction::Approve, services).await
        }
        BotCommands::Reject(args) => {
            resource::review(bot, msg.chat.id, &args, ResourceAction::Reject, services).await
        }
        BotCommands::Deposit(args) => {
            fiat::request(bot, msg.chat.id, ResourceKind::Deposits, &args, services).await
        }
        BotCommands::Withdraw(args) => {
            fiat::request(bot, msg.chat.id, ResourceKind::Withdrawals, &args, services).await
        }
    }
}

pub async fn handle_unknown_text(bot: Bot, msg: Message) -> Result<()> {
    bot.send_message(
        msg.chat.id,
        "I didn't understand that. Use /help to see what I can do.",
    )
    .await?;
    Ok(())
}

// Keeps passwords out of the log
fn command_label(cmd: &BotCommands) -> &'static str {
    match cmd {
        BotCommands::Start => "start",
        BotCommands::Help => "help",
        BotCommands::Menu => "menu",
        BotCommands::Login(_) => "login",
        BotCommands::Logout => "logout",
        BotCommands::Forgot(_) => "forgot",
        BotCommands::Whoami => "whoami",
        BotCommands::Market => "market",
        BotCommands::Buy(_) => "buy",
        BotCommands::Sell(_) => "sell",
        BotCommands::Status => "status",
        BotCommands::Abandon => "abandon",
        BotCommands::Cancel => "cancel",
        BotCommands::List(_) => "list",
        BotCommands::View(_) => "view",
        BotCommands::Add(_) => "add",
        BotCommands::Edit(_) => "edit",
        BotCommands::Approve(_) => "approve",
        BotCommands::Reject(_) => "reject",
        BotCommands::Deposit(_) => "deposit",
        BotCommands::Withdraw(_) => "withdraw",
    }
}

pub(crate) fn auth_presenter(
    bot: &Bot,
    chat_id: ChatId,
    services: &ServiceContainer,
) -> AuthPresenterImpl<TelegramAuthView> {
    AuthPresenterImpl::new(
        chat_id.0,
        services.auth_interactor(),
        services.countdown_interactor(),
        Arc::new(TelegramAuthView::new(bot.clone(), chat_id)),
    )
}

pub(crate) fn market_presenter(
    bot: &Bot,
    chat_id: ChatId,
    services: &ServiceContainer,
) -> MarketPresenterImpl<TelegramMarketView> {
    MarketPresenterImpl::new(
        chat_id.0,
        services.market_interactor(),
        services.auth_interactor(),
        Arc::new(TelegramMarketView::new(bot.clone(), chat_id)),
    )
}

pub(crate) fn countdown_presenter(
    bot: &Bot,
    chat_id: ChatId,
    services: &ServiceContainer,
) -> CountdownPresenterImpl<TelegramCountdownView> {
    CountdownPresenterImpl::new(
        chat_id.0,
        services.countdown_interactor(),
        services.auth_interactor(),
        Arc::new(TelegramCountdownView::new(
            bot.clone(),
            chat_id,
            services.local_currency(),
        )),
        Arc::new(market_presenter(bot, chat_id, services)),
    )
}

pub(crate) fn resource_presenter(
    bot: &Bot,
    chat_id: ChatId,
    services: &ServiceContainer,
) -> ResourcePresenterImpl<TelegramResourceView> {
    ResourcePresenterImpl::new(
        chat_id.0,
        services.resource_interactor(),
        services.auth_interactor(),
        Arc::new(TelegramResourceView::new(bot.clone(), chat_id)),
    )
}

pub(crate) fn order_type_command(order_type: OrderType) -> &'static str {
    match order_type {
        OrderType::Buy => "/buy",
        OrderType::Sell => "/sell",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::utils::command::BotCommands as _;

    #[test]
    fn commands_keep_their_arguments() {
        assert_eq!(
            BotCommands::parse("/login ana@saxo.id secret", "saxo_bot").unwrap(),
            BotCommands::Login("ana@saxo.id secret".to_string())
        );
        assert_eq!(
            BotCommands::parse("/buy BTC 0.5 60", "saxo_bot").unwrap(),
            BotCommands::Buy("BTC 0.5 60".to_string())
        );
        assert_eq!(
            BotCommands::parse("/market", "saxo_bot").unwrap(),
            BotCommands::Market
        );
    }

    #[test]
    fn bare_buy_parses_with_empty_arguments() {
        assert_eq!(
            BotCommands::parse("/buy", "saxo_bot").unwrap(),
            BotCommands::Buy(String::new())
        );
    }
}
