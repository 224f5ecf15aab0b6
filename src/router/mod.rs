use teloxide::{dispatching::dialogue::InMemStorage, dispatching::UpdateHandler, prelude::*};

use crate::commands::{self, callback::handle_callback, BotCommands};
use crate::entity::State;

// Base router trait
pub trait Router: Send + Sync {
    fn setup_handlers(&self) -> UpdateHandler<anyhow::Error>;
}

/// Routes updates by command, then by dialogue state, then buttons.
/// `ServiceContainer` and the dialogue storage come from the dispatcher's dependencies.
pub struct TelegramRouter;

impl TelegramRouter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TelegramRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl Router for TelegramRouter {
    fn setup_handlers(&self) -> UpdateHandler<anyhow::Error> {
        use dptree::case;

        let command_handler =
            teloxide::filter_command::<BotCommands, _>().endpoint(commands::handle_command);

        let dialogue_handler = dptree::entry()
            .branch(
                case![State::AwaitingOrderAmount {
                    order_type,
                    coin_id,
                    coin_code,
                    displayed_price
                }]
                .endpoint(commands::trade::receive_amount),
            )
            .branch(
                case![State::AwaitingOrderDuration {
                    order_type,
                    coin_id,
                    coin_code,
                    displayed_price,
                    amount
                }]
                .endpoint(commands::trade::receive_duration),
            )
            .branch(
                case![State::AwaitingAbandonConfirmation { logout }]
                    .endpoint(commands::trade::receive_abandon_confirmation),
            )
            .branch(case![State::Start].endpoint(commands::handle_unknown_text));

        let message_handler = Update::filter_message()
            .branch(command_handler)
            .branch(dialogue_handler);

        // Add callback query handler for our buttons
        let callback_handler = Update::filter_callback_query().endpoint(handle_callback);

        teloxide::dispatching::dialogue::enter::<Update, InMemStorage<State>, State, _>()
            .branch(message_handler)
            .branch(callback_handler)
    }
}
