mod app_error;
mod coin;
mod order;
mod resource;
mod session;
mod state;
mod trade;

pub use app_error::AppError;
pub use coin::{Coin, CoinQuote};
pub use order::{checked_total, CountdownDuration, CountdownPhase, OrderType, PendingOrder};
pub use resource::{
    Bank, FiatRequest, FiatRequestStatus, Member, ResourceAction, ResourceKind, ResourceRow,
    Wallet,
};
pub use session::{Role, Session};
pub use state::State;
pub use trade::{TradeReceipt, TradeRequest};
