use rust_decimal::Decimal;

use super::OrderType;

#[derive(Clone, Default, Debug)]
pub enum State {
    #[default]
    Start,
    AwaitingOrderAmount {
        order_type: OrderType,
        coin_id: String,
        coin_code: String,
        displayed_price: Decimal,
    },
    AwaitingOrderDuration {
        order_type: OrderType,
        coin_id: String,
        coin_code: String,
        displayed_price: Decimal,
        amount: Decimal,
    },
    /// A countdown is running and the user asked to leave
    AwaitingAbandonConfirmation {
        logout: bool,
    },
}
