use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{AppError, OrderType, PendingOrder};

/// Body of the settlement call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRequest {
    #[serde(rename = "tradeType")]
    pub trade_type: OrderType,
    #[serde(rename = "coinId")]
    pub coin_id: String,
    #[serde(rename = "coinCode")]
    pub coin_code: String,
    #[serde(rename = "coinNominalExchange", with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(
        rename = "fiatCurrentcyCheckoutTime",
        with = "rust_decimal::serde::float"
    )]
    pub total_value: Decimal,
}

impl TryFrom<&PendingOrder> for TradeRequest {
    type Error = AppError;

    fn try_from(order: &PendingOrder) -> Result<Self, Self::Error> {
        Ok(Self {
            trade_type: order.order_type,
            coin_id: order.coin_id.clone(),
            coin_code: order.coin_code.clone(),
            amount: order.amount,
            total_value: order.total_value()?,
        })
    }
}

/// What the backend tells us about a settled trade
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeReceipt {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "transactionId")]
    pub transaction_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::CountdownDuration;

    #[test]
    fn settlement_body_uses_backend_field_names() {
        let order = PendingOrder::new(
            "42",
            "ETH",
            OrderType::Sell,
            Decimal::new(2, 0),
            Decimal::new(1500, 0),
            CountdownDuration::FiveMinutes,
        )
        .unwrap();

        let body = serde_json::to_value(TradeRequest::try_from(&order).unwrap()).unwrap();

        assert_eq!(body["tradeType"], "SELL");
        assert_eq!(body["coinId"], "42");
        assert_eq!(body["coinCode"], "ETH");
        assert_eq!(body["coinNominalExchange"].as_f64(), Some(2.0));
        assert_eq!(body["fiatCurrentcyCheckoutTime"].as_f64(), Some(3000.0));
    }
}
