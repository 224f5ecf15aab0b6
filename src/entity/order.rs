use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use super::AppError;

/// Side of a countdown order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    Buy,
    Sell,
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderType::Buy => write!(f, "BUY"),
            OrderType::Sell => write!(f, "SELL"),
        }
    }
}

impl FromStr for OrderType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BUY" => Ok(OrderType::Buy),
            "SELL" => Ok(OrderType::Sell),
            other => Err(AppError::validation(
                "order type",
                format!("expected BUY or SELL, got {}", other),
            )),
        }
    }
}

/// Delay before a countdown order is settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CountdownDuration {
    OneMinute,
    TwoMinutes,
    ThreeMinutes,
    FiveMinutes,
    TenMinutes,
}

impl CountdownDuration {
    pub const ALL: [CountdownDuration; 5] = [
        CountdownDuration::OneMinute,
        CountdownDuration::TwoMinutes,
        CountdownDuration::ThreeMinutes,
        CountdownDuration::FiveMinutes,
        CountdownDuration::TenMinutes,
    ];

    pub fn seconds(&self) -> u64 {
        match self {
            CountdownDuration::OneMinute => 60,
            CountdownDuration::TwoMinutes => 120,
            CountdownDuration::ThreeMinutes => 180,
            CountdownDuration::FiveMinutes => 300,
            CountdownDuration::TenMinutes => 600,
        }
    }

    pub fn from_seconds(seconds: u64) -> Result<Self, AppError> {
        Self::ALL
            .into_iter()
            .find(|d| d.seconds() == seconds)
            .ok_or(AppError::InvalidDuration(seconds))
    }

    pub fn label(&self) -> String {
        format!("{} min", self.seconds() / 60)
    }
}

/// Price times amount, refusing amounts whose total cannot be represented
pub fn checked_total(price: Decimal, amount: Decimal) -> Result<Decimal, AppError> {
    price
        .checked_mul(amount)
        .ok_or_else(|| AppError::validation("amount", "is too large for the current price"))
}

/// A trade whose price is locked now and whose settlement is deferred
#[derive(Debug, Clone, PartialEq)]
pub struct PendingOrder {
    pub id: Uuid,
    pub coin_id: String,
    pub coin_code: String,
    pub order_type: OrderType,
    pub amount: Decimal,
    pub price_at_order_creation: Decimal,
    pub duration: CountdownDuration,
    pub remaining_seconds: u64,
    pub created_at: DateTime<Utc>,
}

impl PendingOrder {
    pub fn new(
        coin_id: &str,
        coin_code: &str,
        order_type: OrderType,
        amount: Decimal,
        price_at_order_creation: Decimal,
        duration: CountdownDuration,
    ) -> Result<Self, AppError> {
        if amount <= Decimal::ZERO {
            return Err(AppError::InvalidAmount);
        }
        checked_total(price_at_order_creation, amount)?;

        Ok(Self {
            id: Uuid::new_v4(),
            coin_id: coin_id.to_string(),
            coin_code: coin_code.to_string(),
            order_type,
            amount,
            price_at_order_creation,
            duration,
            remaining_seconds: duration.seconds(),
            created_at: Utc::now(),
        })
    }

    pub fn total_value(&self) -> Result<Decimal, AppError> {
        checked_total(self.price_at_order_creation, self.amount)
    }

    /// Advances the countdown by one second. Returns true once it hits zero.
    pub fn tick(&mut self) -> bool {
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        self.remaining_seconds == 0
    }
}

/// Where a chat's countdown currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownPhase {
    Idle,
    Counting { remaining_seconds: u64 },
    Settling,
    FailedIdle,
}

impl CountdownPhase {
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            CountdownPhase::Counting { .. } | CountdownPhase::Settling
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::prelude::FromPrimitive;

    fn order(amount: f64, duration: CountdownDuration) -> Result<PendingOrder, AppError> {
        PendingOrder::new(
            "1",
            "BTC",
            OrderType::Buy,
            Decimal::from_f64(amount).unwrap(),
            Decimal::new(25_000, 0),
            duration,
        )
    }

    #[test]
    fn duration_accepts_only_enumerated_values() {
        for seconds in [60, 120, 180, 300, 600] {
            assert_eq!(
                CountdownDuration::from_seconds(seconds).unwrap().seconds(),
                seconds
            );
        }
        assert!(matches!(
            CountdownDuration::from_seconds(90),
            Err(AppError::InvalidDuration(90))
        ));
    }

    #[test]
    fn non_positive_amount_is_rejected() {
        assert!(matches!(
            order(0.0, CountdownDuration::OneMinute),
            Err(AppError::InvalidAmount)
        ));
        assert!(matches!(
            order(-1.5, CountdownDuration::OneMinute),
            Err(AppError::InvalidAmount)
        ));
    }

    #[test]
    fn tick_counts_down_to_zero_once() {
        let mut pending = order(0.5, CountdownDuration::OneMinute).unwrap();
        assert_eq!(pending.remaining_seconds, 60);

        let mut ticks = 0;
        while !pending.tick() {
            ticks += 1;
        }
        assert_eq!(ticks + 1, 60);
        assert_eq!(pending.remaining_seconds, 0);
        // Further ticks stay at zero
        assert!(pending.tick());
    }

    #[test]
    fn total_value_uses_locked_price() {
        let pending = order(0.5, CountdownDuration::TwoMinutes).unwrap();
        assert_eq!(pending.total_value().unwrap(), Decimal::new(12_500, 0));
    }

    #[test]
    fn amount_overflowing_the_total_is_rejected() {
        let result = PendingOrder::new(
            "1",
            "BTC",
            OrderType::Buy,
            Decimal::from_str("100000000000000000000").unwrap(),
            Decimal::new(960_000_000, 0),
            CountdownDuration::OneMinute,
        );
        assert!(matches!(result, Err(AppError::Validation { .. })));

        assert!(checked_total(Decimal::MAX, Decimal::new(2, 0)).is_err());
    }

    #[test]
    fn order_type_parses_case_insensitively() {
        assert_eq!("buy".parse::<OrderType>().unwrap(), OrderType::Buy);
        assert_eq!("SELL".parse::<OrderType>().unwrap(), OrderType::Sell);
        assert!("hold".parse::<OrderType>().is_err());
    }
}
