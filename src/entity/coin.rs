use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A coin the platform lets members trade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    #[serde(rename = "coinId")]
    pub coin_id: String,
    #[serde(rename = "coinCode")]
    pub coin_code: String,
    #[serde(default, rename = "coinName")]
    pub name: String,
}

/// Coin merged with its market quote
#[derive(Debug, Clone, PartialEq)]
pub struct CoinQuote {
    pub coin_id: String,
    pub coin_code: String,
    pub name: String,
    pub price_usd: Decimal,
    pub price_local: Decimal,
    pub percent_change_24h: f64,
    pub local_currency: String,
}
