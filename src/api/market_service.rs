use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

use crate::api::backend_client::BackendClient;
use crate::app_config::AppConfig;
use crate::entity::{AppError, Coin, CoinQuote, Session};

pub const COIN_LIST_PATH: &str = "coin/list";

/// CoinMarketCap `listings/latest` response
#[derive(Debug, Deserialize)]
pub struct ListingsResponse {
    pub data: Vec<Listing>,
}

#[derive(Debug, Deserialize)]
pub struct Listing {
    pub name: String,
    pub symbol: String,
    pub quote: HashMap<String, ListingQuote>,
}

#[derive(Debug, Deserialize)]
pub struct ListingQuote {
    pub price: f64,
    #[serde(default)]
    pub percent_change_24h: f64,
}

/// Conversion feed response, rates relative to USD
#[derive(Debug, Deserialize)]
pub struct RatesResponse {
    pub rates: HashMap<String, f64>,
}

/// Prices for the coins the platform trades
#[async_trait]
pub trait MarketService: Send + Sync {
    async fn quotes(&self, session: &Session) -> Result<Vec<CoinQuote>, AppError>;

    async fn quote_for(&self, session: &Session, coin_code: &str) -> Result<CoinQuote, AppError> {
        self.quotes(session)
            .await?
            .into_iter()
            .find(|q| q.coin_code.eq_ignore_ascii_case(coin_code))
            .ok_or_else(|| AppError::UnknownCoin(coin_code.to_uppercase()))
    }
}

pub struct CoinMarketCapService {
    http_client: Client,
    backend: Arc<BackendClient>,
    config: AppConfig,
}

impl CoinMarketCapService {
    pub fn new(backend: Arc<BackendClient>, config: AppConfig) -> Result<Self, AppError> {
        let http_client = Client::builder().timeout(config.request_timeout()).build()?;

        Ok(Self {
            http_client,
            backend,
            config,
        })
    }

    async fn fetch_listings(&self) -> Result<Vec<Listing>, AppError> {
        let url = format!(
            "{}/v1/cryptocurrency/listings/latest",
            self.config.cmc_api_url.trim_end_matches('/')
        );
        debug!("GET {}", url);

        let response = self
            .http_client
            .get(&url)
            .header("X-CMC_PRO_API_KEY", self.config.cmc_api_key.as_str())
            .query(&[
                ("limit", self.config.listing_limit.to_string()),
                ("convert", "USD".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::MarketData(format!(
                "CoinMarketCap error: {}",
                error_text
            )));
        }

        let listings: ListingsResponse = response
            .json()
            .await
            .map_err(|e| AppError::MarketData(format!("Failed to parse listings: {}", e)))?;

        Ok(listings.data)
    }

    async fn fetch_rate(&self) -> Result<Decimal, AppError> {
        let currency = self.config.local_currency.to_uppercase();
        if currency == "USD" {
            return Ok(Decimal::ONE);
        }

        let response = self.http_client.get(&self.config.rates_url).send().await?;
        if !response.status().is_success() {
            return Err(AppError::MarketData(format!(
                "Conversion feed answered {}",
                response.status()
            )));
        }

        let rates: RatesResponse = response
            .json()
            .await
            .map_err(|e| AppError::MarketData(format!("Failed to parse rates: {}", e)))?;

        rates
            .rates
            .get(&currency)
            .and_then(|rate| Decimal::from_f64(*rate))
            .ok_or_else(|| AppError::MarketData(format!("No conversion rate for {}", currency)))
    }

    async fn fetch_platform_coins(&self, session: &Session) -> Result<Vec<Coin>, AppError> {
        self.backend
            .post(Some(session), COIN_LIST_PATH, &json!({}))
            .await
    }
}

#[async_trait]
impl MarketService for CoinMarketCapService {
    async fn quotes(&self, session: &Session) -> Result<Vec<CoinQuote>, AppError> {
        let (coins, listings, rate) = futures::try_join!(
            self.fetch_platform_coins(session),
            self.fetch_listings(),
            self.fetch_rate()
        )?;

        Ok(merge_quotes(&coins, &listings, rate, &self.config.local_currency))
    }
}

/// Joins platform coins with their USD listing and converts to the local currency.
/// Coins without a listing are left out.
pub fn merge_quotes(
    coins: &[Coin],
    listings: &[Listing],
    usd_to_local: Decimal,
    local_currency: &str,
) -> Vec<CoinQuote> {
    let by_symbol: HashMap<String, &Listing> = listings
        .iter()
        .map(|l| (l.symbol.to_uppercase(), l))
        .collect();

    coins
        .iter()
        .filter_map(|coin| {
            let code = coin.coin_code.to_uppercase();
            let Some(listing) = by_symbol.get(&code) else {
                warn!("No market listing for platform coin {}", code);
                return None;
            };
            let usd = listing.quote.get("USD")?;
            let price_usd = Decimal::from_f64(usd.price)?;

            Some(CoinQuote {
                coin_id: coin.coin_id.clone(),
                coin_code: code,
                name: if coin.name.is_empty() {
                    listing.name.clone()
                } else {
                    coin.name.clone()
                },
                price_usd,
                price_local: price_usd * usd_to_local,
                percent_change_24h: usd.percent_change_24h,
                local_currency: local_currency.to_uppercase(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listings() -> Vec<Listing> {
        let body = r#"{"data":[
            {"name":"Bitcoin","symbol":"BTC","quote":{"USD":{"price":60000.0,"percent_change_24h":1.5}}},
            {"name":"Ethereum","symbol":"ETH","quote":{"USD":{"price":3000.0,"percent_change_24h":-2.0}}}
        ]}"#;
        serde_json::from_str::<ListingsResponse>(body).unwrap().data
    }

    fn coin(id: &str, code: &str) -> Coin {
        Coin {
            coin_id: id.to_string(),
            coin_code: code.to_string(),
            name: String::new(),
        }
    }

    #[test]
    fn merge_converts_and_keeps_platform_order() {
        let coins = vec![coin("2", "eth"), coin("1", "BTC")];
        let quotes = merge_quotes(&coins, &listings(), Decimal::new(15_000, 0), "idr");

        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].coin_code, "ETH");
        assert_eq!(quotes[0].name, "Ethereum");
        assert_eq!(quotes[0].price_local, Decimal::new(45_000_000, 0));
        assert_eq!(quotes[1].coin_id, "1");
        assert_eq!(quotes[1].local_currency, "IDR");
    }

    #[test]
    fn coins_without_listing_are_dropped() {
        let coins = vec![coin("9", "DOGE"), coin("1", "BTC")];
        let quotes = merge_quotes(&coins, &listings(), Decimal::ONE, "USD");

        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].coin_code, "BTC");
    }
}
