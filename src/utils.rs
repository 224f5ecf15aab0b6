use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde_json::{Map, Number, Value};
use std::str::FromStr;

use crate::entity::{AppError, CountdownDuration, OrderType};

// Fields sent to the backend as numbers rather than strings
const NUMERIC_FIELDS: [&str; 2] = ["amount", "balance"];

/// Arguments of `/buy` and `/sell`: `<coin> [amount] [seconds]`
#[derive(Debug, Clone, PartialEq)]
pub struct OrderArgs {
    pub coin_code: String,
    pub amount: Option<Decimal>,
    pub duration: Option<CountdownDuration>,
}

// Parse a user supplied amount, accepting a decimal comma
pub fn parse_amount(text: &str) -> Result<Decimal, AppError> {
    let normalized = text.trim().replace(',', ".");
    let amount = Decimal::from_str(&normalized)
        .map_err(|_| AppError::validation("amount", format!("'{}' is not a number", text.trim())))?;

    if amount <= Decimal::ZERO {
        return Err(AppError::InvalidAmount);
    }
    Ok(amount)
}

pub fn parse_duration(text: &str) -> Result<CountdownDuration, AppError> {
    let trimmed = text.trim().trim_end_matches('s');
    let seconds = trimmed
        .parse::<u64>()
        .map_err(|_| AppError::validation("duration", format!("'{}' is not a number of seconds", text.trim())))?;
    CountdownDuration::from_seconds(seconds)
}

pub fn parse_order_args(input: &str) -> Result<Option<OrderArgs>, AppError> {
    let parts: Vec<&str> = input.split_whitespace().collect();

    match parts.as_slice() {
        [] => Ok(None),
        [coin, rest @ ..] if rest.len() <= 2 => Ok(Some(OrderArgs {
            coin_code: coin.to_uppercase(),
            amount: rest.first().map(|a| parse_amount(a)).transpose()?,
            duration: rest.get(1).map(|d| parse_duration(d)).transpose()?,
        })),
        _ => Err(AppError::validation(
            "arguments",
            "expected <coin> [amount] [seconds]",
        )),
    }
}

/// Parses `key=value` pairs. Values containing spaces go in double quotes.
pub fn parse_fields(input: &str) -> Result<Map<String, Value>, AppError> {
    lazy_static! {
        static ref FIELD_RE: Regex = Regex::new(r#"(\w+)=(?:"([^"]*)"|(\S+))"#).unwrap();
    }

    let mut fields = Map::new();
    for cap in FIELD_RE.captures_iter(input) {
        let key = cap[1].to_string();
        let raw = cap
            .get(2)
            .or_else(|| cap.get(3))
            .map(|m| m.as_str())
            .unwrap_or_default();

        let value = if NUMERIC_FIELDS.contains(&key.as_str()) {
            let amount = raw
                .replace(',', ".")
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .ok_or_else(|| AppError::validation(key.as_str(), "must be a number"))?;
            Value::Number(amount)
        } else {
            Value::String(raw.to_string())
        };
        fields.insert(key, value);
    }

    Ok(fields)
}

/// Splits `<first> <rest...>` into the first word and the remainder
pub fn split_first_word(input: &str) -> (&str, &str) {
    let trimmed = input.trim();
    match trimmed.find(char::is_whitespace) {
        Some(idx) => (&trimmed[..idx], trimmed[idx..].trim_start()),
        None => (trimmed, ""),
    }
}

pub fn parse_order_type(callback: &str) -> Option<(OrderType, &str)> {
    if let Some(code) = callback.strip_prefix("buy_") {
        Some((OrderType::Buy, code))
    } else {
        callback
            .strip_prefix("sell_")
            .map(|code| (OrderType::Sell, code))
    }
}

// Format a fiat amount with thousands separators
pub fn format_money(amount: Decimal, currency: &str) -> String {
    let rounded = amount.round_dp(2);
    let text = format!("{:.2}", rounded);
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(d) => ("-", d),
        None => ("", int_part),
    };
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{} {}{}.{}", currency, sign, grouped, frac_part)
}

// Format seconds as m:ss
pub fn format_remaining(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
