//! Bitcoin spot price in USD

use crate::fetch::{InvalidUrl, Provider, RequestDescriptor, Resource};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub const NAME: &str = "bitcoin";

const COINGECKO_URL: &str = "https://api.coingecko.com/api/v3/simple/price?ids=bitcoin&vs_currencies=usd";
const COINDESK_URL: &str = "https://api.coindesk.com/v1/bpi/currentprice.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BitcoinPrice {
    /// `None` when no provider answered
    pub usd: Option<f64>,
}

impl fmt::Display for BitcoinPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.usd {
            Some(usd) => write!(f, "1 BTC = ${:.2}", usd),
            None => f.write_str("1 BTC = n/a"),
        }
    }
}

pub fn fallback() -> BitcoinPrice {
    BitcoinPrice { usd: None }
}

fn price(value: &Value) -> Option<BitcoinPrice> {
    value
        .as_f64()
        .filter(|p| p.is_finite() && *p > 0.0)
        .map(|usd| BitcoinPrice { usd: Some(usd) })
}

/// `{"bitcoin": {"usd": 67123.0}}`
pub fn parse_coingecko(document: &Value) -> Option<BitcoinPrice> {
    price(&document["bitcoin"]["usd"])
}

/// `{"bpi": {"USD": {"rate_float": 67123.45, ...}}}`
pub fn parse_coindesk(document: &Value) -> Option<BitcoinPrice> {
    price(&document["bpi"]["USD"]["rate_float"])
}

pub fn resource() -> Result<Resource<BitcoinPrice>, InvalidUrl> {
    let json = |request: RequestDescriptor| request.with_header("Accept", "application/json");

    Ok(Resource::new(
        NAME,
        vec![
            Provider::json(
                "coingecko",
                json(RequestDescriptor::get(COINGECKO_URL)?),
                parse_coingecko,
            )
            .with_rank(1),
            Provider::json("coindesk", json(RequestDescriptor::get(COINDESK_URL)?), parse_coindesk)
                .with_rank(2),
        ],
        fallback(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_both_shapes() {
        assert_eq!(
            parse_coingecko(&json!({"bitcoin": {"usd": 67123.5}})).unwrap().usd,
            Some(67123.5)
        );
        assert_eq!(
            parse_coindesk(&json!({"bpi": {"USD": {"code": "USD", "rate_float": 64000.25}}}))
                .unwrap()
                .usd,
            Some(64000.25)
        );
    }

    #[test]
    fn non_positive_prices_are_rejected() {
        assert!(parse_coingecko(&json!({"bitcoin": {"usd": 0}})).is_none());
        assert!(parse_coingecko(&json!({"bitcoin": {"usd": "67000"}})).is_none());
        assert!(parse_coindesk(&json!({"bpi": {}})).is_none());
    }

    #[test]
    fn display_formats_price() {
        assert_eq!(BitcoinPrice { usd: Some(1234.5) }.to_string(), "1 BTC = $1234.50");
        assert_eq!(fallback().to_string(), "1 BTC = n/a");
    }
}
