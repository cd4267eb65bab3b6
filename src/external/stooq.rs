use async_trait::async_trait;
use chrono::NaiveDate;
use csv::ReaderBuilder;
use serde::Deserialize;

use crate::external::price_provider::{PriceProvider, PriceProviderError};
use crate::models::PricePoint;

/// Daily-history provider backed by Stooq's CSV download endpoint.
///
/// Responses are `Date,Open,High,Low,Close,Volume` rows; only date and close
/// are consumed.
pub struct StooqProvider {
    client: reqwest::Client,
}

impl StooqProvider {
    pub fn new() -> Self {
        Self { client: reqwest::Client::new() }
    }
}

impl Default for StooqProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercase the ticker; tickers already carrying a market suffix (any `.`)
/// pass through, everything else defaults to the US market.
fn market_symbol(ticker: &str) -> String {
    let t = ticker.trim().to_lowercase();
    if t.contains('.') {
        t
    } else {
        format!("{t}.us")
    }
}

#[derive(Debug, Deserialize)]
struct StooqRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Close")]
    close: f64,
}

fn parse_csv(body: &str) -> Result<Vec<PricePoint>, PriceProviderError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(body.as_bytes());

    let mut out = Vec::new();
    for row in reader.deserialize::<StooqRow>() {
        let row = row.map_err(|e| PriceProviderError::Parse(e.to_string()))?;
        let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d")
            .map_err(|e| PriceProviderError::Parse(format!("bad date {}: {}", row.date, e)))?;
        out.push(PricePoint { date, close: row.close });
    }

    // Ensure ascending by date
    out.sort_by_key(|p| p.date);

    Ok(out)
}

#[async_trait]
impl PriceProvider for StooqProvider {
    async fn fetch_daily_history(
        &self,
        ticker: &str,
    ) -> Result<Vec<PricePoint>, PriceProviderError> {
        let symbol = market_symbol(ticker);
        let url = format!("https://stooq.com/q/d/l/?s={symbol}&i=d");

        let resp = self.client
            .get(url)
            .send()
            .await
            .map_err(|e| PriceProviderError::Network(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(PriceProviderError::RateLimited);
        }

        let body = resp
            .text()
            .await
            .map_err(|e| PriceProviderError::Network(e.to_string()))?;

        // Stooq answers unknown symbols with a short plain-text message
        // instead of a header row.
        if !body.starts_with("Date,") {
            return Err(PriceProviderError::BadResponse(format!(
                "no price data for symbol {symbol}"
            )));
        }

        parse_csv(&body)
    }
}
