//! Exchange rate records and the provider abstraction

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One currency's rate against the service's base currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateRecord {
    pub currency: String,
    pub rate: f64,
    pub name: String,
}

/// Payload of `GET /rates`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatesResponse {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub rates: Vec<RateRecord>,
}

#[async_trait]
pub trait RatesProvider: Send + Sync {
    /// Fetches the full rate list for `date`, or the latest available when `None`.
    async fn fetch_rates(&self, date: Option<&str>) -> Result<RatesResponse>;
}
