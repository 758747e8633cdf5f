use crate::address::Address;
use anyhow::{Context, Result};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://toncenter.com/api/v3";
/// Anonymous Telegram Numbers collection.
pub const DEFAULT_COLLECTION_ADDRESS: &str = "EQAOQdwdw8kGftJCSFgOErM1mBjYPe4DBPq8-AhF6vr9si5N";
pub const MAX_PAGE_SIZE: u32 = 1000;

const DEFAULT_MAX_RETRIES: usize = 5;
const ANONYMOUS_INTERVAL_MS: u64 = 1100; // public limit is 1 request per second without a key
const AUTHENTICATED_INTERVAL_MS: u64 = 100;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub api_key: Option<String>,
    pub collection_address: Address,
    pub page_size: u32,
    pub request_interval: Duration,
    pub max_retries: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any variable source; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_url = var("TONCENTER_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_key = var("TONCENTER_API_KEY");

        let collection_address = var("COLLECTION_ADDRESS")
            .as_deref()
            .unwrap_or(DEFAULT_COLLECTION_ADDRESS)
            .parse::<Address>()
            .context("Invalid COLLECTION_ADDRESS format")?;

        let page_size = match var("PAGE_SIZE") {
            Some(raw) => validate_page_size(raw.parse().context("PAGE_SIZE must be a number")?)?,
            None => MAX_PAGE_SIZE,
        };

        let interval_ms = match var("REQUEST_INTERVAL_MS") {
            Some(raw) => raw
                .parse()
                .context("REQUEST_INTERVAL_MS must be a number of milliseconds")?,
            None if api_key.is_some() => AUTHENTICATED_INTERVAL_MS,
            None => ANONYMOUS_INTERVAL_MS,
        };

        let max_retries = match var("MAX_RETRIES") {
            Some(raw) => raw.parse().context("MAX_RETRIES must be a number")?,
            None => DEFAULT_MAX_RETRIES,
        };

        Ok(Config {
            api_url,
            api_key,
            collection_address,
            page_size,
            request_interval: Duration::from_millis(interval_ms),
            max_retries,
        })
    }
}

pub fn validate_page_size(page_size: u32) -> Result<u32> {
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        anyhow::bail!(
            "Page size must be between 1 and {}, got {}",
            MAX_PAGE_SIZE,
            page_size
        );
    }
    Ok(page_size)
}
