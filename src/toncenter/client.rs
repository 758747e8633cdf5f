use super::models::{
    AccountResponse, MasterchainInfo, NftItemsResponse, TransactionsResponse,
};
use crate::address::Address;
use crate::config::Config;
use crate::ledger::{
    AccountState, Cursor, HeadRef, ItemInspector, ItemMetadata, LedgerClient, LedgerError,
    Transaction,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::{sleep, timeout};
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120); // 2 minutes timeout per request

type Query = Vec<(&'static str, String)>;

/// TON Center v3 indexer client, serving as both [`LedgerClient`] and [`ItemInspector`].
#[derive(Clone)]
pub struct TonCenterClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    min_interval: Duration,
    last_request: Arc<Mutex<Option<Instant>>>,
    max_retries: usize,
    request_timeout: Duration,
}

impl TonCenterClient {
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = config.api_url.trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(anyhow::anyhow!("Invalid TON Center URL: {}", config.api_url));
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(TonCenterClient {
            http,
            base_url,
            api_key: config.api_key.clone(),
            min_interval: config.request_interval,
            last_request: Arc::new(Mutex::new(None)),
            max_retries: config.max_retries,
            request_timeout: REQUEST_TIMEOUT,
        })
    }

    /// Bounds each attempt, from sending the request to decoding the body.
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // Public endpoints reject bursts, so requests are spaced at least `min_interval` apart.
    async fn pace(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(at) = *last {
            let elapsed = at.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    fn get_retry_strategy(&self) -> impl Iterator<Item = Duration> {
        ExponentialBackoff::from_millis(100)
            .factor(2)
            .max_delay(Duration::from_secs(10))
            .map(jitter)
            .take(self.max_retries)
    }

    fn handle_error(&self, url: &str, error_str: &str) {
        warn!("TON Center error on {}: {}, retrying", url, error_str);
    }

    fn handle_timeout(&self, url: &str) -> anyhow::Error {
        warn!(
            "Request timeout after {:?} on {}, retrying",
            self.request_timeout, url
        );
        anyhow::anyhow!("Request timeout after {:?}", self.request_timeout)
    }

    // Outer `Err` is worth retrying, inner `Err` is final.
    async fn attempt<T: DeserializeOwned>(&self, url: &str, query: &Query) -> Result<Result<T>> {
        let mut request = self.http.get(url).query(query);
        if let Some(key) = &self.api_key {
            request = request.header("X-API-Key", key);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let error_str = e.to_string();
                self.handle_error(url, &error_str);
                return Err(anyhow::anyhow!("{}", e));
            }
        };

        let status = response.status();
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                let error_str = e.to_string();
                self.handle_error(url, &error_str);
                return Err(anyhow::anyhow!("{}", e));
            }
        };

        if status.is_success() {
            // a body we cannot decode will not improve on retry
            return Ok(serde_json::from_slice::<T>(&body)
                .map_err(|e| anyhow::anyhow!("Invalid response from {}: {}", url, e)));
        }

        let error = anyhow::anyhow!(
            "HTTP {} from {}: {}",
            status,
            url,
            String::from_utf8_lossy(&body).trim()
        );
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            self.handle_error(url, &error.to_string());
            Err(error)
        } else {
            Ok(Err(error))
        }
    }

    async fn get_json<T>(&self, path: &str, query: Query) -> Result<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let url = format!("{}/{}", self.base_url, path);
        let client = self.clone();
        Retry::spawn(self.get_retry_strategy(), move || {
            let client = client.clone();
            let url = url.clone();
            let query = query.clone();
            async move {
                client.pace().await;
                debug!("GET {} {:?}", url, query);

                match timeout(client.request_timeout, client.attempt::<T>(&url, &query)).await {
                    Ok(outcome) => outcome,
                    Err(_) => Err(client.handle_timeout(&url)),
                }
            }
        })
        .await
        .and_then(|r| r)
    }
}

#[async_trait]
impl LedgerClient for TonCenterClient {
    async fn current_head(&self) -> Result<HeadRef, LedgerError> {
        let info: MasterchainInfo = self
            .get_json("masterchainInfo", Vec::new())
            .await
            .map_err(|e| LedgerError::Connectivity(format!("{e:#}")))?;
        Ok(info.last.into())
    }

    async fn account_state(
        &self,
        head: &HeadRef,
        address: &Address,
    ) -> Result<AccountState, LedgerError> {
        // The indexer serves the latest account state; the head only anchors logging.
        debug!(
            "Resolving account {} at masterchain seqno {} or later",
            address, head.seqno
        );
        let account: AccountResponse = self
            .get_json("account", vec![("address", address.to_raw())])
            .await
            .map_err(|e| LedgerError::Lookup {
                address: *address,
                reason: format!("{e:#}"),
            })?;
        Ok(account.into())
    }

    async fn list_transactions(
        &self,
        address: &Address,
        limit: u32,
        cursor: &Cursor,
    ) -> Result<Vec<Transaction>, LedgerError> {
        let query = vec![
            ("account", address.to_raw()),
            ("end_lt", cursor.lt.to_string()),
            ("limit", limit.to_string()),
            ("offset", "0".to_string()),
            ("sort", "desc".to_string()),
        ];
        let page: TransactionsResponse = self
            .get_json("transactions", query)
            .await
            .map_err(|e| LedgerError::Fetch(format!("{e:#}")))?;

        let transactions: Vec<Transaction> =
            page.transactions.into_iter().map(Transaction::from).collect();
        if let Some(newest) = transactions.first() {
            if newest.hash != cursor.hash {
                debug!(
                    "Page starts at {} ({}), cursor named {} ({})",
                    newest.hash, newest.lt, cursor.hash, cursor.lt
                );
            }
        }
        Ok(transactions)
    }
}

#[async_trait]
impl ItemInspector for TonCenterClient {
    async fn nft_data(&self, address: &Address) -> Result<ItemMetadata, LedgerError> {
        let inspection_error = |reason: String| LedgerError::Inspection {
            address: *address,
            reason,
        };

        let response: NftItemsResponse = self
            .get_json(
                "nft/items",
                vec![("address", address.to_raw()), ("limit", "1".to_string())],
            )
            .await
            .map_err(|e| inspection_error(format!("{e:#}")))?;

        response
            .nft_items
            .into_iter()
            .next()
            .map(ItemMetadata::from)
            .ok_or_else(|| inspection_error("not an NFT item".to_string()))
    }
}
