/// Helius API client for enriched transaction history and token metadata

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::{TokenMetadata, Transaction};

const HELIUS_API: &str = "https://api.helius.xyz/v0";
const API_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("missing HELIUS_API_KEY")]
    MissingApiKey,
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("history endpoint returned {status} for {address}")]
    Status {
        status: reqwest::StatusCode,
        address: String,
    },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// One page of transaction history for an address.
///
/// Seats the fetcher on top of either the real API or a synthetic
/// source in tests.
#[async_trait]
pub trait TransactionSource: Send + Sync {
    async fn fetch_page(
        &self,
        address: &str,
        before: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Transaction>, ClientError>;
}

pub struct HeliusClient {
    client: Client,
    api_key: String,
}

impl HeliusClient {
    /// Build a client, taking the key from the argument or the
    /// `HELIUS_API_KEY` environment variable. A missing key fails here,
    /// not on the first request.
    pub fn new(api_key: Option<String>) -> Result<Self, ClientError> {
        let api_key = api_key
            .or_else(|| std::env::var("HELIUS_API_KEY").ok())
            .filter(|key| !key.is_empty())
            .ok_or(ClientError::MissingApiKey)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(API_TIMEOUT_SECS))
            .build()?;

        Ok(Self { client, api_key })
    }

    /// Fetch mint decimals/supply for report headers. Tokens the API does
    /// not know come back as `None`.
    pub async fn get_token_metadata(&self, mint: &str) -> Result<Option<TokenMetadata>, ClientError> {
        let url = format!("{}/token-metadata?api-key={}", HELIUS_API, self.api_key);
        let payload = json!({ "mintAccounts": [mint] });

        let response = self.client.post(&url).json(&payload).send().await?;
        if !response.status().is_success() {
            warn!("⚠️ Token metadata lookup failed for {}: {}", mint, response.status());
            return Ok(None);
        }

        let entries: Vec<Value> = response.json().await?;
        let Some(entry) = entries.first() else {
            return Ok(None);
        };

        let info = &entry["onChainAccountInfo"]["accountInfo"]["data"]["parsed"]["info"];
        let decimals = info["decimals"].as_u64().unwrap_or(0) as u8;
        let supply = info["supply"].as_str().map(str::to_string);
        let symbol = entry["onChainMetadata"]["metadata"]["data"]["symbol"]
            .as_str()
            .map(|s| s.trim_end_matches('\0').to_string())
            .filter(|s| !s.is_empty());

        Ok(Some(TokenMetadata {
            mint: mint.to_string(),
            symbol,
            decimals,
            supply,
        }))
    }
}

#[async_trait]
impl TransactionSource for HeliusClient {
    async fn fetch_page(
        &self,
        address: &str,
        before: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Transaction>, ClientError> {
        let mut url = format!(
            "{}/addresses/{}/transactions?api-key={}&commitment=confirmed&limit={}",
            HELIUS_API, address, self.api_key, limit
        );
        if let Some(cursor) = before {
            url.push_str("&before=");
            url.push_str(cursor);
        }

        debug!("🌐 Fetching transaction page for {} (before: {:?})", address, before);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status,
                address: address.to_string(),
            });
        }

        let transactions: Vec<Transaction> = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        Ok(transactions)
    }
}
