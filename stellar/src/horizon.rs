//! [`LedgerClient`] backed by a Horizon server.
//!
//! Accounts are fetched through `stellar-horizon`'s typed request. Path
//! finding and submission go through plain `reqwest` calls so their JSON
//! bodies can be handed back to callers untouched.

use crate::client::{AccountState, LedgerClient, PathQuery, PathRecord, SignedTransaction};
use crate::config::Settings;
use crate::error::ClientError;
use crate::operation::AssetSpec;
use async_trait::async_trait;
use log::{debug, warn};
use serde_json::Value;
use std::time::Duration;
use stellar_base::PublicKey;
use stellar_horizon::api::accounts;
use stellar_horizon::client::{HorizonClient as _, HorizonHttpClient};

pub struct HorizonClient {
    base_url: String,
    timeout: Duration,
    horizon: HorizonHttpClient,
    http: reqwest::Client,
}

impl HorizonClient {
    pub fn new(settings: &Settings) -> Result<Self, ClientError> {
        let base_url = settings.horizon_url().trim_end_matches('/').to_string();
        let horizon = HorizonHttpClient::new(base_url.as_str())
            .map_err(|e| ClientError::Sdk(e.to_string()))?;
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout())
            .build()?;

        Ok(HorizonClient {
            base_url,
            timeout: settings.request_timeout(),
            horizon,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl LedgerClient for HorizonClient {
    async fn load_account(&self, public_key: &str) -> Result<AccountState, ClientError> {
        let lookup_failed = |reason: String| ClientError::AccountLookup {
            account: public_key.to_string(),
            reason,
        };

        let public = PublicKey::from_account_id(public_key).map_err(|e| lookup_failed(e.to_string()))?;
        let request = accounts::single(&public);

        debug!("loading account {}", public_key);
        let resp = tokio::time::timeout(self.timeout, self.horizon.request(request))
            .await
            .map_err(|_| lookup_failed("request timed out".to_string()))?
            .map_err(|e| lookup_failed(e.to_string()))?;

        // Horizon renders sequence numbers as JSON strings.
        let sequence = resp
            .1
            .sequence
            .to_string()
            .parse::<i64>()
            .map_err(|e| lookup_failed(format!("bad sequence number: {}", e)))?;

        Ok(AccountState {
            account_id: public_key.to_string(),
            sequence,
        })
    }

    async fn find_paths(&self, query: &PathQuery) -> Result<Vec<PathRecord>, ClientError> {
        let url = format!("{}/paths/strict-receive", self.base_url);

        // Keyed on native source assets rather than the sender's account, so
        // every record spends lumens and its source amount is an XLM cap.
        let mut params = vec![
            ("source_assets", "native".to_string()),
            ("destination_asset_type", query.asset.asset_type().to_string()),
            ("destination_amount", query.amount.clone()),
        ];
        if let AssetSpec::Credit { code, issuer } = &query.asset {
            params.push(("destination_asset_code", code.clone()));
            params.push(("destination_asset_issuer", issuer.clone()));
        }

        debug!(
            "finding paths {} -> {} for {} {}",
            query.source,
            query.destination,
            query.amount,
            query.asset.asset_type()
        );
        let response = self.http.get(&url).query(&params).send().await?;

        match response.status().as_u16() {
            200 => {
                let data: Value = response.json().await?;
                let records = data["_embedded"]["records"]
                    .as_array()
                    .cloned()
                    .unwrap_or_default();

                records
                    .into_iter()
                    .map(|r| serde_json::from_value(r).map_err(ClientError::from))
                    .collect()
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(ClientError::Horizon { status, body })
            }
        }
    }

    async fn submit_transaction(
        &self,
        tx: &SignedTransaction,
    ) -> Result<Option<Value>, ClientError> {
        let url = format!("{}/transactions", self.base_url);

        debug!("submitting transaction");
        let response = self
            .http
            .post(&url)
            .form(&[("tx", tx.envelope_xdr.as_str())])
            .send()
            .await?;

        match response.status().as_u16() {
            200 => {
                let body = response.text().await?;
                if body.trim().is_empty() {
                    return Ok(None);
                }
                let value: Value = serde_json::from_str(&body)?;
                Ok(if value.is_null() { None } else { Some(value) })
            }
            400 => {
                let body = response.text().await.unwrap_or_default();
                warn!("transaction rejected by horizon: {}", body);
                Err(ClientError::TransactionRejected { body })
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(ClientError::Horizon { status, body })
            }
        }
    }
}
