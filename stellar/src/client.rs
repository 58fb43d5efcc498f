//! Contract between the task handlers and whatever talks to the ledger.
//!
//! Handlers never see SDK or HTTP types; a [`LedgerClient`] hands them the
//! small records defined here. [`crate::HorizonClient`] is the production
//! implementation, tests plug in an in-memory one.

use crate::error::ClientError;
use crate::operation::AssetSpec;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Snapshot of an account taken right before building a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountState {
    pub account_id: String,
    /// Current sequence number; the next transaction must use `sequence + 1`.
    pub sequence: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathQuery {
    /// Paying account. The production client asks Horizon for native-sourced
    /// paths instead of sending this, so every record spends lumens.
    pub source: String,
    /// Receiving account; logged, not sent.
    pub destination: String,
    pub asset: AssetSpec,
    pub amount: String,
}

/// Asset as Horizon renders it inside path records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub asset_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_issuer: Option<String>,
}

/// One strict-receive path, in the order Horizon ranked it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathRecord {
    pub source_asset_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_asset_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_asset_issuer: Option<String>,
    pub source_amount: String,
    pub destination_asset_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_asset_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_asset_issuer: Option<String>,
    pub destination_amount: String,
    #[serde(default)]
    pub path: Vec<AssetRecord>,
}

/// A signed transaction envelope ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    /// Base64 XDR `TransactionEnvelope`.
    pub envelope_xdr: String,
}

#[async_trait]
pub trait LedgerClient: Send + Sync {
    async fn load_account(&self, public_key: &str) -> Result<AccountState, ClientError>;

    /// May return an empty list when no path exists.
    async fn find_paths(&self, query: &PathQuery) -> Result<Vec<PathRecord>, ClientError>;

    /// `Ok(None)` means the service answered without a usable result.
    async fn submit_transaction(
        &self,
        tx: &SignedTransaction,
    ) -> Result<Option<Value>, ClientError>;
}

#[async_trait]
impl<T: LedgerClient + ?Sized> LedgerClient for Arc<T> {
    async fn load_account(&self, public_key: &str) -> Result<AccountState, ClientError> {
        (**self).load_account(public_key).await
    }

    async fn find_paths(&self, query: &PathQuery) -> Result<Vec<PathRecord>, ClientError> {
        (**self).find_paths(query).await
    }

    async fn submit_transaction(
        &self,
        tx: &SignedTransaction,
    ) -> Result<Option<Value>, ClientError> {
        (**self).submit_transaction(tx).await
    }
}
