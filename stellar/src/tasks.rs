//! The five ledger tasks.
//!
//! Every handler builds its own [`Messages`] list and returns it inside
//! either a [`ResponseEnvelope`] or a [`Rejection`]. Nothing but the
//! read-only settings and the client is shared between calls, so handlers
//! can run concurrently on one `Tasks` value.

use crate::client::{LedgerClient, PathQuery};
use crate::config::{Identity, Settings};
use crate::envelope::{Messages, Rejection, ResponseEnvelope, KEYPAIR_GENERATED, SUBMITTED};
use crate::error::{ClientError, Error, Result};
use crate::keys::validate_key;
use crate::operation::{assemble, AssetSpec, OperationSpec};
use crate::{random_keypair, Signer};
use log::{debug, error, info};
use serde_json::{json, Value};
use std::error::Error as _;
use std::sync::Arc;

/// Amount of the configured asset put up for sale by [`Tasks::offers`].
pub const OFFER_AMOUNT: &str = "5000000";
/// Price of one unit of the configured asset in lumens (500 units = 1 XLM).
pub const OFFER_PRICE: (i32, i32) = (1, 500);

pub struct Tasks<C> {
    settings: Arc<Settings>,
    client: C,
}

impl<C: LedgerClient> Tasks<C> {
    pub fn new(settings: Settings, client: C) -> Self {
        Self::with_shared_settings(Arc::new(settings), client)
    }

    pub fn with_shared_settings(settings: Arc<Settings>, client: C) -> Self {
        Tasks { settings, client }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Creates a fresh random keypair locally. Never talks to the ledger.
    pub async fn generate_keypair(&self) -> std::result::Result<ResponseEnvelope, Rejection> {
        generate_keypair()
    }

    /// Funds `public_key` from the issuer with the configured starting balance.
    pub async fn create_account(
        &self,
        public_key: &str,
    ) -> std::result::Result<ResponseEnvelope, Rejection> {
        let messages = Messages::new();
        info!("create_account for {}", public_key);

        let outcome = async {
            ensure_valid_key(public_key)?;
            let spec = OperationSpec::CreateAccount {
                destination: public_key.to_string(),
                starting_balance: self.settings.starting_balance.clone(),
            };
            self.submit_as(&self.settings.issuer, &spec).await
        }
        .await;

        finish("create_account", outcome, messages)
    }

    /// Makes the receiver trust the configured asset.
    pub async fn trustlines(&self) -> std::result::Result<ResponseEnvelope, Rejection> {
        let messages = Messages::new();
        let receiver = &self.settings.receiver;
        info!("trustlines for {}", receiver.public_key);

        let outcome = async {
            ensure_valid_key(&receiver.public_key)?;
            let spec = OperationSpec::ChangeTrust {
                asset: self.settings.asset(),
            };
            self.submit_as(receiver, &spec).await
        }
        .await;

        finish("trustlines", outcome, messages)
    }

    /// Puts a new sell offer for the configured asset against lumens on the
    /// issuer's book.
    pub async fn offers(&self) -> std::result::Result<ResponseEnvelope, Rejection> {
        let messages = Messages::new();
        let issuer = &self.settings.issuer;
        info!("offers from {}", issuer.public_key);

        let outcome = async {
            ensure_valid_key(&issuer.public_key)?;
            let spec = OperationSpec::ManageOffer {
                selling: self.settings.asset(),
                buying: AssetSpec::Native,
                amount: OFFER_AMOUNT.to_string(),
                price: OFFER_PRICE,
                offer_id: 0,
            };
            self.submit_as(issuer, &spec).await
        }
        .await;

        finish("offers", outcome, messages)
    }

    /// Pays the receiver the configured destination amount of the asset,
    /// spending lumens from the sender along the first path Horizon offers.
    pub async fn path_payment(&self) -> std::result::Result<ResponseEnvelope, Rejection> {
        let messages = Messages::new();
        let sender = &self.settings.sender;
        let receiver = &self.settings.receiver;
        info!(
            "path_payment {} -> {}",
            sender.public_key, receiver.public_key
        );

        let outcome = async {
            ensure_valid_key(&sender.public_key)?;
            ensure_valid_key(&receiver.public_key)?;

            let asset = self.settings.asset();
            let query = PathQuery {
                source: sender.public_key.clone(),
                destination: receiver.public_key.clone(),
                asset: asset.clone(),
                amount: self.settings.destination_amount.clone(),
            };

            let best = self
                .client
                .find_paths(&query)
                .await?
                .into_iter()
                .next()
                .ok_or(Error::NoPaymentPaths)?;
            debug!(
                "using path via {} hop(s), source amount {}",
                best.path.len(),
                best.source_amount
            );

            let path = best
                .path
                .iter()
                .map(AssetSpec::try_from)
                .collect::<Result<Vec<_>>>()?;

            let spec = OperationSpec::PathPayment {
                send_asset: AssetSpec::Native,
                send_max: best.source_amount.clone(),
                destination: receiver.public_key.clone(),
                dest_asset: asset,
                dest_amount: self.settings.destination_amount.clone(),
                path,
            };
            let tx_result = self.submit_as(sender, &spec).await?;

            Ok::<_, Error>(json!({
                "pathUsed": serde_json::to_value(&best)?,
                "txResult": tx_result,
            }))
        }
        .await;

        finish("path_payment", outcome, messages)
    }

    /// Load, assemble, sign and submit `spec` with `source` as the
    /// transaction's source account.
    async fn submit_as(&self, source: &Identity, spec: &OperationSpec) -> Result<Value> {
        let account = self.client.load_account(&source.public_key).await?;
        debug!(
            "{} at sequence {}",
            account.account_id, account.sequence
        );

        let tx = assemble(&account, spec)?;
        let signed = Signer::new(&source.private_key, self.settings.network)?.sign(tx)?;
        debug!("{} envelope: {}", spec.name(), signed.envelope_xdr);

        self.client
            .submit_transaction(&signed)
            .await?
            .ok_or(Error::EmptySubmission)
    }
}

/// Keypair generation needs neither settings nor a client, so it is also
/// usable on its own.
pub fn generate_keypair() -> std::result::Result<ResponseEnvelope, Rejection> {
    let mut messages = Messages::new();
    info!("generate_keypair");

    let outcome = random_keypair().map(|kp| {
        json!({
            "publicKey": kp.public_key().account_id(),
            "privateKey": kp.secret_key().secret_seed(),
        })
    });

    match outcome {
        Ok(data) => {
            messages.push(KEYPAIR_GENERATED);
            Ok(ResponseEnvelope::new(data, messages))
        }
        Err(e) => Err(reject("generate_keypair", &e, messages)),
    }
}

fn ensure_valid_key(candidate: &str) -> Result<()> {
    if validate_key(candidate) {
        Ok(())
    } else {
        Err(Error::InvalidPublicKey(candidate.to_string()))
    }
}

fn finish(
    task: &str,
    outcome: Result<Value>,
    mut messages: Messages,
) -> std::result::Result<ResponseEnvelope, Rejection> {
    match outcome {
        Ok(data) => {
            messages.push(SUBMITTED);
            info!("{} submitted", task);
            Ok(ResponseEnvelope::new(data, messages))
        }
        Err(e) => Err(reject(task, &e, messages)),
    }
}

fn reject(task: &str, err: &Error, messages: Messages) -> Rejection {
    error!("{} failed: {}", task, describe(err));
    match err {
        Error::Client(ClientError::TransactionRejected { body })
        | Error::Client(ClientError::Horizon { body, .. }) => {
            error!("{} horizon response: {}", task, body)
        }
        _ => {}
    }
    Rejection::new(err, messages)
}

/// Full cause chain, for the server log only.
fn describe(err: &Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
