//! Transaction assembly: one [`OperationSpec`] in, one unsigned
//! `stellar_base` transaction out.

use crate::client::{AccountState, AssetRecord};
use crate::error::{Error, Result};
use std::str::FromStr;
use stellar_base::amount::{Amount, Price};
use stellar_base::asset::Asset;
use stellar_base::operations::Operation;
use stellar_base::transaction::MIN_BASE_FEE;
use stellar_base::{PublicKey, Transaction};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSpec {
    Native,
    Credit { code: String, issuer: String },
}

impl AssetSpec {
    pub fn credit(code: impl Into<String>, issuer: impl Into<String>) -> Self {
        AssetSpec::Credit {
            code: code.into(),
            issuer: issuer.into(),
        }
    }

    /// Horizon's `asset_type` for this asset.
    pub fn asset_type(&self) -> &'static str {
        match self {
            AssetSpec::Native => "native",
            AssetSpec::Credit { code, .. } if code.len() <= 4 => "credit_alphanum4",
            AssetSpec::Credit { .. } => "credit_alphanum12",
        }
    }

    pub fn to_asset(&self) -> Result<Asset> {
        match self {
            AssetSpec::Native => Ok(Asset::new_native()),
            AssetSpec::Credit { code, issuer } => {
                let issuer = PublicKey::from_account_id(issuer)?;
                Ok(Asset::new_credit(code.as_str(), issuer)?)
            }
        }
    }
}

impl TryFrom<&AssetRecord> for AssetSpec {
    type Error = Error;

    fn try_from(record: &AssetRecord) -> Result<Self> {
        if record.asset_type == "native" {
            return Ok(AssetSpec::Native);
        }
        match (&record.asset_code, &record.asset_issuer) {
            (Some(code), Some(issuer)) => Ok(AssetSpec::credit(code, issuer)),
            _ => Err(Error::MalformedAsset(format!(
                "{} record without code or issuer",
                record.asset_type
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationSpec {
    CreateAccount {
        destination: String,
        starting_balance: String,
    },
    /// The trustor is the transaction's source account.
    ChangeTrust { asset: AssetSpec },
    /// `offer_id` 0 creates a new offer.
    ManageOffer {
        selling: AssetSpec,
        buying: AssetSpec,
        amount: String,
        price: (i32, i32),
        offer_id: i64,
    },
    /// Strict-receive: `dest_amount` is exact, `send_max` caps the cost.
    PathPayment {
        send_asset: AssetSpec,
        send_max: String,
        destination: String,
        dest_asset: AssetSpec,
        dest_amount: String,
        path: Vec<AssetSpec>,
    },
}

impl OperationSpec {
    pub fn name(&self) -> &'static str {
        match self {
            OperationSpec::CreateAccount { .. } => "create_account",
            OperationSpec::ChangeTrust { .. } => "change_trust",
            OperationSpec::ManageOffer { .. } => "manage_sell_offer",
            OperationSpec::PathPayment { .. } => "path_payment_strict_receive",
        }
    }

    pub fn to_operation(&self) -> Result<Operation> {
        let op = match self {
            OperationSpec::CreateAccount {
                destination,
                starting_balance,
            } => Operation::new_create_account()
                .with_destination(PublicKey::from_account_id(destination)?)
                .with_starting_balance(Amount::from_str(starting_balance)?)?
                .build()?,
            OperationSpec::ChangeTrust { asset } => Operation::new_change_trust()
                .with_asset(asset.to_asset()?)
                .build()?,
            OperationSpec::ManageOffer {
                selling,
                buying,
                amount,
                price,
                offer_id,
            } => {
                let mut builder = Operation::new_manage_sell_offer()
                    .with_selling_asset(selling.to_asset()?)
                    .with_buying_asset(buying.to_asset()?)
                    .with_amount(Amount::from_str(amount)?)?
                    .with_price(Price::new(price.0, price.1));
                if *offer_id != 0 {
                    builder = builder.with_offer_id(Some(*offer_id));
                }
                builder.build()?
            }
            OperationSpec::PathPayment {
                send_asset,
                send_max,
                destination,
                dest_asset,
                dest_amount,
                path,
            } => {
                let mut builder = Operation::new_path_payment_strict_receive()
                    .with_send_asset(send_asset.to_asset()?)
                    .with_send_max(Amount::from_str(send_max)?)?
                    .with_destination(PublicKey::from_account_id(destination)?)
                    .with_destination_asset(dest_asset.to_asset()?)
                    .with_destination_amount(Amount::from_str(dest_amount)?)?;
                for hop in path {
                    builder = builder.add_asset(hop.to_asset()?);
                }
                builder.build()?
            }
        };
        Ok(op)
    }
}

/// Builds a single-operation transaction on top of `source`'s current
/// sequence number.
pub fn assemble(source: &AccountState, spec: &OperationSpec) -> Result<Transaction> {
    let source_key = PublicKey::from_account_id(&source.account_id)?;
    let op = spec.to_operation()?;
    let sequence = source
        .sequence
        .checked_add(1)
        .ok_or(Error::SequenceOverflow(source.sequence))?;
    Ok(Transaction::builder(source_key, sequence, MIN_BASE_FEE)
        .add_operation(op)
        .into_transaction()?)
}
