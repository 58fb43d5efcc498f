//! Process-wide settings, loaded once at startup and read-only afterwards.

use crate::keys::validate_key;
use crate::network::StellarNetwork;
use crate::operation::AssetSpec;
use serde::{Deserialize, Deserializer};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use stellar_base::amount::Amount;
use thiserror::Error;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read config file")]
    Io(#[from] std::io::Error),
    #[error("could not parse config file")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {}", .0.join(", "))]
    Validation(Vec<String>),
}

/// Public/secret key pair of a configured account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub public_key: String,
    pub private_key: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub network: StellarNetwork,
    /// Overrides the network's public Horizon instance.
    #[serde(default)]
    pub horizon_url: Option<String>,
    pub asset_code: String,
    #[serde(deserialize_with = "amount_string")]
    pub starting_balance: String,
    #[serde(deserialize_with = "amount_string")]
    pub destination_amount: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    pub issuer: Identity,
    pub sender: Identity,
    pub receiver: Identity,
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

/// Amounts may be written as TOML strings or numbers; both end up as the
/// decimal string the SDK parses.
fn amount_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(i) => i.to_string(),
        Raw::Float(f) => f.to_string(),
    })
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate().map_err(ConfigError::Validation)?;
        Ok(settings)
    }

    /// Collects every problem rather than stopping at the first one.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        for (role, identity) in self.identities() {
            if !validate_key(&identity.public_key) {
                errors.push(format!("{}: publicKey is not a valid account id", role));
                continue;
            }
            match crate::keypair_from_seed(&identity.private_key) {
                Ok(kp) if kp.public_key().account_id() != identity.public_key => {
                    errors.push(format!("{}: privateKey does not match publicKey", role))
                }
                Ok(_) => {}
                Err(_) => errors.push(format!("{}: privateKey is not a valid secret seed", role)),
            }
        }

        let code_ok = !self.asset_code.is_empty()
            && self.asset_code.len() <= 12
            && self.asset_code.chars().all(|c| c.is_ascii_alphanumeric());
        if !code_ok {
            errors.push(format!(
                "assetCode '{}' must be 1-12 alphanumeric characters",
                self.asset_code
            ));
        }

        for (name, value) in [
            ("startingBalance", &self.starting_balance),
            ("destinationAmount", &self.destination_amount),
        ] {
            if !is_positive_amount(value) {
                errors.push(format!("{} '{}' is not a positive amount", name, value));
            }
        }

        if self.request_timeout_secs == 0 {
            errors.push("requestTimeoutSecs must be greater than zero".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn horizon_url(&self) -> &str {
        self.horizon_url
            .as_deref()
            .unwrap_or_else(|| self.network.to_network_url())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The configured credit asset, issued by the issuer account.
    pub fn asset(&self) -> AssetSpec {
        AssetSpec::credit(self.asset_code.clone(), self.issuer.public_key.clone())
    }

    fn identities(&self) -> [(&'static str, &Identity); 3] {
        [
            ("issuer", &self.issuer),
            ("sender", &self.sender),
            ("receiver", &self.receiver),
        ]
    }
}

fn is_positive_amount(value: &str) -> bool {
    !value.trim_start().starts_with('-')
        && value.parse::<f64>().map(|v| v > 0.0).unwrap_or(false)
        && Amount::from_str(value).is_ok()
}
