use stellar_base::crypto::KeyPair;
use stellar_base::xdr::XDRSerialize;
pub use stellar_base::{Network, PublicKey, Transaction};

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod horizon;
pub mod keys;
pub mod network;
pub mod operation;
pub mod tasks;

pub use client::{AccountState, AssetRecord, LedgerClient, PathQuery, PathRecord, SignedTransaction};
pub use config::{ConfigError, Identity, Settings};
pub use envelope::{Messages, Rejection, ResponseEnvelope};
pub use error::{ClientError, Error, ErrorKind, Result};
pub use horizon::HorizonClient;
pub use keys::validate_key;
pub use network::StellarNetwork;
pub use operation::{AssetSpec, OperationSpec};
pub use tasks::Tasks;

/// Holds the keypair of one configured account and signs on its behalf.
pub struct Signer {
    pub kp: KeyPair,
    pub network: StellarNetwork,
}

impl Signer {
    pub fn new(seed: &str, network: StellarNetwork) -> Result<Self> {
        let kp = keypair_from_seed(seed)?;
        Ok(Signer { kp, network })
    }

    pub fn sign(&self, tx: Transaction) -> Result<SignedTransaction> {
        sign(&self.kp, tx, self.network)
    }
}

pub fn keypair_from_seed(seed: &str) -> Result<KeyPair> {
    Ok(KeyPair::from_secret_seed(seed)?)
}

/// Fresh random keypair; initialises libsodium first since the seed comes
/// from its RNG.
pub fn random_keypair() -> Result<KeyPair> {
    sodiumoxide::init().map_err(|_| Error::CryptoInit)?;
    Ok(KeyPair::random()?)
}

/// Signs `tx` for `network` and encodes the resulting envelope.
pub fn sign(kp: &KeyPair, mut tx: Transaction, network: StellarNetwork) -> Result<SignedTransaction> {
    tx.sign(kp, &network.to_stellar_network())?;
    let envelope_xdr = tx.into_envelope().xdr_base64()?;
    Ok(SignedTransaction { envelope_xdr })
}
