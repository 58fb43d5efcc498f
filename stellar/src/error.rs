use serde::Serialize;
use thiserror::Error;

/// Coarse classification exposed to callers of the task handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    RemoteLookup,
    Submission,
    Fault,
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("could not load account {account}: {reason}")]
    AccountLookup { account: String, reason: String },
    #[error("horizon responded with status {status}")]
    Horizon { status: u16, body: String },
    #[error("transaction rejected by horizon")]
    TransactionRejected { body: String },
    #[error("http transport error")]
    Http(#[from] reqwest::Error),
    #[error("could not decode horizon response")]
    Decode(#[from] serde_json::Error),
    #[error("horizon request failed: {0}")]
    Sdk(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid public key: {0:?}")]
    InvalidPublicKey(String),
    #[error("no payment paths found")]
    NoPaymentPaths,
    #[error("horizon returned no submission result")]
    EmptySubmission,
    #[error("malformed asset: {0}")]
    MalformedAsset(String),
    #[error("ledger client failure")]
    Client(#[from] ClientError),
    #[error("stellar sdk failure")]
    Sdk(#[from] stellar_base::error::Error),
    #[error("serialization failure")]
    Serialization(#[from] serde_json::Error),
    #[error("crypto backend failed to initialise")]
    CryptoInit,
    #[error("sequence number {0} cannot be advanced")]
    SequenceOverflow(i64),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidPublicKey(_) => ErrorKind::InvalidInput,
            Error::NoPaymentPaths => ErrorKind::RemoteLookup,
            Error::Client(ClientError::AccountLookup { .. }) => ErrorKind::RemoteLookup,
            Error::EmptySubmission => ErrorKind::Submission,
            Error::Client(ClientError::TransactionRejected { .. }) => ErrorKind::Submission,
            Error::Client(_)
            | Error::MalformedAsset(_)
            | Error::Sdk(_)
            | Error::Serialization(_)
            | Error::CryptoInit
            | Error::SequenceOverflow(_) => ErrorKind::Fault,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
