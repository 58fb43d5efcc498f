//! Uniform response shapes returned by every task handler.

use crate::error::{ClientError, Error, ErrorKind};
use serde::Serialize;
use serde_json::Value;

pub const INVALID_PUBLIC_KEY: &str = "Invalid Public key";
pub const NO_PAYMENT_PATHS: &str = "No payment paths";
pub const HORIZON_ERROR: &str = "Horizon Error";
pub const ACCOUNT_LOOKUP_FAILED: &str = "Account lookup failed";
pub const TRANSACTION_REJECTED: &str = "Transaction rejected";
pub const SUBMITTED: &str = "Transaction submitted successfully";
pub const KEYPAIR_GENERATED: &str = "Keypair generated";
pub const GENERIC_FAILURE: &str = "An error occured. Check logs";

/// Append-only progress log of a single handler invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Messages(Vec<String>);

impl Messages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseEnvelope {
    pub data: Value,
    pub message: Vec<String>,
}

impl ResponseEnvelope {
    pub fn new(data: Value, messages: Messages) -> Self {
        Self {
            data,
            message: messages.into_vec(),
        }
    }
}

/// Failure side of a handler. `message` is the same list a successful call
/// would have carried, ending with the reason the call stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub kind: ErrorKind,
    pub message: Vec<String>,
}

impl Rejection {
    pub fn new(err: &Error, mut messages: Messages) -> Self {
        messages.push(user_message(err));
        Self {
            kind: err.kind(),
            message: messages.into_vec(),
        }
    }

    pub fn last_message(&self) -> Option<&str> {
        self.message.last().map(String::as_str)
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message.join("; "))
    }
}

impl std::error::Error for Rejection {}

/// What the caller gets to see; details stay in the server log.
fn user_message(err: &Error) -> &'static str {
    match err {
        Error::InvalidPublicKey(_) => INVALID_PUBLIC_KEY,
        Error::NoPaymentPaths => NO_PAYMENT_PATHS,
        Error::EmptySubmission => HORIZON_ERROR,
        Error::Client(ClientError::AccountLookup { .. }) => ACCOUNT_LOOKUP_FAILED,
        Error::Client(ClientError::TransactionRejected { .. }) => TRANSACTION_REJECTED,
        _ => GENERIC_FAILURE,
    }
}
