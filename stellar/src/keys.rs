use stellar_base::PublicKey;

/// Encoded length of an account id: 35 bytes of payload in base32.
const ACCOUNT_ID_LEN: usize = 56;

/// Returns true when `candidate` is a canonical Stellar account id (`G...`).
///
/// Version byte and CRC16 checksum are checked by the strkey decoder. The
/// decoder tolerates trailing base32 padding bits, so the decoded key must
/// also re-encode to exactly `candidate`. Secret seeds are rejected.
pub fn validate_key(candidate: &str) -> bool {
    if candidate.len() != ACCOUNT_ID_LEN {
        return false;
    }
    PublicKey::from_account_id(candidate)
        .map(|pk| pk.account_id() == candidate)
        .unwrap_or(false)
}
