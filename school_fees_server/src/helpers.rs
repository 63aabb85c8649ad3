use hmac::{Hmac, Mac};
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

/// Computes the hex-encoded HMAC-SHA512 of `data`, keyed with the gateway secret. This is the signature
/// scheme the gateway uses for the `x-paystack-signature` webhook header.
pub fn calculate_hmac(secret: &str, data: &[u8]) -> String {
    hex::encode(hmac_of(secret, data).finalize().into_bytes())
}

/// Checks a hex-encoded HMAC-SHA512 signature against `data`. The comparison runs in constant time, so
/// the signature cannot be guessed byte by byte. A malformed hex string never matches.
pub fn verify_signature(secret: &str, data: &[u8], provided: &str) -> bool {
    let Ok(provided) = hex::decode(provided) else {
        return false;
    };
    hmac_of(secret, data).verify_slice(&provided).is_ok()
}

fn hmac_of(secret: &str, data: &[u8]) -> HmacSha512 {
    // HMAC keys can be any length, so this cannot fail.
    let mut mac = HmacSha512::new_from_slice(secret.as_bytes()).unwrap_or_else(|_| unreachable!());
    mac.update(data);
    mac
}
