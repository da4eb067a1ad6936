//! HMAC-SHA1 Webhook Signing
//!
//! Verifies the `X-Hub-Signature` header sent with every event POST.
//! The header carries `sha1=<hex digest>` of the raw body keyed by the app secret.

use hmac::{Hmac, Mac};
use sha1::Sha1;

use super::error::VerificationError;

type HmacSha1 = Hmac<Sha1>;

/// Header carrying the body signature.
pub const SIGNATURE_HEADER: &str = "X-Hub-Signature";

fn mac_for(secret: &[u8], payload: &[u8]) -> HmacSha1 {
    let mut mac = HmacSha1::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(payload);
    mac
}

/// Sign a payload and return the header value (`sha1=<hex>`).
pub fn sign_payload(secret: &[u8], payload: &[u8]) -> String {
    format!("sha1={}", hex::encode(mac_for(secret, payload).finalize().into_bytes()))
}

/// Verify a signature header against the raw body.
///
/// The header is split on the first `=`; the algorithm label is not
/// interpreted. The digest must be lowercase hex, exactly as produced by
/// [`sign_payload`]. The digest comparison is constant-time.
pub fn verify_signature(
    header: &str,
    secret: &[u8],
    payload: &[u8],
) -> Result<(), VerificationError> {
    if header.is_empty() {
        return Err(VerificationError::MissingSignature);
    }

    let (_algorithm, hash) = header
        .split_once('=')
        .ok_or(VerificationError::MalformedSignature)?;

    if !is_lower_hex(hash) {
        return Err(VerificationError::SignatureMismatch);
    }
    let provided = hex::decode(hash).map_err(|_| VerificationError::SignatureMismatch)?;

    mac_for(secret, payload)
        .verify_slice(&provided)
        .map_err(|_| VerificationError::SignatureMismatch)
}

fn is_lower_hex(s: &str) -> bool {
    s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
