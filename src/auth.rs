use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the gateway's signature over the raw request body.
pub const SIGNATURE_HEADER: &str = "x-webhook-signature";

/// Base64-encoded HMAC-SHA256 of the payload under the shared secret.
pub fn sign(secret: &str, payload: &[u8]) -> String {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        // HMAC accepts keys of any length; new_from_slice cannot fail.
        Err(_) => return String::new(),
    };
    mac.update(payload);
    BASE64.encode(mac.finalize().into_bytes())
}

/// Verify a provided signature against the raw payload bytes in constant
/// time. Must be checked before any parsing or persistence.
pub fn verify_signature(secret: &str, payload: &[u8], provided: &str) -> bool {
    let expected = sign(secret, payload);
    constant_time_eq(expected.as_bytes(), provided.trim().as_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}
