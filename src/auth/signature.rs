//! HMAC-SHA256 signature generation for Bybit API authentication.
//!
//! Bybit v5 signed REST requests use a signature computed as:
//! ```text
//! HMAC-SHA256(timestamp + api_key + recv_window + payload, api_secret)
//! ```
//! where `payload` is the URL-encoded query string for GET requests and the
//! raw JSON body for POST requests. The lowercase hex signature is sent in
//! the `X-BAPI-SIGN` header.
//!
//! WebSocket authentication on the private stream signs the challenge:
//! ```text
//! HMAC-SHA256("GET/realtime" + expires, api_secret)
//! ```
//! where `expires` is a millisecond deadline slightly in the future.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::auth::Credentials;
use crate::error::BybitError;

type HmacSha256 = Hmac<Sha256>;

/// Compute the lowercase hex HMAC-SHA256 of `payload` under `secret`.
fn hmac_hex(secret: &str, payload: &str) -> Result<String, BybitError> {
    if secret.is_empty() {
        return Err(BybitError::Auth("API secret is empty".to_string()));
    }
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| BybitError::Auth(format!("Invalid HMAC key: {e}")))?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Sign a REST request for Bybit's private API.
///
/// # Arguments
///
/// * `credentials` - API credentials containing the secret
/// * `timestamp` - Millisecond timestamp, offset-corrected (`X-BAPI-TIMESTAMP`)
/// * `recv_window` - Validity window in milliseconds (`X-BAPI-RECV-WINDOW`)
/// * `payload` - URL-encoded query string (GET) or raw JSON body (POST)
///
/// # Returns
///
/// Lowercase hex HMAC-SHA256 signature for the `X-BAPI-SIGN` header.
///
/// # Example
///
/// ```rust
/// use bybit_api_client::auth::{Credentials, sign_request};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let credentials = Credentials::new("api_key", "api_secret");
/// let signature = sign_request(
///     &credentials,
///     1700000000000,
///     5000,
///     "category=linear&symbol=BTCUSDT",
/// )?;
/// assert_eq!(signature.len(), 64);
/// # Ok(())
/// # }
/// ```
pub fn sign_request(
    credentials: &Credentials,
    timestamp: i64,
    recv_window: u64,
    payload: &str,
) -> Result<String, BybitError> {
    let canonical = format!("{timestamp}{}{recv_window}{payload}", credentials.api_key);
    hmac_hex(credentials.expose_secret(), &canonical)
}

/// Sign the WebSocket authentication challenge for the private stream.
///
/// # Arguments
///
/// * `credentials` - API credentials containing the secret
/// * `expires` - Millisecond deadline for the auth frame (now + ~1s)
///
/// # Returns
///
/// Lowercase hex HMAC-SHA256 signature for the auth frame's `args` array.
pub fn sign_ws_auth(credentials: &Credentials, expires: u64) -> Result<String, BybitError> {
    hmac_hex(credentials.expose_secret(), &format!("GET/realtime{expires}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    // HMAC-SHA256 test vectors from RFC 4231.
    #[test]
    fn test_hmac_rfc4231_case_1() {
        let key = "\x0b".repeat(20);
        let result = hmac_hex(&key, "Hi There").unwrap();
        assert_eq!(
            result,
            "b0344c61d8db38535ca8afceaf0bf12b881dc200c9833da726e9376c2e32cff7"
        );
    }

    #[test]
    fn test_hmac_rfc4231_case_2() {
        let result = hmac_hex("Jefe", "what do ya want for nothing?").unwrap();
        assert_eq!(
            result,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_signature_consistency() {
        // Same inputs should produce same signature.
        let credentials = Credentials::new("key", "my_secret");

        let sig1 = sign_request(&credentials, 1700000000000, 5000, "symbol=BTCUSDT").unwrap();
        let sig2 = sign_request(&credentials, 1700000000000, 5000, "symbol=BTCUSDT").unwrap();

        assert_eq!(sig1, sig2);
        assert_eq!(sig1.len(), 64);
        assert!(sig1.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_signature_changes_with_timestamp() {
        let credentials = Credentials::new("key", "my_secret");

        let sig1 = sign_request(&credentials, 1700000000000, 5000, "symbol=BTCUSDT").unwrap();
        let sig2 = sign_request(&credentials, 1700000000001, 5000, "symbol=BTCUSDT").unwrap();

        assert_ne!(sig1, sig2);
    }

    #[test]
    fn test_signature_changes_with_payload() {
        let credentials = Credentials::new("key", "my_secret");

        let sig1 = sign_request(&credentials, 1700000000000, 5000, "symbol=BTCUSDT").unwrap();
        let sig2 = sign_request(&credentials, 1700000000000, 5000, "symbol=ETHUSDT").unwrap();

        assert_ne!(sig1, sig2);
    }

    #[test]
    fn test_ws_auth_signature_changes_with_expires() {
        let credentials = Credentials::new("key", "my_secret");

        let sig1 = sign_ws_auth(&credentials, 1700000001000).unwrap();
        let sig2 = sign_ws_auth(&credentials, 1700000002000).unwrap();

        assert_ne!(sig1, sig2);
        assert_eq!(sig1.len(), 64);
    }

    #[test]
    fn test_empty_secret_rejected() {
        let credentials = Credentials::new("key", "");
        let result = sign_request(&credentials, 1700000000000, 5000, "");
        assert!(matches!(result, Err(BybitError::Auth(_))));
    }
}
