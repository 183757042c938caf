//! Webhook signature verification.
//!
//! The gateway signs every callback with HMAC-SHA256 over the raw request
//! body, keyed with the shared secret, and sends the lowercase hex digest in
//! `x-maxelpay-signature`, optionally prefixed with `sha256=`. Verification
//! must run on the bytes exactly as received, before any JSON parsing.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-maxelpay-signature";
const SIGNATURE_PREFIX: &str = "sha256=";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// Verification not attempted: the request carried no signature.
    #[error("missing webhook signature")]
    MissingSignature,
    /// Verification not attempted: no shared secret is configured.
    #[error("webhook secret not configured")]
    MissingSecret,
    /// The claimed signature is not a hex digest of the right length.
    #[error("malformed webhook signature")]
    Malformed,
    /// Well-formed signature that does not match the body.
    #[error("webhook signature mismatch")]
    Mismatch,
}

impl SignatureError {
    /// True when verification could not be attempted at all.
    pub fn is_not_attempted(&self) -> bool {
        matches!(self, Self::MissingSignature | Self::MissingSecret)
    }
}

/// Hex-encoded HMAC-SHA256 of `body` keyed with `secret`.
pub fn sign(body: &[u8], secret: &str) -> String {
    hex::encode(digest(body, secret))
}

/// Header value the gateway would send for `body`.
pub fn signature_header_value(body: &[u8], secret: &str) -> String {
    format!("{}{}", SIGNATURE_PREFIX, sign(body, secret))
}

fn digest(body: &[u8], secret: &str) -> Vec<u8> {
    // HMAC accepts keys of any length, including empty.
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .unwrap_or_else(|_| unreachable!("HMAC-SHA256 accepts keys of any length"));
    mac.update(body);
    mac.finalize().into_bytes().to_vec()
}

/// Verify `signature` against `body`. Missing inputs are reported separately
/// from failed verification.
pub fn verify(
    body: &[u8],
    signature: Option<&str>,
    secret: Option<&str>,
) -> Result<(), SignatureError> {
    let signature = signature
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(SignatureError::MissingSignature)?;
    let secret = secret
        .filter(|s| !s.is_empty())
        .ok_or(SignatureError::MissingSecret)?;

    let claimed_hex = signature.strip_prefix(SIGNATURE_PREFIX).unwrap_or(signature);
    let claimed = hex::decode(claimed_hex).map_err(|_| SignatureError::Malformed)?;
    let expected = digest(body, secret);

    if claimed.len() != expected.len() {
        return Err(SignatureError::Malformed);
    }

    if bool::from(expected.ct_eq(&claimed)) {
        Ok(())
    } else {
        Err(SignatureError::Mismatch)
    }
}

/// Boolean form of [`verify`].
pub fn is_valid(body: &[u8], signature: &str, secret: &str) -> bool {
    verify(body, Some(signature), Some(secret)).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_luxio_test";

    #[test]
    fn test_roundtrip_with_and_without_prefix() {
        let body = br#"{"event":"payment.succeeded","data":{"id":"x"}}"#;
        let hex_sig = sign(body, SECRET);

        assert!(is_valid(body, &hex_sig, SECRET));
        assert!(is_valid(body, &format!("sha256={}", hex_sig), SECRET));
        assert!(is_valid(body, &signature_header_value(body, SECRET), SECRET));
    }

    #[test]
    fn test_single_byte_mutation_fails() {
        let body = br#"{"event":"payment.succeeded","data":{"id":"x","amount":100}}"#.to_vec();
        let sig = sign(&body, SECRET);

        for i in 0..body.len() {
            let mut mutated = body.clone();
            mutated[i] ^= 0x01;
            assert_eq!(
                verify(&mutated, Some(&sig), Some(SECRET)),
                Err(SignatureError::Mismatch),
                "mutation at byte {} verified",
                i
            );
        }
    }

    #[test]
    fn test_wrong_secret_fails() {
        let body = b"{}";
        let sig = sign(body, SECRET);
        assert_eq!(
            verify(body, Some(&sig), Some("another-secret")),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_empty_body_is_valid_input() {
        let sig = sign(b"", SECRET);
        assert_eq!(sig.len(), 64);
        assert!(is_valid(b"", &sig, SECRET));
    }

    #[test]
    fn test_wrong_length_rejected_without_panic() {
        let body = b"payload";
        let sig = sign(body, SECRET);

        assert_eq!(verify(body, Some(&sig[..62]), Some(SECRET)), Err(SignatureError::Malformed));
        assert_eq!(
            verify(body, Some(&format!("{}00", sig)), Some(SECRET)),
            Err(SignatureError::Malformed)
        );
        assert_eq!(verify(body, Some("sha256="), Some(SECRET)), Err(SignatureError::Malformed));
    }

    #[test]
    fn test_non_hex_rejected() {
        let body = b"payload";
        let bad = "z".repeat(64);
        assert_eq!(verify(body, Some(&bad), Some(SECRET)), Err(SignatureError::Malformed));
        // odd length
        assert_eq!(verify(body, Some("abc"), Some(SECRET)), Err(SignatureError::Malformed));
    }

    #[test]
    fn test_missing_inputs_are_not_attempted() {
        let body = b"payload";
        let sig = sign(body, SECRET);

        let missing_sig = verify(body, None, Some(SECRET)).unwrap_err();
        assert_eq!(missing_sig, SignatureError::MissingSignature);
        assert!(missing_sig.is_not_attempted());

        let blank_sig = verify(body, Some("   "), Some(SECRET)).unwrap_err();
        assert_eq!(blank_sig, SignatureError::MissingSignature);

        let missing_secret = verify(body, Some(&sig), None).unwrap_err();
        assert_eq!(missing_secret, SignatureError::MissingSecret);
        assert!(missing_secret.is_not_attempted());

        assert_eq!(verify(body, Some(&sig), Some("")), Err(SignatureError::MissingSecret));
        assert!(!SignatureError::Mismatch.is_not_attempted());
    }

    #[test]
    fn test_known_vector() {
        // RFC 4231 test case 2
        assert_eq!(
            sign(b"what do ya want for nothing?", "Jefe"),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }
}
