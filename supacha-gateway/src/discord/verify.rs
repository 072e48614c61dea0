//! Ed25519 verification of interaction webhooks.
//!
//! Discord signs every interaction request with the application's key pair;
//! the signature covers the timestamp header concatenated with the raw body.

use ed25519_dalek::{Signature, VerifyingKey};

#[derive(Debug, thiserror::Error)]
pub enum PublicKeyError {
    #[error("DISCORD_PUBLIC_KEY is not valid hex")]
    InvalidHex,
    #[error("DISCORD_PUBLIC_KEY is not a valid Ed25519 key")]
    InvalidKey,
}

/// Parse the hex-encoded application public key from the developer portal.
pub fn parse_public_key(hex_key: &str) -> Result<VerifyingKey, PublicKeyError> {
    let bytes = hex::decode(hex_key).map_err(|_| PublicKeyError::InvalidHex)?;
    let bytes: [u8; 32] = bytes.try_into().map_err(|_| PublicKeyError::InvalidHex)?;
    VerifyingKey::from_bytes(&bytes).map_err(|_| PublicKeyError::InvalidKey)
}

/// Check a request signature. Any malformed input counts as invalid.
pub fn verify_signature(
    public_key: &VerifyingKey,
    signature_hex: &str,
    timestamp: &str,
    body: &[u8],
) -> bool {
    let Ok(signature_bytes) = hex::decode(signature_hex) else {
        return false;
    };
    let Ok(signature_bytes) = <[u8; 64]>::try_from(signature_bytes) else {
        return false;
    };
    let signature = Signature::from_bytes(&signature_bytes);

    let mut message = timestamp.as_bytes().to_vec();
    message.extend_from_slice(body);
    public_key.verify_strict(&message, &signature).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signer, SigningKey};

    fn test_keypair() -> (SigningKey, VerifyingKey) {
        let signing = SigningKey::from_bytes(&[7u8; 32]);
        let verifying = signing.verifying_key();
        (signing, verifying)
    }

    #[test]
    fn valid_signature_passes() {
        let (signing, verifying) = test_keypair();
        let timestamp = "1700000000";
        let body = br#"{"type":1}"#;

        let mut message = timestamp.as_bytes().to_vec();
        message.extend_from_slice(body);
        let signature = hex::encode(signing.sign(&message).to_bytes());

        assert!(verify_signature(&verifying, &signature, timestamp, body));
    }

    #[test]
    fn tampered_body_fails() {
        let (signing, verifying) = test_keypair();
        let timestamp = "1700000000";

        let mut message = timestamp.as_bytes().to_vec();
        message.extend_from_slice(br#"{"type":1}"#);
        let signature = hex::encode(signing.sign(&message).to_bytes());

        assert!(!verify_signature(
            &verifying,
            &signature,
            timestamp,
            br#"{"type":2}"#
        ));
    }

    #[test]
    fn wrong_timestamp_fails() {
        let (signing, verifying) = test_keypair();
        let body = br#"{"type":1}"#;

        let mut message = b"1700000000".to_vec();
        message.extend_from_slice(body);
        let signature = hex::encode(signing.sign(&message).to_bytes());

        assert!(!verify_signature(&verifying, &signature, "1700000001", body));
    }

    #[test]
    fn malformed_signature_hex_fails() {
        let (_, verifying) = test_keypair();
        assert!(!verify_signature(&verifying, "not-hex", "0", b""));
        assert!(!verify_signature(&verifying, "abcd", "0", b""));
    }

    #[test]
    fn public_key_parsing() {
        let (_, verifying) = test_keypair();
        let parsed = parse_public_key(&hex::encode(verifying.to_bytes())).unwrap();
        assert_eq!(parsed, verifying);

        assert!(matches!(
            parse_public_key("zz"),
            Err(PublicKeyError::InvalidHex)
        ));
        assert!(matches!(
            parse_public_key("ab"),
            Err(PublicKeyError::InvalidHex)
        ));
    }
}
