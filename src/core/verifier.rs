//! JWT signature verification.
//!
//! Checks a token's signature against its declared algorithm using an
//! HMAC shared secret or a PEM-encoded RSA public key. The digest size
//! always comes from the token header.
//!
//! A wrong key is `Ok(false)`. Errors are reserved for inputs that can
//! never verify: a malformed token, unusable key material, or a key from
//! the wrong algorithm family.

use jsonwebtoken::DecodingKey;
use jsonwebtoken::errors::ErrorKind;

use crate::core::algorithm::AlgorithmTier;
use crate::core::codec::{self, DecodedToken};
use crate::core::keys::{looks_like_pem, pem_label};
use crate::error::JwtForgeError;

/// Verify an HMAC-signed token (`HS256`/`HS384`/`HS512`) with `secret`.
///
/// The comparison is constant-time.
///
/// # Errors
///
/// Returns a malformed-token error if the token cannot be decoded, and
/// `InvalidKey` if the token is not HMAC-signed or the secret is a PEM key.
pub fn verify_hmac(token: &str, secret: &str) -> Result<bool, JwtForgeError> {
    let decoded = codec::decode(token)?;
    let tier = declared_tier(&decoded)?;
    if !matches!(tier, AlgorithmTier::Hmac(_)) {
        return Err(JwtForgeError::invalid_key(format!(
            "an HMAC secret cannot verify a {tier} token"
        )));
    }
    if looks_like_pem(secret) {
        return Err(JwtForgeError::invalid_key(
            "a PEM-encoded key cannot be used as an HMAC secret",
        ));
    }

    check_signature(&decoded, &tier, &DecodingKey::from_secret(secret.as_bytes()))
}

/// Verify an RSA-signed token (`RS256`/`RS384`/`RS512`) with a PEM public key.
///
/// # Errors
///
/// Returns a malformed-token error if the token cannot be decoded, and
/// `InvalidKey` if the PEM does not hold an RSA public key or the token
/// is not RSA-signed.
pub fn verify_rsa(token: &str, public_key_pem: &str) -> Result<bool, JwtForgeError> {
    let decoded = codec::decode(token)?;
    let tier = declared_tier(&decoded)?;
    if !matches!(tier, AlgorithmTier::Rsa(_)) {
        return Err(JwtForgeError::invalid_key(format!(
            "an RSA public key cannot verify a {tier} token"
        )));
    }

    let key = rsa_public_key(public_key_pem)?;
    check_signature(&decoded, &tier, &key)
}

/// Parse a PEM-encoded RSA public key (SPKI or PKCS#1).
fn rsa_public_key(pem: &str) -> Result<DecodingKey, JwtForgeError> {
    match pem_label(pem) {
        Some("PUBLIC KEY" | "RSA PUBLIC KEY") => {}
        Some(label) => {
            return Err(JwtForgeError::invalid_key(format!(
                "expected an RSA public key, found a '{label}' PEM block"
            )));
        }
        None => {
            return Err(JwtForgeError::invalid_key(
                "not a PEM-encoded RSA public key",
            ));
        }
    }

    DecodingKey::from_rsa_pem(pem.as_bytes())
        .map_err(|_| JwtForgeError::invalid_key("not a PEM-encoded RSA public key"))
}

fn declared_tier(decoded: &DecodedToken) -> Result<AlgorithmTier, JwtForgeError> {
    decoded.header.tier()?.supported()
}

/// Run the signature check for a signed tier.
fn check_signature(
    decoded: &DecodedToken,
    tier: &AlgorithmTier,
    key: &DecodingKey,
) -> Result<bool, JwtForgeError> {
    let Some(algorithm) = tier.signing_algorithm() else {
        return Err(JwtForgeError::invalid_key(format!(
            "a {tier} token carries no signature to verify"
        )));
    };

    // Catches segments with a valid alphabet but an impossible length.
    decoded.signature_bytes()?;

    jsonwebtoken::crypto::verify(
        &decoded.signature,
        decoded.signing_input.as_bytes(),
        key,
        algorithm,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::Base64(_) => JwtForgeError::Base64DecodeError {
            segment: "signature".to_string(),
        },
        _ => JwtForgeError::invalid_key(format!("key rejected for {tier}")),
    })
}
