//! Token signing.
//!
//! Each signer stamps the algorithm it uses into the header before
//! encoding, so the emitted `alg` always names the algorithm that
//! produced the signature.

use jsonwebtoken::EncodingKey;

use crate::core::algorithm::AlgorithmTier;
use crate::core::codec::{self, Claims, Header};
use crate::core::keys::{SigningKey, looks_like_pem, pem_label};
use crate::error::JwtForgeError;

/// Produce an unsigned token: `alg` is forced to `none`, signature empty.
pub fn sign_none(header: Header, claims: &Claims) -> Result<String, JwtForgeError> {
    codec::encode(&header.with_alg("none"), claims, &[])
}

/// Sign with an HMAC algorithm (`HS256`, `HS384` or `HS512`).
///
/// # Errors
///
/// `UnsupportedAlgorithm` if `algorithm` is not an HMAC variant, and
/// `InvalidKey` if the secret is empty or is a PEM key.
pub fn sign_hmac(
    header: Header,
    claims: &Claims,
    secret: &str,
    algorithm: &str,
) -> Result<String, JwtForgeError> {
    let tier = AlgorithmTier::classify(algorithm);
    if !matches!(tier, AlgorithmTier::Hmac(_)) {
        return Err(JwtForgeError::UnsupportedAlgorithm {
            algorithm: format!("{algorithm} (expected HS256, HS384 or HS512)"),
        });
    }
    if secret.is_empty() {
        return Err(JwtForgeError::invalid_key("HMAC secret cannot be empty"));
    }
    if looks_like_pem(secret) {
        return Err(JwtForgeError::invalid_key(
            "a PEM-encoded key cannot be used as an HMAC secret",
        ));
    }

    sign_with(header, claims, &tier, &EncodingKey::from_secret(secret.as_bytes()))
}

/// Sign with an RSA-PKCS1v1.5 algorithm (`RS256`, `RS384` or `RS512`).
///
/// # Errors
///
/// `UnsupportedAlgorithm` if `algorithm` is not an RSA variant, and
/// `InvalidKey` if the PEM does not hold an RSA private key.
pub fn sign_rsa(
    header: Header,
    claims: &Claims,
    private_key_pem: &str,
    algorithm: &str,
) -> Result<String, JwtForgeError> {
    let tier = AlgorithmTier::classify(algorithm);
    if !matches!(tier, AlgorithmTier::Rsa(_)) {
        return Err(JwtForgeError::UnsupportedAlgorithm {
            algorithm: format!("{algorithm} (expected RS256, RS384 or RS512)"),
        });
    }

    let key = rsa_private_key(private_key_pem)?;
    sign_with(header, claims, &tier, &key)
}

/// Sign according to the header's own `alg`, with whatever key is bound.
///
/// The family of `key` must match the declared algorithm; a missing key is
/// only acceptable for `none`.
pub fn sign_declared(
    header: Header,
    claims: &Claims,
    key: Option<&SigningKey>,
) -> Result<String, JwtForgeError> {
    let tier = header.tier()?.supported()?;
    tracing::debug!(algorithm = %tier, "signing token");

    match (&tier, key) {
        (AlgorithmTier::None, _) => sign_none(header, claims),
        (AlgorithmTier::Hmac(_), Some(SigningKey::HmacSecret(secret))) => {
            sign_hmac(header, claims, secret, tier.alg())
        }
        (AlgorithmTier::Rsa(_), Some(SigningKey::RsaPrivate(pem))) => {
            sign_rsa(header, claims, pem, tier.alg())
        }
        (_, Some(key)) => Err(JwtForgeError::invalid_key(format!(
            "the bound {} key cannot sign {tier}; change 'alg' back or restart with a {} key",
            key.family(),
            tier.family()
        ))),
        (_, None) => Err(JwtForgeError::invalid_key(format!(
            "no key is bound to this session, so {tier} cannot be signed"
        ))),
    }
}

/// Parse a PEM-encoded RSA private key (PKCS#1 or PKCS#8).
pub(crate) fn rsa_private_key(pem: &str) -> Result<EncodingKey, JwtForgeError> {
    match pem_label(pem) {
        Some("RSA PRIVATE KEY" | "PRIVATE KEY") => {}
        Some(label) => {
            return Err(JwtForgeError::invalid_key(format!(
                "expected an RSA private key, found a '{label}' PEM block"
            )));
        }
        None => {
            return Err(JwtForgeError::invalid_key(
                "not a PEM-encoded RSA private key",
            ));
        }
    }

    EncodingKey::from_rsa_pem(pem.as_bytes())
        .map_err(|_| JwtForgeError::invalid_key("not a PEM-encoded RSA private key"))
}

fn sign_with(
    header: Header,
    claims: &Claims,
    tier: &AlgorithmTier,
    key: &EncodingKey,
) -> Result<String, JwtForgeError> {
    let Some(algorithm) = tier.signing_algorithm() else {
        return Err(JwtForgeError::UnsupportedAlgorithm {
            algorithm: tier.alg().to_string(),
        });
    };

    let header = header.with_alg(tier.alg());
    let signing_input = codec::signing_input(&header, claims)?;
    let signature = jsonwebtoken::crypto::sign(signing_input.as_bytes(), key, algorithm)
        .map_err(|_| JwtForgeError::invalid_key(format!("key rejected for {tier}")))?;

    Ok(format!("{signing_input}.{signature}"))
}
