//! Handler for the `verify` subcommand.
//!
//! Verifies a JWT's signature with the protocol of its declared tier:
//! a shared secret for HMAC, a PEM public key file for RSA. Unsigned
//! tokens have nothing to verify and never pass.

use anyhow::Result;
use serde_json::json;

use crate::cli::VerifyArgs;
use crate::core::algorithm::AlgorithmTier;
use crate::core::dispatcher::Severity;
use crate::core::keys::load_key_file;
use crate::core::{codec, verifier};
use crate::display::token_view::render_message;
use crate::error::JwtForgeError;
use crate::input::{resolve_secret, resolve_token};

/// Execute the `verify` subcommand. Returns whether the signature matched.
pub fn execute(args: &VerifyArgs) -> Result<bool> {
    let token = resolve_token(args.source.token.as_deref(), args.source.token_env.as_deref())?;
    let tier = codec::decode(&token)?.header.tier()?;
    tracing::info!(algorithm = %tier, family = tier.family(), "verifying token");

    let valid = match &tier {
        AlgorithmTier::None => false,
        AlgorithmTier::Hmac(_) => {
            if args.key.key_file.is_some() {
                return Err(JwtForgeError::invalid_key(format!(
                    "{tier} needs a shared secret, not a key file; pass --secret or --secret-env"
                ))
                .into());
            }
            let secret = resolve_secret(args.key.secret.as_ref(), args.key.secret_env.as_deref())?
                .ok_or(JwtForgeError::NoKeyProvided)?;
            verifier::verify_hmac(&token, &secret)?
        }
        AlgorithmTier::Rsa(_) => {
            let Some(path) = args.key.key_file.as_deref() else {
                if args.key.secret.is_some() || args.key.secret_env.is_some() {
                    return Err(JwtForgeError::invalid_key(format!(
                        "{tier} needs a public key file, not a shared secret; pass --key-file"
                    ))
                    .into());
                }
                return Err(JwtForgeError::NoKeyProvided.into());
            };
            let pem = load_key_file(path)?;
            verifier::verify_rsa(&token, &pem)?
        }
        AlgorithmTier::Unsupported(algorithm) => {
            return Err(JwtForgeError::UnsupportedAlgorithm {
                algorithm: algorithm.clone(),
            }
            .into());
        }
    };

    if args.json {
        let output = json!({
            "valid": valid,
            "algorithm": tier.alg(),
            "signed": tier != AlgorithmTier::None,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(valid);
    }

    let message = match (&tier, valid) {
        (AlgorithmTier::None, _) => render_message(
            Severity::Warning,
            "Token is unsigned (alg: none): there is no signature to verify.",
        ),
        (_, true) => render_message(Severity::Success, &format!("Signature valid ({tier}).")),
        (_, false) => render_message(
            Severity::Error,
            &format!("Signature does not match ({tier})."),
        ),
    };
    println!("{message}");
    Ok(valid)
}
