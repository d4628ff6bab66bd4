//! Handler for the `sign` subcommand.
//!
//! Builds a token from a header and payload given as JSON and signs it
//! with the algorithm the header declares (or `--alg`, which is written
//! into the header first).

use anyhow::Result;
use zeroize::Zeroizing;

use crate::cli::SignArgs;
use crate::core::codec::{Claims, Header};
use crate::core::keys::{SigningKey, load_key_file};
use crate::core::session::parse_json_object;
use crate::core::signer::sign_declared;
use crate::input::resolve_secret;

const DEFAULT_HEADER: &str = r#"{"typ":"JWT"}"#;

/// Execute the `sign` subcommand and print the new token.
pub fn execute(args: &SignArgs) -> Result<()> {
    let header_json = args.header.as_deref().unwrap_or(DEFAULT_HEADER);
    let mut header = Header::new(parse_json_object(header_json, "header")?);
    if let Some(alg) = args.alg.as_deref() {
        header = header.with_alg(alg);
    }
    let claims = Claims::new(parse_json_object(&args.payload, "payload")?);

    let key = signing_key(args)?;
    let token = sign_declared(header, &claims, key.as_ref())?;
    println!("{token}");
    Ok(())
}

fn signing_key(args: &SignArgs) -> Result<Option<SigningKey>> {
    if let Some(path) = args.key.key_file.as_deref() {
        return Ok(Some(SigningKey::RsaPrivate(load_key_file(path)?)));
    }
    let secret: Option<Zeroizing<String>> =
        resolve_secret(args.key.secret.as_ref(), args.key.secret_env.as_deref())?;
    Ok(secret.map(SigningKey::HmacSecret))
}
