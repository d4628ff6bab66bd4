//! Handler for the `decode` subcommand.
//!
//! Decodes and pretty-prints a JWT's header and payload without
//! verifying its signature. Supports reading the token from a CLI
//! argument, environment variable, or stdin.

use anyhow::Result;
use serde_json::json;

use crate::cli::DecodeArgs;
use crate::core::codec;
use crate::core::dispatcher::TokenView;
use crate::display::token_view::render_token;
use crate::input::resolve_token;

/// Execute the `decode` subcommand with the given arguments.
pub fn execute(args: &DecodeArgs) -> Result<()> {
    let token = resolve_token(args.source.token.as_deref(), args.source.token_env.as_deref())?;
    let decoded = codec::decode(&token)?;
    tracing::debug!(header = ?decoded.header, "decoded token");

    if args.json {
        let output = json!({
            "header": decoded.header,
            "payload": decoded.claims,
            "signature": decoded.signature,
            "algorithm": decoded.header.alg().ok(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print!(
        "{}",
        render_token(TokenView {
            header: &decoded.header,
            claims: &decoded.claims,
            signature: &decoded.signature,
        })
    );
    Ok(())
}
