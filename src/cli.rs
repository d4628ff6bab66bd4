//! CLI argument definitions for jwt-forge.
//!
//! Uses `clap` derive macros to define the command-line interface.
//! Each subcommand has its own argument struct for type-safe parsing.
//!
//! # Security
//!
//! Argument structs that can carry tokens or secrets implement custom
//! `Debug` to redact them and prevent accidental leakage through debug
//! formatting, error chains, or logging.

use std::fmt;
use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use zeroize::Zeroizing;

/// An interactive CLI for inspecting, verifying, and re-signing
/// JSON Web Tokens (JWTs) signed with HMAC, RSA, or nothing at all.
#[derive(Debug, Parser)]
#[command(name = "jwt-forge")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Disable colored output (also honoured via NO_COLOR).
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Increase log verbosity (-v info, -vv debug). Logs go to stderr;
    /// JWT_FORGE_LOG overrides this with a full filter directive.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Decode and inspect a JWT without verifying its signature.
    Decode(DecodeArgs),

    /// Verify a JWT's signature using a shared secret or a public key file.
    Verify(VerifyArgs),

    /// Create a new token from a header and payload.
    Sign(SignArgs),

    /// Interactively verify, edit, and re-sign a JWT.
    Modify(ModifyArgs),
}

/// Shared way to pass the token itself.
#[derive(Args)]
pub struct TokenSource {
    /// The JWT token. If omitted, reads from stdin.
    pub token: Option<String>,

    /// Read the token from the specified environment variable.
    #[arg(long, value_name = "VAR_NAME")]
    pub token_env: Option<String>,
}

impl fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSource")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("token_env", &self.token_env)
            .finish()
    }
}

/// Shared way to pass key material.
#[derive(Args)]
pub struct KeySource {
    /// HMAC shared secret.
    ///
    /// WARNING: Passing secrets via CLI arguments may expose them in shell
    /// history. Prefer using --secret-env instead.
    #[arg(long, value_name = "SECRET", value_parser = parse_zeroizing_string)]
    pub secret: Option<Zeroizing<String>>,

    /// Read the HMAC secret from the specified environment variable.
    #[arg(long, value_name = "VAR_NAME", conflicts_with = "secret")]
    pub secret_env: Option<String>,

    /// Path to a PEM-encoded RSA key file (public key to verify, private
    /// key to sign).
    #[arg(long, value_name = "FILE", conflicts_with_all = ["secret", "secret_env"])]
    pub key_file: Option<PathBuf>,
}

impl fmt::Debug for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeySource")
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .field("secret_env", &self.secret_env)
            .field("key_file", &self.key_file)
            .finish()
    }
}

/// Arguments for the `decode` subcommand.
#[derive(Debug, Args)]
pub struct DecodeArgs {
    #[command(flatten)]
    pub source: TokenSource,

    /// Output raw JSON without colors (machine-readable).
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `verify` subcommand.
#[derive(Debug, Args)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub source: TokenSource,

    #[command(flatten)]
    pub key: KeySource,

    /// Output raw JSON without colors (machine-readable).
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `sign` subcommand.
#[derive(Args)]
pub struct SignArgs {
    /// Header as a JSON object. Defaults to {"typ":"JWT"}.
    #[arg(long, value_name = "JSON")]
    pub header: Option<String>,

    /// Payload (claims) as a JSON object.
    #[arg(long, value_name = "JSON")]
    pub payload: String,

    /// Algorithm to sign with; overrides the header's `alg`.
    #[arg(long, value_name = "ALG")]
    pub alg: Option<String>,

    #[command(flatten)]
    pub key: KeySource,
}

/// Custom `Debug` that keeps claim contents out of logs.
impl fmt::Debug for SignArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignArgs")
            .field("header", &self.header)
            .field("payload", &"[REDACTED]")
            .field("alg", &self.alg)
            .field("key", &self.key)
            .finish()
    }
}

/// Arguments for the `modify` subcommand.
#[derive(Args)]
pub struct ModifyArgs {
    /// The JWT token to start with. If omitted, prompts for one.
    pub token: Option<String>,

    /// Read the starting token from the specified environment variable.
    #[arg(long, value_name = "VAR_NAME")]
    pub token_env: Option<String>,

    /// Do not copy generated tokens to the clipboard.
    #[arg(long)]
    pub no_clipboard: bool,
}

impl fmt::Debug for ModifyArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModifyArgs")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("token_env", &self.token_env)
            .field("no_clipboard", &self.no_clipboard)
            .finish()
    }
}

/// Parse a string into a `Zeroizing<String>` for secure CLI arguments.
fn parse_zeroizing_string(s: &str) -> Result<Zeroizing<String>, std::convert::Infallible> {
    Ok(Zeroizing::new(s.to_string()))
}
