//! Token and secret resolution from arguments, environment, or stdin.
//!
//! Precedence is always: explicit argument, then the named environment
//! variable, then (for tokens) piped stdin.

use std::io::{self, IsTerminal, Read};

use zeroize::Zeroizing;

use crate::error::JwtForgeError;

/// Maximum number of bytes read from stdin for a token.
const STDIN_MAX_SIZE: u64 = 1_048_576;

/// Resolve a token from the argument, `token_env`, or piped stdin.
///
/// # Errors
///
/// `NoTokenProvided` if every source is empty, plus the environment
/// variable errors of [`read_env`].
pub fn resolve_token(
    token: Option<&str>,
    token_env: Option<&str>,
) -> Result<String, JwtForgeError> {
    let raw = match explicit_token(token, token_env)? {
        Some(raw) => raw,
        None => read_stdin()?,
    };
    non_empty(&raw)
}

/// Resolve an optional token without falling back to stdin, for commands
/// that use stdin interactively.
pub fn resolve_optional_token(
    token: Option<&str>,
    token_env: Option<&str>,
) -> Result<Option<String>, JwtForgeError> {
    explicit_token(token, token_env)?
        .map(|raw| non_empty(&raw))
        .transpose()
}

fn explicit_token(
    token: Option<&str>,
    token_env: Option<&str>,
) -> Result<Option<Zeroizing<String>>, JwtForgeError> {
    match (token, token_env) {
        (Some(token), _) => Ok(Some(Zeroizing::new(token.to_string()))),
        (None, Some(name)) => read_env(name).map(Some),
        (None, None) => Ok(None),
    }
}

fn non_empty(raw: &str) -> Result<String, JwtForgeError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(JwtForgeError::NoTokenProvided);
    }
    Ok(trimmed.to_string())
}

/// Resolve a shared secret from the argument or `secret_env`.
pub fn resolve_secret(
    secret: Option<&Zeroizing<String>>,
    secret_env: Option<&str>,
) -> Result<Option<Zeroizing<String>>, JwtForgeError> {
    match (secret, secret_env) {
        (Some(secret), _) => Ok(Some(secret.clone())),
        (None, Some(name)) => read_env(name).map(Some),
        (None, None) => Ok(None),
    }
}

/// Read an environment variable into a zeroizing buffer.
///
/// # Errors
///
/// `InvalidEnvVarName` for names that cannot exist (empty, containing
/// `=` or NUL), and `EnvVarNotFound` when the variable is unset or not
/// valid Unicode.
pub fn read_env(name: &str) -> Result<Zeroizing<String>, JwtForgeError> {
    if name.is_empty() || name.contains('=') || name.contains('\0') {
        return Err(JwtForgeError::InvalidEnvVarName {
            name: name.to_string(),
        });
    }
    std::env::var(name)
        .map(Zeroizing::new)
        .map_err(|_| JwtForgeError::EnvVarNotFound {
            name: name.to_string(),
        })
}

fn read_stdin() -> Result<Zeroizing<String>, JwtForgeError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(Zeroizing::new(String::new()));
    }

    let mut buffer = Zeroizing::new(String::new());
    stdin
        .lock()
        .take(STDIN_MAX_SIZE)
        .read_to_string(&mut buffer)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argument_wins_and_is_trimmed() {
        let token = resolve_token(Some("  a.b.c\n"), Some("IGNORED_VAR")).unwrap();
        assert_eq!(token, "a.b.c");
    }

    #[test]
    fn test_blank_argument_is_no_token() {
        let err = resolve_token(Some("   "), None).unwrap_err();
        assert!(matches!(err, JwtForgeError::NoTokenProvided));
    }

    #[test]
    fn test_invalid_env_var_names() {
        for name in ["", "BAD=NAME", "NUL\0NAME"] {
            let err = read_env(name).unwrap_err();
            assert!(matches!(err, JwtForgeError::InvalidEnvVarName { .. }));
        }
    }

    #[test]
    fn test_missing_env_var() {
        let err = read_env("JWT_FORGE_SURELY_UNSET_VARIABLE").unwrap_err();
        assert!(matches!(err, JwtForgeError::EnvVarNotFound { .. }));
    }

    #[test]
    fn test_optional_token_absent() {
        assert_eq!(resolve_optional_token(None, None).unwrap(), None);
    }

    #[test]
    fn test_secret_argument_wins() {
        let secret = Zeroizing::new("s3cr3t".to_string());
        let resolved = resolve_secret(Some(&secret), Some("IGNORED_VAR")).unwrap();
        assert_eq!(resolved.as_deref().map(String::as_str), Some("s3cr3t"));
        assert!(resolve_secret(None, None).unwrap().is_none());
    }
}
