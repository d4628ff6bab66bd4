//! Domain error types for jwt-forge.
//!
//! All business-logic errors are defined here using `thiserror`.
//! These errors are converted to user-friendly messages at the CLI boundary
//! or surfaced by the interactive dispatcher with a severity tag.

use thiserror::Error;

/// Errors that can occur during JWT operations.
///
/// A signature that simply does not match is not an error: the verifier
/// reports it as `Ok(false)` so callers can offer another key.
#[derive(Debug, Error)]
pub enum JwtForgeError {
    /// The provided token does not have the expected three-part structure.
    #[error("invalid token format: expected 'header.payload.signature' structure")]
    InvalidTokenFormat,

    /// Failed to decode base64url-encoded token segment.
    #[error("failed to decode {segment}: invalid base64url encoding")]
    Base64DecodeError {
        /// Which segment failed to decode (e.g., "header", "payload").
        segment: String,
    },

    /// Failed to parse decoded JSON content.
    #[error("failed to parse {segment} as JSON: {reason}")]
    JsonParseError {
        /// Which segment failed to parse (e.g., "header", "payload").
        segment: String,
        /// Description of the parsing failure.
        reason: String,
    },

    /// A segment decoded to valid JSON that is not an object.
    #[error("{segment} must be a JSON object")]
    NotAnObject {
        /// Which segment held the non-object value.
        segment: String,
    },

    /// The header has no string `alg` field.
    #[error("token header has no 'alg' field")]
    MissingAlgorithm,

    /// The key material cannot be parsed or does not fit the algorithm.
    #[error("invalid key: {reason}")]
    InvalidKey {
        /// Description of why the key was rejected.
        reason: String,
    },

    /// The specified algorithm is not supported.
    #[error("unsupported algorithm: {algorithm}")]
    UnsupportedAlgorithm {
        /// The algorithm that was encountered.
        algorithm: String,
    },

    /// Failed to read the provided key file.
    #[error("failed to read key file '{path}': {reason}")]
    KeyFileError {
        /// Path to the key file.
        path: String,
        /// Description of the read failure.
        reason: String,
    },

    /// User-supplied JSON (header, payload, field value) is not usable.
    #[error("invalid {what} JSON: {reason}")]
    InvalidJson {
        /// What the JSON was meant to describe.
        what: String,
        /// Description of the parsing failure.
        reason: String,
    },

    /// No token was provided via any input method.
    #[error("no token provided: pass a token as an argument, via --token-env, or through stdin")]
    NoTokenProvided,

    /// No key was provided for an operation that needs one.
    #[error("no key provided: pass --secret, --secret-env, or --key-file")]
    NoKeyProvided,

    /// The specified environment variable is not set.
    #[error("environment variable '{name}' is not set")]
    EnvVarNotFound {
        /// Name of the missing environment variable.
        name: String,
    },

    /// The environment variable name cannot be looked up.
    #[error("invalid environment variable name '{name}'")]
    InvalidEnvVarName {
        /// The rejected name.
        name: String,
    },

    /// Reading from or writing to the terminal failed.
    #[error("terminal I/O failed: {reason}")]
    Io {
        /// Description of the I/O failure.
        reason: String,
    },
}

/// The coarse error classes callers react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The token cannot be decoded. Fatal for that token.
    MalformedToken,
    /// Key material is unusable. The user may try another key.
    InvalidKey,
    /// The declared algorithm is outside the supported families.
    UnsupportedAlgorithm,
    /// Bad input that is not about a token or a key.
    Input,
}

impl JwtForgeError {
    /// Map this error onto the class that decides how it is recovered from.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidTokenFormat
            | Self::Base64DecodeError { .. }
            | Self::JsonParseError { .. }
            | Self::NotAnObject { .. }
            | Self::MissingAlgorithm => ErrorClass::MalformedToken,
            Self::InvalidKey { .. } | Self::KeyFileError { .. } => ErrorClass::InvalidKey,
            Self::UnsupportedAlgorithm { .. } => ErrorClass::UnsupportedAlgorithm,
            Self::InvalidJson { .. }
            | Self::NoTokenProvided
            | Self::NoKeyProvided
            | Self::EnvVarNotFound { .. }
            | Self::InvalidEnvVarName { .. }
            | Self::Io { .. } => ErrorClass::Input,
        }
    }

    pub(crate) fn invalid_key(reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for JwtForgeError {
    fn from(e: std::io::Error) -> Self {
        Self::Io {
            reason: e.to_string(),
        }
    }
}
