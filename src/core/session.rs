//! Edit-loop session state.
//!
//! A [`Session`] owns the current header, claims and bound key for one
//! interactive run. Edits replace whole values; re-signing always reads
//! the latest ones.

use serde_json::Value;

use crate::core::algorithm::AlgorithmTier;
use crate::core::codec::{Claims, Header, JsonObject};
use crate::core::keys::SigningKey;
use crate::core::signer;
use crate::error::JwtForgeError;

#[derive(Debug)]
pub struct Session {
    header: Header,
    claims: Claims,
    key: Option<SigningKey>,
    verified_tier: AlgorithmTier,
}

impl Session {
    /// Start a session for a token verified (or accepted unsigned) under
    /// `verified_tier`, with the key that will re-sign it.
    pub fn new(
        header: Header,
        claims: Claims,
        verified_tier: AlgorithmTier,
        key: Option<SigningKey>,
    ) -> Self {
        Self {
            header,
            claims,
            key,
            verified_tier,
        }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    pub fn verified_tier(&self) -> &AlgorithmTier {
        &self.verified_tier
    }

    pub fn has_key(&self) -> bool {
        self.key.is_some()
    }

    /// Replace the header. Returns a warning when the declared algorithm
    /// leaves the verified family or can no longer be signed.
    pub fn replace_header(&mut self, header: Header) -> Option<String> {
        self.header = header;
        self.algorithm_warning()
    }

    pub fn replace_claims(&mut self, claims: Claims) {
        self.claims = claims;
    }

    /// Sign the current header and claims with the bound key.
    pub fn generate(&self) -> Result<String, JwtForgeError> {
        signer::sign_declared(self.header.clone(), &self.claims, self.key.as_ref())
    }

    fn algorithm_warning(&self) -> Option<String> {
        let declared = match self.header.tier() {
            Ok(tier) => tier,
            Err(e) => return Some(format!("{e}; add one before generating a token")),
        };

        match &declared {
            AlgorithmTier::Unsupported(alg) => Some(format!(
                "'{alg}' is not a supported algorithm; generating a token will fail"
            )),
            AlgorithmTier::None if !matches!(self.verified_tier, AlgorithmTier::None) => {
                Some(format!(
                    "algorithm changed {} -> none: the new token will be unsigned",
                    self.verified_tier.family()
                ))
            }
            tier if !tier.same_family(&self.verified_tier) => Some(format!(
                "algorithm changed {} -> {}: signing needs a {} key, which this session {}",
                self.verified_tier.family(),
                tier.family(),
                tier.family(),
                if self.bound_family() == Some(tier.family()) {
                    "has"
                } else {
                    "does not have"
                }
            )),
            _ => None,
        }
    }

    fn bound_family(&self) -> Option<&'static str> {
        self.key.as_ref().map(SigningKey::family)
    }
}

/// Interpret a free-text field value.
///
/// `true`, `false` and `null` (in any letter case) and JSON numbers become
/// typed values, and a quoted JSON string is unquoted. Everything else,
/// arrays and objects included, is kept verbatim as a string.
pub fn parse_field_value(text: &str) -> Value {
    let trimmed = text.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        "null" => return Value::Null,
        _ => {}
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(scalar @ (Value::Number(_) | Value::String(_))) => scalar,
        _ => Value::String(trimmed.to_string()),
    }
}

/// Parse pasted text as a JSON object (for whole-header or whole-payload
/// replacement).
pub fn parse_json_object(text: &str, what: &str) -> Result<JsonObject, JwtForgeError> {
    let value: Value = serde_json::from_str(text).map_err(|e| JwtForgeError::InvalidJson {
        what: what.to_string(),
        reason: e.to_string(),
    })?;
    match value {
        Value::Object(object) => Ok(object),
        _ => Err(JwtForgeError::InvalidJson {
            what: what.to_string(),
            reason: "input must be a JSON object".to_string(),
        }),
    }
}
