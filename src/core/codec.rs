//! JWT decoding and encoding.
//!
//! Handles splitting a raw JWT string into its three parts (header,
//! payload, signature), base64url-decoding the header and payload
//! segments, and parsing them as JSON objects. Encoding goes the other
//! way: compact JSON, base64url without padding, joined with `.`.
//!
//! Nothing here looks at the signature beyond checking its alphabet.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::core::algorithm::AlgorithmTier;
use crate::error::JwtForgeError;

/// An insertion-ordered JSON object.
pub type JsonObject = Map<String, Value>;

/// A JWT header. Must carry `alg` to be signable or verifiable.
///
/// Edits consume the header and return the edited value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Header(JsonObject);

impl Header {
    pub fn new(fields: JsonObject) -> Self {
        Self(fields)
    }

    pub fn fields(&self) -> &JsonObject {
        &self.0
    }

    /// The declared `alg`, which must be a JSON string.
    pub fn alg(&self) -> Result<&str, JwtForgeError> {
        self.0
            .get("alg")
            .and_then(Value::as_str)
            .ok_or(JwtForgeError::MissingAlgorithm)
    }

    /// Classify the declared `alg`. Unsupported values are returned as
    /// [`AlgorithmTier::Unsupported`], not as an error.
    pub fn tier(&self) -> Result<AlgorithmTier, JwtForgeError> {
        self.alg().map(AlgorithmTier::classify)
    }

    /// Replace `alg`, keeping its position when already present.
    pub fn with_alg(self, alg: &str) -> Self {
        self.with_field("alg", Value::String(alg.to_string()))
    }

    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        self.0.insert(key.to_string(), value);
        self
    }

    pub fn without_field(mut self, key: &str) -> Self {
        self.0.shift_remove(key);
        self
    }
}

/// The JWT payload (claims). No claim is required.
#[derive(Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Claims(JsonObject);

impl Claims {
    pub fn new(fields: JsonObject) -> Self {
        Self(fields)
    }

    pub fn fields(&self) -> &JsonObject {
        &self.0
    }

    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        self.0.insert(key.to_string(), value);
        self
    }

    pub fn without_field(mut self, key: &str) -> Self {
        self.0.shift_remove(key);
        self
    }
}

/// Claim values may be personal data; keep them out of debug output.
impl fmt::Debug for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Claims")
            .field("keys", &self.0.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// The decoded parts of a JWT.
///
/// Implements a custom `Debug` that redacts `claims` and `signature`
/// to prevent accidental leakage of sensitive claim data.
#[derive(Clone)]
pub struct DecodedToken {
    /// The parsed JWT header (typically contains `alg` and `typ`).
    pub header: Header,
    /// The parsed JWT payload.
    pub claims: Claims,
    /// The raw base64url-encoded signature segment. Empty for `none`.
    pub signature: String,
    /// `header_segment.payload_segment` exactly as received.
    pub signing_input: String,
}

/// Custom `Debug` that redacts payload and signature to prevent
/// accidental leakage through debug formatting or error chains.
impl fmt::Debug for DecodedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedToken")
            .field("header", &self.header)
            .field("claims", &"[REDACTED]")
            .field("signature", &"[REDACTED]")
            .finish()
    }
}

impl DecodedToken {
    /// Decode the signature segment into raw bytes.
    pub fn signature_bytes(&self) -> Result<Vec<u8>, JwtForgeError> {
        URL_SAFE_NO_PAD
            .decode(&self.signature)
            .map_err(|_| JwtForgeError::Base64DecodeError {
                segment: "signature".to_string(),
            })
    }
}

/// Cheap shape check: three dot-separated segments of base64url
/// characters, the last of which may be empty.
pub fn is_well_formed(token: &str) -> bool {
    let parts: Vec<&str> = token.split('.').collect();
    match parts.as_slice() {
        [header, payload, signature] => {
            !header.is_empty()
                && !payload.is_empty()
                && [header, payload, signature]
                    .iter()
                    .all(|segment| segment.bytes().all(is_base64url_byte))
        }
        _ => false,
    }
}

fn is_base64url_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

/// Decode a raw JWT string into its constituent parts.
///
/// Splits the token on `.` separators, base64url-decodes the header
/// and payload segments, and parses them as JSON objects. The signature
/// is returned as its raw base64url-encoded string.
///
/// # Errors
///
/// Returns an error if the token doesn't have exactly three parts,
/// if base64url decoding fails, if JSON parsing fails, or if the header
/// or payload is not a JSON object.
pub fn decode(token: &str) -> Result<DecodedToken, JwtForgeError> {
    let parts: Vec<&str> = token.split('.').collect();
    let [header_segment, payload_segment, signature] = parts.as_slice() else {
        return Err(JwtForgeError::InvalidTokenFormat);
    };

    let header = decode_segment(header_segment, "header")?;
    let claims = decode_segment(payload_segment, "payload")?;

    if !signature.bytes().all(is_base64url_byte) {
        return Err(JwtForgeError::Base64DecodeError {
            segment: "signature".to_string(),
        });
    }

    Ok(DecodedToken {
        header: Header(header),
        claims: Claims(claims),
        signature: (*signature).to_string(),
        signing_input: format!("{header_segment}.{payload_segment}"),
    })
}

/// Base64url-decode a segment and parse it as a JSON object.
fn decode_segment(encoded: &str, segment_name: &str) -> Result<JsonObject, JwtForgeError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(encoded)
        .map_err(|_| JwtForgeError::Base64DecodeError {
            segment: segment_name.to_string(),
        })?;

    let value: Value =
        serde_json::from_slice(&bytes).map_err(|e| JwtForgeError::JsonParseError {
            segment: segment_name.to_string(),
            reason: e.to_string(),
        })?;

    match value {
        Value::Object(object) => Ok(object),
        _ => Err(JwtForgeError::NotAnObject {
            segment: segment_name.to_string(),
        }),
    }
}

/// Build `base64url(header).base64url(payload)`, the bytes a signature covers.
pub fn signing_input(header: &Header, claims: &Claims) -> Result<String, JwtForgeError> {
    Ok(format!(
        "{}.{}",
        encode_segment(header, "header")?,
        encode_segment(claims, "payload")?
    ))
}

/// Assemble a complete token. An empty `signature` yields the trailing-dot
/// form used by `alg: none`.
pub fn encode(header: &Header, claims: &Claims, signature: &[u8]) -> Result<String, JwtForgeError> {
    Ok(format!(
        "{}.{}",
        signing_input(header, claims)?,
        URL_SAFE_NO_PAD.encode(signature)
    ))
}

fn encode_segment<T: Serialize>(value: &T, segment_name: &str) -> Result<String, JwtForgeError> {
    let json = serde_json::to_vec(value).map_err(|e| JwtForgeError::InvalidJson {
        what: segment_name.to_string(),
        reason: e.to_string(),
    })?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}
