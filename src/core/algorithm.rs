//! Algorithm classification.
//!
//! Every place that needs to know how a token is (or will be) signed goes
//! through [`AlgorithmTier::classify`], which matches the header's `alg`
//! exactly against the supported allow-list.

use std::fmt;

use crate::error::JwtForgeError;

/// SHA-2 digest size used by the HMAC and RSA families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashSize {
    Sha256,
    Sha384,
    Sha512,
}

/// The trust tier implied by a declared `alg`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlgorithmTier {
    /// `none`: unsigned, nothing to verify.
    None,
    /// `HS256`, `HS384`, `HS512`: shared secret.
    Hmac(HashSize),
    /// `RS256`, `RS384`, `RS512`: RSA-PKCS1v1.5 key pair.
    Rsa(HashSize),
    /// Anything else, kept verbatim for error reporting.
    Unsupported(String),
}

/// Every `alg` value this tool accepts, in menu order.
pub const SUPPORTED_ALGORITHMS: [&str; 7] =
    ["none", "HS256", "HS384", "HS512", "RS256", "RS384", "RS512"];

impl AlgorithmTier {
    /// Classify an `alg` string. Matching is exact and case-sensitive.
    pub fn classify(alg: &str) -> Self {
        match alg {
            "none" => Self::None,
            "HS256" => Self::Hmac(HashSize::Sha256),
            "HS384" => Self::Hmac(HashSize::Sha384),
            "HS512" => Self::Hmac(HashSize::Sha512),
            "RS256" => Self::Rsa(HashSize::Sha256),
            "RS384" => Self::Rsa(HashSize::Sha384),
            "RS512" => Self::Rsa(HashSize::Sha512),
            other => Self::Unsupported(other.to_string()),
        }
    }

    /// Reject the unsupported tier with an `UnsupportedAlgorithm` error.
    pub fn supported(self) -> Result<Self, JwtForgeError> {
        match self {
            Self::Unsupported(algorithm) => Err(JwtForgeError::UnsupportedAlgorithm { algorithm }),
            tier => Ok(tier),
        }
    }

    /// The canonical `alg` header value for this tier.
    pub fn alg(&self) -> &str {
        match self {
            Self::None => "none",
            Self::Hmac(HashSize::Sha256) => "HS256",
            Self::Hmac(HashSize::Sha384) => "HS384",
            Self::Hmac(HashSize::Sha512) => "HS512",
            Self::Rsa(HashSize::Sha256) => "RS256",
            Self::Rsa(HashSize::Sha384) => "RS384",
            Self::Rsa(HashSize::Sha512) => "RS512",
            Self::Unsupported(alg) => alg,
        }
    }

    /// Human-readable family name, ignoring the digest size.
    pub fn family(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Hmac(_) => "HMAC",
            Self::Rsa(_) => "RSA",
            Self::Unsupported(_) => "unsupported",
        }
    }

    /// Whether two tiers belong to the same family.
    pub fn same_family(&self, other: &Self) -> bool {
        self.family() == other.family()
    }

    /// The `jsonwebtoken` algorithm backing a signed tier.
    ///
    /// Returns `None` for the unsigned and unsupported tiers.
    pub(crate) fn signing_algorithm(&self) -> Option<jsonwebtoken::Algorithm> {
        use jsonwebtoken::Algorithm;
        match self {
            Self::Hmac(HashSize::Sha256) => Some(Algorithm::HS256),
            Self::Hmac(HashSize::Sha384) => Some(Algorithm::HS384),
            Self::Hmac(HashSize::Sha512) => Some(Algorithm::HS512),
            Self::Rsa(HashSize::Sha256) => Some(Algorithm::RS256),
            Self::Rsa(HashSize::Sha384) => Some(Algorithm::RS384),
            Self::Rsa(HashSize::Sha512) => Some(Algorithm::RS512),
            Self::None | Self::Unsupported(_) => None,
        }
    }
}

impl fmt::Display for AlgorithmTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.alg())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_allow_list() {
        assert_eq!(AlgorithmTier::classify("none"), AlgorithmTier::None);
        assert_eq!(
            AlgorithmTier::classify("HS384"),
            AlgorithmTier::Hmac(HashSize::Sha384)
        );
        assert_eq!(
            AlgorithmTier::classify("RS512"),
            AlgorithmTier::Rsa(HashSize::Sha512)
        );
    }

    #[test]
    fn test_classify_round_trips_every_supported_name() {
        for alg in SUPPORTED_ALGORITHMS {
            let tier = AlgorithmTier::classify(alg);
            assert_eq!(tier.alg(), alg);
            assert!(!matches!(tier, AlgorithmTier::Unsupported(_)));
        }
    }

    #[test]
    fn test_classify_is_exact_not_prefix() {
        for alg in ["HS1", "HS2561", "RSnonstandard", "RS", "PS256", "ES256"] {
            assert_eq!(
                AlgorithmTier::classify(alg),
                AlgorithmTier::Unsupported(alg.to_string()),
                "{alg} must not be accepted"
            );
        }
    }

    #[test]
    fn test_classify_is_case_sensitive() {
        assert!(matches!(
            AlgorithmTier::classify("NONE"),
            AlgorithmTier::Unsupported(_)
        ));
        assert!(matches!(
            AlgorithmTier::classify("hs256"),
            AlgorithmTier::Unsupported(_)
        ));
    }

    #[test]
    fn test_supported_rejects_unsupported_tier() {
        let err = AlgorithmTier::classify("ES256").supported().unwrap_err();
        assert!(matches!(
            err,
            JwtForgeError::UnsupportedAlgorithm { algorithm } if algorithm == "ES256"
        ));
    }

    #[test]
    fn test_family_comparison_ignores_hash_size() {
        let hs256 = AlgorithmTier::classify("HS256");
        let hs512 = AlgorithmTier::classify("HS512");
        let rs256 = AlgorithmTier::classify("RS256");
        assert!(hs256.same_family(&hs512));
        assert!(!hs256.same_family(&rs256));
    }

    #[test]
    fn test_signing_algorithm_is_absent_for_unsigned_tiers() {
        assert!(AlgorithmTier::None.signing_algorithm().is_none());
        assert_eq!(
            AlgorithmTier::classify("RS384").signing_algorithm(),
            Some(jsonwebtoken::Algorithm::RS384)
        );
    }
}
