//! Shared test fixtures and helper utilities.
//!
//! Provides pre-built JWT tokens with known claims for use in the
//! integration tests.
#![allow(dead_code)]

/// An HS256-signed JWT.
///
/// Header: `{"alg":"HS256","typ":"JWT"}`
/// Payload: `{"sub":"u1"}`
/// Secret: [`HMAC_SECRET`]
pub const HS256_TOKEN: &str = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.\
     eyJzdWIiOiJ1MSJ9.\
     zV82i2lDYQX6-C8iCQE6vu5jdANOVH7zRXC8vMn3kt0";

/// The same header and claims as [`HS256_TOKEN`], signed with HS512.
pub const HS512_TOKEN: &str = "eyJhbGciOiJIUzUxMiIsInR5cCI6IkpXVCJ9.\
     eyJzdWIiOiJ1MSJ9.\
     OqhQ2Vh98zk6wDYJFYHK_FoxsNrH9tFpgqi5sjfcti4ydaaIzemxT6XOHz3f-hwhtW7uxIgNn2YImXW0DVQSUA";

/// An unsigned token: `{"alg":"none","typ":"JWT"}` / `{"sub":"u1"}`.
pub const NONE_TOKEN: &str = "eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.eyJzdWIiOiJ1MSJ9.";

/// `{"alg":"ES256","typ":"JWT"}` / `{"sub":"u1"}` with a dummy signature.
pub const ES256_TOKEN: &str = "eyJhbGciOiJFUzI1NiIsInR5cCI6IkpXVCJ9.eyJzdWIiOiJ1MSJ9.c2ln";

/// A header without `alg`: `{"typ":"JWT"}` / `{"sub":"u1"}`.
pub const NO_ALG_TOKEN: &str = "eyJ0eXAiOiJKV1QifQ.eyJzdWIiOiJ1MSJ9.c2ln";

/// A header that is valid JSON but not an object (`[1,2]`).
pub const ARRAY_HEADER_TOKEN: &str = "WzEsMl0.eyJzdWIiOiJ1MSJ9.c2ln";

/// A malformed token with only two parts (missing signature).
pub const MALFORMED_TOKEN_TWO_PARTS: &str = "eyJhbGciOiJIUzI1NiJ9.eyJzdWIiOiIxMjM0NTY3ODkwIn0";

/// A completely invalid token string.
pub const INVALID_TOKEN: &str = "not-a-valid-jwt";

/// Secret used to sign [`HS256_TOKEN`] and [`HS512_TOKEN`].
pub const HMAC_SECRET: &str = "s3cr3t";

/// Path to the test RSA public key fixture.
pub const RSA_PUBLIC_KEY_PATH: &str = "tests/fixtures/rsa_public.pem";

/// Path to the test RSA private key fixture.
pub const RSA_PRIVATE_KEY_PATH: &str = "tests/fixtures/rsa_private.pem";

/// Public half of a second, unrelated RSA key pair.
pub const OTHER_RSA_PUBLIC_KEY_PATH: &str = "tests/fixtures/other_rsa_public.pem";

/// Private half of the unrelated RSA key pair.
pub const OTHER_RSA_PRIVATE_KEY_PATH: &str = "tests/fixtures/other_rsa_private.pem";

/// An RS256 token signed with [`RSA_PRIVATE_KEY_PATH`], with a trailing
/// newline.
///
/// Payload: `{"sub":"user123","name":"John Doe","admin":true}`
pub const RS256_TOKEN: &str = include_str!("../fixtures/rs256_token.jwt");

/// The token printed after a `New JWT:` line in interactive output.
pub fn generated_token(stdout: &str) -> Option<String> {
    let mut lines = stdout.lines();
    lines.find(|line| line.trim() == "New JWT:")?;
    lines.next().map(|line| line.trim().to_string())
}
