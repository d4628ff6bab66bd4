//! Core business logic for JWT operations.
//!
//! This module contains the domain logic separated from CLI concerns.
//! All types and functions here are testable without the CLI layer;
//! terminal I/O enters only through the traits in [`dispatcher`].

pub mod algorithm;
pub mod codec;
pub mod dispatcher;
pub mod keys;
pub mod session;
pub mod signer;
pub mod verifier;
