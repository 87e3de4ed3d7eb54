//! secp256k1 arithmetic primitives with constant-time implementation
//!
//! This crate implements the cryptographic core of the Koblitz curve
//! secp256k1: arithmetic in the base field and the scalar field, the affine
//! group law, and windowed scalar multiplication with a precomputation
//! cache. The scalar-multiplication hot path contains no data-dependent
//! branches or table indices.
//!
//! Higher-level protocols (ECDSA, key agreement) are built on top of this
//! crate; see `koblitz-sign` for signatures.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

// Error module and re-exports
pub mod error;
pub use error::{validate, Error, Result};

// Elliptic curve implementations
pub mod ec;
