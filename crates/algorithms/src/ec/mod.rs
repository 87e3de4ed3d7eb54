//! Elliptic Curve Primitives
//!
//! This module provides a constant-time implementation of the Koblitz curve
//! secp256k1 (K-256). The implementation is designed to be resistant to
//! timing attacks and provides the foundation for ECDSA and ECDH.

pub mod k256;

// Re-export common types
pub use k256::{FieldElement as K256FieldElement, Point as K256Point, Scalar as K256Scalar};
