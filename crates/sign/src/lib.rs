//! ECDSA signatures over secp256k1
//!
//! This crate implements deterministic ECDSA (RFC 6979 nonces) on the
//! arithmetic core from `koblitz-algorithms`: signing, verification,
//! public-key recovery from a signature, and strict DER codec support.

#![forbid(unsafe_code)]

pub mod ecdsa;
pub mod error;

pub use ecdsa::{
    EcdsaK256, EcdsaK256PublicKey, EcdsaK256SecretKey, EcdsaK256Signature, RecoveryId,
    SignOptions,
};
pub use error::{Error, Result};
