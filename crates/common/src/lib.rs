//! Shared building blocks for the koblitz workspace
//!
//! This crate provides the security-sensitive plumbing the arithmetic and
//! signature crates rely on: fixed-size secret buffers with guaranteed
//! zeroization and constant-time comparison/selection helpers.

#![forbid(unsafe_code)]

pub mod constant_time;
pub mod security;

pub use constant_time::{ct_eq, ct_select};
pub use security::{SecretBuffer, SecureZeroingType};
