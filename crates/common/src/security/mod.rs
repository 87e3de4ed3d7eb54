//! Secure memory handling for secret key material

mod secret;

pub use secret::{SecretBuffer, SecureZeroingType};
