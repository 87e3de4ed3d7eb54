//! # koblitz
//!
//! secp256k1 ECDSA and ECDH built on a constant-time arithmetic core.
//!
//! ## Usage
//!
//! The facade functions work on plain byte boundaries:
//!
//! ```
//! use koblitz::SignOptions;
//!
//! let private_key = [0x42u8; 32];
//! let public_key = koblitz::get_public_key(&private_key, true).unwrap();
//!
//! // sign a 32-byte message digest
//! let digest = [0x24u8; 32];
//! let (der, recovery) =
//!     koblitz::sign_recoverable(&digest, &private_key, SignOptions { canonical: true })
//!         .unwrap();
//!
//! assert!(koblitz::verify(&der, &digest, &public_key));
//! assert_eq!(
//!     koblitz::recover_public_key(&digest, &der, recovery, true).unwrap(),
//!     public_key
//! );
//! ```
//!
//! The typed API (hex forms included) lives on the member crates:
//!
//! ```
//! use koblitz::prelude::*;
//!
//! let secret = EcdsaK256SecretKey::from_hex(
//!     "c9afa9d845ba75166b5c215767b1d6934e50c3db36e89b127b8a622b120f6721",
//! )
//! .unwrap();
//! let public = secret.public_key().unwrap();
//!
//! let digest = [0x42u8; 32];
//! let (signature, recovery) =
//!     EcdsaK256::sign(&digest, &secret, SignOptions { canonical: true }).unwrap();
//!
//! assert!(EcdsaK256::verify(&signature, &digest, &public));
//! assert_eq!(
//!     EcdsaK256::recover(&digest, &signature, recovery).unwrap(),
//!     public
//! );
//! ```
//!
//! ## Crate Structure
//!
//! This is a facade crate over the workspace members:
//!
//! - [`koblitz-common`]: secret buffers and constant-time helpers
//! - [`koblitz-algorithms`]: field/scalar/point arithmetic and scalar
//!   multiplication with its precomputation cache
//! - [`koblitz-sign`]: ECDSA signing, verification, recovery and DER
//!
//! [`koblitz-common`]: koblitz_common
//! [`koblitz-algorithms`]: koblitz_algorithms
//! [`koblitz-sign`]: koblitz_sign

#![forbid(unsafe_code)]

pub use koblitz_algorithms as algorithms;
pub use koblitz_common as common;
pub use koblitz_sign as sign;

pub use sign::{Error, RecoveryId, Result, SignOptions};

use sign::{EcdsaK256, EcdsaK256PublicKey, EcdsaK256SecretKey, EcdsaK256Signature};

/// Derive the SEC1-encoded public key d·G for a 32-byte private key.
pub fn get_public_key(private_key: &[u8], compressed: bool) -> Result<Vec<u8>> {
    let sk = EcdsaK256SecretKey::from_bytes(private_key)?;
    Ok(sk.public_key()?.to_sec1_bytes(compressed))
}

/// ECDH key agreement: the SEC1 encoding of the full shared point d·Q.
///
/// This returns the encoded point, not the bare x-coordinate; callers
/// expecting the x-only convention must extract it themselves.
pub fn get_shared_secret(
    private_key: &[u8],
    public_key: &[u8],
    compressed: bool,
) -> Result<Vec<u8>> {
    let sk = EcdsaK256SecretKey::from_bytes(private_key)?;
    let pk = EcdsaK256PublicKey::from_sec1_bytes(public_key)?;
    let shared = algorithms::ec::k256::diffie_hellman(sk.scalar(), pk.point())?;
    let encoded = if compressed {
        shared.serialize_compressed()?.to_vec()
    } else {
        shared.serialize_uncompressed()?.to_vec()
    };
    Ok(encoded)
}

/// Sign a 32-byte message hash, returning the DER-encoded signature.
pub fn sign(msg_hash: &[u8; 32], private_key: &[u8], options: SignOptions) -> Result<Vec<u8>> {
    let sk = EcdsaK256SecretKey::from_bytes(private_key)?;
    let (signature, _) = EcdsaK256::sign(msg_hash, &sk, options)?;
    Ok(signature.to_der())
}

/// Sign a 32-byte message hash, returning the DER-encoded signature
/// together with its recovery id byte.
pub fn sign_recoverable(
    msg_hash: &[u8; 32],
    private_key: &[u8],
    options: SignOptions,
) -> Result<(Vec<u8>, u8)> {
    let sk = EcdsaK256SecretKey::from_bytes(private_key)?;
    let (signature, recovery) = EcdsaK256::sign(msg_hash, &sk, options)?;
    Ok((signature.to_der(), recovery.to_byte()))
}

/// Verify a DER signature over a message hash under a SEC1 public key.
///
/// Total: returns false for malformed or cryptographically invalid input
/// and never errors.
pub fn verify(signature_der: &[u8], msg_hash: &[u8; 32], public_key: &[u8]) -> bool {
    let signature = match EcdsaK256Signature::from_der(signature_der) {
        Ok(signature) => signature,
        Err(_) => return false,
    };
    let pk = match EcdsaK256PublicKey::from_sec1_bytes(public_key) {
        Ok(pk) => pk,
        Err(_) => return false,
    };
    EcdsaK256::verify(&signature, msg_hash, &pk)
}

/// Recover the SEC1-encoded signer key from a DER signature and its
/// recovery id byte. `None` when no valid key can be reconstructed.
pub fn recover_public_key(
    msg_hash: &[u8; 32],
    signature_der: &[u8],
    recovery: u8,
    compressed: bool,
) -> Option<Vec<u8>> {
    let signature = EcdsaK256Signature::from_der(signature_der).ok()?;
    let recovery = RecoveryId::from_byte(recovery).ok()?;
    let pk = EcdsaK256::recover(msg_hash, &signature, recovery)?;
    Some(pk.to_sec1_bytes(compressed))
}

/// Eagerly (re)build the base-point precomputation table with window
/// width `window` (default is 4; larger widths trade memory for speed).
pub fn precompute(window: usize) -> Result<()> {
    algorithms::ec::k256::precompute_base(window)?;
    Ok(())
}

/// Common imports for koblitz users
pub mod prelude {
    // Curve arithmetic and key agreement
    pub use crate::algorithms::ec::k256::{
        base_point_g, diffie_hellman, generate_keypair, precompute_base, public_key,
        scalar_mult, scalar_mult_base_g, FieldElement, Point, PrecomputedPoint, Scalar,
        K256_CURVE_ORDER, K256_DEFAULT_WINDOW, K256_FIELD_PRIME,
    };

    // Signatures
    pub use crate::sign::{
        EcdsaK256, EcdsaK256PublicKey, EcdsaK256SecretKey, EcdsaK256Signature, RecoveryId,
        SignOptions,
    };

    // Security types
    pub use crate::common::{ct_eq, SecretBuffer, SecureZeroingType};
}
