//! Koblitz secp256k1 Elliptic Curve Primitives
//!
//! This module implements the secp256k1 elliptic curve operations in constant
//! time. The curve equation is y² = x³ + 7 over the prime field F_p where:
//! - p = 2^256 - 2^32 - 977
//! - The curve order n = 0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141
//!
//! Scalar multiplication runs through a windowed precomputation cache with
//! data-independent table lookups; the base point's cache is process-wide
//! and built under a one-time-initialization guard.

mod constants;
mod field;
mod mul;
mod point;
mod scalar;

pub use constants::{
    K256_CURVE_ORDER, K256_DEFAULT_WINDOW, K256_FIELD_ELEMENT_SIZE, K256_FIELD_PRIME,
    K256_MAX_WINDOW, K256_MIN_WINDOW, K256_POINT_COMPRESSED_SIZE, K256_POINT_UNCOMPRESSED_SIZE,
    K256_SCALAR_SIZE,
};
pub use field::FieldElement;
pub use mul::{precompute_base, PrecomputedPoint};
pub use point::Point;
pub use scalar::Scalar;

use crate::error::{Error, Result};
use rand::{CryptoRng, RngCore};

/// SECP256K1 curve parameters (base point G)
struct Secp256k1Params {
    g_x: [u8; 32],
    g_y: [u8; 32],
}

const SECP256K1: Secp256k1Params = Secp256k1Params {
    g_x: [
        0x79, 0xBE, 0x66, 0x7E, 0xF9, 0xDC, 0xBB, 0xAC, 0x55, 0xA0, 0x62, 0x95, 0xCE, 0x87, 0x0B,
        0x07, 0x02, 0x9B, 0xFC, 0xDB, 0x2D, 0xCE, 0x28, 0xD9, 0x59, 0xF2, 0x81, 0x5B, 0x16, 0xF8,
        0x17, 0x98,
    ],
    g_y: [
        0x48, 0x3A, 0xDA, 0x77, 0x26, 0xA3, 0xC4, 0x65, 0x5D, 0xA4, 0xFB, 0xFC, 0x0E, 0x11, 0x08,
        0xA8, 0xFD, 0x17, 0xB4, 0x48, 0xA6, 0x85, 0x54, 0x19, 0x9C, 0x47, 0xD0, 0x8F, 0xFB, 0x10,
        0xD4, 0xB8,
    ],
};

/// Get the standard base point G of the secp256k1 curve
pub fn base_point_g() -> Point {
    Point::new_uncompressed(&SECP256K1.g_x, &SECP256K1.g_y)
        .expect("Standard base point must be valid")
}

/// Scalar multiplication with the base point: scalar * G
///
/// Runs through the process-wide precomputation cache for G.
pub fn scalar_mult_base_g(scalar: &Scalar) -> Result<Point> {
    if scalar.is_zero() {
        return Ok(Point::identity());
    }
    let table = mul::base_point_table();
    Ok(mul::mul_with_table(&table, scalar))
}

/// General scalar multiplication: compute scalar * point
pub fn scalar_mult(scalar: &Scalar, point: &Point) -> Result<Point> {
    if point.is_identity() {
        return Ok(Point::identity());
    }
    point.mul(scalar)
}

/// Compute the public key d·G for a private scalar
pub fn public_key(private_key: &Scalar) -> Result<Point> {
    if private_key.is_zero() {
        return Err(Error::param("K256 private key", "Private key cannot be zero"));
    }
    scalar_mult_base_g(private_key)
}

/// Generate a cryptographically secure keypair
pub fn generate_keypair<R: CryptoRng + RngCore>(rng: &mut R) -> Result<(Scalar, Point)> {
    let mut scalar_bytes = [0u8; K256_SCALAR_SIZE];
    loop {
        rng.fill_bytes(&mut scalar_bytes);
        match Scalar::new(scalar_bytes) {
            Ok(private_key) => {
                if private_key.is_zero() {
                    // Input reduced to a multiple of n; draw again
                    continue;
                }
                let public_key = scalar_mult_base_g(&private_key)?;
                return Ok((private_key, public_key));
            }
            Err(_) => continue,
        }
    }
}

/// ECDH key agreement: compute the shared point d·Q
///
/// Returns the full point; the caller picks a SEC1 encoding. Rejects the
/// identity on either side of the computation (an identity shared point
/// would mean a degenerate key on the other end).
pub fn diffie_hellman(private_key: &Scalar, public_key: &Point) -> Result<Point> {
    if private_key.is_zero() {
        return Err(Error::param("K256 ECDH", "Private key cannot be zero"));
    }
    if public_key.is_identity() {
        return Err(Error::param(
            "K256 ECDH",
            "Peer public key cannot be the identity point",
        ));
    }
    let shared = scalar_mult(private_key, public_key)?;
    if shared.is_identity() {
        return Err(Error::param("K256 ECDH", "Shared point is the identity"));
    }
    Ok(shared)
}

#[cfg(test)]
mod tests;
