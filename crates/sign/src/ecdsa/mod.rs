//! Deterministic ECDSA over secp256k1
//!
//! Signing follows FIPS 186-4 §6.3 with RFC 6979 nonces, so a given
//! (message hash, key) pair always produces the same signature. Signatures
//! carry a two-bit recovery id from which the verifying key can be
//! reconstructed. The `canonical` option enforces low-S form.
//!
//! Callers pass the 32-byte message digest; hashing the message itself is
//! outside this crate.

mod der;
mod rfc6979;

use der::SignatureComponents;
use koblitz_algorithms::ec::k256 as ec;
use koblitz_common::ct_eq;
use rand::{CryptoRng, RngCore};
use rfc6979::NonceGenerator;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{Error, Result};

/// ECDSA signature scheme using the secp256k1 curve
///
/// Implements ECDSA as specified in FIPS 186-4, Section 6, with
/// deterministic nonce generation per RFC 6979.
pub struct EcdsaK256;

/// secp256k1 public key: a validated non-identity curve point
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EcdsaK256PublicKey {
    point: ec::Point,
}

/// secp256k1 secret key
///
/// The scalar d must satisfy 1 ≤ d ≤ n-1 where n is the order of the base
/// point G. Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EcdsaK256SecretKey {
    scalar: ec::Scalar,
}

/// secp256k1 ECDSA signature: the scalar pair (r, s), both in [1, n−1]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EcdsaK256Signature {
    r: ec::Scalar,
    s: ec::Scalar,
}

/// Two-bit public-key recovery hint attached to a signature.
///
/// Bit 0 is the parity of R.y; bit 1 is set in the rare case that R.x
/// required reduction modulo n.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecoveryId(u8);

/// Signing options
#[derive(Clone, Copy, Debug, Default)]
pub struct SignOptions {
    /// Enforce low-S form: replace s > n/2 with n − s and flip recovery
    /// bit 0 accordingly
    pub canonical: bool,
}

impl RecoveryId {
    /// Validate a recovery id byte (must be < 4).
    pub fn from_byte(byte: u8) -> Result<Self> {
        if byte < 4 {
            Ok(RecoveryId(byte))
        } else {
            Err(Error::InvalidParameter(format!(
                "recovery id must be 0..=3, got {}",
                byte
            )))
        }
    }

    /// The raw id byte.
    pub fn to_byte(self) -> u8 {
        self.0
    }

    /// Parity of R.y: true when odd.
    pub fn is_y_odd(self) -> bool {
        self.0 & 1 == 1
    }

    /// Whether R.x was reduced modulo n when forming r.
    pub fn is_x_reduced(self) -> bool {
        self.0 & 2 == 2
    }
}

impl EcdsaK256PublicKey {
    /// Wrap a curve point after validation.
    ///
    /// Rejects the identity and anything off the curve.
    pub fn from_point(point: ec::Point) -> Result<Self> {
        if point.is_identity() {
            return Err(Error::InvalidKey(
                "public key cannot be the identity point".into(),
            ));
        }
        if !point.is_valid() {
            return Err(Error::InvalidKey("point is not on the curve".into()));
        }
        Ok(EcdsaK256PublicKey { point })
    }

    /// Parse a SEC1-encoded public key, compressed (33 bytes) or
    /// uncompressed (65 bytes).
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self> {
        let point = match bytes.len() {
            ec::K256_POINT_COMPRESSED_SIZE => ec::Point::deserialize_compressed(bytes),
            ec::K256_POINT_UNCOMPRESSED_SIZE => ec::Point::deserialize_uncompressed(bytes),
            actual => {
                return Err(Error::InvalidKey(format!(
                    "public key must be 33 or 65 bytes, got {}",
                    actual
                )))
            }
        }
        .map_err(|e| Error::InvalidKey(e.to_string()))?;
        Self::from_point(point)
    }

    /// Parse from lowercase or uppercase hex.
    pub fn from_hex(s: &str) -> Result<Self> {
        let point = ec::Point::from_hex(s).map_err(|e| Error::InvalidKey(e.to_string()))?;
        Self::from_point(point)
    }

    /// SEC1 encoding of the key.
    pub fn to_sec1_bytes(&self, compressed: bool) -> Vec<u8> {
        if compressed {
            self.point
                .serialize_compressed()
                .expect("validated key is never the identity")
                .to_vec()
        } else {
            self.point
                .serialize_uncompressed()
                .expect("validated key is never the identity")
                .to_vec()
        }
    }

    /// Lowercase hex of the SEC1 encoding.
    pub fn to_hex(&self, compressed: bool) -> String {
        hex::encode(self.to_sec1_bytes(compressed))
    }

    /// The underlying curve point.
    pub fn point(&self) -> &ec::Point {
        &self.point
    }
}

impl EcdsaK256SecretKey {
    /// Import a secret key from its 32-byte big-endian scalar.
    ///
    /// The value must lie in [1, n−1]; out-of-range input is rejected
    /// rather than reduced.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != ec::K256_SCALAR_SIZE {
            return Err(Error::InvalidKey(format!(
                "secret key must be {} bytes, got {}",
                ec::K256_SCALAR_SIZE,
                bytes.len()
            )));
        }
        let mut data = [0u8; ec::K256_SCALAR_SIZE];
        data.copy_from_slice(bytes);
        let (scalar, was_high) = ec::Scalar::reduce_overflowing(data);
        data.zeroize();
        if was_high {
            return Err(Error::InvalidKey(
                "secret key is not below the curve order".into(),
            ));
        }
        if scalar.is_zero() {
            return Err(Error::InvalidKey("secret key cannot be zero".into()));
        }
        Ok(EcdsaK256SecretKey { scalar })
    }

    /// Import from hex.
    pub fn from_hex(s: &str) -> Result<Self> {
        let mut bytes =
            hex::decode(s).map_err(|e| Error::InvalidKey(format!("invalid hex: {}", e)))?;
        let key = Self::from_bytes(&bytes);
        bytes.zeroize();
        key
    }

    /// Export the scalar bytes; the returned buffer zeroizes on drop.
    pub fn to_bytes(&self) -> Zeroizing<[u8; ec::K256_SCALAR_SIZE]> {
        Zeroizing::new(self.scalar.serialize())
    }

    /// Derive the public key d·G.
    pub fn public_key(&self) -> Result<EcdsaK256PublicKey> {
        let point = ec::public_key(&self.scalar)?;
        EcdsaK256PublicKey::from_point(point)
    }

    /// The private scalar.
    pub fn scalar(&self) -> &ec::Scalar {
        &self.scalar
    }
}

impl EcdsaK256Signature {
    /// Build a signature from raw 32-byte big-endian components.
    ///
    /// Both must be in [1, n−1].
    pub fn from_components(r: &[u8; 32], s: &[u8; 32]) -> Result<Self> {
        let r = Self::range_checked(r, "r")?;
        let s = Self::range_checked(s, "s")?;
        Ok(EcdsaK256Signature { r, s })
    }

    fn range_checked(bytes: &[u8; 32], which: &str) -> Result<ec::Scalar> {
        let (scalar, was_high) = ec::Scalar::reduce_overflowing(*bytes);
        if was_high {
            return Err(Error::InvalidSignature(format!(
                "{} is not below the curve order",
                which
            )));
        }
        if scalar.is_zero() {
            return Err(Error::InvalidSignature(format!("{} cannot be zero", which)));
        }
        Ok(scalar)
    }

    /// The r component, big-endian.
    pub fn r_bytes(&self) -> [u8; 32] {
        self.r.serialize()
    }

    /// The s component, big-endian.
    pub fn s_bytes(&self) -> [u8; 32] {
        self.s.serialize()
    }

    /// Whether s is in low-S form (at most n/2).
    pub fn is_low_s(&self) -> bool {
        !self.s.is_high()
    }

    /// Serialize to DER: SEQUENCE { INTEGER r, INTEGER s }.
    pub fn to_der(&self) -> Vec<u8> {
        SignatureComponents::from_scalar_bytes(&self.r.serialize(), &self.s.serialize()).to_der()
    }

    /// Parse a DER signature, tolerating leading-zero padded INTEGERs.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        Self::from_components_parsed(SignatureComponents::from_der(der, false)?)
    }

    /// Parse a DER signature, rejecting any non-minimal encoding
    /// (consensus-critical callers).
    pub fn from_der_strict(der: &[u8]) -> Result<Self> {
        Self::from_components_parsed(SignatureComponents::from_der(der, true)?)
    }

    fn from_components_parsed(components: SignatureComponents) -> Result<Self> {
        let r = SignatureComponents::component_to_scalar_bytes(&components.r)?;
        let s = SignatureComponents::component_to_scalar_bytes(&components.s)?;
        Self::from_components(&r, &s)
    }

    /// Lowercase hex of the DER encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_der())
    }

    /// Parse a DER signature from hex.
    pub fn from_hex(s: &str) -> Result<Self> {
        let der = hex::decode(s)
            .map_err(|e| Error::InvalidSignature(format!("invalid hex: {}", e)))?;
        Self::from_der(&der)
    }

    pub(crate) fn r(&self) -> &ec::Scalar {
        &self.r
    }

    pub(crate) fn s(&self) -> &ec::Scalar {
        &self.s
    }
}

impl EcdsaK256 {
    /// Generate an ECDSA key pair
    ///
    /// Generates a random private key d ∈ [1, n-1] and computes the
    /// corresponding public key Q = d·G.
    pub fn keypair<R: CryptoRng + RngCore>(
        rng: &mut R,
    ) -> Result<(EcdsaK256PublicKey, EcdsaK256SecretKey)> {
        let (sk_scalar, pk_point) = ec::generate_keypair(rng)?;
        let public_key = EcdsaK256PublicKey::from_point(pk_point)?;
        Ok((public_key, EcdsaK256SecretKey { scalar: sk_scalar }))
    }

    /// Sign a 32-byte message hash
    ///
    /// Algorithm (FIPS 186-4 §6.3 with RFC 6979 nonces):
    /// 1. z = the leftmost 256 bits of the hash, mod n
    /// 2. Derive deterministic k from (hash, d)
    /// 3. (x₁, y₁) = k·G through the base-point cache
    /// 4. r = x₁ mod n; if r = 0, continue the nonce generator
    /// 5. s = k⁻¹(z + rd) mod n; if s = 0, continue the nonce generator
    /// 6. Recovery bits: parity of y₁ and whether x₁ ≥ n
    /// 7. canonical ⇒ s := n − s when s > n/2, flipping recovery bit 0
    pub fn sign(
        msg_hash: &[u8; 32],
        secret_key: &EcdsaK256SecretKey,
        options: SignOptions,
    ) -> Result<(EcdsaK256Signature, RecoveryId)> {
        let d = secret_key.scalar();
        let z = ec::Scalar::reduce(*msg_hash);

        let mut nonces = NonceGenerator::new(msg_hash, d);

        loop {
            let k = nonces.next_nonce();

            // R = k·G; k ∈ [1, n−1] never lands on the identity
            let big_r = ec::scalar_mult_base_g(&k)?;

            let (r, x_reduced) = ec::Scalar::reduce_overflowing(big_r.x_coordinate_bytes());
            if r.is_zero() {
                continue;
            }

            let k_inv = k.inv_mod_n()?;
            let mut s = k_inv.mul_mod_n(&z.add_mod_n(&r.mul_mod_n(d)));
            if s.is_zero() {
                continue;
            }

            let mut recovery =
                (big_r.is_y_odd() as u8) | ((x_reduced as u8) << 1);

            if options.canonical && s.is_high() {
                s = s.negate_mod_n();
                recovery ^= 1;
            }

            return Ok((EcdsaK256Signature { r, s }, RecoveryId(recovery)));
        }
    }

    /// Verify a signature over a 32-byte message hash
    ///
    /// Total: returns false for cryptographically invalid input and never
    /// errors. The final comparison of R.x mod n against r is
    /// constant-time.
    pub fn verify(
        signature: &EcdsaK256Signature,
        msg_hash: &[u8; 32],
        public_key: &EcdsaK256PublicKey,
    ) -> bool {
        // r, s ∈ [1, n−1] is enforced at construction; re-check the cheap
        // half in case a signature was built from a zeroed scalar
        if signature.r().is_zero() || signature.s().is_zero() {
            return false;
        }
        let q = public_key.point();
        if q.is_identity() || !q.is_valid() {
            return false;
        }

        let z = ec::Scalar::reduce(*msg_hash);

        let w = match signature.s().inv_mod_n() {
            Ok(w) => w,
            Err(_) => return false,
        };
        let u1 = z.mul_mod_n(&w);
        let u2 = signature.r().mul_mod_n(&w);

        let u1_g = match ec::scalar_mult_base_g(&u1) {
            Ok(p) => p,
            Err(_) => return false,
        };
        let u2_q = match ec::scalar_mult(&u2, q) {
            Ok(p) => p,
            Err(_) => return false,
        };
        let big_r = u1_g.add(&u2_q);
        if big_r.is_identity() {
            return false;
        }

        let v = ec::Scalar::reduce(big_r.x_coordinate_bytes());
        ct_eq(v.serialize(), signature.r_bytes())
    }

    /// Recover the signer's public key from a signature and its recovery id
    ///
    /// Returns `None` when no valid key can be reconstructed: the implied
    /// R.x does not fit the field, x is not an abscissa, or the candidate
    /// key is the identity.
    pub fn recover(
        msg_hash: &[u8; 32],
        signature: &EcdsaK256Signature,
        recovery_id: RecoveryId,
    ) -> Option<EcdsaK256PublicKey> {
        if signature.r().is_zero() || signature.s().is_zero() {
            return None;
        }

        // R.x = r, or r + n when the signer reduced it
        let x_bytes = if recovery_id.is_x_reduced() {
            add_order_checked(&signature.r_bytes())?
        } else {
            signature.r_bytes()
        };

        // Rebuild R by decompressing x with the recorded parity
        let mut compressed = [0u8; ec::K256_POINT_COMPRESSED_SIZE];
        compressed[0] = if recovery_id.is_y_odd() { 0x03 } else { 0x02 };
        compressed[1..].copy_from_slice(&x_bytes);
        let big_r = ec::Point::deserialize_compressed(&compressed).ok()?;

        // Q = r⁻¹·(s·R − z·G)
        let z = ec::Scalar::reduce(*msg_hash);
        let r_inv = signature.r().inv_mod_n().ok()?;
        let u1 = z.mul_mod_n(&r_inv).negate_mod_n();
        let u2 = signature.s().mul_mod_n(&r_inv);

        let u1_g = ec::scalar_mult_base_g(&u1).ok()?;
        let u2_r = big_r.mul(&u2).ok()?;
        let q = u1_g.add(&u2_r);

        EcdsaK256PublicKey::from_point(q).ok()
    }
}

/// r + n as a 256-bit value, `None` when the sum leaves the field.
fn add_order_checked(r_bytes: &[u8; 32]) -> Option<[u8; 32]> {
    let mut out = [0u8; 32];
    let mut carry = 0u16;
    for i in (0..32).rev() {
        let sum = r_bytes[i] as u16 + ec::K256_CURVE_ORDER[i] as u16 + carry;
        out[i] = sum as u8;
        carry = sum >> 8;
    }
    if carry != 0 {
        // r + n ≥ 2²⁵⁶ > p
        return None;
    }
    // The field check (x < p) happens during decompression
    Some(out)
}
