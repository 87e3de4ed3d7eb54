//! secp256k1 scalar arithmetic modulo the curve order

use crate::ec::k256::constants::K256_SCALAR_SIZE;
use crate::error::{validate, Error, Result};
use koblitz_common::security::SecretBuffer;
use subtle::{Choice, ConditionallySelectable};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Number of 32-bit limbs for a secp256k1 scalar
const NLIMBS: usize = 8;

/// secp256k1 scalar value for use in elliptic curve operations
///
/// Represents integers modulo the curve order n. Used for private keys,
/// nonces and signature components. Automatically zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop, Debug)]
pub struct Scalar(SecretBuffer<K256_SCALAR_SIZE>);

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        koblitz_common::ct_eq(self.0.as_ref(), other.0.as_ref())
    }
}

impl Eq for Scalar {}

impl Scalar {
    /// The curve order n, big-endian
    const ORDER: [u8; K256_SCALAR_SIZE] = [
        0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
        0xFF, 0xFE, 0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C,
        0xD0, 0x36, 0x41, 0x41,
    ];

    /// n as little-endian limbs
    const N_LIMBS: [u32; NLIMBS] = [
        0xD0364141, 0xBFD25E8C, 0xAF48A03B, 0xBAAEDCE6, 0xFFFFFFFE, 0xFFFFFFFF, 0xFFFFFFFF,
        0xFFFFFFFF,
    ];

    /// 2²⁵⁶ − n as little-endian limbs (5 limbs; 2²⁵⁶ ≡ this mod n)
    const FOLD_LIMBS: [u32; 5] = [0x2FC9BEBF, 0x402DA173, 0x50B75FC4, 0x45512319, 0x1];

    /// n/2 (rounded down) as little-endian limbs, the low-S boundary
    const HALF_ORDER_LIMBS: [u32; NLIMBS] = [
        0x681B20A0, 0xDFE92F46, 0x57A4501D, 0x5D576E73, 0xFFFFFFFF, 0xFFFFFFFF, 0xFFFFFFFF,
        0x7FFFFFFF,
    ];

    /// n − 2, big-endian, the Fermat inversion exponent
    const N_MINUS_2: [u8; K256_SCALAR_SIZE] = [
        0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
        0xFF, 0xFE, 0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C,
        0xD0, 0x36, 0x41, 0x3F,
    ];

    /// Create a new scalar from raw bytes.
    ///
    /// The bytes will be reduced modulo the curve order if necessary.
    /// Returns an error if the input is the literal zero encoding; zeros
    /// that arise from reducing a multiple of n are accepted.
    pub fn new(data: [u8; K256_SCALAR_SIZE]) -> Result<Self> {
        let is_explicit_zero = data.iter().all(|&b| b == 0);
        if is_explicit_zero {
            return Err(Error::param("K256 Scalar", "Scalar cannot be zero"));
        }
        Ok(Self::reduce(data))
    }

    /// Reduce raw bytes modulo the curve order. Zero is a valid result.
    ///
    /// Intermediate arithmetic (message-hash scalars, signature math) runs
    /// through this constructor; secret keys and nonces go through `new`.
    pub fn reduce(data: [u8; K256_SCALAR_SIZE]) -> Self {
        Self::reduce_overflowing(data).0
    }

    /// Reduce raw bytes modulo the curve order, also reporting whether the
    /// input required reduction (was ≥ n).
    ///
    /// The flag is what ECDSA recovery encodes in bit 1 of the recovery id.
    pub fn reduce_overflowing(data: [u8; K256_SCALAR_SIZE]) -> (Self, bool) {
        let limbs = Self::to_le_limbs(&data);
        let (reduced, borrow) = Self::sbb8(limbs, Self::N_LIMBS);
        // borrow == 0 → input ≥ n → take the subtracted value
        let was_high = Choice::from((borrow ^ 1) as u8);
        let out = Self::conditional_select_limbs(&limbs, &reduced, was_high);
        (
            Scalar(SecretBuffer::new(Self::limbs_to_be(&out))),
            was_high.into(),
        )
    }

    /// Create a scalar from a `SecretBuffer`.
    ///
    /// The buffer contents will be reduced modulo the curve order if
    /// necessary. Returns an error if the input is the literal zero.
    pub fn from_secret_buffer(buffer: SecretBuffer<K256_SCALAR_SIZE>) -> Result<Self> {
        let mut bytes = [0u8; K256_SCALAR_SIZE];
        bytes.copy_from_slice(buffer.as_ref());
        Self::new(bytes)
    }

    /// Deserialize a scalar from a byte slice with length validation.
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        validate::length("K256 Scalar", bytes.len(), K256_SCALAR_SIZE)?;
        let mut data = [0u8; K256_SCALAR_SIZE];
        data.copy_from_slice(bytes);
        Self::new(data)
    }

    /// Get a reference to the underlying `SecretBuffer`.
    pub fn as_secret_buffer(&self) -> &SecretBuffer<K256_SCALAR_SIZE> {
        &self.0
    }

    /// Serialize this scalar to big-endian bytes.
    pub fn serialize(&self) -> [u8; K256_SCALAR_SIZE] {
        let mut result = [0u8; K256_SCALAR_SIZE];
        result.copy_from_slice(self.0.as_ref());
        result
    }

    /// Check if this scalar is zero.
    pub fn is_zero(&self) -> bool {
        self.0.as_ref().iter().all(|&b| b == 0)
    }

    /// Check whether this scalar exceeds n/2 (a "high-S" value).
    pub fn is_high(&self) -> bool {
        let limbs = Self::to_le_limbs(&self.serialize());
        // n/2 − self borrows exactly when self > n/2
        let (_, borrow) = Self::sbb8(Self::HALF_ORDER_LIMBS, limbs);
        borrow == 1
    }

    /* ================================================================= */
    /*  Modular arithmetic                                               */
    /* ================================================================= */

    /// Add two scalars modulo the curve order n
    pub fn add_mod_n(&self, other: &Self) -> Self {
        let a = Self::to_le_limbs(&self.serialize());
        let b = Self::to_le_limbs(&other.serialize());

        let (sum, carry) = Self::adc8(a, b);
        let (reduced, borrow) = Self::sbb8(sum, Self::N_LIMBS);
        let need_reduce = (carry | (borrow ^ 1)) & 1;
        let out = Self::conditional_select_limbs(&sum, &reduced, Choice::from(need_reduce as u8));

        Scalar(SecretBuffer::new(Self::limbs_to_be(&out)))
    }

    /// Subtract two scalars modulo the curve order n
    pub fn sub_mod_n(&self, other: &Self) -> Self {
        let a = Self::to_le_limbs(&self.serialize());
        let b = Self::to_le_limbs(&other.serialize());

        let (diff, borrow) = Self::sbb8(a, b);
        let (diff_plus_n, _) = Self::adc8(diff, Self::N_LIMBS);
        let out = Self::conditional_select_limbs(&diff, &diff_plus_n, Choice::from(borrow as u8));

        Scalar(SecretBuffer::new(Self::limbs_to_be(&out)))
    }

    /// Negate this scalar modulo the curve order: n − self (0 stays 0)
    pub fn negate_mod_n(&self) -> Self {
        Self::reduce([0u8; K256_SCALAR_SIZE]).sub_mod_n(self)
    }

    /// Multiply two scalars modulo the curve order n
    ///
    /// Schoolbook 8×8 → 16-limb product, then folding by 2²⁵⁶ − n.
    pub fn mul_mod_n(&self, other: &Self) -> Self {
        let a = Self::to_le_limbs(&self.serialize());
        let b = Self::to_le_limbs(&other.serialize());

        let mut t = [0u128; NLIMBS * 2];
        for i in 0..NLIMBS {
            for j in 0..NLIMBS {
                t[i + j] += (a[i] as u128) * (b[j] as u128);
            }
        }

        let mut wide = [0u32; NLIMBS * 2];
        let mut carry: u128 = 0;
        for i in 0..(NLIMBS * 2) {
            let v = t[i] + carry;
            wide[i] = (v & 0xFFFF_FFFF) as u32;
            carry = v >> 32;
        }

        let out = Self::reduce_wide(wide);
        Scalar(SecretBuffer::new(Self::limbs_to_be(&out)))
    }

    /// Compute multiplicative inverse modulo n using Fermat's little
    /// theorem: a⁻¹ ≡ a^(n−2) (mod n). Left-to-right binary exponentiation
    /// with a data-independent operation sequence (the exponent is public).
    pub fn inv_mod_n(&self) -> Result<Self> {
        if self.is_zero() {
            return Err(Error::param("K256 Scalar", "Cannot invert zero scalar"));
        }

        let mut result = Self::reduce({
            let mut one = [0u8; K256_SCALAR_SIZE];
            one[K256_SCALAR_SIZE - 1] = 1;
            one
        });
        let base = self.clone();

        for &byte in Self::N_MINUS_2.iter() {
            for bit in (0..8).rev() {
                result = result.mul_mod_n(&result);
                if (byte >> bit) & 1 == 1 {
                    result = result.mul_mod_n(&base);
                }
            }
        }

        Ok(result)
    }

    /* ================================================================= */
    /*  Private helpers                                                  */
    /* ================================================================= */

    /// Convert big-endian bytes to little-endian limbs
    #[inline(always)]
    fn to_le_limbs(bytes_be: &[u8; K256_SCALAR_SIZE]) -> [u32; NLIMBS] {
        let mut limbs = [0u32; NLIMBS];
        for (i, limb) in limbs.iter_mut().enumerate() {
            let offset = (NLIMBS - 1 - i) * 4;
            *limb = u32::from_be_bytes([
                bytes_be[offset],
                bytes_be[offset + 1],
                bytes_be[offset + 2],
                bytes_be[offset + 3],
            ]);
        }
        limbs
    }

    /// Convert little-endian limbs back to big-endian bytes
    #[inline(always)]
    fn limbs_to_be(limbs: &[u32; NLIMBS]) -> [u8; K256_SCALAR_SIZE] {
        let mut out = [0u8; K256_SCALAR_SIZE];
        for (i, &limb) in limbs.iter().enumerate() {
            let offset = (NLIMBS - 1 - i) * 4;
            out[offset..offset + 4].copy_from_slice(&limb.to_be_bytes());
        }
        out
    }

    /// 8-limb addition with carry
    #[inline(always)]
    fn adc8(a: [u32; NLIMBS], b: [u32; NLIMBS]) -> ([u32; NLIMBS], u32) {
        let mut r = [0u32; NLIMBS];
        let mut carry = 0u64;
        for ((&a_limb, &b_limb), r_limb) in a.iter().zip(b.iter()).zip(r.iter_mut()) {
            let tmp = (a_limb as u64) + (b_limb as u64) + carry;
            *r_limb = (tmp & 0xFFFF_FFFF) as u32;
            carry = tmp >> 32;
        }
        (r, carry as u32)
    }

    /// 8-limb subtraction with borrow (constant-time)
    #[inline(always)]
    fn sbb8(a: [u32; NLIMBS], b: [u32; NLIMBS]) -> ([u32; NLIMBS], u32) {
        let mut r = [0u32; NLIMBS];
        let mut borrow = 0u32;
        for ((&a_limb, &b_limb), r_limb) in a.iter().zip(b.iter()).zip(r.iter_mut()) {
            let ai = a_limb as u64;
            let bi = b_limb as u64;
            let tmp = ai.wrapping_sub(bi + borrow as u64);
            *r_limb = tmp as u32;
            borrow = (ai < bi + borrow as u64) as u32;
        }
        (r, borrow)
    }

    /// Constant-time select: if flag == 0 return a else return b
    fn conditional_select_limbs(
        a: &[u32; NLIMBS],
        b: &[u32; NLIMBS],
        flag: Choice,
    ) -> [u32; NLIMBS] {
        let mut out = [0u32; NLIMBS];
        for ((a_limb, b_limb), out_limb) in a.iter().zip(b.iter()).zip(out.iter_mut()) {
            *out_limb = u32::conditional_select(a_limb, b_limb, flag);
        }
        out
    }

    /// One fold of lo + hi·2²⁵⁶ → lo + hi·(2²⁵⁶ − n) modulo n
    fn fold(t: [u32; NLIMBS * 2]) -> [u32; NLIMBS * 2] {
        let mut acc = [0u128; NLIMBS * 2];
        for (a, &lo) in acc.iter_mut().zip(t.iter().take(NLIMBS)) {
            *a = lo as u128;
        }
        for i in 0..NLIMBS {
            let hi = t[NLIMBS + i] as u128;
            for (j, &c) in Self::FOLD_LIMBS.iter().enumerate() {
                acc[i + j] += hi * (c as u128);
            }
        }

        let mut out = [0u32; NLIMBS * 2];
        let mut carry: u128 = 0;
        for (o, a) in out.iter_mut().zip(acc.iter()) {
            let v = a + carry;
            *o = (v & 0xFFFF_FFFF) as u32;
            carry = v >> 32;
        }
        out
    }

    /// Reduce a 16-word (512-bit) value modulo n
    fn reduce_wide(t: [u32; NLIMBS * 2]) -> [u32; NLIMBS] {
        // Four folds bring the value below 2²⁵⁶
        let mut v = t;
        for _ in 0..4 {
            v = Self::fold(v);
        }

        let mut out = [0u32; NLIMBS];
        out.copy_from_slice(&v[..NLIMBS]);

        // At most two conditional subtractions of n
        for _ in 0..2 {
            let (sub, borrow) = Self::sbb8(out, Self::N_LIMBS);
            out = Self::conditional_select_limbs(&out, &sub, Choice::from((borrow ^ 1) as u8));
        }

        out
    }
}
