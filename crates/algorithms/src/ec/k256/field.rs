//! secp256k1 base-field arithmetic

use crate::ec::k256::constants::K256_FIELD_ELEMENT_SIZE;
use crate::error::{Error, Result};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

/// Number of 32-bit limbs for a secp256k1 field element (8 × 32 = 256 bits)
const NLIMBS: usize = 8;

/// secp256k1 field element representing values in 𝔽ₚ, where
/// p = 2²⁵⁶ − 2³² − 977.
/// Internally stored as 8 little-endian 32-bit limbs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldElement(pub(crate) [u32; NLIMBS]);

impl FieldElement {
    /// p = 0xFFFFFFFF FFFFFFFF FFFFFFFF FFFFFFFF FFFFFFFF FFFFFFFF FFFFFFFE FFFFFC2F
    /// which equals 2²⁵⁶ − 2³² − 977.
    /// Stored as eight 32-bit words, little-endian.
    pub(crate) const MOD_LIMBS: [u32; NLIMBS] = [
        0xFFFFFC2F, // least significant
        0xFFFFFFFE, 0xFFFFFFFF, 0xFFFFFFFF, 0xFFFFFFFF, 0xFFFFFFFF, 0xFFFFFFFF,
        0xFFFFFFFF, // most significant
    ];

    /// 2²⁵⁶ − p = 2³² + 977, the folding constant of the pseudo-Mersenne
    /// reduction: 2²⁵⁶ ≡ 2³² + 977 (mod p).
    const FOLD: u64 = 977;

    /// p − 2, big-endian, the Fermat inversion exponent
    const P_MINUS_2: [u8; 32] = [
        0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
        0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE,
        0xFF, 0xFF, 0xFC, 0x2D,
    ];

    /// (p + 1) / 4, big-endian. Since p ≡ 3 (mod 4), a^((p+1)/4) is a square
    /// root of a whenever a is a quadratic residue.
    const SQRT_EXP: [u8; 32] = [
        0x3F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
        0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
        0xBF, 0xFF, 0xFF, 0x0C,
    ];

    /* ================================================================= */
    /*  Tiny helpers                                                     */
    /* ================================================================= */

    /// Build a field element from a small literal (`0 ≤ n < 2³²`)
    #[inline]
    pub fn from_u32(n: u32) -> Self {
        let mut limbs = [0u32; NLIMBS];
        limbs[0] = n;
        FieldElement(limbs)
    }

    /// The additive identity: 0
    #[inline]
    pub fn zero() -> Self {
        FieldElement([0u32; NLIMBS])
    }

    /// The multiplicative identity: 1
    #[inline]
    pub fn one() -> Self {
        Self::from_u32(1)
    }

    /// Create a field element from big-endian bytes.
    /// Validates that the value < p. Returns Err if ≥ p.
    pub fn from_bytes(bytes: &[u8; K256_FIELD_ELEMENT_SIZE]) -> Result<Self> {
        // Convert big-endian → little-endian limbs
        let mut limbs = [0u32; NLIMBS];
        for (i, limb) in limbs.iter_mut().enumerate() {
            let offset = (NLIMBS - 1 - i) * 4;
            *limb = u32::from_be_bytes([
                bytes[offset],
                bytes[offset + 1],
                bytes[offset + 2],
                bytes[offset + 3],
            ]);
        }

        let (_, borrow) = Self::sbb8(limbs, Self::MOD_LIMBS);
        if borrow == 1 {
            // limbs < p → canonical
            Ok(FieldElement(limbs))
        } else {
            Err(Error::param(
                "K256 FieldElement",
                "Value not below the field modulus",
            ))
        }
    }

    /// Convert this field element into big-endian bytes.
    pub fn to_bytes(&self) -> [u8; K256_FIELD_ELEMENT_SIZE] {
        let mut out = [0u8; K256_FIELD_ELEMENT_SIZE];
        for (i, &limb) in self.0.iter().enumerate() {
            let limb_bytes = limb.to_be_bytes();
            let offset = (NLIMBS - 1 - i) * 4;
            out[offset..offset + 4].copy_from_slice(&limb_bytes);
        }
        out
    }

    /// Check if element is zero
    pub fn is_zero(&self) -> bool {
        self.ct_is_zero().into()
    }

    /// Constant-time zero check
    pub(crate) fn ct_is_zero(&self) -> Choice {
        let folded = self.0.iter().fold(0u32, |acc, &limb| acc | limb);
        folded.ct_eq(&0)
    }

    /// Constant-time equality
    pub(crate) fn ct_eq(&self, other: &Self) -> Choice {
        let folded = self
            .0
            .iter()
            .zip(other.0.iter())
            .fold(0u32, |acc, (&a, &b)| acc | (a ^ b));
        folded.ct_eq(&0)
    }

    /// Return true if the element is odd (least-significant bit = 1).
    pub fn is_odd(&self) -> bool {
        (self.0[0] & 1) == 1
    }

    /* ================================================================= */
    /*  Field operations                                                 */
    /* ================================================================= */

    /// Constant-time addition: (self + other) mod p
    pub fn add(&self, other: &Self) -> Self {
        let (sum, carry) = Self::adc8(self.0, other.0);

        // If carry = 1 or sum >= p, subtract p. When the addition wrapped
        // past 2²⁵⁶, the subtraction of p mod 2²⁵⁶ lands on the right value
        // because 2²⁵⁶ − p fits well below a limb.
        let (reduced, borrow) = Self::sbb8(sum, Self::MOD_LIMBS);
        let need_reduce = (carry | (borrow ^ 1)) & 1;

        Self::conditional_select(&Self(sum), &Self(reduced), Choice::from(need_reduce as u8))
    }

    /// Constant-time doubling: (2·self) mod p
    #[inline]
    pub fn double(&self) -> Self {
        self.add(self)
    }

    /// Constant-time subtraction: (self - other) mod p
    pub fn sub(&self, other: &Self) -> Self {
        let (diff, borrow) = Self::sbb8(self.0, other.0);
        // If borrow == 1, add p back
        let (diff_plus_p, _) = Self::adc8(diff, Self::MOD_LIMBS);
        Self::conditional_select(&Self(diff), &Self(diff_plus_p), Choice::from(borrow as u8))
    }

    /// Negate this field element: returns p - self if non-zero, else zero
    pub fn negate(&self) -> Self {
        if self.is_zero() {
            self.clone()
        } else {
            FieldElement::zero().sub(self)
        }
    }

    /// Field multiplication: (self * other) mod p
    /// Schoolbook 8×8 → 16-limb product, then pseudo-Mersenne reduction
    pub fn mul(&self, other: &Self) -> Self {
        // Phase 1: 8×8 → 128-bit partial accumulators
        let mut t = [0u128; NLIMBS * 2];
        for i in 0..NLIMBS {
            for j in 0..NLIMBS {
                t[i + j] += (self.0[i] as u128) * (other.0[j] as u128);
            }
        }

        // Phase 2: Carry-propagate into 16 × u32 limbs
        let mut wide = [0u32; NLIMBS * 2];
        let mut carry: u128 = 0;
        for i in 0..(NLIMBS * 2) {
            let v = t[i] + carry;
            wide[i] = (v & 0xFFFF_FFFF) as u32;
            carry = v >> 32;
        }

        // Phase 3: Reduce 16 limbs → 8 limbs mod p
        Self::reduce_wide(wide)
    }

    /// Field squaring: (self²) mod p
    #[inline(always)]
    pub fn square(&self) -> Self {
        self.mul(self)
    }

    /// Raise this element to a public big-endian exponent.
    ///
    /// Left-to-right binary ladder. The exponent is public data (the fixed
    /// inversion and square-root exponents), so the bit-dependent multiply
    /// does not leak secrets.
    pub fn pow(&self, exp_be: &[u8; 32]) -> Self {
        let mut result = FieldElement::one();
        let base = self.clone();

        for &byte in exp_be.iter() {
            for bit in (0..8).rev() {
                result = result.square();
                if (byte >> bit) & 1 == 1 {
                    result = result.mul(&base);
                }
            }
        }

        result
    }

    /// Compute multiplicative inverse via Fermat: a^(p-2) mod p
    ///
    /// Slower than extended-Euclid but the operation sequence does not
    /// depend on the value being inverted.
    pub fn invert(&self) -> Result<Self> {
        if self.is_zero() {
            return Err(Error::param("K256 FieldElement", "Inverse of zero"));
        }
        Ok(self.pow(&Self::P_MINUS_2))
    }

    /// Compute square root using the fact that p ≡ 3 (mod 4):
    /// sqrt(a) = a^((p+1)/4).
    ///
    /// Returns `None` when self is not a quadratic residue; the candidate
    /// root is always verified by squaring.
    pub fn sqrt(&self) -> Option<Self> {
        if self.is_zero() {
            return Some(FieldElement::zero());
        }

        let root = self.pow(&Self::SQRT_EXP);

        if root.square() == *self {
            Some(root)
        } else {
            None
        }
    }

    /* ================================================================= */
    /*  Private helper methods (constant-time arithmetic)                */
    /* ================================================================= */

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

            // New borrow = 1 iff ai < bi + old_borrow
            borrow = (ai < bi + borrow as u64) as u32;
        }

        (r, borrow)
    }

    /// Constant-time select: if flag == 0 return a else return b
    pub(crate) fn conditional_select(a: &Self, b: &Self, flag: Choice) -> Self {
        let mut out = [0u32; NLIMBS];
        for ((a_limb, b_limb), out_limb) in a.0.iter().zip(b.0.iter()).zip(out.iter_mut()) {
            *out_limb = u32::conditional_select(a_limb, b_limb, flag);
        }
        FieldElement(out)
    }

    /// One fold of the pseudo-Mersenne reduction:
    /// lo + hi·2²⁵⁶  →  lo + hi·(2³² + 977).
    ///
    /// The result of each fold fits in strictly fewer limbs than the input;
    /// after four folds any 512-bit value is below 2²⁵⁶.
    fn fold(t: [u32; NLIMBS * 2]) -> [u32; NLIMBS * 2] {
        let mut acc = [0u64; NLIMBS * 2];
        for (a, &lo) in acc.iter_mut().zip(t.iter().take(NLIMBS)) {
            *a = lo as u64;
        }
        for i in 0..NLIMBS {
            let hi = t[NLIMBS + i] as u64;
            acc[i] += hi * Self::FOLD;
            acc[i + 1] += hi; // hi · 2³²
        }

        let mut out = [0u32; NLIMBS * 2];
        let mut carry = 0u64;
        for (o, a) in out.iter_mut().zip(acc.iter()) {
            let v = a + carry;
            *o = (v & 0xFFFF_FFFF) as u32;
            carry = v >> 32;
        }
        out
    }

    /// Reduce a 16-word (512-bit) value modulo p = 2²⁵⁶ − 2³² − 977.
    fn reduce_wide(t: [u32; NLIMBS * 2]) -> FieldElement {
        // Four folds bring the value below 2²⁵⁶
        let mut v = t;
        for _ in 0..4 {
            v = Self::fold(v);
        }

        let mut out = [0u32; NLIMBS];
        out.copy_from_slice(&v[..NLIMBS]);

        // At most two conditional subtractions of p
        for _ in 0..2 {
            let (sub, borrow) = Self::sbb8(out, Self::MOD_LIMBS);
            // if borrow == 0 → out ≥ p → use the subtracted value
            let selected = Self::conditional_select(
                &FieldElement(out),
                &FieldElement(sub),
                Choice::from((borrow ^ 1) as u8),
            );
            out = selected.0;
        }

        FieldElement(out)
    }
}
