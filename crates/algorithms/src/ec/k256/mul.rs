//! Constant-flow scalar multiplication with windowed precomputation
//!
//! The scalar is recoded into signed digits in [−2^(W−1), 2^(W−1)]; for each
//! window index i a table row holds {j·2^(i·W)·P : j = 1..2^(W−1)} in affine
//! coordinates. The accumulator adds one looked-up entry per window. Table
//! lookups scan the whole row and select with a data-independent mask; the
//! digit sign is applied by mask-driven negation; a zero digit performs the
//! same add against the row's first entry and discards the result by
//! conditional selection. No branch or table index in this module depends on
//! the scalar value.

use crate::ec::k256::constants::{K256_DEFAULT_WINDOW, K256_MAX_WINDOW, K256_MIN_WINDOW};
use crate::ec::k256::field::FieldElement;
use crate::ec::k256::point::{Point, ProjectivePoint};
use crate::ec::k256::scalar::Scalar;
use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use std::sync::{Arc, RwLock};
use subtle::{Choice, ConstantTimeEq};

/// Number of signed digits produced when recoding with window width `w`.
///
/// One extra digit absorbs the final recoding carry.
fn digit_count(w: usize) -> usize {
    (256 + w - 1) / w + 1
}

/// Recode a big-endian scalar into signed digits d_j ∈ [−2^(w−1), 2^(w−1)]
/// with k = Σ d_j·2^(j·w). Branchless: the borrow decision is a mask.
fn recode(bytes_be: &[u8; 32], w: usize) -> Vec<i16> {
    // Little-endian limb view for cheap bit extraction
    let mut limbs = [0u32; 8];
    for (i, limb) in limbs.iter_mut().enumerate() {
        let offset = (8 - 1 - i) * 4;
        *limb = u32::from_be_bytes([
            bytes_be[offset],
            bytes_be[offset + 1],
            bytes_be[offset + 2],
            bytes_be[offset + 3],
        ]);
    }

    let half = 1u32 << (w - 1);
    let full = 1u32 << w;
    let mask = full - 1;

    let mut digits = vec![0i16; digit_count(w)];
    let mut carry = 0u32;
    for (j, digit) in digits.iter_mut().enumerate() {
        let bit = j * w;
        let raw = if bit >= 256 {
            0
        } else {
            let limb = bit / 32;
            let off = bit % 32;
            let mut v = limbs[limb] >> off;
            if off + w > 32 && limb + 1 < 8 {
                v |= limbs[limb + 1] << (32 - off);
            }
            v & mask
        };

        let sum = raw + carry;
        // m = all-ones when sum > 2^(w−1); then the digit becomes sum − 2^w
        // and a carry of one propagates into the next window.
        let m = half.wrapping_sub(sum) >> 8;
        *digit = sum.wrapping_sub(m & full) as i32 as i16;
        carry = m & 1;
    }
    digits
}

/// Precomputed affine multiples of a point for one window width.
///
/// Immutable once built; rebuilding with a different width produces a new
/// table. Row i stores {j·2^(i·W)·P : j = 1..2^(W−1)}.
pub(crate) struct WindowTable {
    window: usize,
    half: usize,
    entries: Vec<Point>,
}

impl WindowTable {
    /// Build the table for `point` with window width `window`.
    pub(crate) fn new(point: &Point, window: usize) -> Result<Self> {
        if !(K256_MIN_WINDOW..=K256_MAX_WINDOW).contains(&window) {
            return Err(Error::param(
                "K256 precompute",
                "Window width out of range",
            ));
        }
        if point.is_identity() {
            return Err(Error::param(
                "K256 precompute",
                "Cannot precompute the identity point",
            ));
        }

        let half = 1usize << (window - 1);
        let rows = digit_count(window);

        let mut projective = Vec::with_capacity(rows * half);
        let mut base = point.to_projective();
        for _ in 0..rows {
            let mut multiple = base.clone();
            projective.push(multiple.clone());
            for _ in 1..half {
                multiple = multiple.add(&base);
                projective.push(multiple.clone());
            }
            for _ in 0..window {
                base = base.double();
            }
        }

        Ok(WindowTable {
            window,
            half,
            entries: batch_normalize(&projective),
        })
    }

    pub(crate) fn window(&self) -> usize {
        self.window
    }

    /// Constant-flow lookup of |digit|·2^(i·W)·P with the digit's sign
    /// applied. Also reports whether the digit was zero, in which case the
    /// returned point is the row's sentinel entry and the caller discards
    /// the add.
    fn lookup(&self, window_idx: usize, digit: i16) -> (Point, Choice) {
        // Split the digit into a sign mask and its absolute value
        let s = ((digit as i32) >> 31) as u32;
        let f = ((digit as i32 as u32) ^ s).wrapping_sub(s);

        let row = &self.entries[window_idx * self.half..][..self.half];
        let mut selected = row[0].clone();
        for (i, entry) in row.iter().enumerate() {
            // entry holds (i+1)·2^(i·W)·P; keep it iff i+1 == f. The OR of
            // both differences has its high bit clear only on equality.
            let j = (i as u32) + 1;
            let equal = !(f.wrapping_sub(j) | j.wrapping_sub(f));
            let keep = Choice::from((equal >> 31) as u8);
            selected = Point::conditional_select(&selected, entry, keep);
        }

        // Mask-driven negation; p − y is computed unconditionally
        let negated_y = FieldElement::zero().sub(&selected.y);
        let negative = Choice::from((s & 1) as u8);
        selected.y = FieldElement::conditional_select(&selected.y, &negated_y, negative);

        (selected, f.ct_eq(&0))
    }
}

/// Multiply the table's point by a scalar: one constant-flow lookup and one
/// add per window, zero-digit adds discarded by selection.
pub(crate) fn mul_with_table(table: &WindowTable, scalar: &Scalar) -> Point {
    let digits = recode(&scalar.serialize(), table.window);

    let mut acc = ProjectivePoint::identity();
    for (i, &digit) in digits.iter().enumerate() {
        let (entry, digit_is_zero) = table.lookup(i, digit);
        let sum = acc.add_mixed(&entry);
        acc = ProjectivePoint::conditional_select(&sum, &acc, digit_is_zero);
    }
    acc.to_affine()
}

/// Constant-flow double-and-add ladder for points without a precomputation
/// cache: per bit, one doubling and one add whose result is kept or
/// discarded by conditional selection.
pub(crate) fn scalar_mul_ladder(point: &Point, scalar: &Scalar) -> Point {
    if point.is_identity() || scalar.is_zero() {
        return Point::identity();
    }

    let bytes = scalar.serialize();
    let mut acc = ProjectivePoint::identity();
    for &byte in bytes.iter() {
        for bit in (0..8).rev() {
            acc = acc.double();
            let sum = acc.add_mixed(point);
            let bit_set = Choice::from((byte >> bit) & 1);
            acc = ProjectivePoint::conditional_select(&acc, &sum, bit_set);
        }
    }
    acc.to_affine()
}

/// Normalize a batch of Jacobian points to affine with a single shared
/// inversion (Montgomery's trick). All inputs must have nonzero Z.
fn batch_normalize(points: &[ProjectivePoint]) -> Vec<Point> {
    let mut prefix = Vec::with_capacity(points.len());
    let mut acc = FieldElement::one();
    for p in points {
        prefix.push(acc.clone());
        acc = acc.mul(p.z_coordinate());
    }

    let mut suffix_inv = acc.invert().expect("window table entries have nonzero Z");

    let mut out = vec![Point::identity(); points.len()];
    for (i, p) in points.iter().enumerate().rev() {
        let z_inv = suffix_inv.mul(&prefix[i]);
        suffix_inv = suffix_inv.mul(p.z_coordinate());
        out[i] = p.to_affine_with_z_inv(&z_inv);
    }
    out
}

/* ------------------------------------------------------------------------- */
/*                       Base-point precomputation cache                     */
/* ------------------------------------------------------------------------- */

/// Process-wide table for the base point G, built once on first use and
/// replaced wholesale by [`precompute_base`]. Readers clone the `Arc` and
/// keep using the table they observed; the tables differ only in speed.
static BASE_POINT_TABLE: Lazy<RwLock<Arc<WindowTable>>> = Lazy::new(|| {
    let table = WindowTable::new(&super::base_point_g(), K256_DEFAULT_WINDOW)
        .expect("base point is a valid non-identity point");
    RwLock::new(Arc::new(table))
});

/// Snapshot of the current base-point table.
pub(crate) fn base_point_table() -> Arc<WindowTable> {
    BASE_POINT_TABLE
        .read()
        .expect("base point table lock")
        .clone()
}

/// Eagerly (re)build the base-point table with the given window width.
///
/// The default width is 4; width 8 trades an 8× larger cache for fewer
/// group additions per multiplication.
pub fn precompute_base(window: usize) -> Result<()> {
    let table = WindowTable::new(&super::base_point_g(), window)?;
    *BASE_POINT_TABLE
        .write()
        .expect("base point table lock") = Arc::new(table);
    Ok(())
}

/// A point bundled with its precomputation cache.
///
/// The eager form of the per-point cache: build once, multiply many times.
/// Points multiplied without one fall back to the ladder.
pub struct PrecomputedPoint {
    point: Point,
    table: WindowTable,
}

impl PrecomputedPoint {
    /// Build the cache for `point` with window width `window`.
    pub fn new(point: &Point, window: usize) -> Result<Self> {
        Ok(PrecomputedPoint {
            point: point.clone(),
            table: WindowTable::new(point, window)?,
        })
    }

    /// The point this cache accelerates.
    pub fn point(&self) -> &Point {
        &self.point
    }

    /// The window width the cache was built with.
    pub fn window(&self) -> usize {
        self.table.window()
    }

    /// Compute scalar · point through the cache.
    pub fn mul(&self, scalar: &Scalar) -> Point {
        mul_with_table(&self.table, scalar)
    }
}
