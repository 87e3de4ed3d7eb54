//! secp256k1 elliptic curve point operations

use crate::ec::k256::constants::{
    K256_FIELD_ELEMENT_SIZE, K256_POINT_COMPRESSED_SIZE, K256_POINT_UNCOMPRESSED_SIZE,
};
use crate::ec::k256::field::FieldElement;
use crate::ec::k256::mul;
use crate::ec::k256::scalar::Scalar;
use crate::error::{validate, Error, Result};
use subtle::{Choice, ConditionallySelectable};

/// A point on the secp256k1 elliptic curve in affine coordinates
///
/// Either a coordinate pair satisfying y² = x³ + 7 or the identity element
/// (point at infinity). The identity has no SEC1 encoding: serializing it is
/// a caller error and no byte string decodes to it.
#[derive(Clone, Debug)]
pub struct Point {
    pub(crate) is_identity: Choice,
    pub(crate) x: FieldElement,
    pub(crate) y: FieldElement,
}

/// A point in Jacobian coordinates (X : Y : Z), x = X/Z², y = Y/Z³.
///
/// The identity is any triple with Z = 0; the canonical one is (1 : 1 : 0).
#[derive(Clone, Debug)]
pub(crate) struct ProjectivePoint {
    x: FieldElement,
    y: FieldElement,
    z: FieldElement,
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        let self_is_identity: bool = self.is_identity.into();
        let other_is_identity: bool = other.is_identity.into();
        if self_is_identity || other_is_identity {
            return self_is_identity == other_is_identity;
        }
        self.x == other.x && self.y == other.y
    }
}

impl Eq for Point {}

impl Point {
    /// Create a new point from uncompressed coordinates.
    ///
    /// Returns an error if the coordinates don't satisfy the curve equation.
    pub fn new_uncompressed(
        x: &[u8; K256_FIELD_ELEMENT_SIZE],
        y: &[u8; K256_FIELD_ELEMENT_SIZE],
    ) -> Result<Self> {
        let x_fe = FieldElement::from_bytes(x)?;
        let y_fe = FieldElement::from_bytes(y)?;
        if !Self::is_on_curve(&x_fe, &y_fe) {
            return Err(Error::param(
                "K256 Point",
                "Point coordinates do not satisfy curve equation",
            ));
        }
        Ok(Point {
            is_identity: Choice::from(0),
            x: x_fe,
            y: y_fe,
        })
    }

    /// Create the identity point (point at infinity).
    pub fn identity() -> Self {
        Point {
            is_identity: Choice::from(1),
            x: FieldElement::zero(),
            y: FieldElement::zero(),
        }
    }

    /// Check if this point is the identity element.
    pub fn is_identity(&self) -> bool {
        self.is_identity.into()
    }

    /// Check if this point is valid (on the curve).
    pub fn is_valid(&self) -> bool {
        if self.is_identity() {
            return true;
        }
        Self::is_on_curve(&self.x, &self.y)
    }

    /// Get the x-coordinate of this point as bytes.
    pub fn x_coordinate_bytes(&self) -> [u8; K256_FIELD_ELEMENT_SIZE] {
        self.x.to_bytes()
    }

    /// Get the y-coordinate of this point as bytes.
    pub fn y_coordinate_bytes(&self) -> [u8; K256_FIELD_ELEMENT_SIZE] {
        self.y.to_bytes()
    }

    /// Parity of the y-coordinate (false = even), used by compressed
    /// encoding and ECDSA public-key recovery.
    pub fn is_y_odd(&self) -> bool {
        self.y.is_odd()
    }

    /* ================================================================= */
    /*  SEC1 encoding                                                    */
    /* ================================================================= */

    /// Serialize this point in uncompressed SEC1 format: 0x04 || x || y.
    ///
    /// The identity point has no encoding; attempting to serialize it is an
    /// error.
    pub fn serialize_uncompressed(&self) -> Result<[u8; K256_POINT_UNCOMPRESSED_SIZE]> {
        if self.is_identity() {
            return Err(Error::param("K256 Point", "Identity point is not encodable"));
        }
        let mut out = [0u8; K256_POINT_UNCOMPRESSED_SIZE];
        out[0] = 0x04;
        out[1..33].copy_from_slice(&self.x.to_bytes());
        out[33..].copy_from_slice(&self.y.to_bytes());
        Ok(out)
    }

    /// Deserialize a point from uncompressed SEC1 format.
    ///
    /// Returns an error if the bytes don't represent a valid point on the
    /// curve. No encoding of the identity is accepted.
    pub fn deserialize_uncompressed(bytes: &[u8]) -> Result<Self> {
        validate::length(
            "K256 Uncompressed Point",
            bytes.len(),
            K256_POINT_UNCOMPRESSED_SIZE,
        )?;

        if bytes[0] != 0x04 {
            return Err(Error::param(
                "K256 Point",
                "Invalid uncompressed point prefix (expected 0x04)",
            ));
        }

        let mut x_bytes = [0u8; K256_FIELD_ELEMENT_SIZE];
        let mut y_bytes = [0u8; K256_FIELD_ELEMENT_SIZE];
        x_bytes.copy_from_slice(&bytes[1..33]);
        y_bytes.copy_from_slice(&bytes[33..65]);

        Self::new_uncompressed(&x_bytes, &y_bytes)
    }

    /// Serialize this point in compressed SEC1 format: 0x02/0x03 || x.
    ///
    /// The identity point has no encoding; attempting to serialize it is an
    /// error.
    pub fn serialize_compressed(&self) -> Result<[u8; K256_POINT_COMPRESSED_SIZE]> {
        if self.is_identity() {
            return Err(Error::param("K256 Point", "Identity point is not encodable"));
        }
        let mut out = [0u8; K256_POINT_COMPRESSED_SIZE];
        out[0] = if self.y.is_odd() { 0x03 } else { 0x02 };
        out[1..].copy_from_slice(&self.x.to_bytes());
        Ok(out)
    }

    /// Deserialize a point from compressed SEC1 format.
    ///
    /// Recovers y as a square root of x³ + 7 and picks the root whose
    /// parity matches the prefix byte. Fails when x is not a valid abscissa
    /// (x³ + 7 is a non-residue).
    pub fn deserialize_compressed(bytes: &[u8]) -> Result<Self> {
        validate::length(
            "K256 Compressed Point",
            bytes.len(),
            K256_POINT_COMPRESSED_SIZE,
        )?;
        let tag = bytes[0];
        if tag != 0x02 && tag != 0x03 {
            return Err(Error::param("K256 Point", "Invalid compressed point prefix"));
        }
        let mut x_bytes = [0u8; K256_FIELD_ELEMENT_SIZE];
        x_bytes.copy_from_slice(&bytes[1..]);
        let x_fe = FieldElement::from_bytes(&x_bytes)?;

        // y² = x³ + 7
        let rhs = x_fe.square().mul(&x_fe).add(&FieldElement::from_u32(7));
        let y_fe = rhs.sqrt().ok_or_else(|| {
            Error::param("K256 Point", "Invalid compressed point: no square root")
        })?;

        let want_odd = tag == 0x03;
        let y_final = if y_fe.is_odd() == want_odd {
            y_fe
        } else {
            y_fe.negate()
        };
        Ok(Point {
            is_identity: Choice::from(0),
            x: x_fe,
            y: y_final,
        })
    }

    /// Serialize to a lowercase hex string.
    pub fn to_hex(&self, compressed: bool) -> Result<String> {
        if compressed {
            Ok(hex::encode(self.serialize_compressed()?))
        } else {
            Ok(hex::encode(self.serialize_uncompressed()?))
        }
    }

    /// Parse a point from a hex string, accepting both SEC1 forms.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s)
            .map_err(|_| Error::param("K256 Point", "Invalid hex encoding"))?;
        match bytes.len() {
            K256_POINT_COMPRESSED_SIZE => Self::deserialize_compressed(&bytes),
            K256_POINT_UNCOMPRESSED_SIZE => Self::deserialize_uncompressed(&bytes),
            actual => Err(Error::Length {
                context: "K256 Point hex",
                expected: K256_POINT_UNCOMPRESSED_SIZE,
                actual,
            }),
        }
    }

    /* ================================================================= */
    /*  Group operations                                                 */
    /* ================================================================= */

    /// Add two points using the group law.
    pub fn add(&self, other: &Self) -> Self {
        self.to_projective().add(&other.to_projective()).to_affine()
    }

    /// Double a point (add it to itself).
    pub fn double(&self) -> Self {
        // Identity or Y = 0 are special-cases
        if self.is_identity() || self.y.is_zero() {
            return Self::identity();
        }

        // λ = (3·x²) / (2·y)
        let x_sq = self.x.square();
        let three_x_sq = x_sq.add(&x_sq).add(&x_sq);
        let two_y = self.y.double();
        let inv_two_y = two_y
            .invert()
            .expect("2·y ≠ 0 for non-identity point");
        let lambda = three_x_sq.mul(&inv_two_y);

        // x₂ = λ² − 2·x₁
        let x3 = lambda.square().sub(&self.x.double());

        // y₂ = λ·(x₁ − x₂) − y₁
        let y3 = lambda.mul(&self.x.sub(&x3)).sub(&self.y);

        Point {
            is_identity: Choice::from(0),
            x: x3,
            y: y3,
        }
    }

    /// Negate this point: (x, −y mod p). The identity is its own negation.
    pub fn negate(&self) -> Self {
        Point {
            is_identity: self.is_identity,
            x: self.x.clone(),
            y: self.y.negate(),
        }
    }

    /// Scalar multiplication: compute scalar * self.
    ///
    /// Uses the constant-flow double-and-add ladder; points with a
    /// precomputation cache go through `PrecomputedPoint` instead.
    pub fn mul(&self, scalar: &Scalar) -> Result<Self> {
        Ok(mul::scalar_mul_ladder(self, scalar))
    }

    pub(crate) fn is_on_curve(x: &FieldElement, y: &FieldElement) -> bool {
        let y_squared = y.square();
        let x_cubed = x.square().mul(x);
        let rhs = x_cubed.add(&FieldElement::from_u32(7));
        y_squared == rhs
    }

    pub(crate) fn to_projective(&self) -> ProjectivePoint {
        ProjectivePoint {
            x: FieldElement::conditional_select(&self.x, &FieldElement::one(), self.is_identity),
            y: FieldElement::conditional_select(&self.y, &FieldElement::one(), self.is_identity),
            z: FieldElement::conditional_select(
                &FieldElement::one(),
                &FieldElement::zero(),
                self.is_identity,
            ),
        }
    }

    /// Constant-time select: if flag == 0 return a else return b
    pub(crate) fn conditional_select(a: &Self, b: &Self, flag: Choice) -> Self {
        Point {
            is_identity: Choice::conditional_select(&a.is_identity, &b.is_identity, flag),
            x: FieldElement::conditional_select(&a.x, &b.x, flag),
            y: FieldElement::conditional_select(&a.y, &b.y, flag),
        }
    }
}

impl ProjectivePoint {
    pub fn identity() -> Self {
        ProjectivePoint {
            x: FieldElement::one(),
            y: FieldElement::one(),
            z: FieldElement::zero(),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.z.is_zero()
    }

    /// General Jacobian addition with explicit handling of the exceptional
    /// cases. Used by the public group-law API; the scalar-multiplication
    /// hot path uses [`Self::add_mixed`].
    pub fn add(&self, other: &Self) -> Self {
        if self.is_identity() {
            return other.clone();
        }
        if other.is_identity() {
            return self.clone();
        }

        let z1_sq = self.z.square();
        let z2_sq = other.z.square();
        let u1 = self.x.mul(&z2_sq);
        let u2 = other.x.mul(&z1_sq);
        let s1 = self.y.mul(&z2_sq).mul(&other.z);
        let s2 = other.y.mul(&z1_sq).mul(&self.z);

        let h = u2.sub(&u1);
        if h.is_zero() {
            if s1 == s2 {
                return self.double();
            } else {
                return Self::identity();
            }
        }

        let r = s2.sub(&s1);
        let h_sq = h.square();
        let h_cu = h_sq.mul(&h);
        let v = u1.mul(&h_sq);

        let r_sq = r.square();
        let two_v = v.add(&v);
        let x3 = r_sq.sub(&h_cu).sub(&two_v);

        let v_minus_x3 = v.sub(&x3);
        let y3 = r.mul(&v_minus_x3).sub(&s1.mul(&h_cu));

        let z3 = self.z.mul(&other.z).mul(&h);

        ProjectivePoint {
            x: x3,
            y: y3,
            z: z3,
        }
    }

    /// Jacobian doubling for a = 0 curves, branch-free.
    ///
    /// The identity (Z = 0) and the 2-torsion case (Y = 0, unreachable on
    /// this curve) both land on Z₃ = 0 without special-casing.
    pub fn double(&self) -> Self {
        let a = self.x.square();
        let b = self.y.square();
        let c = b.square();

        // D = 2·((X + B)² − A − C)
        let d = self.x.add(&b).square().sub(&a).sub(&c).double();
        let e = a.double().add(&a);
        let f = e.square();

        let x3 = f.sub(&d.double());
        let eight_c = c.double().double().double();
        let y3 = e.mul(&d.sub(&x3)).sub(&eight_c);
        let z3 = self.y.mul(&self.z).double();

        ProjectivePoint {
            x: x3,
            y: y3,
            z: z3,
        }
    }

    /// Mixed addition self + q with a data-independent operation sequence.
    ///
    /// `q` must be a non-identity affine point (table entries and ladder
    /// bases always are). The exceptional cases (self = O, self = q,
    /// self = −q) are patched in with conditional selects after the
    /// general formulas, so the flow does not depend on the operands.
    pub fn add_mixed(&self, q: &Point) -> Self {
        let z1z1 = self.z.square();
        let u2 = q.x.mul(&z1z1);
        let s2 = q.y.mul(&z1z1).mul(&self.z);

        let h = u2.sub(&self.x);
        let r = s2.sub(&self.y);

        let hh = h.square();
        let hhh = h.mul(&hh);
        let v = self.x.mul(&hh);

        let x3 = r.square().sub(&hhh).sub(&v.double());
        let y3 = r.mul(&v.sub(&x3)).sub(&self.y.mul(&hhh));
        let z3 = self.z.mul(&h);

        let general = ProjectivePoint {
            x: x3,
            y: y3,
            z: z3,
        };

        let h_zero = h.ct_is_zero();
        let r_zero = r.ct_is_zero();
        let self_identity = self.z.ct_is_zero();

        // self = q → doubling; self = −q → identity; self = O → q.
        // The canonical identity triple (1 : 1 : 0) never trips the h = 0
        // path, so the select order below is unambiguous.
        let result = Self::conditional_select(&general, &self.double(), h_zero & r_zero);
        let result = Self::conditional_select(&result, &Self::identity(), h_zero & !r_zero);
        Self::conditional_select(&result, &q.to_projective(), self_identity)
    }

    pub fn to_affine(&self) -> Point {
        if self.is_identity() {
            return Point::identity();
        }
        let z_inv = self.z.invert().expect("Nonzero Z should be invertible");
        let z_inv_sq = z_inv.square();
        let z_inv_cu = z_inv_sq.mul(&z_inv);
        let x_aff = self.x.mul(&z_inv_sq);
        let y_aff = self.y.mul(&z_inv_cu);
        Point {
            is_identity: Choice::from(0),
            x: x_aff,
            y: y_aff,
        }
    }

    /// Constant-time select: if flag == 0 return a else return b
    pub(crate) fn conditional_select(a: &Self, b: &Self, flag: Choice) -> Self {
        ProjectivePoint {
            x: FieldElement::conditional_select(&a.x, &b.x, flag),
            y: FieldElement::conditional_select(&a.y, &b.y, flag),
            z: FieldElement::conditional_select(&a.z, &b.z, flag),
        }
    }

    /// Raw coordinate access for batch normalization.
    pub(crate) fn z_coordinate(&self) -> &FieldElement {
        &self.z
    }

    /// Build the affine point X/Z², Y/Z³ from an externally supplied Z
    /// inverse (batch normalization).
    pub(crate) fn to_affine_with_z_inv(&self, z_inv: &FieldElement) -> Point {
        let z_inv_sq = z_inv.square();
        let z_inv_cu = z_inv_sq.mul(z_inv);
        Point {
            is_identity: Choice::from(0),
            x: self.x.mul(&z_inv_sq),
            y: self.y.mul(&z_inv_cu),
        }
    }
}
