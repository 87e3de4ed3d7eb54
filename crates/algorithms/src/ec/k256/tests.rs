//! secp256k1 unit tests

use super::*;
use rand::rngs::OsRng;
use rand::Rng;

#[test]
fn test_field_arithmetic() {
    let mut one_bytes = [0u8; 32];
    one_bytes[31] = 1;
    let one = FieldElement::from_bytes(&one_bytes).unwrap();

    let mut two_bytes = [0u8; 32];
    two_bytes[31] = 2;
    let two = FieldElement::from_bytes(&two_bytes).unwrap();

    // 1 + 1 = 2
    assert_eq!(one.add(&one), two);

    // 2 - 1 = 1
    assert_eq!(two.sub(&one), one);

    // 2 * 1 = 2
    assert_eq!(two.mul(&one), two);

    // 1 * 1^-1 = 1
    let inv_one = one.invert().unwrap();
    assert_eq!(one.mul(&inv_one), one);
}

#[test]
fn test_field_arithmetic_properties() {
    let mut rng = OsRng;

    for _ in 0..20 {
        let mut a_bytes = [0u8; 32];
        let mut b_bytes = [0u8; 32];
        let mut c_bytes = [0u8; 32];
        rng.fill(&mut a_bytes);
        rng.fill(&mut b_bytes);
        rng.fill(&mut c_bytes);

        if let (Ok(a), Ok(b), Ok(c)) = (
            FieldElement::from_bytes(&a_bytes),
            FieldElement::from_bytes(&b_bytes),
            FieldElement::from_bytes(&c_bytes),
        ) {
            // Commutativity
            assert_eq!(a.add(&b), b.add(&a), "Addition not commutative");
            assert_eq!(a.mul(&b), b.mul(&a), "Multiplication not commutative");

            // Associativity
            assert_eq!(
                a.add(&b).add(&c),
                a.add(&b.add(&c)),
                "Addition not associative"
            );
            assert_eq!(
                a.mul(&b).mul(&c),
                a.mul(&b.mul(&c)),
                "Multiplication not associative"
            );

            // Distributivity: a * (b + c) = a * b + a * c
            assert_eq!(
                a.mul(&b.add(&c)),
                a.mul(&b).add(&a.mul(&c)),
                "Multiplication not distributive"
            );

            // Identities
            assert_eq!(a.add(&FieldElement::zero()), a, "Zero not additive identity");
            assert_eq!(
                a.mul(&FieldElement::one()),
                a,
                "One not multiplicative identity"
            );

            // Inverses
            assert_eq!(a.add(&a.negate()), FieldElement::zero(), "Negation failed");
            if !a.is_zero() {
                let a_inv = a.invert().unwrap();
                assert_eq!(a.mul(&a_inv), FieldElement::one(), "Inversion failed");
            }
        }
    }
}

#[test]
fn test_field_sqrt_consistency() {
    let mut rng = OsRng;

    // sqrt(x^2) = ±x for random field elements
    for _ in 0..50 {
        let mut bytes = [0u8; 32];
        rng.fill(&mut bytes);

        if let Ok(x) = FieldElement::from_bytes(&bytes) {
            let x_squared = x.square();

            let sqrt_result = x_squared.sqrt().expect("square must have a root");
            assert!(
                sqrt_result == x || sqrt_result == x.negate(),
                "sqrt(x^2) should equal ±x"
            );
            assert_eq!(sqrt_result.square(), x_squared, "sqrt consistency failed");
        }
    }
}

#[test]
fn test_field_nonresidue_has_no_root() {
    // p ≡ 3 (mod 4), so exactly one of a, −a has a square root for a ≠ 0
    let mut rng = OsRng;
    for _ in 0..20 {
        let mut bytes = [0u8; 32];
        rng.fill(&mut bytes);
        if let Ok(a) = FieldElement::from_bytes(&bytes) {
            if a.is_zero() {
                continue;
            }
            let roots = [a.sqrt().is_some(), a.negate().sqrt().is_some()];
            assert_eq!(
                roots.iter().filter(|&&r| r).count(),
                1,
                "exactly one of a, -a is a residue"
            );
        }
    }
}

#[test]
fn test_field_parity() {
    let mut odd_bytes = [0u8; 32];
    odd_bytes[31] = 1; // value = 1 → odd
    let odd = FieldElement::from_bytes(&odd_bytes).unwrap();
    assert!(odd.is_odd());

    let mut even_bytes = [0u8; 32];
    even_bytes[30] = 1; // value = 256 → even
    let even = FieldElement::from_bytes(&even_bytes).unwrap();
    assert!(!even.is_odd());
}

#[test]
fn test_field_edge_cases() {
    assert!(FieldElement::zero().is_zero());
    assert!(!FieldElement::one().is_zero());
    assert_eq!(FieldElement::zero().double(), FieldElement::zero());
    assert_eq!(FieldElement::zero().square(), FieldElement::zero());
    assert_eq!(FieldElement::zero().negate(), FieldElement::zero());
    assert!(FieldElement::zero().invert().is_err());

    // p−1 is valid but p is not
    let mut p_minus_1_bytes = K256_FIELD_PRIME;
    p_minus_1_bytes[31] -= 1;
    assert!(FieldElement::from_bytes(&p_minus_1_bytes).is_ok());
    assert!(FieldElement::from_bytes(&K256_FIELD_PRIME).is_err());

    // round trip through bytes
    let p_minus_1 = FieldElement::from_bytes(&p_minus_1_bytes).unwrap();
    assert_eq!(p_minus_1.to_bytes(), p_minus_1_bytes);
}

#[test]
fn test_scalar_reduction() {
    // A scalar larger than the group order n
    let large_scalar_bytes = [0xFF; 32];
    let scalar = Scalar::new(large_scalar_bytes).unwrap();

    // The result should be different from the input
    assert_ne!(scalar.serialize(), large_scalar_bytes);

    // Test zero rejection
    assert!(Scalar::new([0; 32]).is_err());

    // n itself reduces to zero, which `new` accepts but flags via is_zero
    let n = Scalar::new(K256_CURVE_ORDER).unwrap();
    assert!(n.is_zero());

    // reduce_overflowing reports whether reduction happened
    let (_, was_high) = Scalar::reduce_overflowing(K256_CURVE_ORDER);
    assert!(was_high);
    let mut n_minus_1 = K256_CURVE_ORDER;
    n_minus_1[31] -= 1;
    let (r, was_high) = Scalar::reduce_overflowing(n_minus_1);
    assert!(!was_high);
    assert_eq!(r.serialize(), n_minus_1);
}

#[test]
fn test_scalar_mod_n_arithmetic() {
    let mut five_bytes = [0u8; 32];
    five_bytes[31] = 5;
    let five = Scalar::new(five_bytes).unwrap();

    let mut seven_bytes = [0u8; 32];
    seven_bytes[31] = 7;
    let seven = Scalar::new(seven_bytes).unwrap();

    let mut thirty_five_bytes = [0u8; 32];
    thirty_five_bytes[31] = 35;
    let thirty_five = Scalar::new(thirty_five_bytes).unwrap();

    // 5 · 7 = 35
    assert_eq!(five.mul_mod_n(&seven), thirty_five);

    // 35 − 7·5 = 0
    assert!(thirty_five.sub_mod_n(&five.mul_mod_n(&seven)).is_zero());

    // a + (n − a) = 0
    assert!(five.add_mod_n(&five.negate_mod_n()).is_zero());

    // a · a⁻¹ = 1
    let mut rng = OsRng;
    for _ in 0..10 {
        let mut bytes = [0u8; 32];
        rng.fill(&mut bytes);
        if let Ok(a) = Scalar::new(bytes) {
            if a.is_zero() {
                continue;
            }
            let a_inv = a.inv_mod_n().unwrap();
            let product = a.mul_mod_n(&a_inv);
            let mut one = [0u8; 32];
            one[31] = 1;
            assert_eq!(product.serialize(), one, "a · a⁻¹ ≠ 1");
        }
    }

    // inversion of zero is an error
    assert!(Scalar::reduce([0u8; 32]).inv_mod_n().is_err());
}

#[test]
fn test_scalar_high_boundary() {
    // n/2 is not high; n/2 + 1 is
    let half_n: [u8; 32] = [
        0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
        0xFF, 0xFF, 0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46,
        0x68, 0x1B, 0x20, 0xA0,
    ];
    let half = Scalar::new(half_n).unwrap();
    assert!(!half.is_high());

    let mut half_plus_1 = half_n;
    half_plus_1[31] += 1;
    let above = Scalar::new(half_plus_1).unwrap();
    assert!(above.is_high());

    // s + (n − s) = 0 and exactly one of the pair is high
    let mut rng = OsRng;
    let mut bytes = [0u8; 32];
    rng.fill(&mut bytes);
    let s = Scalar::new(bytes).unwrap();
    if !s.is_zero() {
        let neg = s.negate_mod_n();
        assert!(s.add_mod_n(&neg).is_zero());
        assert_ne!(s.is_high(), neg.is_high());
    }
}

#[test]
fn test_point_operations() {
    let g = base_point_g();
    let g2 = g.double();

    // G + G = 2G
    assert_eq!(g.add(&g), g2);

    // G + (−G) = O
    assert!(g.add(&g.negate()).is_identity());

    // G + O = G
    assert_eq!(g.add(&Point::identity()), g);

    // O + O = O
    assert!(Point::identity().add(&Point::identity()).is_identity());
}

#[test]
fn test_known_double_of_generator() {
    // 2G has well-known coordinates
    let g2 = base_point_g().double();
    assert_eq!(
        hex::encode(g2.x_coordinate_bytes()),
        "c6047f9441ed7d6d3045406e95c07cd85c778e4b8cef3ca7abac09b95c709ee5"
    );
    assert_eq!(
        hex::encode(g2.y_coordinate_bytes()),
        "1ae168fea63dc339a3c58419466ceaeef7f632653266d0e1236431a950cfe52a"
    );
}

#[test]
fn test_scalar_multiplication() {
    let g = base_point_g();

    let mut two_bytes = [0; 32];
    two_bytes[31] = 2;
    let two = Scalar::new(two_bytes).unwrap();

    // through the fallback ladder
    let g2 = g.mul(&two).unwrap();
    assert_eq!(g2, g.double());

    // through the base-point cache
    let g2_cached = scalar_mult_base_g(&two).unwrap();
    assert_eq!(g2_cached, g.double());
}

#[test]
fn test_windowed_and_ladder_agree() {
    let mut rng = OsRng;
    let g = base_point_g();

    for _ in 0..20 {
        let mut bytes = [0u8; 32];
        rng.fill(&mut bytes);
        if let Ok(k) = Scalar::new(bytes) {
            let via_table = scalar_mult_base_g(&k).unwrap();
            let via_ladder = g.mul(&k).unwrap();
            assert_eq!(via_table, via_ladder, "table and ladder disagree");
        }
    }
}

#[test]
fn test_precomputed_point_windows() {
    let mut rng = OsRng;
    let (_, q) = generate_keypair(&mut rng).unwrap();

    for window in [4usize, 5, 8] {
        let cached = PrecomputedPoint::new(&q, window).unwrap();
        assert_eq!(cached.window(), window);
        for _ in 0..5 {
            let mut bytes = [0u8; 32];
            rng.fill(&mut bytes);
            if let Ok(k) = Scalar::new(bytes) {
                assert_eq!(
                    cached.mul(&k),
                    q.mul(&k).unwrap(),
                    "cached multiply disagrees at W={}",
                    window
                );
            }
        }
    }

    // out-of-range widths and the identity are rejected
    assert!(PrecomputedPoint::new(&q, 0).is_err());
    assert!(PrecomputedPoint::new(&q, 9).is_err());
    assert!(PrecomputedPoint::new(&Point::identity(), 4).is_err());
}

#[test]
fn test_precompute_base_rebuild() {
    let mut rng = OsRng;
    let mut bytes = [0u8; 32];
    rng.fill(&mut bytes);
    let k = match Scalar::new(bytes) {
        Ok(k) if !k.is_zero() => k,
        _ => return,
    };

    let before = scalar_mult_base_g(&k).unwrap();
    precompute_base(8).unwrap();
    let wide = scalar_mult_base_g(&k).unwrap();
    precompute_base(K256_DEFAULT_WINDOW).unwrap();
    let after = scalar_mult_base_g(&k).unwrap();

    assert_eq!(before, wide);
    assert_eq!(before, after);
    assert!(precompute_base(1).is_err());
}

#[test]
fn test_point_group_properties() {
    let mut rng = OsRng;
    let g = base_point_g();

    // (P + Q) + R = P + (Q + R)
    for _ in 0..10 {
        let mut s1_bytes = [0u8; 32];
        let mut s2_bytes = [0u8; 32];
        let mut s3_bytes = [0u8; 32];
        rng.fill(&mut s1_bytes);
        rng.fill(&mut s2_bytes);
        rng.fill(&mut s3_bytes);

        if let (Ok(s1), Ok(s2), Ok(s3)) = (
            Scalar::new(s1_bytes),
            Scalar::new(s2_bytes),
            Scalar::new(s3_bytes),
        ) {
            let p = g.mul(&s1).unwrap();
            let q = g.mul(&s2).unwrap();
            let r = g.mul(&s3).unwrap();

            let lhs = p.add(&q).add(&r);
            let rhs = p.add(&q.add(&r));

            assert_eq!(lhs, rhs, "Point addition not associative");
        }
    }

    // nG = O
    let n = Scalar::new(K256_CURVE_ORDER).unwrap();
    let result = g.mul(&n).unwrap();
    assert!(result.is_identity(), "nG should equal identity");

    // 0·P = O and k·O = O
    assert!(g.mul(&Scalar::reduce([0u8; 32])).unwrap().is_identity());
    let mut k_bytes = [0u8; 32];
    k_bytes[31] = 9;
    let nine = Scalar::new(k_bytes).unwrap();
    assert!(scalar_mult(&nine, &Point::identity()).unwrap().is_identity());

    // (k mod n)·P = k·P: n + 5 acts as 5
    let mut five_bytes = [0u8; 32];
    five_bytes[31] = 5;
    let five = Scalar::new(five_bytes).unwrap();
    let mut n_plus_5 = K256_CURVE_ORDER;
    n_plus_5[31] += 5; // no carry: order ends 0x41
    let reduced = Scalar::new(n_plus_5).unwrap();
    assert_eq!(g.mul(&reduced).unwrap(), g.mul(&five).unwrap());

    // multiples of G stay on the curve
    for _ in 0..5 {
        let mut bytes = [0u8; 32];
        rng.fill(&mut bytes);
        if let Ok(k) = Scalar::new(bytes) {
            assert!(g.mul(&k).unwrap().is_valid());
        }
    }
}

#[test]
fn test_keypair_generation() {
    let (sk, pk) = generate_keypair(&mut OsRng).unwrap();
    let pk_recomputed = scalar_mult_base_g(&sk).unwrap();
    assert_eq!(pk, pk_recomputed);
    assert!(pk.is_valid());
    assert!(!pk.is_identity());
}

#[test]
fn test_point_compression_roundtrip() {
    let g = base_point_g();
    let compressed = g.serialize_compressed().unwrap();
    let decompressed = Point::deserialize_compressed(&compressed).unwrap();
    assert_eq!(g, decompressed);

    let g2 = g.double();
    let compressed2 = g2.serialize_compressed().unwrap();
    let decompressed2 = Point::deserialize_compressed(&compressed2).unwrap();
    assert_eq!(g2, decompressed2);
}

#[test]
fn test_point_compression_property() {
    let mut rng = OsRng;

    for _ in 0..100 {
        let mut scalar_bytes = [0u8; 32];
        rng.fill(&mut scalar_bytes);

        if let Ok(scalar) = Scalar::new(scalar_bytes) {
            let point = base_point_g().mul(&scalar).unwrap();

            let compressed = point.serialize_compressed().unwrap();
            let decompressed = Point::deserialize_compressed(&compressed).unwrap();
            assert_eq!(point, decompressed, "Compression round-trip failed");

            let uncompressed = point.serialize_uncompressed().unwrap();
            let decoded = Point::deserialize_uncompressed(&uncompressed).unwrap();
            assert_eq!(point, decoded, "Uncompressed round-trip failed");
        }
    }
}

#[test]
fn test_compressed_parity_both_ways() {
    // Walk small multiples of G until both parities have round-tripped
    let g = base_point_g();
    let mut p = g.clone();
    let mut saw_even = false;
    let mut saw_odd = false;
    for _ in 0..8 {
        let compressed = p.serialize_compressed().unwrap();
        let expected_tag = if p.is_y_odd() { 0x03 } else { 0x02 };
        assert_eq!(compressed[0], expected_tag);
        let decoded = Point::deserialize_compressed(&compressed).unwrap();
        assert_eq!(decoded, p);
        assert_eq!(decoded.is_y_odd(), p.is_y_odd());

        saw_even |= !p.is_y_odd();
        saw_odd |= p.is_y_odd();
        p = p.add(&g);
    }
    assert!(saw_even && saw_odd, "both y parities should occur");
}

#[test]
fn test_point_encoding_rejections() {
    let g = base_point_g();

    // identity has no encoding
    assert!(Point::identity().serialize_compressed().is_err());
    assert!(Point::identity().serialize_uncompressed().is_err());
    assert!(Point::deserialize_compressed(&[0u8; 33]).is_err());
    assert!(Point::deserialize_uncompressed(&[0u8; 65]).is_err());

    // bad prefixes
    let mut unc = g.serialize_uncompressed().unwrap();
    unc[0] = 0x05;
    assert!(Point::deserialize_uncompressed(&unc).is_err());
    let mut cmp = g.serialize_compressed().unwrap();
    cmp[0] = 0x04;
    assert!(Point::deserialize_compressed(&cmp).is_err());

    // off-curve point: valid x with corrupted y
    let mut bad = g.serialize_uncompressed().unwrap();
    bad[64] ^= 0x01;
    assert!(Point::deserialize_uncompressed(&bad).is_err());

    // wrong lengths
    assert!(Point::deserialize_compressed(&[0x02; 32]).is_err());
    assert!(Point::deserialize_uncompressed(&[0x04; 64]).is_err());

    // random x values: every successful decode lands on the curve, and
    // roughly half of all x are not abscissas at all
    let mut rng = OsRng;
    let mut failures = 0;
    for _ in 0..32 {
        let mut candidate = [0u8; 33];
        rng.fill(&mut candidate[1..]);
        candidate[0] = 0x02;
        match Point::deserialize_compressed(&candidate) {
            Ok(point) => assert!(point.is_valid()),
            Err(_) => failures += 1,
        }
    }
    assert!(failures > 0, "some random x must be non-residues");
}

#[test]
fn test_point_hex_roundtrip() {
    let g = base_point_g();

    let unc_hex = g.to_hex(false).unwrap();
    assert_eq!(unc_hex.len(), 130);
    assert_eq!(
        unc_hex,
        "0479be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798\
         483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8"
    );
    assert_eq!(Point::from_hex(&unc_hex).unwrap(), g);

    let cmp_hex = g.to_hex(true).unwrap();
    assert_eq!(cmp_hex.len(), 66);
    assert_eq!(Point::from_hex(&cmp_hex).unwrap(), g);

    // lowercase output
    assert!(!unc_hex.chars().any(|c| c.is_ascii_uppercase()));

    // invalid hex input
    assert!(Point::from_hex("zz").is_err());
    assert!(Point::from_hex("0404").is_err());
}

#[test]
fn test_diffie_hellman() {
    let mut rng = OsRng;
    let (sk_a, pk_a) = generate_keypair(&mut rng).unwrap();
    let (sk_b, pk_b) = generate_keypair(&mut rng).unwrap();

    // both sides derive the same point
    let ab = diffie_hellman(&sk_a, &pk_b).unwrap();
    let ba = diffie_hellman(&sk_b, &pk_a).unwrap();
    assert_eq!(ab, ba);
    assert!(ab.is_valid());

    // identity peer key is rejected
    assert!(diffie_hellman(&sk_a, &Point::identity()).is_err());
}
