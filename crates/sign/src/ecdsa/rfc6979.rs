//! RFC 6979 deterministic nonce derivation
//!
//! Implements §3.2 of the RFC with HMAC-SHA256: the V/K state is seeded
//! from the private key and message hash, then candidate nonces are drawn
//! until one lands in [1, n−1]. The generator object survives across
//! candidates so the ECDSA loop can keep drawing when r or s comes out
//! zero, exactly continuing the RFC's step-h sequence.

use hmac::{Hmac, Mac};
use koblitz_algorithms::ec::k256::Scalar;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 over a sequence of message chunks
fn hmac_sha256(key: &[u8; 32], chunks: &[&[u8]]) -> [u8; 32] {
    let mut mac =
        HmacSha256::new_from_slice(key).expect("HMAC-SHA256 accepts any key length");
    for chunk in chunks {
        mac.update(chunk);
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&mac.finalize().into_bytes());
    out
}

/// Deterministic nonce generator state (V, K of RFC 6979 §3.2)
#[derive(Zeroize, ZeroizeOnDrop)]
pub(crate) struct NonceGenerator {
    k: [u8; 32],
    v: [u8; 32],
}

impl NonceGenerator {
    /// Seed the generator from a 32-byte message hash and the private key.
    pub fn new(msg_hash: &[u8; 32], private_key: &Scalar) -> Self {
        // bits2octets(h) = int2octets(bits2int(h) mod n); for a 32-byte
        // hash, bits2int is the identity.
        let h1 = Scalar::reduce(*msg_hash).serialize();
        let x = private_key.serialize();

        let mut v = [0x01u8; 32];
        let mut k = [0x00u8; 32];

        // K = HMAC_K(V || 0x00 || int2octets(x) || bits2octets(h1))
        k = hmac_sha256(&k, &[&v, &[0x00], &x, &h1]);
        // V = HMAC_K(V)
        v = hmac_sha256(&k, &[&v]);
        // K = HMAC_K(V || 0x01 || int2octets(x) || bits2octets(h1))
        k = hmac_sha256(&k, &[&v, &[0x01], &x, &h1]);
        // V = HMAC_K(V)
        v = hmac_sha256(&k, &[&v]);

        NonceGenerator { k, v }
    }

    /// Draw the next nonce candidate in [1, n−1].
    ///
    /// SHA-256 emits exactly the 32 octets a candidate needs, so the RFC's
    /// inner concatenation loop collapses to a single V step. Candidates
    /// outside the range (probability ≈ 2⁻¹²⁸) roll the state per step h
    /// and the loop continues.
    pub fn next_nonce(&mut self) -> Scalar {
        loop {
            self.v = hmac_sha256(&self.k, &[&self.v]);

            let (candidate, overflowed) = Scalar::reduce_overflowing(self.v);
            if !overflowed && !candidate.is_zero() {
                return candidate;
            }

            // step h: K = HMAC_K(V || 0x00); V = HMAC_K(V)
            self.k = hmac_sha256(&self.k, &[&self.v, &[0x00]]);
            self.v = hmac_sha256(&self.k, &[&self.v]);
        }
    }
}
