//! DER codec for ECDSA signatures
//!
//! Encodes (r, s) as `SEQUENCE { INTEGER r, INTEGER s }`. Encoding is
//! always minimal. Parsing rejects trailing bytes, non-minimal length
//! octets, negative and empty INTEGERs; in lenient mode a leading-zero
//! padded INTEGER is tolerated for interoperability, in strict mode it is
//! rejected too.

use crate::error::{Error, Result};

/// Raw signature components as minimal big-endian magnitudes
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SignatureComponents {
    pub r: Vec<u8>,
    pub s: Vec<u8>,
}

impl SignatureComponents {
    /// Build components from fixed-width scalar bytes, trimming to the
    /// minimal magnitude.
    pub fn from_scalar_bytes(r: &[u8; 32], s: &[u8; 32]) -> Self {
        SignatureComponents {
            r: trim_leading_zeros(r),
            s: trim_leading_zeros(s),
        }
    }

    /// Left-pad a component back to fixed scalar width. Errors when the
    /// magnitude is wider than a scalar.
    pub fn component_to_scalar_bytes(component: &[u8]) -> Result<[u8; 32]> {
        if component.len() > 32 {
            return Err(Error::InvalidSignature(
                "signature component exceeds 32 bytes".into(),
            ));
        }
        let mut out = [0u8; 32];
        out[32 - component.len()..].copy_from_slice(component);
        Ok(out)
    }

    /// Serialize signature to DER format
    pub fn to_der(&self) -> Vec<u8> {
        let r_int = encode_integer(&self.r);
        let s_int = encode_integer(&self.s);

        // Both INTEGERs fit in 33 bytes, so every length is a single octet
        let body_len = 2 + r_int.len() + 2 + s_int.len();

        let mut der = Vec::with_capacity(2 + body_len);
        der.push(0x30);
        der.push(body_len as u8);
        der.push(0x02);
        der.push(r_int.len() as u8);
        der.extend_from_slice(&r_int);
        der.push(0x02);
        der.push(s_int.len() as u8);
        der.extend_from_slice(&s_int);
        der
    }

    /// Parse signature from DER format
    pub fn from_der(der: &[u8], strict: bool) -> Result<Self> {
        if der.len() < 8 {
            return Err(Error::InvalidSignature("DER signature too short".into()));
        }
        if der[0] != 0x30 {
            return Err(Error::InvalidSignature(
                "expected DER SEQUENCE tag".into(),
            ));
        }
        if der[1] & 0x80 != 0 {
            // A 70-byte body never needs the long length form
            return Err(Error::InvalidSignature(
                "non-minimal SEQUENCE length encoding".into(),
            ));
        }
        let body_len = der[1] as usize;
        if der.len() != 2 + body_len {
            return Err(Error::InvalidSignature(
                "SEQUENCE length does not match input".into(),
            ));
        }

        let mut pos = 2;
        let r = parse_integer(der, &mut pos, strict)?;
        let s = parse_integer(der, &mut pos, strict)?;

        if pos != der.len() {
            return Err(Error::InvalidSignature(
                "trailing bytes after signature".into(),
            ));
        }

        Ok(SignatureComponents { r, s })
    }
}

/// Minimal two's-complement encoding of a nonnegative magnitude:
/// prepend 0x00 when the high bit of the first byte is set.
fn encode_integer(magnitude: &[u8]) -> Vec<u8> {
    if magnitude.is_empty() {
        return vec![0x00];
    }
    if magnitude[0] & 0x80 != 0 {
        let mut out = Vec::with_capacity(magnitude.len() + 1);
        out.push(0x00);
        out.extend_from_slice(magnitude);
        out
    } else {
        magnitude.to_vec()
    }
}

/// Parse one INTEGER at `pos`, returning its magnitude with leading zeros
/// stripped.
fn parse_integer(der: &[u8], pos: &mut usize, strict: bool) -> Result<Vec<u8>> {
    if der.len() < *pos + 2 {
        return Err(Error::InvalidSignature("truncated INTEGER header".into()));
    }
    if der[*pos] != 0x02 {
        return Err(Error::InvalidSignature("expected DER INTEGER tag".into()));
    }
    if der[*pos + 1] & 0x80 != 0 {
        return Err(Error::InvalidSignature(
            "non-minimal INTEGER length encoding".into(),
        ));
    }
    let len = der[*pos + 1] as usize;
    if len == 0 {
        return Err(Error::InvalidSignature("empty INTEGER".into()));
    }
    if der.len() < *pos + 2 + len {
        return Err(Error::InvalidSignature("truncated INTEGER body".into()));
    }
    let bytes = &der[*pos + 2..*pos + 2 + len];
    *pos += 2 + len;

    if bytes[0] & 0x80 != 0 {
        return Err(Error::InvalidSignature("negative INTEGER".into()));
    }
    if bytes.len() > 1 && bytes[0] == 0x00 && bytes[1] & 0x80 == 0 {
        // Zero padding beyond what two's complement requires. Tolerated on
        // decode for interoperability unless the caller asked for strict
        // (consensus-style) parsing.
        if strict {
            return Err(Error::InvalidSignature(
                "non-minimal INTEGER encoding".into(),
            ));
        }
    }

    Ok(trim_leading_zeros(bytes))
}

fn trim_leading_zeros(bytes: &[u8]) -> Vec<u8> {
    let first_nonzero = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len() - 1);
    bytes[first_nonzero..].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_der_encoding() {
        let sig = SignatureComponents {
            r: vec![0x01, 0x23, 0x45, 0x67],
            s: vec![0x89, 0xAB, 0xCD, 0xEF],
        };

        let der = sig.to_der();
        let parsed = SignatureComponents::from_der(&der, true).unwrap();

        assert_eq!(sig.r, parsed.r);
        assert_eq!(sig.s, parsed.s);
    }

    #[test]
    fn test_der_with_high_bit() {
        // Encoding when the high bit is set requires a leading zero
        let sig = SignatureComponents {
            r: vec![0xFF, 0x23, 0x45, 0x67],
            s: vec![0x79, 0xAB, 0xCD, 0xEF],
        };

        let der = sig.to_der();

        assert_eq!(der[3], 5); // r length grows by the pad byte
        assert_eq!(der[4], 0x00);
        assert_eq!(der[5], 0xFF);

        let parsed = SignatureComponents::from_der(&der, true).unwrap();
        assert_eq!(sig.r, parsed.r);
        assert_eq!(sig.s, parsed.s);
    }

    #[test]
    fn test_der_rejects_malformed_input() {
        let good = SignatureComponents {
            r: vec![0x11; 32],
            s: vec![0x22; 32],
        }
        .to_der();

        // trailing byte
        let mut trailing = good.clone();
        trailing.push(0x00);
        assert!(SignatureComponents::from_der(&trailing, false).is_err());

        // truncated
        assert!(SignatureComponents::from_der(&good[..good.len() - 1], false).is_err());

        // wrong outer tag
        let mut bad_tag = good.clone();
        bad_tag[0] = 0x31;
        assert!(SignatureComponents::from_der(&bad_tag, false).is_err());

        // long-form length octet
        let mut long_len = good.clone();
        long_len[1] |= 0x80;
        assert!(SignatureComponents::from_der(&long_len, false).is_err());

        // negative INTEGER: r starts 0x11, flip its high bit via content
        let mut negative = good.clone();
        negative[4] = 0x91;
        assert!(SignatureComponents::from_der(&negative, false).is_err());
    }

    #[test]
    fn test_der_zero_padding_lenient_vs_strict() {
        // INTEGER 0x00 0x01: padded zero with a clear high bit on the next
        // byte, i.e. non-minimal
        let padded: Vec<u8> = vec![0x30, 0x08, 0x02, 0x02, 0x00, 0x01, 0x02, 0x02, 0x00, 0x01];
        let lenient = SignatureComponents::from_der(&padded, false).unwrap();
        assert_eq!(lenient.r, vec![0x01]);
        assert_eq!(lenient.s, vec![0x01]);

        assert!(SignatureComponents::from_der(&padded, true).is_err());
    }

    #[test]
    fn test_component_width_check() {
        assert!(SignatureComponents::component_to_scalar_bytes(&[0x01; 33]).is_err());
        let padded = SignatureComponents::component_to_scalar_bytes(&[0x7F]).unwrap();
        assert_eq!(padded[31], 0x7F);
        assert!(padded[..31].iter().all(|&b| b == 0));
    }
}
