//! Scalar Decimal codec.
//!
//! Wire layout: the coefficient `value * 10^scale` as a signed two's-complement
//! integer of `width` bits, little-endian, `width / 8` bytes. Widths up to 128
//! bits go through `i128`; 256 and 512 bits need a big integer.

use bytes::{BufMut, BytesMut};
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use tracing::trace;

use crate::decimal::{Decimal, pow10};
use crate::error::{WireError, WireResult};
use crate::precision::{DecimalSpec, DecimalWidth};
use crate::wire::take;

/// Compute the coefficient a value stores as in a column of `spec`.
///
/// Fails when nonzero digits would be dropped (`ScaleMismatch`), when the
/// aligned value has more digits than the precision (`MagnitudeOverflow`), or
/// when it does not fit the storage integer (`CoefficientOverflow`).
pub fn coefficient(value: &Decimal, spec: &DecimalSpec) -> WireResult<BigInt> {
    let aligned = value
        .with_scale(spec.scale())
        .ok_or(WireError::ScaleMismatch {
            fractional_digits: value.min_scale(),
            scale: spec.scale(),
        })?;

    let coefficient = aligned.coefficient().clone();
    if coefficient.magnitude() >= pow10(spec.precision()).magnitude() {
        return Err(WireError::MagnitudeOverflow {
            digits: aligned.digit_count(),
            precision: spec.precision(),
        });
    }

    // 10^154 - 1 exceeds 2^511 - 1, so 154-digit values can still overflow.
    if coefficient.to_signed_bytes_le().len() > spec.width().bytes() {
        return Err(WireError::CoefficientOverflow {
            width: spec.width().bits(),
        });
    }
    Ok(coefficient)
}

/// Append the wire encoding of `value` to `buf`.
pub fn encode(value: &Decimal, spec: &DecimalSpec, buf: &mut BytesMut) -> WireResult<()> {
    let coefficient = coefficient(value, spec)?;
    let size = spec.width().bytes();

    match spec.width() {
        DecimalWidth::W32 | DecimalWidth::W64 | DecimalWidth::W128 => {
            let n = coefficient
                .to_i128()
                .ok_or(WireError::CoefficientOverflow {
                    width: spec.width().bits(),
                })?;
            // In range, so the low `size` bytes are the two's complement.
            buf.put_slice(&n.to_le_bytes()[..size]);
        }
        DecimalWidth::W256 | DecimalWidth::W512 => {
            let bytes = coefficient.to_signed_bytes_le();
            let fill = if coefficient.sign() == num_bigint::Sign::Minus {
                0xFF
            } else {
                0x00
            };
            buf.put_slice(&bytes);
            buf.put_bytes(fill, size - bytes.len());
        }
    }

    trace!(%value, %spec, "encoded decimal");
    Ok(())
}

/// Decode one value from the front of `buf`, advancing it by `width / 8` bytes.
///
/// The result always has exactly `spec.scale()` fractional digits.
pub fn decode(buf: &mut &[u8], spec: &DecimalSpec) -> WireResult<Decimal> {
    let bytes = take(buf, spec.width().bytes())?;
    Ok(Decimal::new(decode_coefficient(bytes), spec.scale()))
}

/// Interpret little-endian two's-complement bytes as a signed integer.
pub fn decode_coefficient(bytes: &[u8]) -> BigInt {
    if bytes.len() <= 16 {
        let negative = bytes.last().is_some_and(|b| b & 0x80 != 0);
        let mut wide = if negative { [0xFF; 16] } else { [0x00; 16] };
        wide[..bytes.len()].copy_from_slice(bytes);
        BigInt::from(i128::from_le_bytes(wide))
    } else {
        BigInt::from_signed_bytes_le(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn encode_to_vec(value: &str, p: u32, s: u32) -> WireResult<Vec<u8>> {
        let spec = DecimalSpec::new(p, s).unwrap();
        let mut buf = BytesMut::new();
        encode(&dec(value), &spec, &mut buf)?;
        Ok(buf.to_vec())
    }

    #[test]
    fn test_decimal32_layout() {
        // 25.0004 at scale 4 -> 250004
        let bytes = encode_to_vec("25.0004", 9, 4).unwrap();
        assert_eq!(bytes, 250004i32.to_le_bytes());
        let bytes = encode_to_vec("-1", 9, 0).unwrap();
        assert_eq!(bytes, [0xFF, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn test_decimal64_layout() {
        let bytes = encode_to_vec("-123.456", 18, 6).unwrap();
        assert_eq!(bytes, (-123_456_000i64).to_le_bytes());
    }

    #[test]
    fn test_decimal256_sign_extension() {
        let bytes = encode_to_vec("-2", 76, 0).unwrap();
        assert_eq!(bytes.len(), 32);
        assert_eq!(bytes[0], 0xFE);
        assert!(bytes[1..].iter().all(|b| *b == 0xFF));

        let bytes = encode_to_vec("2", 76, 0).unwrap();
        assert_eq!(bytes[0], 0x02);
        assert!(bytes[1..].iter().all(|b| *b == 0x00));
    }

    #[test]
    fn test_decimal512_width() {
        let bytes = encode_to_vec("1", 77, 0).unwrap();
        assert_eq!(bytes.len(), 64);
    }

    #[test]
    fn test_roundtrip_each_width() {
        for (p, s, v) in [
            (9, 3, "-999999.999"),
            (18, 6, "123456789012.345678"),
            (38, 10, "-1234567890123456789012345678.1234567890"),
            (76, 0, "-9999999999999999999999999999999999999999999999999999999999999999999999999999"),
            (153, 50, "-77777777777777777777777777777777777777777777777777.77777777777777777777777777777777777777777777777777"),
        ] {
            let spec = DecimalSpec::new(p, s).unwrap();
            let mut buf = BytesMut::new();
            encode(&dec(v), &spec, &mut buf).unwrap();
            let mut slice = &buf[..];
            let back = decode(&mut slice, &spec).unwrap();
            assert!(slice.is_empty());
            assert_eq!(back.to_string(), v, "Decimal({p}, {s})");
        }
    }

    #[test]
    fn test_zero_and_scale_alignment() {
        let spec = DecimalSpec::new(100, 10).unwrap();
        let mut buf = BytesMut::new();
        encode(&dec("0"), &spec, &mut buf).unwrap();
        assert!(buf.iter().all(|b| *b == 0));
        let back = decode(&mut &buf[..], &spec).unwrap();
        assert_eq!(back.to_string(), "0.0000000000");
    }

    #[test]
    fn test_scale_mismatch() {
        assert!(matches!(
            encode_to_vec("1.234", 10, 2),
            Err(WireError::ScaleMismatch { fractional_digits: 3, scale: 2 })
        ));
        // Trailing zeros are not information.
        assert!(encode_to_vec("1.230", 10, 2).is_ok());
    }

    #[test]
    fn test_huge_value_scale_is_rejected_without_rescaling() {
        let spec = DecimalSpec::new(154, 2).unwrap();
        let mut buf = BytesMut::new();
        assert!(matches!(
            encode(&Decimal::new(1, u32::MAX), &spec, &mut buf),
            Err(WireError::ScaleMismatch { fractional_digits: u32::MAX, scale: 2 })
        ));
        encode(&Decimal::new(0, u32::MAX), &spec, &mut buf).unwrap();
        assert!(buf.iter().all(|b| *b == 0));
    }

    #[test]
    fn test_magnitude_overflow() {
        assert!(matches!(
            encode_to_vec("1000", 5, 2),
            Err(WireError::MagnitudeOverflow { digits: 6, precision: 5 })
        ));
        assert!(encode_to_vec("999.99", 5, 2).is_ok());
        assert!(encode_to_vec("-999.99", 5, 2).is_ok());
    }

    #[test]
    fn test_coefficient_overflow_at_154_digits() {
        let max = "9".repeat(154);
        assert!(matches!(
            encode_to_vec(&max, 154, 0),
            Err(WireError::CoefficientOverflow { width: 512 })
        ));
        // 153 nines fit comfortably.
        assert!(encode_to_vec(&"9".repeat(153), 154, 0).is_ok());
    }

    #[test]
    fn test_decode_short_input() {
        let spec = DecimalSpec::new(40, 0).unwrap();
        let bytes = [0u8; 31];
        assert!(matches!(
            decode(&mut &bytes[..], &spec),
            Err(WireError::UnexpectedEof { needed: 32, remaining: 31 })
        ));
    }

    #[test]
    fn test_decode_full_512_bit_range() {
        // -2^511, the most negative 512-bit coefficient, has 154 digits.
        let mut bytes = [0u8; 64];
        bytes[63] = 0x80;
        let spec = DecimalSpec::new(154, 0).unwrap();
        let value = decode(&mut &bytes[..], &spec).unwrap();
        assert!(value.is_negative());
        assert_eq!(value.digit_count(), 154);
        assert_eq!(value.coefficient(), &-(BigInt::from(1) << 511usize));
    }
}
