//! Wire primitives shared by the decimal and composite codecs.
//!
//! - `take` slices fixed-size chunks off the front of an input buffer
//! - `put_varint` / `get_varint` handle LEB128 length prefixes
//! - [`LeafCodec`] is the seam for every non-decimal leaf type

use bytes::{BufMut, BytesMut};

use crate::error::{WireError, WireResult};
use crate::types::ScalarType;
use crate::value::Value;

/// Longest LEB128 encoding of a `u64`.
const MAX_VARINT_LEN: usize = 10;

/// Split `n` bytes off the front of `buf`.
pub fn take<'a>(buf: &mut &'a [u8], n: usize) -> WireResult<&'a [u8]> {
    if buf.len() < n {
        return Err(WireError::UnexpectedEof {
            needed: n,
            remaining: buf.len(),
        });
    }
    let (head, tail) = buf.split_at(n);
    *buf = tail;
    Ok(head)
}

/// Append an unsigned LEB128 varint.
pub fn put_varint(mut value: u64, buf: &mut BytesMut) {
    while value >= 0x80 {
        buf.put_u8((value as u8) | 0x80);
        value >>= 7;
    }
    buf.put_u8(value as u8);
}

/// Read an unsigned LEB128 varint.
pub fn get_varint(buf: &mut &[u8]) -> WireResult<u64> {
    let mut value = 0u64;
    for i in 0..MAX_VARINT_LEN {
        let byte = take(buf, 1)?[0];
        value |= u64::from(byte & 0x7F) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err(WireError::Corrupted("varint longer than 10 bytes".to_string()))
}

/// Encoder/decoder for leaves that are not decimals.
///
/// Implementations must be stateless or internally synchronized: one codec is
/// shared by every thread encoding against the same shape.
pub trait LeafCodec: Send + Sync {
    fn encode_leaf(&self, ty: &ScalarType, value: &Value, buf: &mut BytesMut) -> WireResult<()>;

    fn decode_leaf(&self, ty: &ScalarType, buf: &mut &[u8]) -> WireResult<Value>;
}

/// Row-binary encodings of booleans, fixed-width integers and strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinLeaves;

macro_rules! put_int {
    ($buf:expr, $ty:ident, $target:ty, $value:expr) => {{
        let v: $target = match $value {
            Value::Int(i) => <$target>::try_from(*i).map_err(|_| out_of_range($ty, i))?,
            Value::UInt(u) => <$target>::try_from(*u).map_err(|_| out_of_range($ty, u))?,
            other => return Err(mismatch($ty, other)),
        };
        $buf.put_slice(&v.to_le_bytes());
    }};
}

macro_rules! get_int {
    ($buf:expr, $target:ty) => {{
        let bytes = take($buf, std::mem::size_of::<$target>())?;
        let mut raw = [0u8; std::mem::size_of::<$target>()];
        raw.copy_from_slice(bytes);
        <$target>::from_le_bytes(raw)
    }};
}

fn out_of_range(ty: &ScalarType, value: impl ToString) -> WireError {
    WireError::IntegerOutOfRange {
        type_name: ty.name().to_string(),
        value: value.to_string(),
    }
}

fn mismatch(ty: &ScalarType, value: &Value) -> WireError {
    match value {
        Value::Null => WireError::UnexpectedNull {
            expected: ty.name().to_string(),
        },
        other => WireError::TypeMismatch {
            expected: ty.name().to_string(),
            found: other.kind(),
        },
    }
}

impl LeafCodec for BuiltinLeaves {
    fn encode_leaf(&self, ty: &ScalarType, value: &Value, buf: &mut BytesMut) -> WireResult<()> {
        match ty {
            ScalarType::Bool => match value {
                Value::Bool(b) => buf.put_u8(u8::from(*b)),
                other => return Err(mismatch(ty, other)),
            },
            ScalarType::UInt8 => put_int!(buf, ty, u8, value),
            ScalarType::UInt16 => put_int!(buf, ty, u16, value),
            ScalarType::UInt32 => put_int!(buf, ty, u32, value),
            ScalarType::UInt64 => put_int!(buf, ty, u64, value),
            ScalarType::Int8 => put_int!(buf, ty, i8, value),
            ScalarType::Int16 => put_int!(buf, ty, i16, value),
            ScalarType::Int32 => put_int!(buf, ty, i32, value),
            ScalarType::Int64 => put_int!(buf, ty, i64, value),
            ScalarType::String => match value {
                Value::String(s) => {
                    put_varint(s.len() as u64, buf);
                    buf.put_slice(s.as_bytes());
                }
                other => return Err(mismatch(ty, other)),
            },
            ScalarType::Other(name) => return Err(WireError::UnsupportedType(name.clone())),
        }
        Ok(())
    }

    fn decode_leaf(&self, ty: &ScalarType, buf: &mut &[u8]) -> WireResult<Value> {
        let value = match ty {
            ScalarType::Bool => match take(buf, 1)?[0] {
                0 => Value::Bool(false),
                1 => Value::Bool(true),
                b => return Err(WireError::Corrupted(format!("invalid Bool byte {b:#04x}"))),
            },
            ScalarType::UInt8 => Value::UInt(u64::from(get_int!(buf, u8))),
            ScalarType::UInt16 => Value::UInt(u64::from(get_int!(buf, u16))),
            ScalarType::UInt32 => Value::UInt(u64::from(get_int!(buf, u32))),
            ScalarType::UInt64 => Value::UInt(get_int!(buf, u64)),
            ScalarType::Int8 => Value::Int(i64::from(get_int!(buf, i8))),
            ScalarType::Int16 => Value::Int(i64::from(get_int!(buf, i16))),
            ScalarType::Int32 => Value::Int(i64::from(get_int!(buf, i32))),
            ScalarType::Int64 => Value::Int(get_int!(buf, i64)),
            ScalarType::String => {
                let len = get_varint(buf)?;
                let len = usize::try_from(len)
                    .map_err(|_| WireError::Corrupted(format!("string length {len}")))?;
                let bytes = take(buf, len)?;
                let s = std::str::from_utf8(bytes)
                    .map_err(|e| WireError::Corrupted(format!("invalid UTF-8 in String: {e}")))?;
                Value::String(s.to_string())
            }
            ScalarType::Other(name) => return Err(WireError::UnsupportedType(name.clone())),
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take() {
        let data = [1u8, 2, 3];
        let mut buf = &data[..];
        assert_eq!(take(&mut buf, 2).unwrap(), &[1, 2]);
        assert!(matches!(
            take(&mut buf, 2),
            Err(WireError::UnexpectedEof { needed: 2, remaining: 1 })
        ));
    }

    #[test]
    fn test_varint() {
        for (n, expected) in [
            (0u64, vec![0x00u8]),
            (127, vec![0x7F]),
            (128, vec![0x80, 0x01]),
            (300, vec![0xAC, 0x02]),
        ] {
            let mut buf = BytesMut::new();
            put_varint(n, &mut buf);
            assert_eq!(buf.to_vec(), expected);
            assert_eq!(get_varint(&mut &buf[..]).unwrap(), n);
        }

        let mut buf = BytesMut::new();
        put_varint(u64::MAX, &mut buf);
        assert_eq!(buf.len(), 10);
        assert_eq!(get_varint(&mut &buf[..]).unwrap(), u64::MAX);
    }

    #[test]
    fn test_varint_corrupted() {
        let data = [0xFFu8; 11];
        assert!(matches!(get_varint(&mut &data[..]), Err(WireError::Corrupted(_))));
        let truncated = [0x80u8];
        assert!(matches!(
            get_varint(&mut &truncated[..]),
            Err(WireError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_builtin_leaves() {
        let leaves = BuiltinLeaves;
        let mut buf = BytesMut::new();
        leaves
            .encode_leaf(&ScalarType::String, &Value::String("héllo".into()), &mut buf)
            .unwrap();
        leaves.encode_leaf(&ScalarType::Int16, &Value::Int(-2), &mut buf).unwrap();
        leaves.encode_leaf(&ScalarType::UInt32, &Value::UInt(7), &mut buf).unwrap();
        leaves.encode_leaf(&ScalarType::Bool, &Value::Bool(true), &mut buf).unwrap();
        assert_eq!(buf[0], 6);

        let mut slice = &buf[..];
        assert_eq!(
            leaves.decode_leaf(&ScalarType::String, &mut slice).unwrap(),
            Value::String("héllo".into())
        );
        assert_eq!(leaves.decode_leaf(&ScalarType::Int16, &mut slice).unwrap(), Value::Int(-2));
        assert_eq!(leaves.decode_leaf(&ScalarType::UInt32, &mut slice).unwrap(), Value::UInt(7));
        assert_eq!(leaves.decode_leaf(&ScalarType::Bool, &mut slice).unwrap(), Value::Bool(true));
        assert!(slice.is_empty());
    }

    #[test]
    fn test_builtin_leaf_errors() {
        let leaves = BuiltinLeaves;
        let mut buf = BytesMut::new();
        assert!(matches!(
            leaves.encode_leaf(&ScalarType::UInt8, &Value::Int(256), &mut buf),
            Err(WireError::IntegerOutOfRange { .. })
        ));
        assert!(matches!(
            leaves.encode_leaf(&ScalarType::UInt8, &Value::Int(-1), &mut buf),
            Err(WireError::IntegerOutOfRange { .. })
        ));
        assert!(matches!(
            leaves.encode_leaf(&ScalarType::String, &Value::Null, &mut buf),
            Err(WireError::UnexpectedNull { .. })
        ));
        assert!(matches!(
            leaves.encode_leaf(&ScalarType::Other("UUID".into()), &Value::Null, &mut buf),
            Err(WireError::UnsupportedType(_))
        ));
        assert!(matches!(
            leaves.decode_leaf(&ScalarType::Bool, &mut &[2u8][..]),
            Err(WireError::Corrupted(_))
        ));
        assert!(matches!(
            leaves.decode_leaf(&ScalarType::String, &mut &[2u8, 0xFF, 0xFE][..]),
            Err(WireError::Corrupted(_))
        ));
    }
}
