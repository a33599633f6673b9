//! Composite codec: threads the decimal codec through `Nullable`, `Array`,
//! `Map` and `Tuple` shapes.
//!
//! # Layout
//!
//! | Shape         | Bytes                                                   |
//! |---------------|---------------------------------------------------------|
//! | `Decimal`     | `width / 8` bytes, little-endian two's complement       |
//! | `Nullable(T)` | marker byte: `1` = null (nothing follows), `0` = `T`    |
//! | `Array(T)`    | varint count, then `count` consecutive `T`              |
//! | `Map(K, V)`   | same as `Array(Tuple(K, V))`                            |
//! | `Tuple(...)`  | members back to back in declaration order               |
//!
//! Other leaves are delegated to a [`LeafCodec`].

use bytes::{BufMut, BytesMut};
use tracing::trace;

use crate::codec;
use crate::config::CodecConfig;
use crate::error::{WireError, WireResult};
use crate::normalize::normalize_value;
use crate::types::{ColumnType, TupleField};
use crate::value::Value;
use crate::wire::{BuiltinLeaves, LeafCodec, get_varint, put_varint, take};

/// Presence marker for a null `Nullable` slot.
pub const NULL_MARKER: u8 = 1;
/// Presence marker for a non-null `Nullable` slot.
pub const PRESENT_MARKER: u8 = 0;

/// Encoder/decoder for whole column values of any shape.
///
/// Holds no per-call state; share one instance across threads.
#[derive(Debug, Clone)]
pub struct CompositeCodec<L: LeafCodec = BuiltinLeaves> {
    leaves: L,
    max_collection_len: usize,
}

impl Default for CompositeCodec<BuiltinLeaves> {
    fn default() -> Self {
        Self::new()
    }
}

impl CompositeCodec<BuiltinLeaves> {
    pub fn new() -> Self {
        Self::with_config(&CodecConfig::default())
    }

    pub fn with_config(config: &CodecConfig) -> Self {
        Self::with_leaves(BuiltinLeaves, config)
    }
}

impl<L: LeafCodec> CompositeCodec<L> {
    /// Use a custom codec for non-decimal leaves.
    pub fn with_leaves(leaves: L, config: &CodecConfig) -> Self {
        Self {
            leaves,
            max_collection_len: config.max_collection_len,
        }
    }

    /// Append the encoding of `value` as `ty` to `buf`.
    ///
    /// On error `buf` is left exactly as it was before the call.
    pub fn encode(&self, ty: &ColumnType, value: &Value, buf: &mut BytesMut) -> WireResult<()> {
        let start = buf.len();
        match self.encode_value(ty, value, buf) {
            Ok(()) => {
                trace!(column_type = %ty, bytes = buf.len() - start, "encoded value");
                Ok(())
            }
            Err(e) => {
                buf.truncate(start);
                Err(e)
            }
        }
    }

    /// Decode one value of `ty` from the front of `buf`, advancing it.
    pub fn decode(&self, ty: &ColumnType, buf: &mut &[u8]) -> WireResult<Value> {
        match ty {
            ColumnType::Decimal(spec) => Ok(Value::Decimal(codec::decode(buf, spec)?)),
            ColumnType::Scalar(scalar) => self.leaves.decode_leaf(scalar, buf),
            ColumnType::Nullable(inner) => match take(buf, 1)?[0] {
                NULL_MARKER => Ok(Value::Null),
                PRESENT_MARKER => self.decode(inner, buf),
                b => Err(WireError::Corrupted(format!("invalid null marker {b:#04x}"))),
            },
            ColumnType::Array(inner) => {
                let count = self.read_count(buf)?;
                let mut items = Vec::with_capacity(count.min(buf.len()));
                for i in 0..count {
                    items.push(arity(self.decode(inner, buf), count, i)?);
                }
                Ok(Value::Array(items))
            }
            ColumnType::Map(key_ty, value_ty) => {
                let count = self.read_count(buf)?;
                let mut pairs = Vec::with_capacity(count.min(buf.len()));
                for i in 0..count {
                    let key = arity(self.decode(key_ty, buf), count, i)?;
                    let value = arity(self.decode(value_ty, buf), count, i)?;
                    pairs.push((key, value));
                }
                Ok(Value::Map(pairs))
            }
            ColumnType::Tuple(fields) => self.decode_tuple(ty, fields, buf),
        }
    }

    fn encode_value(&self, ty: &ColumnType, value: &Value, buf: &mut BytesMut) -> WireResult<()> {
        match ty {
            ColumnType::Decimal(spec) => {
                let decimal = normalize_value(value, spec)?;
                codec::encode(&decimal, spec, buf)
            }
            ColumnType::Scalar(scalar) => self.leaves.encode_leaf(scalar, value, buf),
            ColumnType::Nullable(inner) => {
                if value.is_null() {
                    buf.put_u8(NULL_MARKER);
                    Ok(())
                } else {
                    buf.put_u8(PRESENT_MARKER);
                    self.encode_value(inner, value, buf)
                }
            }
            ColumnType::Array(inner) => match value {
                Value::Array(items) => {
                    put_varint(items.len() as u64, buf);
                    items
                        .iter()
                        .try_for_each(|item| self.encode_value(inner, item, buf))
                }
                other => Err(shape_mismatch(ty, other)),
            },
            ColumnType::Map(key_ty, value_ty) => match value {
                Value::Map(pairs) => {
                    put_varint(pairs.len() as u64, buf);
                    for (k, v) in pairs {
                        self.encode_value(key_ty, k, buf)?;
                        self.encode_value(value_ty, v, buf)?;
                    }
                    Ok(())
                }
                other => Err(shape_mismatch(ty, other)),
            },
            ColumnType::Tuple(fields) => self.encode_tuple(ty, fields, value, buf),
        }
    }

    fn encode_tuple(
        &self,
        ty: &ColumnType,
        fields: &[TupleField],
        value: &Value,
        buf: &mut BytesMut,
    ) -> WireResult<()> {
        match value {
            Value::Tuple(items) => {
                if items.len() != fields.len() {
                    return Err(WireError::ArityMismatch {
                        expected: fields.len(),
                        found: items.len(),
                    });
                }
                fields
                    .iter()
                    .zip(items)
                    .try_for_each(|(field, item)| self.encode_value(&field.ty, item, buf))
            }
            Value::NamedTuple(members) if ty.is_named_tuple() => {
                if let Some((unknown, _)) = members
                    .iter()
                    .find(|(name, _)| !fields.iter().any(|f| f.name.as_ref() == Some(name)))
                {
                    return Err(WireError::TypeMismatch {
                        expected: format!("member of {} (got '{}')", ty, unknown),
                        found: "NamedTuple",
                    });
                }
                if let Some((i, (dup, _))) = members
                    .iter()
                    .enumerate()
                    .find(|(i, (name, _))| members[..*i].iter().any(|(n, _)| n == name))
                {
                    return Err(WireError::TypeMismatch {
                        expected: format!("{} with member '{}' once (repeated at {})", ty, dup, i),
                        found: "NamedTuple",
                    });
                }
                // Declaration order decides the layout; absent members are null.
                for field in fields {
                    let member = members
                        .iter()
                        .find(|(name, _)| field.name.as_ref() == Some(name))
                        .map(|(_, v)| v)
                        .unwrap_or(&Value::Null);
                    self.encode_value(&field.ty, member, buf)?;
                }
                Ok(())
            }
            other => Err(shape_mismatch(ty, other)),
        }
    }

    fn decode_tuple(
        &self,
        ty: &ColumnType,
        fields: &[TupleField],
        buf: &mut &[u8],
    ) -> WireResult<Value> {
        let mut items = Vec::with_capacity(fields.len());
        for (i, field) in fields.iter().enumerate() {
            items.push(arity(self.decode(&field.ty, buf), fields.len(), i)?);
        }

        if ty.is_named_tuple() {
            let members = fields
                .iter()
                .zip(items)
                .map(|(field, v)| (field.name.clone().unwrap_or_default(), v))
                .collect();
            Ok(Value::NamedTuple(members))
        } else {
            Ok(Value::Tuple(items))
        }
    }

    fn read_count(&self, buf: &mut &[u8]) -> WireResult<usize> {
        let len = get_varint(buf)?;
        match usize::try_from(len) {
            Ok(n) if n <= self.max_collection_len => Ok(n),
            _ => Err(WireError::CollectionTooLarge {
                len,
                limit: self.max_collection_len,
            }),
        }
    }
}

/// Running out of input inside a collection means the stream holds fewer
/// elements than its shape or prefix promised.
fn arity<T>(result: WireResult<T>, expected: usize, found: usize) -> WireResult<T> {
    result.map_err(|e| match e {
        WireError::UnexpectedEof { .. } => WireError::ArityMismatch { expected, found },
        other => other,
    })
}

fn shape_mismatch(ty: &ColumnType, value: &Value) -> WireError {
    match value {
        Value::Null => WireError::UnexpectedNull {
            expected: ty.to_string(),
        },
        other => WireError::TypeMismatch {
            expected: ty.to_string(),
            found: other.kind(),
        },
    }
}
