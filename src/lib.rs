//! # chwire: exact Decimal columns on the wire
//!
//! Encodes and decodes `Decimal(P, S)` column values for a columnar database's
//! native binary protocol, for every precision up to 154 digits, including
//! inside `Nullable`, `Array`, `Map` and `Tuple` shapes. Values never pass
//! through binary floating point.
//!
//! ## Quick Example
//!
//! ```rust
//! use chwire::prelude::*;
//!
//! let ty = chwire::parse_type("Array(Nullable(Decimal(100, 10)))").unwrap();
//! let value = Value::Array(vec![
//!     Value::from("123.456"),
//!     Value::Null,
//!     Value::from("-7"),
//! ]);
//!
//! let codec = CompositeCodec::new();
//! let mut buf = bytes::BytesMut::new();
//! codec.encode(&ty, &value, &mut buf).unwrap();
//!
//! let decoded = codec.decode(&ty, &mut &buf[..]).unwrap();
//! assert_eq!(decoded.to_string(), "[123.4560000000, NULL, -7.0000000000]");
//! ```
//!
//! ## Storage widths
//!
//! | Precision | Width    | Bytes |
//! |-----------|----------|-------|
//! | 1..=9     | 32 bit   | 4     |
//! | 10..=18   | 64 bit   | 8     |
//! | 19..=38   | 128 bit  | 16    |
//! | 39..=76   | 256 bit  | 32    |
//! | 77..=154  | 512 bit  | 64    |

pub mod codec;
pub mod composite;
pub mod config;
pub mod decimal;
pub mod error;
pub mod normalize;
pub mod precision;
pub mod schema;
pub mod types;
pub mod value;
pub mod wire;

pub mod prelude {
    pub use crate::composite::CompositeCodec;
    pub use crate::config::CodecConfig;
    pub use crate::decimal::Decimal;
    pub use crate::error::*;
    pub use crate::normalize::{RenderStyle, normalize, render};
    pub use crate::precision::{DecimalSpec, DecimalWidth, resolve};
    pub use crate::schema::{Column, Schema};
    pub use crate::types::{ColumnType, ScalarType, TupleField};
    pub use crate::value::Value;
    pub use crate::wire::{BuiltinLeaves, LeafCodec};
}

/// Parse a declared column type with the default configuration.
///
/// # Example
///
/// ```
/// let ty = chwire::parse_type("Nullable(Decimal(77, 10))").unwrap();
/// assert!(ty.is_nullable());
/// assert_eq!(ty.decimal_spec().unwrap().width().bits(), 512);
/// ```
pub fn parse_type(input: &str) -> error::WireResult<types::ColumnType> {
    types::ColumnType::parse(input)
}
