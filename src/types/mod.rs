//! Column type shapes.
//!
//! A [`ColumnType`] is the tree a declared type string describes: decimal and
//! other scalar leaves wrapped in `Nullable`, `Array`, `Map` and `Tuple` nodes.
//! It is built once per column and only read afterwards, so one instance can be
//! shared by any number of concurrent encoders.

pub mod factory;
pub mod parser;

use std::fmt;

pub use factory::{TypeFactory, build};
pub use parser::{TypeDescriptor, TypeParam, parse_descriptor, parse_descriptor_with};

use crate::config::CodecConfig;
use crate::error::WireResult;
use crate::precision::DecimalSpec;

/// Non-decimal leaf types. Their encoding belongs to a [`LeafCodec`](crate::wire::LeafCodec).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Bool,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Int8,
    Int16,
    Int32,
    Int64,
    String,
    /// Any other named type, passed through to the leaf codec untouched.
    Other(String),
}

impl ScalarType {
    /// Map a type name to a scalar type.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Bool" | "Boolean" => ScalarType::Bool,
            "UInt8" => ScalarType::UInt8,
            "UInt16" => ScalarType::UInt16,
            "UInt32" => ScalarType::UInt32,
            "UInt64" => ScalarType::UInt64,
            "Int8" => ScalarType::Int8,
            "Int16" => ScalarType::Int16,
            "Int32" => ScalarType::Int32,
            "Int64" => ScalarType::Int64,
            "String" => ScalarType::String,
            other => ScalarType::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ScalarType::Bool => "Bool",
            ScalarType::UInt8 => "UInt8",
            ScalarType::UInt16 => "UInt16",
            ScalarType::UInt32 => "UInt32",
            ScalarType::UInt64 => "UInt64",
            ScalarType::Int8 => "Int8",
            ScalarType::Int16 => "Int16",
            ScalarType::Int32 => "Int32",
            ScalarType::Int64 => "Int64",
            ScalarType::String => "String",
            ScalarType::Other(name) => name,
        }
    }
}

/// One member of a tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TupleField {
    pub name: Option<String>,
    pub ty: ColumnType,
}

/// A column's type tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Decimal(DecimalSpec),
    Scalar(ScalarType),
    Nullable(Box<ColumnType>),
    Array(Box<ColumnType>),
    Map(Box<ColumnType>, Box<ColumnType>),
    Tuple(Vec<TupleField>),
}

impl ColumnType {
    /// Parse a type string with the default configuration.
    pub fn parse(input: &str) -> WireResult<Self> {
        Self::parse_with(input, &CodecConfig::default())
    }

    /// Parse a type string under `config`.
    pub fn parse_with(input: &str, config: &CodecConfig) -> WireResult<Self> {
        let descriptor = parse_descriptor_with(input, config.max_type_depth)?;
        TypeFactory::new(config).build(&descriptor)
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, ColumnType::Nullable(_))
    }

    /// The decimal spec of a `Decimal` or `Nullable(Decimal)` column.
    pub fn decimal_spec(&self) -> Option<&DecimalSpec> {
        match self {
            ColumnType::Decimal(spec) => Some(spec),
            ColumnType::Nullable(inner) => inner.decimal_spec(),
            _ => None,
        }
    }

    /// Whether the tuple members carry names.
    pub fn is_named_tuple(&self) -> bool {
        match self {
            ColumnType::Tuple(fields) => fields.first().is_some_and(|f| f.name.is_some()),
            _ => false,
        }
    }

    /// Every decimal leaf in the tree, depth first.
    pub fn decimal_leaves(&self) -> Vec<&DecimalSpec> {
        let mut out = Vec::new();
        self.collect_decimals(&mut out);
        out
    }

    fn collect_decimals<'a>(&'a self, out: &mut Vec<&'a DecimalSpec>) {
        match self {
            ColumnType::Decimal(spec) => out.push(spec),
            ColumnType::Scalar(_) => {}
            ColumnType::Nullable(inner) | ColumnType::Array(inner) => inner.collect_decimals(out),
            ColumnType::Map(k, v) => {
                k.collect_decimals(out);
                v.collect_decimals(out);
            }
            ColumnType::Tuple(fields) => {
                for field in fields {
                    field.ty.collect_decimals(out);
                }
            }
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Decimal(spec) => write!(f, "{}", spec),
            ColumnType::Scalar(s) => f.write_str(s.name()),
            ColumnType::Nullable(inner) => write!(f, "Nullable({})", inner),
            ColumnType::Array(inner) => write!(f, "Array({})", inner),
            ColumnType::Map(k, v) => write!(f, "Map({}, {})", k, v),
            ColumnType::Tuple(fields) => {
                f.write_str("Tuple(")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    if let Some(name) = &field.name {
                        write!(f, "{} ", name)?;
                    }
                    write!(f, "{}", field.ty)?;
                }
                f.write_str(")")
            }
        }
    }
}
