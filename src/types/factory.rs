//! Builds [`ColumnType`] trees from parsed descriptors.
//!
//! Dispatch is an explicit `match` on the type name; there is no global
//! registry to populate before use.

use tracing::{debug, warn};

use super::parser::{TypeDescriptor, TypeParam};
use super::{ColumnType, ScalarType, TupleField};
use crate::config::{CodecConfig, DEFAULT_MAX_TYPE_DEPTH};
use crate::error::{WireError, WireResult};
use crate::precision::{self, DecimalSpec, MAX_PRECISION_256};

/// Build a shape with the default configuration.
pub fn build(descriptor: &TypeDescriptor) -> WireResult<ColumnType> {
    TypeFactory::default().build(descriptor)
}

/// Turns descriptors into validated column types.
#[derive(Debug, Clone, Copy)]
pub struct TypeFactory {
    allow_decimal512: bool,
    max_depth: usize,
}

impl Default for TypeFactory {
    fn default() -> Self {
        Self {
            allow_decimal512: true,
            max_depth: DEFAULT_MAX_TYPE_DEPTH,
        }
    }
}

impl TypeFactory {
    pub fn new(config: &CodecConfig) -> Self {
        Self {
            allow_decimal512: config.allow_decimal512,
            max_depth: config.max_type_depth,
        }
    }

    /// Validate a descriptor tree and resolve every decimal leaf.
    pub fn build(&self, descriptor: &TypeDescriptor) -> WireResult<ColumnType> {
        let ty = self.build_node(descriptor, 0)?;
        debug!(column_type = %ty, "built column type");
        Ok(ty)
    }

    /// `depth` counts the parameter lists enclosing `d`.
    fn build_node(&self, d: &TypeDescriptor, depth: usize) -> WireResult<ColumnType> {
        let name = d.name.as_str();
        let depth = if d.params.is_empty() { depth } else { depth + 1 };
        if depth > self.max_depth {
            return Err(WireError::arguments(
                name,
                format!("nested deeper than {} levels", self.max_depth),
            ));
        }
        match name {
            "Decimal" => match d.params.as_slice() {
                [TypeParam::Int(p)] => self.decimal(*p, 0),
                [TypeParam::Int(p), TypeParam::Int(s)] => self.decimal(*p, *s),
                _ => Err(WireError::arguments(name, "expected (precision[, scale])")),
            },
            "Decimal32" | "Decimal64" | "Decimal128" | "Decimal256" => {
                let precision = match name {
                    "Decimal32" => 9,
                    "Decimal64" => 18,
                    "Decimal128" => 38,
                    _ => 76,
                };
                match d.params.as_slice() {
                    [TypeParam::Int(s)] => self.decimal(precision, *s),
                    _ => Err(WireError::arguments(name, "expected (scale)")),
                }
            }
            "Nullable" => {
                let inner = self.single_type_param(d, depth)?;
                Ok(ColumnType::Nullable(Box::new(inner)))
            }
            "Array" => {
                let inner = self.single_type_param(d, depth)?;
                Ok(ColumnType::Array(Box::new(inner)))
            }
            "Map" => match d.params.as_slice() {
                [
                    TypeParam::Type { name: None, ty: k },
                    TypeParam::Type { name: None, ty: v },
                ] => Ok(ColumnType::Map(
                    Box::new(self.build_node(k, depth)?),
                    Box::new(self.build_node(v, depth)?),
                )),
                _ => Err(WireError::arguments(name, "expected (key type, value type)")),
            },
            "Tuple" => self.tuple(d, depth),
            _ => {
                let scalar = ScalarType::from_name(name);
                if d.params.is_empty() {
                    Ok(ColumnType::Scalar(scalar))
                } else if matches!(scalar, ScalarType::Other(_)) {
                    Err(WireError::UnsupportedType(name.to_string()))
                } else {
                    Err(WireError::arguments(name, "takes no parameters"))
                }
            }
        }
    }

    fn decimal(&self, precision: i64, scale: i64) -> WireResult<ColumnType> {
        let spec: DecimalSpec = precision::resolve(precision, scale)?;
        if !self.allow_decimal512 && spec.precision() > MAX_PRECISION_256 {
            warn!(precision, "512-bit decimals are disabled by configuration");
            return Err(WireError::InvalidPrecision {
                precision,
                max: MAX_PRECISION_256,
            });
        }
        Ok(ColumnType::Decimal(spec))
    }

    fn single_type_param(&self, d: &TypeDescriptor, depth: usize) -> WireResult<ColumnType> {
        match d.params.as_slice() {
            [TypeParam::Type { name: None, ty }] => self.build_node(ty, depth),
            _ => Err(WireError::arguments(&d.name, "expected exactly one type")),
        }
    }

    fn tuple(&self, d: &TypeDescriptor, depth: usize) -> WireResult<ColumnType> {
        if d.params.is_empty() {
            return Err(WireError::arguments("Tuple", "expected at least one element"));
        }

        let mut fields = Vec::with_capacity(d.params.len());
        for param in &d.params {
            match param {
                TypeParam::Type { name, ty } => fields.push(TupleField {
                    name: name.clone(),
                    ty: self.build_node(ty, depth)?,
                }),
                TypeParam::Int(_) => {
                    return Err(WireError::arguments("Tuple", "elements must be types"));
                }
            }
        }

        let named = fields.iter().filter(|f| f.name.is_some()).count();
        if named != 0 && named != fields.len() {
            return Err(WireError::arguments(
                "Tuple",
                "elements must be either all named or all unnamed",
            ));
        }
        Ok(ColumnType::Tuple(fields))
    }
}
