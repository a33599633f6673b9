//! Dynamic values flowing through the composite codec.
//!
//! A [`Value`] is the application-side form of one cell. Its variant set is
//! finite and matches the shapes [`ColumnType`] can describe, so the codec
//! dispatches on it with a plain `match`.

use std::fmt;

use serde_json::Value as Json;

use crate::decimal::Decimal;
use crate::error::{WireError, WireResult};
use crate::normalize::{self, RenderStyle};
use crate::types::{ColumnType, ScalarType};

/// One cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    String(String),
    Decimal(Decimal),
    Array(Vec<Value>),
    /// Key/value pairs in wire order. Keys are not deduplicated.
    Map(Vec<(Value, Value)>),
    Tuple(Vec<Value>),
    NamedTuple(Vec<(String, Value)>),
}

impl Value {
    /// Variant name, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::UInt(_) => "UInt",
            Value::String(_) => "String",
            Value::Decimal(_) => "Decimal",
            Value::Array(_) => "Array",
            Value::Map(_) => "Map",
            Value::Tuple(_) => "Tuple",
            Value::NamedTuple(_) => "NamedTuple",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_decimal(&self) -> Option<&Decimal> {
        match self {
            Value::Decimal(d) => Some(d),
            _ => None,
        }
    }

    /// Build a value for `ty` from JSON.
    ///
    /// Decimals are read from strings or JSON integers; JSON floats are
    /// rejected because they have already lost exactness. Maps accept either
    /// an object or an array of `[key, value]` pairs; only the latter keeps
    /// the caller's order.
    pub fn from_json(ty: &ColumnType, json: &Json) -> WireResult<Value> {
        if json.is_null() {
            return Ok(Value::Null);
        }

        match ty {
            ColumnType::Nullable(inner) => Value::from_json(inner, json),
            ColumnType::Decimal(spec) => match json {
                Json::String(s) => Ok(Value::Decimal(normalize::normalize(s.as_str())?)),
                Json::Number(n) => {
                    if let Some(i) = n.as_i64() {
                        Ok(Value::Decimal(normalize::normalize(i)?))
                    } else if let Some(u) = n.as_u64() {
                        Ok(Value::Decimal(normalize::normalize(u)?))
                    } else {
                        Err(WireError::TypeMismatch {
                            expected: spec.to_string(),
                            found: "Float",
                        })
                    }
                }
                other => Err(json_mismatch(ty, other)),
            },
            ColumnType::Scalar(scalar) => scalar_from_json(ty, scalar, json),
            ColumnType::Array(inner) => match json {
                Json::Array(items) => items
                    .iter()
                    .map(|item| Value::from_json(inner, item))
                    .collect::<WireResult<Vec<_>>>()
                    .map(Value::Array),
                other => Err(json_mismatch(ty, other)),
            },
            ColumnType::Map(key_ty, value_ty) => match json {
                Json::Object(entries) => entries
                    .iter()
                    .map(|(k, v)| -> WireResult<(Value, Value)> {
                        Ok((
                            Value::from_json(key_ty, &Json::String(k.clone()))?,
                            Value::from_json(value_ty, v)?,
                        ))
                    })
                    .collect::<WireResult<Vec<_>>>()
                    .map(Value::Map),
                Json::Array(pairs) => pairs
                    .iter()
                    .map(|pair| -> WireResult<(Value, Value)> {
                        match pair.as_array().map(Vec::as_slice) {
                            Some([k, v]) => Ok((
                                Value::from_json(key_ty, k)?,
                                Value::from_json(value_ty, v)?,
                            )),
                            _ => Err(json_mismatch(ty, pair)),
                        }
                    })
                    .collect::<WireResult<Vec<_>>>()
                    .map(Value::Map),
                other => Err(json_mismatch(ty, other)),
            },
            ColumnType::Tuple(fields) => match json {
                Json::Array(items) => {
                    if items.len() != fields.len() {
                        return Err(WireError::ArityMismatch {
                            expected: fields.len(),
                            found: items.len(),
                        });
                    }
                    fields
                        .iter()
                        .zip(items)
                        .map(|(field, item)| Value::from_json(&field.ty, item))
                        .collect::<WireResult<Vec<_>>>()
                        .map(Value::Tuple)
                }
                Json::Object(members) if ty.is_named_tuple() => {
                    if let Some(unknown) = members
                        .keys()
                        .find(|key| !fields.iter().any(|f| f.name.as_ref() == Some(*key)))
                    {
                        return Err(WireError::TypeMismatch {
                            expected: format!("member of {} (got '{}')", ty, unknown),
                            found: "Object",
                        });
                    }
                    fields
                        .iter()
                        .map(|field| -> WireResult<(String, Value)> {
                            let name = field.name.clone().unwrap_or_default();
                            let value = match members.get(&name) {
                                Some(json) => Value::from_json(&field.ty, json)?,
                                None => Value::Null,
                            };
                            Ok((name, value))
                        })
                        .collect::<WireResult<Vec<_>>>()
                        .map(Value::NamedTuple)
                }
                other => Err(json_mismatch(ty, other)),
            },
        }
    }

    /// Convert to JSON. Decimals become strings in `style`; maps become
    /// arrays of `[key, value]` pairs.
    pub fn to_json(&self, style: RenderStyle) -> Json {
        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(i) => Json::from(*i),
            Value::UInt(u) => Json::from(*u),
            Value::String(s) => Json::String(s.clone()),
            Value::Decimal(d) => Json::String(normalize::render(d, style)),
            Value::Array(items) | Value::Tuple(items) => {
                Json::Array(items.iter().map(|v| v.to_json(style)).collect())
            }
            Value::Map(pairs) => Json::Array(
                pairs
                    .iter()
                    .map(|(k, v)| Json::Array(vec![k.to_json(style), v.to_json(style)]))
                    .collect(),
            ),
            Value::NamedTuple(members) => Json::Object(
                members
                    .iter()
                    .map(|(name, v)| (name.clone(), v.to_json(style)))
                    .collect(),
            ),
        }
    }
}

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "Null",
        Json::Bool(_) => "Bool",
        Json::Number(_) => "Number",
        Json::String(_) => "String",
        Json::Array(_) => "Array",
        Json::Object(_) => "Object",
    }
}

fn json_mismatch(ty: &ColumnType, json: &Json) -> WireError {
    WireError::TypeMismatch {
        expected: ty.to_string(),
        found: json_kind(json),
    }
}

fn scalar_from_json(ty: &ColumnType, scalar: &ScalarType, json: &Json) -> WireResult<Value> {
    match (scalar, json) {
        (ScalarType::Bool, Json::Bool(b)) => Ok(Value::Bool(*b)),
        (ScalarType::String, Json::String(s)) => Ok(Value::String(s.clone())),
        (
            ScalarType::Int8 | ScalarType::Int16 | ScalarType::Int32 | ScalarType::Int64,
            Json::Number(n),
        ) => n.as_i64().map(Value::Int).ok_or_else(|| WireError::IntegerOutOfRange {
            type_name: scalar.name().to_string(),
            value: n.to_string(),
        }),
        (
            ScalarType::UInt8 | ScalarType::UInt16 | ScalarType::UInt32 | ScalarType::UInt64,
            Json::Number(n),
        ) => n.as_u64().map(Value::UInt).ok_or_else(|| WireError::IntegerOutOfRange {
            type_name: scalar.name().to_string(),
            value: n.to_string(),
        }),
        // Map keys arrive as object keys, i.e. strings.
        (
            ScalarType::Int8 | ScalarType::Int16 | ScalarType::Int32 | ScalarType::Int64,
            Json::String(s),
        ) => s.parse().map(Value::Int).map_err(|_| json_mismatch(ty, json)),
        (
            ScalarType::UInt8 | ScalarType::UInt16 | ScalarType::UInt32 | ScalarType::UInt64,
            Json::String(s),
        ) => s.parse().map(Value::UInt).map_err(|_| json_mismatch(ty, json)),
        (ScalarType::Other(name), _) => Err(WireError::UnsupportedType(name.clone())),
        _ => Err(json_mismatch(ty, json)),
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Rendered(self, RenderStyle::Scaled), f)
    }
}

/// Text form of a value with decimals printed in a given style.
pub struct Rendered<'a>(pub &'a Value, pub RenderStyle);

impl Rendered<'_> {
    fn list(&self, f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", Rendered(item, self.1))?;
        }
        Ok(())
    }
}

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let style = self.1;
        match self.0 {
            Value::Null => f.write_str("NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::UInt(u) => write!(f, "{}", u),
            Value::String(s) => write!(f, "'{}'", s.replace('\'', "\\'")),
            Value::Decimal(d) => f.write_str(&normalize::render(d, style)),
            Value::Array(items) => {
                f.write_str("[")?;
                self.list(f, items)?;
                f.write_str("]")
            }
            Value::Tuple(items) => {
                f.write_str("(")?;
                self.list(f, items)?;
                f.write_str(")")
            }
            Value::Map(pairs) => {
                f.write_str("{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", Rendered(k, style), Rendered(v, style))?;
                }
                f.write_str("}")
            }
            Value::NamedTuple(members) => {
                f.write_str("(")?;
                for (i, (name, v)) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", name, Rendered(v, style))?;
                }
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dec(s: &str) -> Value {
        Value::Decimal(s.parse().unwrap())
    }

    #[test]
    fn test_decimal_from_json() {
        let ty = ColumnType::parse("Decimal(80, 10)").unwrap();
        assert_eq!(Value::from_json(&ty, &json!("-1.25")).unwrap(), dec("-1.25"));
        assert_eq!(Value::from_json(&ty, &json!(42)).unwrap(), dec("42"));
        assert!(matches!(
            Value::from_json(&ty, &json!(1.5)),
            Err(WireError::TypeMismatch { found: "Float", .. })
        ));
        assert!(matches!(
            Value::from_json(&ty, &json!("1e5")),
            Err(WireError::MalformedDecimalLiteral(_))
        ));
    }

    #[test]
    fn test_composite_from_json() {
        let ty = ColumnType::parse(
            "Tuple(amounts Array(Nullable(Decimal(95, 20))), prices Map(String, Decimal(85, 18)))",
        )
        .unwrap();
        let value = Value::from_json(
            &ty,
            &json!({
                "amounts": ["1.5", null, "-2"],
                "prices": [["b", "2"], ["a", "1"]]
            }),
        )
        .unwrap();
        assert_eq!(
            value,
            Value::NamedTuple(vec![
                (
                    "amounts".to_string(),
                    Value::Array(vec![dec("1.5"), Value::Null, dec("-2")])
                ),
                (
                    "prices".to_string(),
                    Value::Map(vec![
                        (Value::from("b"), dec("2")),
                        (Value::from("a"), dec("1")),
                    ])
                ),
            ])
        );
    }

    #[test]
    fn test_unknown_member_from_json() {
        let ty = ColumnType::parse("Tuple(amount Nullable(Decimal(80, 2)), note String)").unwrap();
        let err = Value::from_json(&ty, &json!({"amonut": "1.50", "note": "x"})).unwrap_err();
        assert!(matches!(err, WireError::TypeMismatch { found: "Object", .. }));
        assert!(err.to_string().contains("'amonut'"));

        assert_eq!(
            Value::from_json(&ty, &json!({"note": "x"})).unwrap(),
            Value::NamedTuple(vec![
                ("amount".to_string(), Value::Null),
                ("note".to_string(), Value::from("x")),
            ])
        );
    }

    #[test]
    fn test_tuple_arity_from_json() {
        let ty = ColumnType::parse("Tuple(String, Decimal(10, 2))").unwrap();
        assert!(matches!(
            Value::from_json(&ty, &json!(["x"])),
            Err(WireError::ArityMismatch { expected: 2, found: 1 })
        ));
    }

    #[test]
    fn test_map_integer_keys_from_object() {
        let ty = ColumnType::parse("Map(UInt32, Decimal(10, 2))").unwrap();
        let value = Value::from_json(&ty, &json!({"7": "1.5"})).unwrap();
        assert_eq!(value, Value::Map(vec![(Value::UInt(7), dec("1.5"))]));
    }

    #[test]
    fn test_to_json() {
        let value = Value::Tuple(vec![
            Value::Array(vec![Value::Decimal("1.50".parse().unwrap()), Value::Null]),
            Value::Map(vec![(Value::from("k"), Value::Int(-1))]),
        ]);
        assert_eq!(
            value.to_json(RenderStyle::Scaled),
            json!([["1.50", null], [["k", -1]]])
        );
        assert_eq!(
            value.to_json(RenderStyle::Trimmed),
            json!([["1.5", null], [["k", -1]]])
        );
    }

    #[test]
    fn test_display() {
        let value = Value::NamedTuple(vec![
            ("a".to_string(), Value::Array(vec![Value::Null, Value::Int(1)])),
            ("b".to_string(), Value::from("x")),
        ]);
        assert_eq!(value.to_string(), "(a: [NULL, 1], b: 'x')");

        let decimals = Value::Map(vec![(Value::from("k"), dec("2.500"))]);
        assert_eq!(decimals.to_string(), "{'k': 2.500}");
        assert_eq!(Rendered(&decimals, RenderStyle::Trimmed).to_string(), "{'k': 2.5}");
    }
}
