//! Type grammar parser using nom.
//!
//! Parses declared type strings into an untyped [`TypeDescriptor`] tree. Names
//! and parameter counts are not checked here; [`super::factory`] does that.
//!
//! # Grammar
//!
//! ```text
//! type    := ident [ '(' [ param (',' param)* ] ')' ]
//! param   := integer | ident WS type | type
//! columns := column (',' column)*
//! column  := (ident | '`' name '`') WS type
//! ```
//!
//! Examples: `Decimal(77, 10)`, `Array(Nullable(Decimal(110, 35)))`,
//! `Tuple(id UInt32, amount Decimal(100, 20), name String)`.

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, digit1, multispace0, multispace1},
    combinator::{map, map_res, opt, recognize},
    multi::{separated_list0, separated_list1},
    sequence::{delimited, pair, preceded, terminated},
};

use crate::config::DEFAULT_MAX_TYPE_DEPTH;
use crate::error::{WireError, WireResult};

/// A parsed but not yet validated type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub name: String,
    pub params: Vec<TypeParam>,
}

/// A parameter inside a type's parentheses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeParam {
    /// Numeric parameter, e.g. precision or scale.
    Int(i64),
    /// Nested type, optionally named (tuple members).
    Type {
        name: Option<String>,
        ty: TypeDescriptor,
    },
}

impl TypeDescriptor {
    /// A descriptor without parameters.
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
        }
    }
}

/// Parse a complete type string, nested at most [`DEFAULT_MAX_TYPE_DEPTH`] deep.
pub fn parse_descriptor(input: &str) -> WireResult<TypeDescriptor> {
    parse_descriptor_with(input, DEFAULT_MAX_TYPE_DEPTH)
}

/// Parse a complete type string, nested at most `max_depth` deep.
pub fn parse_descriptor_with(input: &str, max_depth: usize) -> WireResult<TypeDescriptor> {
    let input = input.trim();
    check_depth(input, max_depth)?;
    finish(input, type_expr(input))
}

/// Parse a column list: `name Type, name Type, ...`.
pub fn parse_column_list(
    input: &str,
    max_depth: usize,
) -> WireResult<Vec<(String, TypeDescriptor)>> {
    let input = input.trim();
    check_depth(input, max_depth)?;
    let parsed = separated_list1(
        char(','),
        delimited(multispace0, column_def, multispace0),
    )(input);
    finish(input, parsed)
}

/// Reject input whose parentheses nest deeper than `max_depth` before the
/// recursive grammar sees it. Backquoted column names are skipped.
fn check_depth(input: &str, max_depth: usize) -> WireResult<()> {
    let mut depth = 0usize;
    let mut quoted = false;
    for (pos, c) in input.char_indices() {
        match c {
            '`' => quoted = !quoted,
            '(' if !quoted => {
                depth += 1;
                if depth > max_depth {
                    return Err(WireError::syntax(
                        pos,
                        format!("Type nested deeper than {} levels", max_depth),
                    ));
                }
            }
            ')' if !quoted => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}

/// Convert a nom result into a crate result, rejecting trailing input.
fn finish<T>(input: &str, parsed: IResult<&str, T>) -> WireResult<T> {
    match parsed {
        Ok(("", value)) => Ok(value),
        Ok((remaining, _)) => Err(WireError::syntax(
            input.len() - remaining.len(),
            format!("Unexpected trailing content: '{}'", remaining),
        )),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(WireError::syntax(
            input.len() - e.input.len(),
            format!("Expected a type expression ({:?})", e.code),
        )),
        Err(nom::Err::Incomplete(_)) => Err(WireError::syntax(input.len(), "Unexpected end of input")),
    }
}

/// Parse an identifier (type name, tuple member name, column name).
fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))(input)
}

/// Parse a possibly negative integer.
fn integer(input: &str) -> IResult<&str, i64> {
    map_res(recognize(pair(opt(char('-')), digit1)), |s: &str| {
        s.parse::<i64>()
    })(input)
}

/// Parse a type expression with its optional parameter list.
fn type_expr(input: &str) -> IResult<&str, TypeDescriptor> {
    let (input, name) = identifier(input)?;
    let (input, params) = opt(preceded(
        preceded(multispace0, char('(')),
        terminated(
            separated_list0(char(','), delimited(multispace0, param, multispace0)),
            preceded(multispace0, char(')')),
        ),
    ))(input)?;

    Ok((
        input,
        TypeDescriptor {
            name: name.to_string(),
            params: params.unwrap_or_default(),
        },
    ))
}

/// Parse one parameter: an integer, a named member, or a bare type.
fn param(input: &str) -> IResult<&str, TypeParam> {
    alt((
        map(integer, TypeParam::Int),
        map(
            pair(terminated(identifier, multispace1), type_expr),
            |(name, ty)| TypeParam::Type {
                name: Some(name.to_string()),
                ty,
            },
        ),
        map(type_expr, |ty| TypeParam::Type { name: None, ty }),
    ))(input)
}

/// Parse a column name, bare or backquoted.
fn column_name(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('`'), take_while1(|c: char| c != '`'), char('`')),
        identifier,
    ))(input)
}

/// Parse `name Type`.
fn column_def(input: &str) -> IResult<&str, (String, TypeDescriptor)> {
    map(
        pair(terminated(column_name, multispace1), type_expr),
        |(name, ty)| (name.to_string(), ty),
    )(input)
}
