//! Error types for chwire.

use thiserror::Error;

/// The main error type for type parsing, encoding and decoding.
#[derive(Debug, Error)]
pub enum WireError {
    /// Precision outside `1..=max`.
    #[error("Invalid precision {precision}: must be between 1 and {max}")]
    InvalidPrecision { precision: i64, max: u32 },

    /// Scale negative or larger than the precision.
    #[error("Invalid scale {scale}: must be between 0 and precision {precision}")]
    InvalidScale { scale: i64, precision: i64 },

    /// String input does not match `[+-]digits[.digits]`.
    #[error("Malformed decimal literal: '{0}'")]
    MalformedDecimalLiteral(String),

    /// Value needs more significant digits than the column allows.
    #[error("Value has {digits} significant digits at this scale, column precision is {precision}")]
    MagnitudeOverflow { digits: usize, precision: u32 },

    /// Coefficient does not fit the signed storage integer.
    #[error("Coefficient does not fit in a signed {width}-bit integer")]
    CoefficientOverflow { width: u32 },

    /// Value carries nonzero digits beyond the column scale.
    #[error("Value has {fractional_digits} fractional digits, column scale is {scale}")]
    ScaleMismatch { fractional_digits: u32, scale: u32 },

    /// NULL against a non-nullable shape.
    #[error("Unexpected NULL for non-nullable {expected}")]
    UnexpectedNull { expected: String },

    /// Element count differs from what the shape or length prefix implies.
    #[error("Arity mismatch: expected {expected} elements, found {found}")]
    ArityMismatch { expected: usize, found: usize },

    /// Value variant does not fit the column shape.
    #[error("Type mismatch: expected {expected}, got {found}")]
    TypeMismatch { expected: String, found: &'static str },

    /// Failed to parse a type string.
    #[error("Type syntax error at position {position}: {message}")]
    TypeSyntax { position: usize, message: String },

    /// Known type name with the wrong parameters.
    #[error("Invalid arguments for {type_name}: {message}")]
    InvalidTypeArguments { type_name: String, message: String },

    /// Leaf type the leaf codec cannot handle.
    #[error("Unsupported type: '{0}'")]
    UnsupportedType(String),

    /// Integer leaf value outside the leaf's range.
    #[error("Value {value} out of range for {type_name}")]
    IntegerOutOfRange { type_name: String, value: String },

    /// Scalar read past the end of the input.
    #[error("Unexpected end of input: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    /// Length prefix above the configured limit.
    #[error("Collection length {len} exceeds limit {limit}")]
    CollectionTooLarge { len: u64, limit: usize },

    /// Malformed bytes that no valid encoder produces.
    #[error("Corrupted input: {0}")]
    Corrupted(String),

    /// Failure while encoding or decoding a batch, with its location.
    #[error("Row {row}, column '{column}': {source}")]
    AtRow {
        row: usize,
        column: String,
        #[source]
        source: Box<WireError>,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WireError {
    /// Create a type syntax error at the given position.
    pub fn syntax(position: usize, message: impl Into<String>) -> Self {
        Self::TypeSyntax {
            position,
            message: message.into(),
        }
    }

    /// Create an invalid-arguments error for a named type.
    pub fn arguments(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidTypeArguments {
            type_name: type_name.into(),
            message: message.into(),
        }
    }

    /// Attach batch coordinates to an error.
    pub fn at_row(self, row: usize, column: impl Into<String>) -> Self {
        Self::AtRow {
            row,
            column: column.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, with batch coordinates stripped.
    pub fn root_cause(&self) -> &WireError {
        match self {
            WireError::AtRow { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Result type alias for chwire operations.
pub type WireResult<T> = Result<T, WireError>;
