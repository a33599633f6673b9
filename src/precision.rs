//! Storage width selection for `Decimal(P, S)` columns.
//!
//! The database stores a decimal as a signed integer coefficient whose width is
//! picked from the precision alone:
//!
//! | Precision | Width    |
//! |-----------|----------|
//! | 1..=9     | 32 bits  |
//! | 10..=18   | 64 bits  |
//! | 19..=38   | 128 bits |
//! | 39..=76   | 256 bits |
//! | 77..=154  | 512 bits |

use std::fmt;

use tracing::debug;

use crate::error::{WireError, WireResult};

/// Highest precision this driver can store (512-bit coefficients).
pub const MAX_PRECISION: u32 = 154;

/// Highest precision representable without 512-bit storage.
pub const MAX_PRECISION_256: u32 = 76;

/// Physical width of a decimal coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DecimalWidth {
    W32,
    W64,
    W128,
    W256,
    W512,
}

impl DecimalWidth {
    const ALL: [DecimalWidth; 5] = [
        DecimalWidth::W32,
        DecimalWidth::W64,
        DecimalWidth::W128,
        DecimalWidth::W256,
        DecimalWidth::W512,
    ];

    /// Smallest width that holds `precision` digits, if any.
    pub fn for_precision(precision: u32) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|w| precision <= w.max_precision())
    }

    /// Number of bits.
    pub fn bits(self) -> u32 {
        match self {
            DecimalWidth::W32 => 32,
            DecimalWidth::W64 => 64,
            DecimalWidth::W128 => 128,
            DecimalWidth::W256 => 256,
            DecimalWidth::W512 => 512,
        }
    }

    /// Number of bytes on the wire.
    pub fn bytes(self) -> usize {
        self.bits() as usize / 8
    }

    /// Largest precision stored at this width.
    pub fn max_precision(self) -> u32 {
        match self {
            DecimalWidth::W32 => 9,
            DecimalWidth::W64 => 18,
            DecimalWidth::W128 => 38,
            DecimalWidth::W256 => 76,
            DecimalWidth::W512 => 154,
        }
    }
}

impl fmt::Display for DecimalWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Decimal{}", self.bits())
    }
}

/// Validated precision, scale and storage width of a decimal column.
///
/// Immutable once built; owned by the column type that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecimalSpec {
    precision: u32,
    scale: u32,
    width: DecimalWidth,
}

impl DecimalSpec {
    /// Shorthand for [`resolve`] with unsigned arguments.
    pub fn new(precision: u32, scale: u32) -> WireResult<Self> {
        resolve(i64::from(precision), i64::from(scale))
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn width(&self) -> DecimalWidth {
        self.width
    }

    /// Digits left of the decimal point.
    pub fn integer_digits(&self) -> u32 {
        self.precision - self.scale
    }
}

impl fmt::Display for DecimalSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Decimal({}, {})", self.precision, self.scale)
    }
}

/// Resolve a `(precision, scale)` pair, as written in a type string, to a spec.
///
/// Arguments are signed so that negative values from the type text reach the
/// range checks instead of failing in the parser.
pub fn resolve(precision: i64, scale: i64) -> WireResult<DecimalSpec> {
    if !(1..=i64::from(MAX_PRECISION)).contains(&precision) {
        return Err(WireError::InvalidPrecision {
            precision,
            max: MAX_PRECISION,
        });
    }
    if scale < 0 || scale > precision {
        return Err(WireError::InvalidScale { scale, precision });
    }

    // Range-checked above.
    let precision = precision as u32;
    let scale = scale as u32;
    let width = DecimalWidth::for_precision(precision).ok_or(WireError::InvalidPrecision {
        precision: i64::from(precision),
        max: MAX_PRECISION,
    })?;

    debug!(precision, scale, bits = width.bits(), "resolved decimal width");
    Ok(DecimalSpec {
        precision,
        scale,
        width,
    })
}
