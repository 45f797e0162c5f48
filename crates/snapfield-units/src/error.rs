//! Errors from unit parsing, conversion and array arithmetic.

use std::error::Error;
use std::fmt;

/// Errors raised by the unit subsystem.
#[derive(Clone, Debug, PartialEq)]
pub enum UnitError {
    /// An expression referenced a symbol the registry does not define.
    UnknownSymbol {
        /// The unresolved symbol.
        symbol: String,
    },
    /// An expression could not be parsed.
    Syntax {
        /// The full expression.
        expr: String,
        /// Byte offset of the offending token.
        position: usize,
        /// What the parser expected.
        reason: String,
    },
    /// A conversion or addition between units of different dimensions.
    Incompatible {
        /// Source unit label and dimensions.
        from: String,
        /// Target unit label and dimensions.
        to: String,
    },
    /// Two arrays have incompatible shapes for an elementwise operation.
    ShapeMismatch {
        /// `(rows, components)` of the left operand.
        left: (usize, u32),
        /// `(rows, components)` of the right operand.
        right: (usize, u32),
    },
    /// A flat buffer cannot be split into rows of the given width.
    Ragged {
        /// Number of values in the buffer.
        len: usize,
        /// Requested components per row.
        components: u32,
    },
    /// A column index beyond the array's component count.
    ComponentOutOfRange {
        /// The requested column.
        index: u32,
        /// Components per row.
        components: u32,
    },
    /// A registry symbol was defined twice.
    DuplicateSymbol {
        /// The repeated symbol.
        symbol: String,
    },
    /// Concatenation was asked to join zero arrays.
    EmptyConcat,
    /// Combining units pushed a dimension exponent outside `i8`.
    ExponentOverflow {
        /// The expression that overflowed.
        expr: String,
    },
}

impl fmt::Display for UnitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownSymbol { symbol } => write!(f, "unknown unit symbol '{symbol}'"),
            Self::Syntax {
                expr,
                position,
                reason,
            } => write!(f, "invalid unit expression '{expr}' at {position}: {reason}"),
            Self::Incompatible { from, to } => {
                write!(f, "cannot convert {from} to {to}")
            }
            Self::ShapeMismatch { left, right } => write!(
                f,
                "shape mismatch: {}x{} vs {}x{}",
                left.0, left.1, right.0, right.1
            ),
            Self::Ragged { len, components } => {
                write!(f, "{len} values cannot be split into rows of {components}")
            }
            Self::ComponentOutOfRange { index, components } => {
                write!(f, "component {index} out of range (array has {components})")
            }
            Self::DuplicateSymbol { symbol } => {
                write!(f, "unit symbol '{symbol}' is already defined")
            }
            Self::EmptyConcat => write!(f, "cannot concatenate zero arrays"),
            Self::ExponentOverflow { expr } => {
                write!(f, "dimension exponent out of range in '{expr}'")
            }
        }
    }
}

impl Error for UnitError {}
