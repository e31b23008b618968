use thiserror::Error as ThisError;

use crate::error::{Error, ErrorKind};

/// The kinds of errors that can occur when working with the
/// [`Decimal128`](crate::Decimal128) type.
#[derive(Clone, Debug, ThisError)]
#[non_exhaustive]
pub enum Decimal128ErrorKind {
    /// A string that does not match the decimal format was provided.
    #[error("invalid decimal string: {message}")]
    #[non_exhaustive]
    InvalidString {
        /// A message describing the error.
        message: String,
    },

    /// The exponent was outside of the representable range.
    #[error("exponent out of range")]
    InvalidRange,

    /// The coefficient had more significant digits than can be represented.
    #[error("unrepresentable precision: more than 34 significant digits")]
    UnrepresentablePrecision,
}

impl Error {
    pub(crate) fn decimal128(kind: Decimal128ErrorKind) -> Self {
        ErrorKind::Decimal128 { kind }.into()
    }

    pub(crate) fn decimal128_invalid_string(message: impl ToString) -> Self {
        Self::decimal128(Decimal128ErrorKind::InvalidString {
            message: message.to_string(),
        })
    }
}
