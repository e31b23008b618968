//! Errors that can occur in the crate.

mod decimal128;
mod oid;
mod uuid;
mod value_access;

use thiserror::Error;

pub use self::{
    decimal128::Decimal128ErrorKind,
    oid::ObjectIdErrorKind,
    uuid::UuidErrorKind,
    value_access::ValueAccessErrorKind,
};

/// The result type for all methods that can return an error in the `bsonkit` crate.
pub type Result<T> = std::result::Result<T, Error>;

/// An error that can occur in the `bsonkit` crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,

    /// The document key associated with the error, if any.
    pub key: Option<String>,

    /// The array index associated with the error, if any.
    pub index: Option<usize>,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(key) = self.key.as_deref() {
            write!(f, "Error at key \"{key}\": ")?;
        } else if let Some(index) = self.index {
            write!(f, "Error at array index {index}: ")?;
        }

        write!(f, "{}", self.kind)
    }
}

/// The types of errors that can occur in the `bsonkit` crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Malformed BSON bytes were encountered.
    #[error("Malformed BSON: {message}")]
    #[non_exhaustive]
    MalformedValue { message: String },

    /// Invalid UTF-8 bytes were encountered.
    #[error("Invalid UTF-8")]
    Utf8Encoding,

    /// A cstring contained an embedded null byte.
    #[error("cstrings cannot contain a null byte")]
    EmbeddedNullByte,

    /// A numeric value was outside of the representable range.
    #[error("Value out of range: {message}")]
    #[non_exhaustive]
    OutOfRange { message: String },

    /// A document key was rejected by key validation.
    #[error("Invalid document key: {message}")]
    #[non_exhaustive]
    InvalidKey { message: String },

    /// An unknown type discriminator was encountered during decoding.
    #[error("Unsupported BSON element type {tag:#04x}")]
    #[non_exhaustive]
    UnsupportedType { tag: u8 },

    /// A binary subtype in the reserved-but-unassigned range was encountered
    /// during decoding.
    #[error("Unsupported binary subtype {subtype:#04x}")]
    #[non_exhaustive]
    UnsupportedBinarySubtype { subtype: u8 },

    /// An error occurred while working with the [`ObjectId`](crate::oid::ObjectId) type.
    #[error("An ObjectId-related error occurred: {kind}")]
    #[non_exhaustive]
    ObjectId {
        /// The kind of error that occurred.
        kind: ObjectIdErrorKind,
    },

    /// An error occurred while working with the [`Uuid`](crate::Uuid) type.
    #[error("A UUID-related error occurred: {kind}")]
    #[non_exhaustive]
    Uuid {
        /// The kind of error that occurred.
        kind: UuidErrorKind,
    },

    /// An error occurred while working with the [`Decimal128`](crate::Decimal128) type.
    #[error("A Decimal128-related error occurred: {kind}")]
    #[non_exhaustive]
    Decimal128 {
        /// The kind of error that occurred.
        kind: Decimal128ErrorKind,
    },

    /// Invalid extended JSON was encountered.
    #[error("Invalid extended JSON: {message}")]
    #[non_exhaustive]
    ExtJsonParse { message: String },

    /// An error occurred when attempting to access a value in a document.
    #[error("An error occurred when attempting to access a document value: {kind}")]
    #[non_exhaustive]
    ValueAccess {
        /// The kind of error that occurred.
        kind: ValueAccessErrorKind,
    },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self {
            kind,
            key: None,
            index: None,
        }
    }
}

impl Error {
    pub(crate) fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub(crate) fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub(crate) fn malformed_value(message: impl ToString) -> Self {
        ErrorKind::MalformedValue {
            message: message.to_string(),
        }
        .into()
    }

    pub(crate) fn out_of_range(message: impl ToString) -> Self {
        ErrorKind::OutOfRange {
            message: message.to_string(),
        }
        .into()
    }

    pub(crate) fn invalid_key(message: impl ToString) -> Self {
        ErrorKind::InvalidKey {
            message: message.to_string(),
        }
        .into()
    }

    pub(crate) fn unsupported_type(tag: u8) -> Self {
        ErrorKind::UnsupportedType { tag }.into()
    }

    pub(crate) fn unsupported_binary_subtype(subtype: u8) -> Self {
        ErrorKind::UnsupportedBinarySubtype { subtype }.into()
    }

    pub(crate) fn ext_json_parse(message: impl ToString) -> Self {
        ErrorKind::ExtJsonParse {
            message: message.to_string(),
        }
        .into()
    }
}
