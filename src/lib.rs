//! BSON, short for Binary JSON, is a binary-encoded serialization of
//! JSON-like documents: zero or more ordered key/value pairs stored as a
//! single entity. This crate converts an in-memory tree of typed values
//! ([`Bson`]) to and from the binary encoding, and to and from
//! [extended JSON](https://www.mongodb.com/docs/manual/reference/mongodb-extended-json/),
//! a JSON-compatible text form that preserves BSON's richer type
//! information.
//!
//! ## Basic usage
//!
//! ```rust
//! use bsonkit::{doc, Document};
//!
//! let doc = doc! {
//!     "name": "Jane Doe",
//!     "age": 34,
//! };
//!
//! let bytes = doc.to_vec()?;
//! let round_tripped = Document::from_slice(&bytes)?;
//! assert_eq!(round_tripped, doc);
//! # Ok::<(), bsonkit::Error>(())
//! ```
//!
//! ## Extended JSON
//!
//! ```rust
//! use bsonkit::{bson, extjson, ExtJsonMode};
//!
//! let value = bson!({ "count": 300i64 });
//! let text = extjson::to_string(&value, ExtJsonMode::Canonical)?;
//! assert_eq!(text, r#"{"count":{"$numberLong":"300"}}"#);
//! assert_eq!(extjson::parse(&text, ExtJsonMode::Canonical)?, value);
//! # Ok::<(), bsonkit::Error>(())
//! ```

mod base64;
mod registry;

#[macro_use]
mod macros;
mod binary;
mod bson;
mod buffer;
mod datetime;
pub mod de;
mod decimal128;
mod document;
pub mod error;
pub mod extjson;
pub mod oid;
pub mod ser;
pub mod spec;
mod uuid;

pub use self::{
    binary::Binary,
    bson::{Array, Bson, DbPointer, JavaScriptCodeWithScope, Regex, Timestamp},
    buffer::ByteBuffer,
    datetime::DateTime,
    de::decode_document,
    decimal128::Decimal128,
    document::Document,
    error::{Error, ErrorKind, Result},
    extjson::ExtJsonMode,
    oid::ObjectId,
    ser::encode_document,
    uuid::{Uuid, UuidRepresentation},
};
