//! The dispatch table used during decoding.
//!
//! Each element type's discriminator byte resolves to the decoder for that
//! type's payload. The table is closed: the set of BSON element types is
//! fixed by the specification, so a static match replaces a runtime
//! registration table and an unknown discriminator is always an error.

use crate::{
    bson::Bson,
    buffer::ByteBuffer,
    de,
    error::{Error, Result},
    spec::ElementType,
};

/// A decoder for the payload of a single element type. The discriminator
/// byte and element key have already been consumed when one of these runs.
pub(crate) type Decoder = fn(&mut ByteBuffer) -> Result<Bson>;

/// Resolves a discriminator byte to its payload decoder, failing with
/// [`ErrorKind::UnsupportedType`](crate::error::ErrorKind) for a byte that
/// does not name an element type. The caller attaches the field name or
/// array index it was reading to the error.
pub(crate) fn resolve(tag: u8) -> Result<Decoder> {
    let element_type = ElementType::from(tag).ok_or_else(|| Error::unsupported_type(tag))?;

    Ok(match element_type {
        ElementType::Double => de::decode_double,
        ElementType::String => de::decode_string,
        ElementType::EmbeddedDocument => de::decode_embedded_document,
        ElementType::Array => de::decode_array,
        ElementType::Binary => de::decode_binary,
        ElementType::Undefined => de::decode_undefined,
        ElementType::ObjectId => de::decode_object_id,
        ElementType::Boolean => de::decode_boolean,
        ElementType::DateTime => de::decode_datetime,
        ElementType::Null => de::decode_null,
        ElementType::RegularExpression => de::decode_regex,
        ElementType::DbPointer => de::decode_db_pointer,
        ElementType::JavaScriptCode => de::decode_javascript_code,
        ElementType::Symbol => de::decode_symbol,
        ElementType::JavaScriptCodeWithScope => de::decode_javascript_code_with_scope,
        ElementType::Int32 => de::decode_int32,
        ElementType::Timestamp => de::decode_timestamp,
        ElementType::Int64 => de::decode_int64,
        ElementType::Decimal128 => de::decode_decimal128,
        ElementType::MaxKey => de::decode_max_key,
        ElementType::MinKey => de::decode_min_key,
    })
}
