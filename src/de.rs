//! Decoding of BSON bytes into a [`Bson`] value tree.

use crate::{
    bson::{Array, Bson, DbPointer, JavaScriptCodeWithScope, Regex, Timestamp},
    buffer::ByteBuffer,
    datetime::DateTime,
    error::{Error, Result},
    oid::ObjectId,
    registry,
    spec::BinarySubtype,
    Binary,
    Decimal128,
    Document,
};

// an empty document: the length prefix plus the trailing null byte
const MIN_BSON_DOCUMENT_SIZE: i32 = 4 + 1;

/// Decodes a document from the buffer, verifying that the bytes consumed
/// match the declared length prefix exactly. A mismatch in either direction
/// means the stream is truncated or the prefix is lying, and fails rather
/// than leaving the cursor somewhere undefined.
pub fn decode_document(buffer: &mut ByteBuffer) -> Result<Document> {
    let start = buffer.position();
    let declared = read_declared_length(buffer)?;

    let mut doc = Document::new();
    loop {
        let tag = buffer.get_byte()?;
        if tag == 0 {
            break;
        }

        let key = buffer.get_cstring()?;
        let value = decode_element(buffer, tag).map_err(|e| match (&e.key, e.index) {
            (None, None) => e.with_key(key.as_str()),
            _ => e,
        })?;
        doc.insert(key, value);
    }

    verify_declared_length(buffer.position() - start, declared)?;
    Ok(doc)
}

pub(crate) fn decode_embedded_document(buffer: &mut ByteBuffer) -> Result<Bson> {
    decode_document(buffer).map(Bson::Document)
}

// Wire-identical to a document. The index keys carry no information, so
// their content is not validated; elements are kept in stream order.
pub(crate) fn decode_array(buffer: &mut ByteBuffer) -> Result<Bson> {
    let start = buffer.position();
    let declared = read_declared_length(buffer)?;

    let mut array = Array::new();
    loop {
        let tag = buffer.get_byte()?;
        if tag == 0 {
            break;
        }

        let index = array.len();
        buffer.get_cstring()?;
        let value = decode_element(buffer, tag).map_err(|e| match (&e.key, e.index) {
            (None, None) => e.with_index(index),
            _ => e,
        })?;
        array.push(value);
    }

    verify_declared_length(buffer.position() - start, declared)?;
    Ok(Bson::Array(array))
}

fn decode_element(buffer: &mut ByteBuffer, tag: u8) -> Result<Bson> {
    let decoder = registry::resolve(tag)?;
    decoder(buffer)
}

fn read_declared_length(buffer: &mut ByteBuffer) -> Result<i32> {
    let declared = buffer.get_int32()?;
    if declared < MIN_BSON_DOCUMENT_SIZE {
        return Err(Error::malformed_value(format!(
            "document length {declared} is too small"
        )));
    }
    Ok(declared)
}

fn verify_declared_length(consumed: usize, declared: i32) -> Result<()> {
    if consumed != declared as usize {
        return Err(Error::malformed_value(format!(
            "declared length {declared} does not match consumed length {consumed}"
        )));
    }
    Ok(())
}

pub(crate) fn decode_double(buffer: &mut ByteBuffer) -> Result<Bson> {
    buffer.get_double().map(Bson::Double)
}

pub(crate) fn decode_string(buffer: &mut ByteBuffer) -> Result<Bson> {
    buffer.get_string().map(Bson::String)
}

pub(crate) fn decode_symbol(buffer: &mut ByteBuffer) -> Result<Bson> {
    buffer.get_string().map(Bson::Symbol)
}

pub(crate) fn decode_javascript_code(buffer: &mut ByteBuffer) -> Result<Bson> {
    buffer.get_string().map(Bson::JavaScriptCode)
}

pub(crate) fn decode_javascript_code_with_scope(buffer: &mut ByteBuffer) -> Result<Bson> {
    let start = buffer.position();
    let declared = buffer.get_int32()?;

    let code = buffer.get_string()?;
    let scope = decode_document(buffer)?;

    let consumed = buffer.position() - start;
    if consumed != declared as usize {
        return Err(Error::malformed_value(format!(
            "code with scope declared length {declared} does not match consumed length {consumed}"
        )));
    }

    Ok(Bson::JavaScriptCodeWithScope(JavaScriptCodeWithScope {
        code,
        scope,
    }))
}

pub(crate) fn decode_binary(buffer: &mut ByteBuffer) -> Result<Bson> {
    let declared = buffer.get_int32()?;
    if declared < 0 {
        return Err(Error::malformed_value(format!(
            "binary length {declared} is negative"
        )));
    }

    let subtype_byte = buffer.get_byte()?;
    let subtype = BinarySubtype::from(subtype_byte);
    if let BinarySubtype::Reserved(_) = subtype {
        return Err(Error::unsupported_binary_subtype(subtype_byte));
    }

    // the deprecated "old" subtype nests a second length field covering just
    // the payload
    let length = if subtype == BinarySubtype::BinaryOld {
        if declared < 4 {
            return Err(Error::malformed_value(format!(
                "old binary length {declared} cannot hold its nested length"
            )));
        }
        let nested = buffer.get_int32()?;
        if nested != declared - 4 {
            return Err(Error::malformed_value(format!(
                "old binary nested length {nested} does not match outer length {declared}"
            )));
        }
        nested
    } else {
        declared
    };

    let bytes = buffer.get_bytes(length as usize)?.to_vec();
    Ok(Bson::Binary(Binary { subtype, bytes }))
}

pub(crate) fn decode_object_id(buffer: &mut ByteBuffer) -> Result<Bson> {
    let mut bytes = [0u8; 12];
    bytes.copy_from_slice(buffer.get_bytes(12)?);
    Ok(Bson::ObjectId(ObjectId::from_bytes(bytes)))
}

pub(crate) fn decode_boolean(buffer: &mut ByteBuffer) -> Result<Bson> {
    match buffer.get_byte()? {
        0x00 => Ok(Bson::Boolean(false)),
        0x01 => Ok(Bson::Boolean(true)),
        other => Err(Error::malformed_value(format!(
            "invalid boolean value {other:#04x}"
        ))),
    }
}

pub(crate) fn decode_datetime(buffer: &mut ByteBuffer) -> Result<Bson> {
    buffer
        .get_int64()
        .map(|millis| Bson::DateTime(DateTime::from_millis(millis)))
}

pub(crate) fn decode_null(_buffer: &mut ByteBuffer) -> Result<Bson> {
    Ok(Bson::Null)
}

pub(crate) fn decode_undefined(_buffer: &mut ByteBuffer) -> Result<Bson> {
    Ok(Bson::Undefined)
}

pub(crate) fn decode_min_key(_buffer: &mut ByteBuffer) -> Result<Bson> {
    Ok(Bson::MinKey)
}

pub(crate) fn decode_max_key(_buffer: &mut ByteBuffer) -> Result<Bson> {
    Ok(Bson::MaxKey)
}

// The options are kept as read; canonical ordering is an encode-side
// guarantee.
pub(crate) fn decode_regex(buffer: &mut ByteBuffer) -> Result<Bson> {
    let pattern = buffer.get_cstring()?;
    let options = buffer.get_cstring()?;
    Ok(Bson::RegularExpression(Regex { pattern, options }))
}

pub(crate) fn decode_db_pointer(buffer: &mut ByteBuffer) -> Result<Bson> {
    let namespace = buffer.get_string()?;
    let mut bytes = [0u8; 12];
    bytes.copy_from_slice(buffer.get_bytes(12)?);
    Ok(Bson::DbPointer(DbPointer {
        namespace,
        id: ObjectId::from_bytes(bytes),
    }))
}

pub(crate) fn decode_int32(buffer: &mut ByteBuffer) -> Result<Bson> {
    buffer.get_int32().map(Bson::Int32)
}

pub(crate) fn decode_int64(buffer: &mut ByteBuffer) -> Result<Bson> {
    buffer.get_int64().map(Bson::Int64)
}

// The halves appear on the wire increment first, opposite their logical
// order.
pub(crate) fn decode_timestamp(buffer: &mut ByteBuffer) -> Result<Bson> {
    let increment = buffer.get_uint32()?;
    let time = buffer.get_uint32()?;
    Ok(Bson::Timestamp(Timestamp { time, increment }))
}

pub(crate) fn decode_decimal128(buffer: &mut ByteBuffer) -> Result<Bson> {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(buffer.get_bytes(16)?);
    Ok(Bson::Decimal128(Decimal128::from_bytes(bytes)))
}
