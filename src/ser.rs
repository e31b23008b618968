//! Encoding of a [`Bson`] value tree into BSON bytes.

use crate::{
    bson::{Bson, JavaScriptCodeWithScope, Timestamp},
    buffer::ByteBuffer,
    error::Result,
    spec::BinarySubtype,
    Binary,
    Document,
};

/// Encodes a document into the buffer: a length prefix covering the whole
/// span including itself, each element as discriminator byte + cstring key +
/// payload in insertion order, and a trailing null byte. The length prefix
/// is reserved up front and patched once the span is known.
pub fn encode_document(buffer: &mut ByteBuffer, doc: &Document) -> Result<()> {
    let start = buffer.len();
    buffer.put_int32(0);

    for (key, value) in doc {
        encode_element(buffer, key, value).map_err(|e| match e.key {
            Some(_) => e,
            None => e.with_key(key.as_str()),
        })?;
    }

    buffer.put_byte(0);
    buffer.replace_int32(start, (buffer.len() - start) as i32);
    Ok(())
}

// Wire-identical to a document; the keys are the decimal renderings of each
// element's index.
fn encode_array(buffer: &mut ByteBuffer, array: &[Bson]) -> Result<()> {
    let start = buffer.len();
    buffer.put_int32(0);

    for (index, value) in array.iter().enumerate() {
        encode_element(buffer, &index.to_string(), value)
            .map_err(|e| e.with_index(index))?;
    }

    buffer.put_byte(0);
    buffer.replace_int32(start, (buffer.len() - start) as i32);
    Ok(())
}

fn encode_element(buffer: &mut ByteBuffer, key: &str, value: &Bson) -> Result<()> {
    buffer.put_byte(value.element_type() as u8);
    buffer.put_cstring(key)?;
    encode_value(buffer, value)
}

fn encode_value(buffer: &mut ByteBuffer, value: &Bson) -> Result<()> {
    match value {
        Bson::Double(v) => buffer.put_double(*v),
        Bson::String(v) => buffer.put_string(v),
        Bson::Array(v) => encode_array(buffer, v)?,
        Bson::Document(v) => encode_document(buffer, v)?,
        Bson::Boolean(v) => buffer.put_byte(if *v { 0x01 } else { 0x00 }),
        Bson::Null => {}
        Bson::RegularExpression(regex) => {
            buffer.put_cstring(&regex.pattern)?;
            buffer.put_cstring(&regex.canonical_options())?;
        }
        Bson::JavaScriptCode(code) => buffer.put_string(code),
        Bson::JavaScriptCodeWithScope(JavaScriptCodeWithScope { code, scope }) => {
            let start = buffer.len();
            buffer.put_int32(0);
            buffer.put_string(code);
            encode_document(buffer, scope)?;
            buffer.replace_int32(start, (buffer.len() - start) as i32);
        }
        Bson::Int32(v) => buffer.put_int32(*v),
        Bson::Int64(v) => buffer.put_int64(*v),
        // the timestamp halves are written increment first, opposite their
        // logical order
        Bson::Timestamp(Timestamp { time, increment }) => {
            buffer.put_uint32(*increment);
            buffer.put_uint32(*time);
        }
        Bson::Binary(Binary { subtype, bytes }) => {
            let len = if *subtype == BinarySubtype::BinaryOld {
                bytes.len() + 4
            } else {
                bytes.len()
            };

            buffer.put_int32(len as i32);
            buffer.put_byte((*subtype).into());

            // the deprecated "old" subtype carries a second length covering
            // just the payload
            if *subtype == BinarySubtype::BinaryOld {
                buffer.put_int32(bytes.len() as i32);
            }

            buffer.put_bytes(bytes);
        }
        Bson::ObjectId(id) => buffer.put_bytes(&id.bytes()),
        Bson::DateTime(dt) => buffer.put_int64(dt.timestamp_millis()),
        Bson::Symbol(v) => buffer.put_string(v),
        Bson::Decimal128(d) => buffer.put_bytes(&d.bytes()),
        Bson::Undefined | Bson::MinKey | Bson::MaxKey => {}
        Bson::DbPointer(pointer) => {
            buffer.put_string(&pointer.namespace);
            buffer.put_bytes(&pointer.id.bytes());
        }
    }

    Ok(())
}
