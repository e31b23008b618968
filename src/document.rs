//! A BSON document represented as an associative map with insertion ordering.

use std::fmt::{self, Debug, Display, Formatter};

use ahash::RandomState;
use indexmap::IndexMap;

use crate::{
    bson::{Array, Bson, Timestamp},
    buffer::ByteBuffer,
    datetime::DateTime,
    error::{Error, Result},
    oid::ObjectId,
    spec::{BinarySubtype, ElementType},
    Decimal128,
};

/// A BSON document, an ordered mapping from UTF-8 string keys to [`Bson`]
/// values. Insertion order is preserved and is significant: two documents
/// with the same entries in a different order encode to different bytes.
///
/// Inserting under an existing key overwrites the previous value in place;
/// the same applies field-by-field while decoding, so a byte stream carrying
/// duplicate keys decodes to the last occurrence of each.
#[derive(Clone, PartialEq, Default)]
pub struct Document {
    inner: IndexMap<String, Bson, RandomState>,
}

impl Display for Document {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> fmt::Result {
        fmt.write_str("{")?;

        let mut first = true;
        for (k, v) in self {
            if first {
                first = false;
                fmt.write_str(" ")?;
            } else {
                fmt.write_str(", ")?;
            }

            write!(fmt, "\"{k}\": {v}")?;
        }

        write!(fmt, "{}}}", if !first { " " } else { "" })
    }
}

impl Debug for Document {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> fmt::Result {
        write!(fmt, "Document(")?;
        fmt.debug_map().entries(self.iter()).finish()?;
        write!(fmt, ")")
    }
}

/// An owning iterator over Document entries.
pub struct IntoIter {
    inner: indexmap::map::IntoIter<String, Bson>,
}

/// An iterator over Document entries.
pub struct Iter<'a> {
    inner: indexmap::map::Iter<'a, String, Bson>,
}

/// An iterator over a Document's keys.
pub struct Keys<'a> {
    inner: indexmap::map::Keys<'a, String, Bson>,
}

/// An iterator over a Document's values.
pub struct Values<'a> {
    inner: indexmap::map::Values<'a, String, Bson>,
}

impl<'a> Iterator for Keys<'a> {
    type Item = &'a String;

    fn next(&mut self) -> Option<&'a String> {
        self.inner.next()
    }
}

impl<'a> Iterator for Values<'a> {
    type Item = &'a Bson;

    fn next(&mut self) -> Option<&'a Bson> {
        self.inner.next()
    }
}

impl IntoIterator for Document {
    type Item = (String, Bson);
    type IntoIter = IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.inner.into_iter(),
        }
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = (&'a String, &'a Bson);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        Iter {
            inner: self.inner.iter(),
        }
    }
}

impl Iterator for IntoIter {
    type Item = (String, Bson);

    fn next(&mut self) -> Option<(String, Bson)> {
        self.inner.next()
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a String, &'a Bson);

    fn next(&mut self) -> Option<(&'a String, &'a Bson)> {
        self.inner.next()
    }
}

impl<K: Into<String>, V: Into<Bson>> FromIterator<(K, V)> for Document {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut doc = Document::new();
        for (k, v) in iter {
            doc.insert(k, v);
        }
        doc
    }
}

impl<K: Into<String>, V: Into<Bson>> Extend<(K, V)> for Document {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl Document {
    /// Creates a new empty Document.
    pub fn new() -> Document {
        Document::default()
    }

    /// Gets an iterator over the entries of the document.
    pub fn iter(&self) -> Iter<'_> {
        self.into_iter()
    }

    /// Clears the document, removing all values.
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Returns a reference to the value corresponding to the key.
    pub fn get(&self, key: impl AsRef<str>) -> Option<&Bson> {
        self.inner.get(key.as_ref())
    }

    /// Gets a mutable reference to the value corresponding to the key.
    pub fn get_mut(&mut self, key: impl AsRef<str>) -> Option<&mut Bson> {
        self.inner.get_mut(key.as_ref())
    }

    fn get_with<'a, T: 'a>(
        &'a self,
        key: impl AsRef<str>,
        expected: ElementType,
        f: impl FnOnce(&'a Bson) -> Option<T>,
    ) -> Result<T> {
        let key = key.as_ref();
        match self.get(key) {
            Some(bson) => f(bson).ok_or_else(|| {
                Error::value_access_unexpected_type(bson.element_type(), expected).with_key(key)
            }),
            None => Err(Error::value_access_not_present().with_key(key)),
        }
    }

    /// Gets the floating point value for this key if it exists and has the
    /// correct type.
    pub fn get_f64(&self, key: impl AsRef<str>) -> Result<f64> {
        self.get_with(key, ElementType::Double, Bson::as_f64)
    }

    /// Gets a reference to the string value for this key if it exists and has
    /// the correct type.
    pub fn get_str(&self, key: impl AsRef<str>) -> Result<&str> {
        self.get_with(key, ElementType::String, Bson::as_str)
    }

    /// Gets the 32-bit integer value for this key if it exists and has the
    /// correct type.
    pub fn get_i32(&self, key: impl AsRef<str>) -> Result<i32> {
        self.get_with(key, ElementType::Int32, Bson::as_i32)
    }

    /// Gets the 64-bit integer value for this key if it exists and has the
    /// correct type.
    pub fn get_i64(&self, key: impl AsRef<str>) -> Result<i64> {
        self.get_with(key, ElementType::Int64, Bson::as_i64)
    }

    /// Gets the boolean value for this key if it exists and has the correct
    /// type.
    pub fn get_bool(&self, key: impl AsRef<str>) -> Result<bool> {
        self.get_with(key, ElementType::Boolean, Bson::as_bool)
    }

    /// Gets a reference to the array value for this key if it exists and has
    /// the correct type.
    pub fn get_array(&self, key: impl AsRef<str>) -> Result<&Array> {
        self.get_with(key, ElementType::Array, Bson::as_array)
    }

    /// Gets a reference to the embedded document value for this key if it
    /// exists and has the correct type.
    pub fn get_document(&self, key: impl AsRef<str>) -> Result<&Document> {
        self.get_with(key, ElementType::EmbeddedDocument, Bson::as_document)
    }

    /// Gets the object id value for this key if it exists and has the correct
    /// type.
    pub fn get_object_id(&self, key: impl AsRef<str>) -> Result<ObjectId> {
        self.get_with(key, ElementType::ObjectId, Bson::as_object_id)
    }

    /// Gets the datetime value for this key if it exists and has the correct
    /// type.
    pub fn get_datetime(&self, key: impl AsRef<str>) -> Result<DateTime> {
        self.get_with(key, ElementType::DateTime, Bson::as_datetime)
    }

    /// Gets the timestamp value for this key if it exists and has the correct
    /// type.
    pub fn get_timestamp(&self, key: impl AsRef<str>) -> Result<Timestamp> {
        self.get_with(key, ElementType::Timestamp, Bson::as_timestamp)
    }

    /// Gets a reference to the decimal value for this key if it exists and
    /// has the correct type.
    pub fn get_decimal128(&self, key: impl AsRef<str>) -> Result<&Decimal128> {
        self.get_with(key, ElementType::Decimal128, |bson| match bson {
            Bson::Decimal128(d) => Some(d),
            _ => None,
        })
    }

    /// Gets a reference to the bytes of a generic binary value for this key
    /// if it exists and has the correct type.
    pub fn get_binary_generic(&self, key: impl AsRef<str>) -> Result<&Vec<u8>> {
        self.get_with(key, ElementType::Binary, |bson| match bson {
            Bson::Binary(binary) if binary.subtype == BinarySubtype::Generic => {
                Some(&binary.bytes)
            }
            _ => None,
        })
    }

    /// Returns whether the document contains a value for the specified key.
    pub fn contains_key(&self, key: impl AsRef<str>) -> bool {
        self.inner.contains_key(key.as_ref())
    }

    /// Gets an iterator over the document's keys, in insertion order.
    pub fn keys(&self) -> Keys<'_> {
        Keys {
            inner: self.inner.keys(),
        }
    }

    /// Gets an iterator over the document's values, in insertion order.
    pub fn values(&self) -> Values<'_> {
        Values {
            inner: self.inner.values(),
        }
    }

    /// Returns the number of entries in the document.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns whether the document contains no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Sets the value of the entry with the given key, returning the previous
    /// value if the key was already present. An overwritten entry keeps its
    /// original position.
    pub fn insert(&mut self, key: impl Into<String>, val: impl Into<Bson>) -> Option<Bson> {
        self.inner.insert(key.into(), val.into())
    }

    /// Removes the entry with the given key, returning its value. Later
    /// entries shift down to close the gap.
    pub fn remove(&mut self, key: impl AsRef<str>) -> Option<Bson> {
        self.inner.shift_remove(key.as_ref())
    }

    /// Encodes the document into BSON bytes.
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        let mut buffer = ByteBuffer::new();
        crate::ser::encode_document(&mut buffer, self)?;
        Ok(buffer.into_vec())
    }

    /// Encodes the document into BSON bytes, first validating every key in
    /// the tree: keys starting with `$` or containing `.` are rejected with
    /// [`ErrorKind::InvalidKey`](crate::error::ErrorKind).
    pub fn to_vec_checked(&self) -> Result<Vec<u8>> {
        validate_keys(self)?;
        self.to_vec()
    }

    /// Decodes a document from BSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Document> {
        let mut buffer = ByteBuffer::from_slice(bytes);
        crate::de::decode_document(&mut buffer)
    }
}

fn validate_keys(doc: &Document) -> Result<()> {
    for (key, value) in doc {
        if key.starts_with('$') {
            return Err(Error::invalid_key(format!("key \"{key}\" must not start with '$'")));
        }
        if key.contains('.') {
            return Err(Error::invalid_key(format!("key \"{key}\" must not contain '.'")));
        }
        validate_value(value)?;
    }
    Ok(())
}

fn validate_value(value: &Bson) -> Result<()> {
    match value {
        Bson::Document(inner) => validate_keys(inner),
        Bson::Array(entries) => entries.iter().try_for_each(validate_value),
        _ => Ok(()),
    }
}
