//! BSON definition

use std::fmt::{self, Debug, Display};

use serde_json::{json, Value};

use crate::{
    base64,
    datetime::DateTime,
    error::{Error, Result},
    oid::ObjectId,
    spec::ElementType,
    Binary,
    Decimal128,
    Document,
};

/// Possible BSON value types.
#[derive(Clone, Debug, PartialEq)]
pub enum Bson {
    /// 64-bit binary floating point
    Double(f64),
    /// UTF-8 string
    String(String),
    /// Array
    Array(Array),
    /// Embedded document
    Document(Document),
    /// Boolean value
    Boolean(bool),
    /// Null value
    Null,
    /// Regular expression
    RegularExpression(Regex),
    /// JavaScript code
    JavaScriptCode(String),
    /// JavaScript code w/ scope
    JavaScriptCodeWithScope(JavaScriptCodeWithScope),
    /// 32-bit signed integer
    Int32(i32),
    /// 64-bit signed integer
    Int64(i64),
    /// Timestamp
    Timestamp(Timestamp),
    /// Binary data
    Binary(Binary),
    /// [ObjectId](http://dochub.mongodb.org/core/objectids)
    ObjectId(ObjectId),
    /// UTC datetime
    DateTime(DateTime),
    /// Symbol (Deprecated)
    Symbol(String),
    /// [128-bit decimal floating point](https://github.com/mongodb/specifications/blob/master/source/bson-decimal128/decimal128.md)
    Decimal128(Decimal128),
    /// Undefined value (Deprecated)
    Undefined,
    /// Max key
    MaxKey,
    /// Min key
    MinKey,
    /// DBPointer (Deprecated)
    DbPointer(DbPointer),
}

/// Alias for `Vec<Bson>`.
pub type Array = Vec<Bson>;

/// Represents a BSON regular expression value: an opaque pattern plus a set
/// of option flags.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Regex {
    /// The regex pattern to match.
    pub pattern: String,

    /// The options for the regex.
    ///
    /// Recognized options are `i` (case insensitive), `m` (multiline),
    /// `s` (dotall) and `x` (verbose). Options serialize in that fixed
    /// order no matter how this field is populated.
    pub options: String,
}

impl Regex {
    /// Creates a new `Regex` with its options reduced to the recognized
    /// flags in canonical order.
    pub fn new(pattern: impl Into<String>, options: impl AsRef<str>) -> Self {
        let pattern = pattern.into();
        let options = canonical_options(options.as_ref());
        Self { pattern, options }
    }

    pub(crate) fn canonical_options(&self) -> String {
        canonical_options(&self.options)
    }
}

fn canonical_options(options: &str) -> String {
    let mut flags: Vec<char> = options.chars().filter(|c| "imsx".contains(*c)).collect();
    flags.sort_unstable();
    flags.dedup();
    flags.into_iter().collect()
}

impl Display for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.pattern, self.options)
    }
}

/// Represents a BSON timestamp value: an opaque pair used internally by the
/// database for replication bookkeeping.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Timestamp {
    /// Seconds since the Unix epoch.
    pub time: u32,

    /// An incrementing value to order events with a duplicate seconds value.
    pub increment: u32,
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({}, {})", self.time, self.increment)
    }
}

/// Represents a BSON code with scope value.
#[derive(Clone, Debug, PartialEq)]
pub struct JavaScriptCodeWithScope {
    /// The JavaScript code.
    pub code: String,

    /// The scope document containing variable bindings.
    pub scope: Document,
}

impl Display for JavaScriptCodeWithScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

/// Represents a DBPointer (deprecated).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DbPointer {
    /// The namespace being pointed into.
    pub namespace: String,

    /// The id of the document being pointed at.
    pub id: ObjectId,
}

impl Display for DbPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DbPointer({}, {})", self.namespace, self.id)
    }
}

impl Default for Bson {
    fn default() -> Self {
        Bson::Null
    }
}

impl Display for Bson {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bson::Double(f) => write!(fmt, "{f}"),
            Bson::String(s) => write!(fmt, "\"{s}\""),
            Bson::Array(vec) => {
                fmt.write_str("[")?;

                let mut first = true;
                for bson in vec {
                    if !first {
                        fmt.write_str(", ")?;
                    }

                    write!(fmt, "{bson}")?;
                    first = false;
                }

                fmt.write_str("]")
            }
            Bson::Document(doc) => write!(fmt, "{doc}"),
            Bson::Boolean(b) => write!(fmt, "{b}"),
            Bson::Null => write!(fmt, "null"),
            Bson::RegularExpression(regex) => write!(fmt, "{regex}"),
            Bson::JavaScriptCode(code) => fmt.write_str(code),
            Bson::JavaScriptCodeWithScope(code_w_scope) => fmt.write_str(&code_w_scope.code),
            Bson::Int32(i) => write!(fmt, "{i}"),
            Bson::Int64(i) => write!(fmt, "{i}"),
            Bson::Timestamp(ts) => write!(fmt, "{ts}"),
            Bson::Binary(bin) => write!(fmt, "{bin}"),
            Bson::ObjectId(id) => write!(fmt, "ObjectId(\"{id}\")"),
            Bson::DateTime(date_time) => write!(fmt, "DateTime(\"{date_time}\")"),
            Bson::Symbol(sym) => write!(fmt, "Symbol(\"{sym}\")"),
            Bson::Decimal128(d) => write!(fmt, "{d}"),
            Bson::Undefined => write!(fmt, "undefined"),
            Bson::MinKey => write!(fmt, "MinKey"),
            Bson::MaxKey => write!(fmt, "MaxKey"),
            Bson::DbPointer(pointer) => write!(fmt, "{pointer}"),
        }
    }
}

impl From<f32> for Bson {
    fn from(a: f32) -> Bson {
        Bson::Double(a.into())
    }
}

impl From<f64> for Bson {
    fn from(a: f64) -> Bson {
        Bson::Double(a)
    }
}

impl From<&str> for Bson {
    fn from(s: &str) -> Bson {
        Bson::String(s.to_owned())
    }
}

impl From<String> for Bson {
    fn from(a: String) -> Bson {
        Bson::String(a)
    }
}

impl From<bool> for Bson {
    fn from(a: bool) -> Bson {
        Bson::Boolean(a)
    }
}

impl From<i8> for Bson {
    fn from(a: i8) -> Bson {
        Bson::Int32(a.into())
    }
}

impl From<i16> for Bson {
    fn from(a: i16) -> Bson {
        Bson::Int32(a.into())
    }
}

impl From<i32> for Bson {
    fn from(a: i32) -> Bson {
        Bson::Int32(a)
    }
}

impl From<i64> for Bson {
    fn from(a: i64) -> Bson {
        Bson::Int64(a)
    }
}

impl From<u8> for Bson {
    fn from(a: u8) -> Bson {
        Bson::Int32(a.into())
    }
}

impl From<u16> for Bson {
    fn from(a: u16) -> Bson {
        Bson::Int32(a.into())
    }
}

impl From<u32> for Bson {
    fn from(a: u32) -> Bson {
        match i32::try_from(a) {
            Ok(i) => Bson::Int32(i),
            Err(_) => Bson::Int64(a.into()),
        }
    }
}

/// A generic unsigned integer becomes the narrowest signed integer variant
/// that holds it, and is rejected when even Int64 cannot.
impl TryFrom<u64> for Bson {
    type Error = Error;

    fn try_from(a: u64) -> Result<Bson> {
        Bson::try_from(a as i128)
    }
}

/// A generic integer becomes the narrowest signed integer variant that holds
/// it, and is rejected when even Int64 cannot.
impl TryFrom<i128> for Bson {
    type Error = Error;

    fn try_from(a: i128) -> Result<Bson> {
        if let Ok(i) = i32::try_from(a) {
            Ok(Bson::Int32(i))
        } else if let Ok(i) = i64::try_from(a) {
            Ok(Bson::Int64(i))
        } else {
            Err(Error::out_of_range(format!(
                "{a} is too big to be represented as a BSON integer"
            )))
        }
    }
}

impl From<Document> for Bson {
    fn from(a: Document) -> Bson {
        Bson::Document(a)
    }
}

impl From<Regex> for Bson {
    fn from(regex: Regex) -> Bson {
        Bson::RegularExpression(regex)
    }
}

impl From<Timestamp> for Bson {
    fn from(ts: Timestamp) -> Bson {
        Bson::Timestamp(ts)
    }
}

impl From<JavaScriptCodeWithScope> for Bson {
    fn from(code_w_scope: JavaScriptCodeWithScope) -> Bson {
        Bson::JavaScriptCodeWithScope(code_w_scope)
    }
}

impl From<Binary> for Bson {
    fn from(binary: Binary) -> Bson {
        Bson::Binary(binary)
    }
}

impl From<ObjectId> for Bson {
    fn from(id: ObjectId) -> Bson {
        Bson::ObjectId(id)
    }
}

impl From<DateTime> for Bson {
    fn from(dt: DateTime) -> Bson {
        Bson::DateTime(dt)
    }
}

impl From<Decimal128> for Bson {
    fn from(d: Decimal128) -> Bson {
        Bson::Decimal128(d)
    }
}

impl From<DbPointer> for Bson {
    fn from(pointer: DbPointer) -> Bson {
        Bson::DbPointer(pointer)
    }
}

impl<T> From<&T> for Bson
where
    T: Clone + Into<Bson>,
{
    fn from(t: &T) -> Bson {
        t.clone().into()
    }
}

impl<T> From<Vec<T>> for Bson
where
    T: Into<Bson>,
{
    fn from(v: Vec<T>) -> Bson {
        Bson::Array(v.into_iter().map(|val| val.into()).collect())
    }
}

impl<T> From<&[T]> for Bson
where
    T: Clone + Into<Bson>,
{
    fn from(s: &[T]) -> Bson {
        Bson::Array(s.iter().cloned().map(|val| val.into()).collect())
    }
}

impl<T: Into<Bson>> From<Option<T>> for Bson {
    fn from(a: Option<T>) -> Bson {
        match a {
            None => Bson::Null,
            Some(t) => t.into(),
        }
    }
}

impl<T: Into<Bson>> FromIterator<T> for Bson {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Bson::Array(iter.into_iter().map(Into::into).collect())
    }
}

/// Value helpers
impl Bson {
    /// If this value is `Double`, return its value as an `f64`. Returns `None` otherwise.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Bson::Double(v) => Some(v),
            _ => None,
        }
    }

    /// If this value is `String`, return its value as a `&str`. Returns `None` otherwise.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Bson::String(s) => Some(s),
            _ => None,
        }
    }

    /// If this value is `Array`, return its value. Returns `None` otherwise.
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Bson::Array(v) => Some(v),
            _ => None,
        }
    }

    /// If this value is `Array`, return a mutable reference to its value. Returns `None`
    /// otherwise.
    pub fn as_array_mut(&mut self) -> Option<&mut Array> {
        match self {
            Bson::Array(v) => Some(v),
            _ => None,
        }
    }

    /// If this value is `Document`, return its value. Returns `None` otherwise.
    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Bson::Document(doc) => Some(doc),
            _ => None,
        }
    }

    /// If this value is `Document`, return a mutable reference to its value. Returns `None`
    /// otherwise.
    pub fn as_document_mut(&mut self) -> Option<&mut Document> {
        match self {
            Bson::Document(doc) => Some(doc),
            _ => None,
        }
    }

    /// If this value is `Boolean`, return its value. Returns `None` otherwise.
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Bson::Boolean(v) => Some(v),
            _ => None,
        }
    }

    /// If this value is `Int32`, return its value. Returns `None` otherwise.
    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            Bson::Int32(v) => Some(v),
            _ => None,
        }
    }

    /// If this value is `Int64`, return its value. Returns `None` otherwise.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Bson::Int64(v) => Some(v),
            _ => None,
        }
    }

    /// If this value is `ObjectId`, return its value. Returns `None` otherwise.
    pub fn as_object_id(&self) -> Option<ObjectId> {
        match *self {
            Bson::ObjectId(v) => Some(v),
            _ => None,
        }
    }

    /// If this value is `DateTime`, return its value. Returns `None` otherwise.
    pub fn as_datetime(&self) -> Option<DateTime> {
        match *self {
            Bson::DateTime(v) => Some(v),
            _ => None,
        }
    }

    /// If this value is `Timestamp`, return its value. Returns `None` otherwise.
    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match *self {
            Bson::Timestamp(v) => Some(v),
            _ => None,
        }
    }

    /// If this value is `Null`, return `()`. Returns `None` otherwise.
    pub fn as_null(&self) -> Option<()> {
        match *self {
            Bson::Null => Some(()),
            _ => None,
        }
    }

    /// Get the [`ElementType`] of this value.
    pub fn element_type(&self) -> ElementType {
        match *self {
            Bson::Double(..) => ElementType::Double,
            Bson::String(..) => ElementType::String,
            Bson::Array(..) => ElementType::Array,
            Bson::Document(..) => ElementType::EmbeddedDocument,
            Bson::Boolean(..) => ElementType::Boolean,
            Bson::Null => ElementType::Null,
            Bson::RegularExpression(..) => ElementType::RegularExpression,
            Bson::JavaScriptCode(..) => ElementType::JavaScriptCode,
            Bson::JavaScriptCodeWithScope(..) => ElementType::JavaScriptCodeWithScope,
            Bson::Int32(..) => ElementType::Int32,
            Bson::Int64(..) => ElementType::Int64,
            Bson::Timestamp(..) => ElementType::Timestamp,
            Bson::Binary(..) => ElementType::Binary,
            Bson::ObjectId(..) => ElementType::ObjectId,
            Bson::DateTime(..) => ElementType::DateTime,
            Bson::Symbol(..) => ElementType::Symbol,
            Bson::Decimal128(..) => ElementType::Decimal128,
            Bson::Undefined => ElementType::Undefined,
            Bson::MaxKey => ElementType::MaxKey,
            Bson::MinKey => ElementType::MinKey,
            Bson::DbPointer(..) => ElementType::DbPointer,
        }
    }
}

/// Extended JSON projections.
impl Bson {
    /// Converts this value into its [relaxed extended JSON representation](https://www.mongodb.com/docs/manual/reference/mongodb-extended-json/):
    /// bare JSON values wherever JSON can represent the value losslessly,
    /// type-annotated objects otherwise.
    pub fn into_relaxed_extjson(self) -> Value {
        match self {
            Bson::Double(v) if v.is_nan() => {
                let s = if v.is_sign_negative() { "-NaN" } else { "NaN" };

                json!({ "$numberDouble": s })
            }
            Bson::Double(v) if v.is_infinite() => {
                let s = if v.is_sign_negative() {
                    "-Infinity"
                } else {
                    "Infinity"
                };

                json!({ "$numberDouble": s })
            }
            Bson::Double(v) => json!(v),
            Bson::String(v) => json!(v),
            Bson::Array(v) => {
                Value::Array(v.into_iter().map(Bson::into_relaxed_extjson).collect())
            }
            Bson::Document(v) => Value::Object(
                v.into_iter()
                    .map(|(k, v)| (k, v.into_relaxed_extjson()))
                    .collect(),
            ),
            Bson::Boolean(v) => json!(v),
            Bson::Null => Value::Null,
            Bson::RegularExpression(regex) => {
                json!({
                    "$regularExpression": {
                        "pattern": regex.pattern,
                        "options": regex.canonical_options(),
                    }
                })
            }
            Bson::JavaScriptCode(code) => json!({ "$code": code }),
            Bson::JavaScriptCodeWithScope(JavaScriptCodeWithScope { code, scope }) => json!({
                "$code": code,
                "$scope": Bson::Document(scope).into_relaxed_extjson(),
            }),
            Bson::Int32(v) => json!(v),
            // an Int64 outside of the exactly representable range of a JSON
            // double still needs the type wrapper
            Bson::Int64(v) if v.unsigned_abs() > MAX_SAFE_JSON_INTEGER => {
                json!({ "$numberLong": v.to_string() })
            }
            Bson::Int64(v) => json!(v),
            Bson::Timestamp(Timestamp { time, increment }) => json!({
                "$timestamp": {
                    "t": time,
                    "i": increment,
                }
            }),
            Bson::Binary(Binary { subtype, ref bytes }) => {
                let tval: u8 = subtype.into();
                json!({
                    "$binary": {
                        "base64": base64::encode(bytes),
                        "subType": hex::encode([tval]),
                    }
                })
            }
            Bson::ObjectId(v) => json!({ "$oid": v.to_hex() }),
            Bson::DateTime(v) if v.timestamp_millis() >= 0 => match v.try_to_rfc3339_string() {
                Ok(formatted) => json!({ "$date": formatted }),
                Err(_) => json!({ "$date": { "$numberLong": v.timestamp_millis().to_string() } }),
            },
            Bson::DateTime(v) => json!({
                "$date": { "$numberLong": v.timestamp_millis().to_string() },
            }),
            Bson::Symbol(v) => json!({ "$symbol": v }),
            Bson::Decimal128(v) => json!({ "$numberDecimal": v.to_string() }),
            Bson::Undefined => json!({ "$undefined": true }),
            Bson::MinKey => json!({ "$minKey": 1 }),
            Bson::MaxKey => json!({ "$maxKey": 1 }),
            Bson::DbPointer(DbPointer {
                ref namespace,
                ref id,
            }) => json!({
                "$dbPointer": {
                    "$ref": namespace,
                    "$id": {
                        "$oid": id.to_hex()
                    }
                }
            }),
        }
    }

    /// Converts this value into its [canonical extended JSON representation](https://www.mongodb.com/docs/manual/reference/mongodb-extended-json/):
    /// every type that JSON does not share with BSON is wrapped in a
    /// type-annotated object, numerics included, so the exact BSON types
    /// round-trip.
    pub fn into_canonical_extjson(self) -> Value {
        match self {
            Bson::Int32(i) => json!({ "$numberInt": i.to_string() }),
            Bson::Int64(i) => json!({ "$numberLong": i.to_string() }),
            Bson::Double(f) if f.is_finite() => {
                let mut s = f.to_string();
                if f.fract() == 0.0 {
                    s.push_str(".0");
                }

                json!({ "$numberDouble": s })
            }
            Bson::DateTime(date) => {
                json!({ "$date": { "$numberLong": date.timestamp_millis().to_string() } })
            }
            Bson::Array(arr) => {
                Value::Array(arr.into_iter().map(Bson::into_canonical_extjson).collect())
            }
            Bson::Document(arr) => Value::Object(
                arr.into_iter()
                    .map(|(k, v)| (k, v.into_canonical_extjson()))
                    .collect(),
            ),
            Bson::JavaScriptCodeWithScope(JavaScriptCodeWithScope { code, scope }) => json!({
                "$code": code,
                "$scope": Bson::Document(scope).into_canonical_extjson(),
            }),

            other => other.into_relaxed_extjson(),
        }
    }

    /// Converts this value into the legacy (pre-version-2) extended JSON
    /// representation: the flat `$binary`/`$type` and `$regex`/`$options`
    /// object shapes and a bare integer millisecond `$date`.
    pub fn into_legacy_extjson(self) -> Value {
        match self {
            Bson::RegularExpression(regex) => json!({
                "$regex": regex.pattern,
                "$options": regex.canonical_options(),
            }),
            Bson::Binary(Binary { subtype, ref bytes }) => {
                let tval: u8 = subtype.into();
                json!({
                    "$binary": base64::encode(bytes),
                    "$type": hex::encode([tval]),
                })
            }
            Bson::DateTime(v) => json!({ "$date": v.timestamp_millis() }),
            Bson::Array(arr) => {
                Value::Array(arr.into_iter().map(Bson::into_legacy_extjson).collect())
            }
            Bson::Document(doc) => Value::Object(
                doc.into_iter()
                    .map(|(k, v)| (k, v.into_legacy_extjson()))
                    .collect(),
            ),
            Bson::JavaScriptCodeWithScope(JavaScriptCodeWithScope { code, scope }) => json!({
                "$code": code,
                "$scope": Bson::Document(scope).into_legacy_extjson(),
            }),

            other => other.into_relaxed_extjson(),
        }
    }
}

// The largest integer magnitude a JSON number can carry without rounding
// (2^53, IEEE 754 double precision).
const MAX_SAFE_JSON_INTEGER: u64 = 1 << 53;
