//! The transform from a generic JSON value tree to a typed [`Bson`] tree.

use serde_json::{Map, Value};

use crate::{
    bson::{Bson, JavaScriptCodeWithScope},
    error::{Error, Result},
    extjson::{models, ExtJsonMode},
    Document,
};

// Keys that only appear inside a recognized type shape. A map that carries
// one of these without matching its shape is malformed (or written by a
// newer convention than this crate knows), not user data. `$ref`, `$id`,
// `$db` (the DBRef convention) and the legacy `$regex`/`$options`/`$type`
// keys are deliberately absent: they double as user-visible query syntax and
// pass through as plain data when their shape does not match.
const RESERVED_KEYS: &[&str] = &[
    "$oid",
    "$symbol",
    "$numberInt",
    "$numberLong",
    "$numberDouble",
    "$numberDecimal",
    "$binary",
    "$uuid",
    "$code",
    "$scope",
    "$timestamp",
    "$regularExpression",
    "$dbPointer",
    "$date",
    "$minKey",
    "$maxKey",
    "$undefined",
];

pub(crate) fn parse_value(value: Value, mode: ExtJsonMode) -> Result<Bson> {
    match value {
        Value::Null => Ok(Bson::Null),
        Value::Bool(b) => Ok(Bson::Boolean(b)),
        Value::String(s) => Ok(Bson::String(s)),
        Value::Number(n) => parse_number(n),
        Value::Array(items) => items
            .into_iter()
            .map(|item| parse_value(item, mode))
            .collect::<Result<Vec<Bson>>>()
            .map(Bson::Array),
        Value::Object(map) => parse_object(map, mode),
    }
}

// A bare JSON integer decodes to the narrowest BSON integer that holds it;
// everything else decodes to a double.
fn parse_number(n: serde_json::Number) -> Result<Bson> {
    if let Some(i) = n.as_i64() {
        return Ok(match i32::try_from(i) {
            Ok(i) => Bson::Int32(i),
            Err(_) => Bson::Int64(i),
        });
    }
    if let Some(u) = n.as_u64() {
        return Bson::try_from(u);
    }
    n.as_f64().map(Bson::Double).ok_or_else(|| {
        Error::ext_json_parse(format!("number {n} cannot be represented as a BSON value"))
    })
}

fn parse_object(map: Map<String, Value>, mode: ExtJsonMode) -> Result<Bson> {
    if map.contains_key("$oid") {
        let oid: models::ObjectId = from_model(map)?;
        return Ok(Bson::ObjectId(oid.parse()?));
    }

    if map.contains_key("$symbol") {
        let symbol: models::Symbol = from_model(map)?;
        return Ok(Bson::Symbol(symbol.value));
    }

    if map.contains_key("$regularExpression") {
        let regex: models::Regex = from_model(map)?;
        return Ok(regex.parse().into());
    }

    if map.contains_key("$numberInt") {
        let int: models::Int32 = from_model(map)?;
        return Ok(Bson::Int32(int.parse()?));
    }

    if map.contains_key("$numberLong") {
        let int: models::Int64 = from_model(map)?;
        return Ok(Bson::Int64(int.parse()?));
    }

    if map.contains_key("$numberDouble") {
        let double: models::Double = from_model(map)?;
        return Ok(Bson::Double(double.parse()?));
    }

    if map.contains_key("$numberDecimal") {
        let decimal: models::Decimal128 = from_model(map)?;
        return Ok(Bson::Decimal128(decimal.parse()?));
    }

    if map.contains_key("$binary") {
        // the legacy shape stores the base64 payload directly under $binary;
        // version 2 nests an object
        let binary = if map.get("$binary").is_some_and(Value::is_string) {
            let legacy: models::LegacyBinary = from_model(map)?;
            legacy.parse()?
        } else {
            let binary: models::Binary = from_model(map)?;
            binary.parse()?
        };
        return Ok(Bson::Binary(binary));
    }

    if map.contains_key("$uuid") {
        let uuid: models::Uuid = from_model(map)?;
        return Ok(Bson::Binary(uuid.parse()?));
    }

    if map.contains_key("$code") {
        let code_w_scope: models::JavaScriptCodeWithScope = from_model(map)?;
        return match code_w_scope.scope {
            Some(scope) => Ok(Bson::JavaScriptCodeWithScope(JavaScriptCodeWithScope {
                code: code_w_scope.code,
                scope: parse_document(scope, mode)?,
            })),
            None => Ok(Bson::JavaScriptCode(code_w_scope.code)),
        };
    }

    if map.contains_key("$timestamp") {
        let ts: models::Timestamp = from_model(map)?;
        return Ok(ts.parse().into());
    }

    if map.contains_key("$date") {
        let date: models::DateTime = from_model(map)?;
        return Ok(Bson::DateTime(date.parse()?));
    }

    if map.contains_key("$minKey") {
        let min_key: models::MinKey = from_model(map)?;
        return min_key.parse();
    }

    if map.contains_key("$maxKey") {
        let max_key: models::MaxKey = from_model(map)?;
        return max_key.parse();
    }

    if map.contains_key("$dbPointer") {
        let db_ptr: models::DbPointer = from_model(map)?;
        return Ok(db_ptr.parse()?.into());
    }

    if map.contains_key("$undefined") {
        let undefined: models::Undefined = from_model(map)?;
        return undefined.parse();
    }

    // the flat legacy regex shape, only when both values are strings: the
    // same keys are valid query syntax carrying arbitrary values
    if map.len() == 2
        && map.get("$regex").is_some_and(Value::is_string)
        && map.get("$options").is_some_and(Value::is_string)
    {
        let regex: models::LegacyRegex = from_model(map)?;
        return Ok(regex.parse().into());
    }

    // anything else is a plain document, provided no reserved key leaked
    // through the shape cascade above
    for key in map.keys() {
        if RESERVED_KEYS.contains(&key.as_str()) {
            return Err(Error::ext_json_parse(format!(
                "map uses reserved key \"{key}\" without matching a recognized type shape"
            )));
        }
    }

    Ok(Bson::Document(parse_document(map, mode)?))
}

fn parse_document(map: Map<String, Value>, mode: ExtJsonMode) -> Result<Document> {
    map.into_iter()
        .map(|(key, value)| Ok((key, parse_value(value, mode)?)))
        .collect()
}

fn from_model<T: serde::de::DeserializeOwned>(map: Map<String, Value>) -> Result<T> {
    serde_json::from_value(Value::Object(map)).map_err(|e| Error::ext_json_parse(e))
}
