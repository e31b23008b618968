//! [Extended JSON](https://www.mongodb.com/docs/manual/reference/mongodb-extended-json/):
//! a JSON-compatible text representation that preserves BSON type
//! information via `$`-prefixed reserved keys.
//!
//! Three fidelity levels are supported, selected by [`ExtJsonMode`]:
//!
//! - **Canonical** wraps every type JSON does not share with BSON in a
//!   type-annotated object, numerics included, so a value round-trips
//!   through text with its exact BSON type intact.
//! - **Relaxed** emits bare JSON values wherever the value is losslessly
//!   representable (ordinary numbers, in-range dates) and falls back to the
//!   canonical wrappers elsewhere. Easier to read, loses integer width.
//! - **Legacy** emits the pre-version-2 conventions: flat `$binary`/`$type`
//!   and `$regex`/`$options` objects and a bare integer millisecond `$date`.
//!
//! Parsing accepts all three shapes, mixed freely, in every mode: the typed
//! value tree produced is the same regardless of which convention the text
//! used. A map that uses a reserved key without exactly matching one of the
//! recognized shapes is rejected rather than passed through as data.

mod de;
mod models;

use crate::{
    bson::Bson,
    error::{Error, Result},
};

/// The fidelity level of an extended JSON rendering.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExtJsonMode {
    /// Type-annotated objects for every non-JSON type, numerics included.
    Canonical,
    /// Bare JSON values where lossless, type-annotated objects otherwise.
    Relaxed,
    /// The pre-version-2 conventions.
    Legacy,
}

/// Parses extended JSON text into a [`Bson`] value tree.
pub fn parse(text: &str, mode: ExtJsonMode) -> Result<Bson> {
    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| Error::ext_json_parse(format!("invalid JSON: {e}")))?;
    de::parse_value(value, mode)
}

/// Renders a [`Bson`] value tree as extended JSON text.
pub fn to_string(value: &Bson, mode: ExtJsonMode) -> Result<String> {
    let json = to_json_value(value.clone(), mode);
    serde_json::to_string(&json).map_err(|e| Error::ext_json_parse(format!("cannot render: {e}")))
}

pub(crate) fn to_json_value(value: Bson, mode: ExtJsonMode) -> serde_json::Value {
    match mode {
        ExtJsonMode::Canonical => value.into_canonical_extjson(),
        ExtJsonMode::Relaxed => value.into_relaxed_extjson(),
        ExtJsonMode::Legacy => value.into_legacy_extjson(),
    }
}
