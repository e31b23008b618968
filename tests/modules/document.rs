use assert_matches::assert_matches;
use bsonkit::{
    doc,
    error::ValueAccessErrorKind,
    Bson,
    Document,
    ErrorKind,
    ObjectId,
    Timestamp,
};

#[test]
fn ordered_insert() {
    let mut doc = Document::new();
    doc.insert("first", 1i32);
    doc.insert("second", "foo");
    doc.insert("alphanumeric", "bar");

    let keys: Vec<_> = doc.keys().map(|key| key.as_str()).collect();
    assert_eq!(keys, vec!["first", "second", "alphanumeric"]);
}

#[test]
fn insertion_order_survives_a_round_trip() {
    let mut doc = Document::new();
    for index in 0..100 {
        doc.insert(format!("field_{index}"), index);
    }

    let decoded = Document::from_slice(&doc.to_vec().unwrap()).unwrap();
    let keys: Vec<_> = decoded.keys().cloned().collect();
    let expected: Vec<_> = (0..100).map(|index| format!("field_{index}")).collect();
    assert_eq!(keys, expected);
}

#[test]
fn overwriting_insert_keeps_position_and_returns_previous() {
    let mut doc = doc! { "a": 1, "b": 2, "c": 3 };
    let previous = doc.insert("b", "two");
    assert_eq!(previous, Some(Bson::Int32(2)));

    let keys: Vec<_> = doc.keys().map(|key| key.as_str()).collect();
    assert_eq!(keys, vec!["a", "b", "c"]);
    assert_eq!(doc.get_str("b").unwrap(), "two");
}

#[test]
fn remove() {
    let mut doc = doc! { "a": 1, "b": 2 };
    assert_eq!(doc.remove("a"), Some(Bson::Int32(1)));
    assert_eq!(doc.remove("a"), None);
    assert_eq!(doc.len(), 1);
}

#[test]
fn typed_getters() {
    let oid = ObjectId::new();
    let doc = doc! {
        "float": 2.5,
        "string": "hello",
        "bool": true,
        "i32": 4i32,
        "i64": 5i64,
        "oid": oid,
        "ts": Timestamp { time: 7, increment: 1 },
        "nested": { "inner": [1, 2] },
    };

    assert_eq!(doc.get_f64("float").unwrap(), 2.5);
    assert_eq!(doc.get_str("string").unwrap(), "hello");
    assert!(doc.get_bool("bool").unwrap());
    assert_eq!(doc.get_i32("i32").unwrap(), 4);
    assert_eq!(doc.get_i64("i64").unwrap(), 5);
    assert_eq!(doc.get_object_id("oid").unwrap(), oid);
    assert_eq!(
        doc.get_timestamp("ts").unwrap(),
        Timestamp { time: 7, increment: 1 }
    );
    assert_eq!(
        doc.get_document("nested").unwrap().get_array("inner").unwrap().len(),
        2
    );
}

#[test]
fn getter_errors_carry_key_context() {
    let doc = doc! { "a": 1 };

    let err = doc.get_str("missing").unwrap_err();
    assert_eq!(err.key.as_deref(), Some("missing"));
    assert_matches!(
        err.kind,
        ErrorKind::ValueAccess {
            kind: ValueAccessErrorKind::NotPresent,
            ..
        }
    );

    let err = doc.get_str("a").unwrap_err();
    assert_eq!(err.key.as_deref(), Some("a"));
    assert_matches!(
        err.kind,
        ErrorKind::ValueAccess {
            kind: ValueAccessErrorKind::UnexpectedType { .. },
            ..
        }
    );
}

#[test]
fn checked_encode_rejects_dollar_and_dot_keys() {
    let err = doc! { "$set": 1 }.to_vec_checked().unwrap_err();
    assert_matches!(err.kind, ErrorKind::InvalidKey { .. });

    let err = doc! { "a.b": 1 }.to_vec_checked().unwrap_err();
    assert_matches!(err.kind, ErrorKind::InvalidKey { .. });

    // nested documents are validated too, including through arrays
    let err = doc! { "outer": [{ "$inner": 1 }] }.to_vec_checked().unwrap_err();
    assert_matches!(err.kind, ErrorKind::InvalidKey { .. });

    // the unchecked encoder accepts the same keys
    assert!(doc! { "$set": 1 }.to_vec().is_ok());
}

// Decoding builds the document field by field, so duplicate keys in the
// source bytes collapse with the last occurrence winning, mirroring repeated
// literal inserts.
#[test]
fn duplicate_keys_collapse_to_the_last_occurrence() {
    let first = doc! { "a": 1 }.to_vec().unwrap();
    let second = doc! { "a": 2 }.to_vec().unwrap();

    // splice the two "a" elements into a single document
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    bytes.extend_from_slice(&first[4..first.len() - 1]);
    bytes.extend_from_slice(&second[4..second.len() - 1]);
    bytes.push(0);
    let total = bytes.len() as u8;
    bytes[0] = total;

    let decoded = Document::from_slice(&bytes).unwrap();
    assert_eq!(decoded, doc! { "a": 2 });
}

#[test]
fn display_renders_like_a_shell_document() {
    let doc = doc! { "a": 1, "b": "two" };
    assert_eq!(doc.to_string(), "{ \"a\": 1, \"b\": \"two\" }");
    assert_eq!(doc! {}.to_string(), "{}");
}
