use assert_matches::assert_matches;
use bsonkit::{
    doc,
    spec::BinarySubtype,
    Binary,
    Bson,
    DbPointer,
    Document,
    ErrorKind,
    JavaScriptCodeWithScope,
    ObjectId,
    Regex,
    Timestamp,
};
use pretty_assertions::assert_eq;

fn round_trip(doc: &Document, expected: &[u8]) {
    let bytes = doc.to_vec().unwrap();
    assert_eq!(bytes, expected);

    let decoded = Document::from_slice(&bytes).unwrap();
    assert_eq!(&decoded, doc);
}

#[test]
fn encode_decode_string() {
    round_trip(
        &doc! { "k": "eliot" },
        &[
            0x12, 0x00, 0x00, 0x00, 0x02, 0x6B, 0x00, 0x06, 0x00, 0x00, 0x00, 0x65, 0x6C, 0x69,
            0x6F, 0x74, 0x00, 0x00,
        ],
    );

    round_trip(
        &doc! { "hello": "world" },
        &[
            0x16, 0x00, 0x00, 0x00, 0x02, 0x68, 0x65, 0x6C, 0x6C, 0x6F, 0x00, 0x06, 0x00, 0x00,
            0x00, 0x77, 0x6F, 0x72, 0x6C, 0x64, 0x00, 0x00,
        ],
    );
}

#[test]
fn encode_decode_utf8_string() {
    round_trip(
        &doc! { "key": "test你好吗" },
        &[
            28, 0, 0, 0, 2, 107, 101, 121, 0, 14, 0, 0, 0, 116, 101, 115, 116, 228, 189, 160, 229,
            165, 189, 229, 144, 151, 0, 0,
        ],
    );
}

#[test]
fn encode_decode_boolean() {
    round_trip(
        &doc! { "k": true },
        &[0x09, 0x00, 0x00, 0x00, 0x08, 0x6B, 0x00, 0x01, 0x00],
    );
}

#[test]
fn encode_decode_floating_point() {
    round_trip(
        &doc! { "key": 1020.123 },
        &[
            18, 0, 0, 0, 1, 107, 101, 121, 0, 68, 139, 108, 231, 251, 224, 143, 64, 0,
        ],
    );
}

#[test]
fn encode_decode_int32() {
    round_trip(
        &doc! { "key": 100i32 },
        &[14, 0, 0, 0, 16, 107, 101, 121, 0, 100, 0, 0, 0, 0],
    );
}

#[test]
fn encode_decode_int64() {
    round_trip(
        &doc! { "key": 100i64 },
        &[18, 0, 0, 0, 18, 107, 101, 121, 0, 100, 0, 0, 0, 0, 0, 0, 0, 0],
    );
}

#[test]
fn encode_decode_array() {
    round_trip(
        &doc! { "key": [1.01, "xyz"] },
        &[
            37, 0, 0, 0, 4, 107, 101, 121, 0, 27, 0, 0, 0, 1, 48, 0, 41, 92, 143, 194, 245, 40,
            240, 63, 2, 49, 0, 4, 0, 0, 0, 120, 121, 122, 0, 0, 0,
        ],
    );
}

#[test]
fn encode_decode_embedded_document() {
    round_trip(
        &doc! { "key": { "subkey": 1 } },
        &[
            27, 0, 0, 0, 3, 107, 101, 121, 0, 17, 0, 0, 0, 16, 115, 117, 98, 107, 101, 121, 0, 1,
            0, 0, 0, 0, 0,
        ],
    );
}

#[test]
fn encode_decode_empty_document() {
    round_trip(&doc! {}, &[5, 0, 0, 0, 0]);
}

// The halves of a timestamp appear on the wire increment first.
#[test]
fn timestamp_wire_order() {
    let doc = doc! { "key": Timestamp { time: 1, increment: 2 } };
    let bytes = doc.to_vec().unwrap();
    assert_eq!(
        bytes,
        vec![18, 0, 0, 0, 17, 107, 101, 121, 0, 2, 0, 0, 0, 1, 0, 0, 0, 0]
    );
    assert_eq!(Document::from_slice(&bytes).unwrap(), doc);
}

#[test]
fn regex_options_serialize_canonically() {
    let doc = doc! { "key": Regex { pattern: "ab+".to_string(), options: "xi".to_string() } };
    let decoded = Document::from_slice(&doc.to_vec().unwrap()).unwrap();
    match decoded.get("key") {
        Some(Bson::RegularExpression(regex)) => {
            assert_eq!(regex.pattern, "ab+");
            assert_eq!(regex.options, "ix");
        }
        other => panic!("expected regex, got {other:?}"),
    }

    // duplicate and unrecognized flags are dropped
    let regex = Regex::new("^$", "uixxsmg");
    assert_eq!(regex.options, "imsx");
}

#[test]
fn encode_decode_binary_generic() {
    round_trip(
        &doc! { "key": Binary { subtype: BinarySubtype::Generic, bytes: vec![1, 2, 3] } },
        &[18, 0, 0, 0, 5, 107, 101, 121, 0, 3, 0, 0, 0, 0, 1, 2, 3, 0],
    );
}

// The deprecated "old" binary subtype nests a second length before the
// payload.
#[test]
fn encode_decode_binary_old() {
    round_trip(
        &doc! { "key": Binary { subtype: BinarySubtype::BinaryOld, bytes: vec![1, 2, 3] } },
        &[22, 0, 0, 0, 5, 107, 101, 121, 0, 7, 0, 0, 0, 2, 3, 0, 0, 0, 1, 2, 3, 0],
    );
}

#[test]
fn binary_old_nested_length_mismatch_fails() {
    let mut bytes = doc! {
        "key": Binary { subtype: BinarySubtype::BinaryOld, bytes: vec![1, 2, 3] }
    }
    .to_vec()
    .unwrap();
    // corrupt the nested length
    bytes[14] = 9;
    let err = Document::from_slice(&bytes).unwrap_err();
    assert_matches!(err.kind, ErrorKind::MalformedValue { .. });
}

#[test]
fn encode_decode_object_id() {
    let oid = ObjectId::parse_str("4e4d66343b39b68407000001").unwrap();
    round_trip(
        &doc! { "_id": oid },
        &[
            22, 0, 0, 0, 7, 95, 105, 100, 0, 0x4e, 0x4d, 0x66, 0x34, 0x3b, 0x39, 0xb6, 0x84, 0x07,
            0x00, 0x00, 0x01, 0,
        ],
    );
}

#[test]
fn encode_decode_null_undefined_min_max() {
    let doc = doc! {
        "null": null,
        "undefined": Bson::Undefined,
        "min": Bson::MinKey,
        "max": Bson::MaxKey,
    };
    let decoded = Document::from_slice(&doc.to_vec().unwrap()).unwrap();
    assert_eq!(decoded, doc);
}

#[test]
fn encode_decode_datetime() {
    let doc = doc! { "when": bsonkit::DateTime::from_millis(1_590_972_160_292) };
    let decoded = Document::from_slice(&doc.to_vec().unwrap()).unwrap();
    assert_eq!(decoded, doc);

    let negative = doc! { "when": bsonkit::DateTime::from_millis(-44) };
    let decoded = Document::from_slice(&negative.to_vec().unwrap()).unwrap();
    assert_eq!(decoded, negative);
}

#[test]
fn encode_decode_code_with_scope() {
    let doc = doc! {
        "f": JavaScriptCodeWithScope {
            code: "function() { return x; }".to_string(),
            scope: doc! { "x": 1 },
        }
    };
    let decoded = Document::from_slice(&doc.to_vec().unwrap()).unwrap();
    assert_eq!(decoded, doc);
}

#[test]
fn code_with_scope_length_mismatch_fails() {
    let doc = doc! {
        "f": JavaScriptCodeWithScope {
            code: "x".to_string(),
            scope: doc! {},
        }
    };
    let mut bytes = doc.to_vec().unwrap();
    // the code-with-scope total length sits right after the element key
    bytes[7] += 1;
    let err = Document::from_slice(&bytes).unwrap_err();
    assert_matches!(err.kind, ErrorKind::MalformedValue { .. });
}

#[test]
fn encode_decode_db_pointer() {
    let doc = doc! {
        "ref": DbPointer {
            namespace: "db.coll".to_string(),
            id: ObjectId::parse_str("4e4d66343b39b68407000001").unwrap(),
        }
    };
    let decoded = Document::from_slice(&doc.to_vec().unwrap()).unwrap();
    assert_eq!(decoded, doc);
}

// A declared length larger than the terminated span must fail rather than
// silently ignoring trailing garbage.
#[test]
fn over_declared_length_fails() {
    let mut bytes = doc! { "k": true }.to_vec().unwrap();
    let declared = bytes[0] + 5;
    bytes[0] = declared;
    bytes.extend_from_slice(&[0, 0, 0, 0, 0]);

    let err = Document::from_slice(&bytes).unwrap_err();
    assert_matches!(err.kind, ErrorKind::MalformedValue { .. });
}

#[test]
fn off_by_one_length_fails() {
    let bytes = doc! { "k": true }.to_vec().unwrap();

    for delta in [-1i32, 1] {
        let mut corrupted = bytes.clone();
        corrupted[0] = (corrupted[0] as i32 + delta) as u8;
        assert!(
            Document::from_slice(&corrupted).is_err(),
            "corrupting the length by {delta} must fail decoding"
        );
    }
}

#[test]
fn truncated_document_fails() {
    let bytes = doc! { "k": "eliot" }.to_vec().unwrap();
    let err = Document::from_slice(&bytes[..bytes.len() - 4]).unwrap_err();
    assert_matches!(err.kind, ErrorKind::MalformedValue { .. });
}

#[test]
fn unknown_element_type_fails_with_key_context() {
    // { <0xAB> "k" ... }
    let bytes = [10, 0, 0, 0, 0xAB, 0x6B, 0x00, 0x01, 0x00, 0x00];
    let err = Document::from_slice(&bytes).unwrap_err();
    assert_eq!(err.key.as_deref(), Some("k"));
    assert_matches!(err.kind, ErrorKind::UnsupportedType { tag: 0xAB, .. });
}

#[test]
fn invalid_boolean_byte_fails() {
    let mut bytes = doc! { "k": true }.to_vec().unwrap();
    bytes[7] = 0x02;
    let err = Document::from_slice(&bytes).unwrap_err();
    assert_matches!(err.kind, ErrorKind::MalformedValue { .. });
}

#[test]
fn key_with_embedded_null_fails_to_encode() {
    let mut doc = Document::new();
    doc.insert("a\0b", 1);
    let err = doc.to_vec().unwrap_err();
    assert_matches!(err.kind, ErrorKind::EmbeddedNullByte);
}

#[test]
fn nested_error_reports_array_index() {
    let mut bytes = doc! { "arr": [true, true] }.to_vec().unwrap();
    // corrupt the second boolean's payload byte
    let at = bytes.len() - 3;
    bytes[at] = 0x07;
    let err = Document::from_slice(&bytes).unwrap_err();
    assert_eq!(err.index, Some(1));
}
