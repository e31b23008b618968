use assert_matches::assert_matches;
use bsonkit::{
    doc,
    extjson,
    spec::BinarySubtype,
    Binary,
    Bson,
    DateTime,
    Decimal128,
    ErrorKind,
    ExtJsonMode,
    JavaScriptCodeWithScope,
    ObjectId,
    Regex,
    Timestamp,
    Uuid,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn comprehensive_doc() -> Bson {
    let oid = ObjectId::parse_str("4e4d66343b39b68407000001").unwrap();
    Bson::Document(doc! {
        "double": 10.5,
        "nan": f64::NAN,
        "infinity": f64::INFINITY,
        "string": "some string",
        "array": [1, 2.5, { "nested": null }],
        "document": { "x": 1i64 },
        "bool": true,
        "null": null,
        "regex": Regex::new("^a.*$", "xi"),
        "code": Bson::JavaScriptCode("function() {}".to_string()),
        "code_w_scope": JavaScriptCodeWithScope {
            code: "function() { return a; }".to_string(),
            scope: doc! { "a": 1 },
        },
        "int32": 42i32,
        "int64": 9_007_199_254_740_993i64,
        "timestamp": Timestamp { time: 123, increment: 456 },
        "binary": Binary { subtype: BinarySubtype::Generic, bytes: vec![1, 2, 3] },
        "oid": oid,
        "datetime": DateTime::from_millis(1_590_972_160_292),
        "symbol": Bson::Symbol("sym".to_string()),
        "decimal": "2.000".parse::<Decimal128>().unwrap(),
        "undefined": Bson::Undefined,
        "min": Bson::MinKey,
        "max": Bson::MaxKey,
        "db_pointer": bsonkit::DbPointer { namespace: "db.coll".to_string(), id: oid },
    })
}

// NaN compares unequal to itself, so the usual equality assertion needs the
// NaN entry checked structurally instead.
fn assert_bson_eq(actual: &Bson, expected: &Bson) {
    let (actual, expected) = match (actual, expected) {
        (Bson::Document(actual), Bson::Document(expected)) => {
            let mut actual = actual.clone();
            let mut expected = expected.clone();
            let a = actual.remove("nan");
            let b = expected.remove("nan");
            match (a, b) {
                (Some(Bson::Double(a)), Some(Bson::Double(b))) => {
                    assert!(a.is_nan() && b.is_nan())
                }
                (None, None) => {}
                other => panic!("nan entries diverged: {other:?}"),
            }
            (actual, expected)
        }
        _ => panic!("expected documents"),
    };
    assert_eq!(actual, expected);
}

#[test]
fn canonical_round_trip_is_identity() {
    let value = comprehensive_doc();
    let text = extjson::to_string(&value, ExtJsonMode::Canonical).unwrap();
    let parsed = extjson::parse(&text, ExtJsonMode::Canonical).unwrap();
    assert_bson_eq(&parsed, &value);
}

#[test]
fn canonical_wraps_every_numeric() {
    let value = Bson::Document(doc! { "a": 1i32, "b": 2i64, "c": 3.0 });
    let text = extjson::to_string(&value, ExtJsonMode::Canonical).unwrap();
    assert_eq!(
        text,
        r#"{"a":{"$numberInt":"1"},"b":{"$numberLong":"2"},"c":{"$numberDouble":"3.0"}}"#
    );
}

#[test]
fn relaxed_uses_bare_numbers_where_lossless() {
    let value = Bson::Document(doc! {
        "i32": 1i32,
        "small_i64": 300i64,
        "big_i64": 9_007_199_254_740_993i64,
        "double": 10.5,
        "nan": f64::NAN,
    });
    let json = match extjson::parse(
        &extjson::to_string(&value, ExtJsonMode::Relaxed).unwrap(),
        ExtJsonMode::Relaxed,
    )
    .unwrap()
    {
        Bson::Document(doc) => doc,
        other => panic!("expected document, got {other:?}"),
    };

    // bare integers lose their width on the way through relaxed JSON
    assert_eq!(json.get("i32"), Some(&Bson::Int32(1)));
    assert_eq!(json.get("small_i64"), Some(&Bson::Int32(300)));
    // an integer past 2^53 keeps the $numberLong wrapper and its width
    assert_eq!(json.get("big_i64"), Some(&Bson::Int64(9_007_199_254_740_993)));
    assert_eq!(json.get("double"), Some(&Bson::Double(10.5)));
}

#[test]
fn relaxed_renders_in_range_dates_as_rfc3339() {
    let value = Bson::Document(doc! { "when": DateTime::from_millis(1_590_972_160_292) });
    let text = extjson::to_string(&value, ExtJsonMode::Relaxed).unwrap();
    assert_eq!(text, r#"{"when":{"$date":"2020-06-01T00:42:40.292Z"}}"#);

    // negative-epoch dates fall back to the canonical form
    let value = Bson::Document(doc! { "when": DateTime::from_millis(-1) });
    let text = extjson::to_string(&value, ExtJsonMode::Relaxed).unwrap();
    assert_eq!(text, r#"{"when":{"$date":{"$numberLong":"-1"}}}"#);
}

#[test]
fn legacy_output_shapes() {
    let value = Bson::Document(doc! {
        "bin": Binary { subtype: BinarySubtype::Generic, bytes: vec![1, 2, 3] },
        "regex": Regex::new("^a", "ix"),
        "when": DateTime::from_millis(100),
        "count": 5i64,
    });
    let json: serde_json::Value =
        serde_json::from_str(&extjson::to_string(&value, ExtJsonMode::Legacy).unwrap()).unwrap();

    assert_eq!(
        json,
        json!({
            "bin": { "$binary": "AQID", "$type": "00" },
            "regex": { "$regex": "^a", "$options": "ix" },
            "when": { "$date": 100 },
            "count": 5,
        })
    );
}

#[test]
fn legacy_shapes_parse_in_any_mode() {
    let text = r#"{
        "bin": { "$binary": "AQID", "$type": "00" },
        "regex": { "$regex": "^a", "$options": "ix" },
        "when": { "$date": 100 }
    }"#;

    for mode in [ExtJsonMode::Canonical, ExtJsonMode::Relaxed, ExtJsonMode::Legacy] {
        let parsed = extjson::parse(text, mode).unwrap();
        let expected = Bson::Document(doc! {
            "bin": Binary { subtype: BinarySubtype::Generic, bytes: vec![1, 2, 3] },
            "regex": Regex::new("^a", "ix"),
            "when": DateTime::from_millis(100),
        });
        assert_eq!(parsed, expected);
    }
}

#[test]
fn canonical_and_relaxed_can_be_mixed() {
    let text = r#"{ "x": 5, "y": { "$numberInt": "5" }, "z": { "subdoc": "hello" } }"#;
    let parsed = extjson::parse(text, ExtJsonMode::Canonical).unwrap();
    assert_eq!(
        parsed,
        Bson::Document(doc! { "x": 5i32, "y": 5i32, "z": { "subdoc": "hello" } })
    );
}

#[test]
fn uuid_shape_parses_to_a_standard_binary() {
    let text = r#"{ "$uuid": "00112233-4455-6677-8899-aabbccddeeff" }"#;
    let parsed = extjson::parse(text, ExtJsonMode::Canonical).unwrap();
    let uuid = Uuid::parse_str("00112233-4455-6677-8899-aabbccddeeff").unwrap();
    assert_eq!(parsed, Bson::Binary(Binary::from_uuid(uuid)));
}

#[test]
fn dbref_is_a_plain_document() {
    let text = r#"{ "$ref": "coll", "$id": { "$oid": "4e4d66343b39b68407000001" }, "$db": "db" }"#;
    let parsed = extjson::parse(text, ExtJsonMode::Canonical).unwrap();
    assert_eq!(
        parsed,
        Bson::Document(doc! {
            "$ref": "coll",
            "$id": ObjectId::parse_str("4e4d66343b39b68407000001").unwrap(),
            "$db": "db",
        })
    );
}

#[test]
fn code_without_scope_and_with_scope() {
    let parsed = extjson::parse(r#"{ "$code": "x" }"#, ExtJsonMode::Canonical).unwrap();
    assert_eq!(parsed, Bson::JavaScriptCode("x".to_string()));

    let parsed = extjson::parse(
        r#"{ "$code": "x", "$scope": { "a": { "$numberInt": "1" } } }"#,
        ExtJsonMode::Canonical,
    )
    .unwrap();
    assert_eq!(
        parsed,
        Bson::JavaScriptCodeWithScope(JavaScriptCodeWithScope {
            code: "x".to_string(),
            scope: doc! { "a": 1 },
        })
    );
}

#[test]
fn reserved_key_misuse_is_rejected() {
    let cases = [
        // wrong value type under a reserved key
        r#"{ "$numberLong": 5 }"#,
        r#"{ "$oid": 5 }"#,
        // out-of-range wrapped integer
        r#"{ "$numberInt": "2147483648" }"#,
        // reserved key with an unexpected sibling
        r#"{ "$oid": "4e4d66343b39b68407000001", "extra": 1 }"#,
        // reserved key outside of any recognized shape
        r#"{ "$scope": {} }"#,
        r#"{ "a": 1, "$numberInt": "5" }"#,
        // malformed substructure
        r#"{ "$timestamp": { "t": 1 } }"#,
        r#"{ "$regularExpression": { "pattern": "a" } }"#,
        r#"{ "$date": true }"#,
        r#"{ "$minKey": 2 }"#,
        r#"{ "$undefined": false }"#,
    ];

    for text in cases {
        let err = extjson::parse(text, ExtJsonMode::Canonical).unwrap_err();
        assert_matches!(
            err.kind,
            ErrorKind::ExtJsonParse { .. },
            "{text} should be rejected"
        );
    }
}

#[test]
fn non_finite_doubles_round_trip() {
    for (text, check) in [
        (r#"{ "$numberDouble": "Infinity" }"#, f64::is_infinite as fn(f64) -> bool),
        (r#"{ "$numberDouble": "NaN" }"#, f64::is_nan),
    ] {
        match extjson::parse(text, ExtJsonMode::Canonical).unwrap() {
            Bson::Double(d) => assert!(check(d)),
            other => panic!("expected double, got {other:?}"),
        }
    }
}

#[test]
fn plain_json_numbers_take_the_narrowest_type() {
    let parsed = extjson::parse(r#"{ "a": 5, "b": 2147483648, "c": 1.5 }"#, ExtJsonMode::Relaxed)
        .unwrap();
    assert_eq!(
        parsed,
        Bson::Document(doc! { "a": 5i32, "b": 2_147_483_648i64, "c": 1.5 })
    );
}
