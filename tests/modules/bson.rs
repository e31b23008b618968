use assert_matches::assert_matches;
use bsonkit::{
    doc,
    spec::ElementType,
    Bson,
    ErrorKind,
    ObjectId,
    Regex,
    Timestamp,
};

#[test]
fn from_impls_pick_the_natural_variant() {
    assert_eq!(Bson::from(1.5f64), Bson::Double(1.5));
    assert_eq!(Bson::from("s"), Bson::String("s".to_string()));
    assert_eq!(Bson::from(true), Bson::Boolean(true));
    assert_eq!(Bson::from(5i32), Bson::Int32(5));
    assert_eq!(Bson::from(5i64), Bson::Int64(5));
    assert_eq!(Bson::from(vec![1, 2]), Bson::Array(vec![1.into(), 2.into()]));
    assert_eq!(Bson::from(Some(5i32)), Bson::Int32(5));
    assert_eq!(Bson::from(None::<i32>), Bson::Null);
}

#[test]
fn unsigned_conversions_narrow_or_promote() {
    assert_eq!(Bson::from(5u32), Bson::Int32(5));
    assert_eq!(Bson::from(u32::MAX), Bson::Int64(u32::MAX.into()));

    assert_eq!(Bson::try_from(5u64).unwrap(), Bson::Int32(5));
    // the first value past i32::MAX promotes to Int64
    assert_eq!(
        Bson::try_from(2_147_483_648u64).unwrap(),
        Bson::Int64(2_147_483_648)
    );

    let err = Bson::try_from(u64::MAX).unwrap_err();
    assert_matches!(err.kind, ErrorKind::OutOfRange { .. });

    assert_eq!(
        Bson::try_from(i64::MIN as i128).unwrap(),
        Bson::Int64(i64::MIN)
    );
    let err = Bson::try_from(i64::MIN as i128 - 1).unwrap_err();
    assert_matches!(err.kind, ErrorKind::OutOfRange { .. });
}

#[test]
fn element_types() {
    assert_eq!(Bson::Double(1.0).element_type(), ElementType::Double);
    assert_eq!(Bson::Null.element_type(), ElementType::Null);
    assert_eq!(Bson::MinKey.element_type(), ElementType::MinKey);
    assert_eq!(Bson::MaxKey.element_type(), ElementType::MaxKey);
    assert_eq!(
        Bson::Timestamp(Timestamp { time: 0, increment: 0 }).element_type(),
        ElementType::Timestamp
    );
    assert_eq!(ElementType::from(0x13), Some(ElementType::Decimal128));
    assert_eq!(ElementType::from(0xFF), Some(ElementType::MinKey));
    assert_eq!(ElementType::from(0x7F), Some(ElementType::MaxKey));
    assert_eq!(ElementType::from(0x14), None);
}

#[test]
fn display_uses_shell_notation() {
    assert_eq!(Bson::Null.to_string(), "null");
    assert_eq!(Bson::String("x".to_string()).to_string(), "\"x\"");
    assert_eq!(
        Bson::Array(vec![1i32.into(), "two".into()]).to_string(),
        "[1, \"two\"]"
    );
    assert_eq!(
        Bson::RegularExpression(Regex::new("ab", "i")).to_string(),
        "/ab/i"
    );
    let oid = ObjectId::parse_str("4e4d66343b39b68407000001").unwrap();
    assert_eq!(
        Bson::ObjectId(oid).to_string(),
        "ObjectId(\"4e4d66343b39b68407000001\")"
    );
    assert_eq!(
        Bson::Document(doc! { "a": 1 }).to_string(),
        "{ \"a\": 1 }"
    );
}

#[test]
fn accessors_match_variants() {
    let value = Bson::Int32(5);
    assert_eq!(value.as_i32(), Some(5));
    assert_eq!(value.as_i64(), None);
    assert_eq!(value.as_str(), None);

    let mut value = Bson::Document(doc! { "a": 1 });
    value.as_document_mut().unwrap().insert("b", 2);
    assert_eq!(value.as_document().unwrap().len(), 2);
}
