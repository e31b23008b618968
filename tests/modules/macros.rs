use bsonkit::{bson, doc, Bson};

#[test]
fn recursive_macro() {
    let doc = doc! {
        "a": "foo",
        "b": {
            "bar": {
                "harbor": ["seal", false],
                "jelly": 42.0,
            },
            "grape": 27,
        },
        "c": [-7],
    };

    assert_eq!(doc.get_str("a").unwrap(), "foo");

    let b = doc.get_document("b").unwrap();
    let bar = b.get_document("bar").unwrap();
    assert_eq!(
        bar.get_array("harbor").unwrap(),
        &vec![Bson::String("seal".to_string()), Bson::Boolean(false)]
    );
    assert_eq!(bar.get_f64("jelly").unwrap(), 42.0);
    assert_eq!(b.get_i32("grape").unwrap(), 27);

    assert_eq!(doc.get_array("c").unwrap(), &vec![Bson::Int32(-7)]);
}

#[test]
fn empty_and_null() {
    assert!(doc! {}.is_empty());
    assert_eq!(bson!(null), Bson::Null);
    assert_eq!(bson!([]), Bson::Array(vec![]));
    assert_eq!(bson!({}), Bson::Document(doc! {}));
}

#[test]
fn expressions_as_keys_and_values() {
    let key = "dynamic";
    let value = 40 + 2;
    let doc = doc! {
        (key): value,
        (format!("{key}_2")): "two",
    };
    assert_eq!(doc.get_i32("dynamic").unwrap(), 42);
    assert_eq!(doc.get_str("dynamic_2").unwrap(), "two");
}

#[test]
fn trailing_commas_are_accepted() {
    let doc = doc! {
        "a": [1, 2,],
        "b": { "c": 3, },
    };
    assert_eq!(doc.get_array("a").unwrap().len(), 2);
    assert_eq!(doc.get_document("b").unwrap().get_i32("c").unwrap(), 3);
}

#[test]
fn nested_arrays_and_documents() {
    let value = bson!([
        "literal",
        { "nested": "document", "integer": 1 },
        [true, null],
    ]);

    let array = match value {
        Bson::Array(array) => array,
        other => panic!("expected array, got {other:?}"),
    };
    assert_eq!(array.len(), 3);
    assert_eq!(array[0], Bson::String("literal".to_string()));
    match &array[1] {
        Bson::Document(doc) => assert_eq!(doc.get_i32("integer").unwrap(), 1),
        other => panic!("expected document, got {other:?}"),
    }
    assert_eq!(array[2], Bson::Array(vec![Bson::Boolean(true), Bson::Null]));
}
