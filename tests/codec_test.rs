//! Integration tests for the codec surface re-exported by pgarray
//!
//! No database is needed: these exercise text literals, the binary format,
//! the runtime type registry and configuration together.

use pgarray::array_codec::{decode_literal, encode_literal, parse_literal_values, split_binary};
use pgarray::prelude::*;
use pgarray::type_mapping::{array_from_json, array_to_json, to_dynamic_array};
use serde_json::json;

#[test]
fn test_registry_decodes_server_output() {
    let registry = ArrayTypeRegistry::default();

    let decoded = registry
        .decode_text("string-array", Some(r#"{"a b",NULL,"say \"hi\"",plain,"NULL"}"#))
        .unwrap()
        .unwrap();
    assert_eq!(
        decoded,
        vec![
            Some(PostgresValue::Text("a b".to_string())),
            None,
            Some(PostgresValue::Text("say \"hi\"".to_string())),
            Some(PostgresValue::Text("plain".to_string())),
            Some(PostgresValue::Text("NULL".to_string())),
        ]
    );

    let ints = registry
        .decode_text("int-array", Some("[1:3]={ 1 , 2 ,3 }"))
        .unwrap()
        .unwrap();
    assert_eq!(ints, to_dynamic_array(vec![Some(1i32), Some(2), Some(3)]));
}

#[test]
fn test_null_column_and_empty_array_stay_distinct() {
    let options = CodecOptions::default();

    assert_eq!(decode_literal::<i64>(None, &options).unwrap(), None);
    assert_eq!(decode_literal::<i64>(Some("{}"), &options).unwrap(), Some(vec![]));
    assert_eq!(encode_literal::<i64>(None, &options), None);
    assert_eq!(encode_literal::<i64>(Some(&[][..]), &options).as_deref(), Some("{}"));

    assert_eq!(array_to_json(None), serde_json::Value::Null);
    assert_eq!(array_to_json(Some(&[][..])), json!([]));
}

#[test]
fn test_malformed_literals_carry_position() {
    let options = CodecOptions::default();

    for (input, position) in [("{1,2", 4), ("{1,,2}", 3), ("{1,x}", 3), ("1,2}", 0)] {
        let err = parse_literal_values::<i32>(input, &options).unwrap_err();
        assert!(
            matches!(err, CodecError::MalformedArrayLiteral { .. }),
            "{}",
            input
        );
        assert_eq!(err.position(), Some(position), "{}", input);
    }
}

#[test]
fn test_typed_and_runtime_binary_agree() {
    let typed = PgArray::new(vec![Some(1.5f64), None, Some(f64::NEG_INFINITY)]);
    let typed_bytes = typed.to_binary().unwrap();

    let runtime = TypedArray::from_values(vec![Some(1.5f64), None, Some(f64::NEG_INFINITY)]);
    let mut runtime_bytes = Vec::new();
    pgarray::type_mapping::encode_binary_array(
        runtime.values(),
        runtime.element_type(),
        &mut runtime_bytes,
    )
    .unwrap();
    assert_eq!(typed_bytes, runtime_bytes);

    let header = split_binary(&typed_bytes, &CodecOptions::default()).unwrap();
    assert_eq!(header.element_oid, ElementType::DoublePrecision.oid());
    assert_eq!(header.lower_bound, 1);
    assert_eq!(header.elements.len(), 3);
    assert!(header.elements[1].bytes.is_none());
}

#[test]
fn test_configured_delimiter_flows_through_registry() {
    let content = r#"
[database]
host = "localhost"
port = 5432
database = "postgres"
username = "postgres"
password = "postgres"
min_connections = 1
max_connections = 5
connection_timeout_seconds = 30
idle_timeout_seconds = 600
max_lifetime_seconds = 3600

[codec]
delimiter = ";"
max_elements = 2
"#;
    let config = AppConfig::from_toml_str(content).unwrap();
    let registry = ArrayTypeRegistry::from_config(&config.codec);

    let decoded = registry
        .decode_text("string-array", Some("{a,b;c}"))
        .unwrap()
        .unwrap();
    assert_eq!(decoded, to_dynamic_array(vec![Some("a,b"), Some("c")]));

    assert!(matches!(
        registry.decode_text("string-array", Some("{a;b;c}")),
        Err(PgArrayError::Codec(CodecError::MalformedArrayLiteral { .. }))
    ));
}

#[test]
fn test_json_bridge_matches_registry() {
    let registry = ArrayTypeRegistry::default();
    let values = array_from_json(&json!([10, null, "30"]), ElementType::BigInt)
        .unwrap()
        .unwrap();

    let literal = registry
        .encode_text("long-array", Some(values.as_slice()))
        .unwrap();
    assert_eq!(literal.as_deref(), Some("{10,NULL,30}"));

    let param = registry.bind("long-array", values).unwrap();
    assert_eq!(array_to_json(Some(param.values())), json!([10, null, 30]));
}

#[test]
fn test_ddl_helpers() {
    assert_eq!(
        array_column_sql("tags", ElementType::Text).unwrap(),
        "tags text[]"
    );
    assert!(matches!(
        array_contains_function_sql("bad name", ElementType::Integer),
        Err(PgArrayError::InvalidIdentifier(_))
    ));
}
