use serde_json::json;

use httpdf_template::schema::Schema;

fn person_schema() -> Schema {
    Schema::compile(&json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "properties": {
            "name": {"type": "string"},
            "age": {"type": "integer", "minimum": 0}
        },
        "required": ["name"]
    }))
    .unwrap()
}

#[test]
fn valid_values_pass() {
    let result = person_schema().validate(&json!({"name": "World", "age": 3}));
    assert!(result.is_valid(), "{result:?}");
}

#[test]
fn missing_required_field_is_reported() {
    let result = person_schema().validate(&json!({}));
    assert_eq!(result.violations.len(), 1);
    assert_eq!(result.violations[0].pointer, "/name");
    assert!(result.violations[0].reason.contains("name"), "{result:?}");
}

#[test]
fn nested_required_fields_point_at_the_missing_property() {
    let schema = Schema::compile(&json!({
        "type": "object",
        "properties": {
            "customer": {"type": "object", "required": ["email", "a/b~c"]}
        }
    }))
    .unwrap();
    let result = schema.validate(&json!({"customer": {}}));
    let mut pointers: Vec<&str> = result.violations.iter().map(|v| v.pointer.as_str()).collect();
    pointers.sort();
    assert_eq!(pointers, ["/customer/a~1b~0c", "/customer/email"]);
}

#[test]
fn every_violation_is_reported() {
    let result = person_schema().validate(&json!({"age": -1}));
    assert_eq!(result.violations.len(), 2, "{result:?}");
    assert!(result.violations.iter().any(|v| v.pointer == "/age"));
    assert!(result.violations.iter().any(|v| v.pointer == "/name"));
}

#[test]
fn schema_without_properties_is_permissive() {
    let schema = Schema::compile(&json!({})).unwrap();
    assert!(schema.validate(&json!({"anything": [1, {"nested": null}]})).is_valid());

    let object_only = Schema::compile(&json!({"type": "object"})).unwrap();
    assert!(object_only.validate(&json!({"x": 1})).is_valid());
}

#[test]
fn malformed_schema_is_rejected() {
    assert!(Schema::from_slice(b"{invalid json").is_err());
}
