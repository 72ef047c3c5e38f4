//! Conversions between DynamoDB attribute values and plain JSON, so records
//! stay schemaless end to end and unknown fields survive read-modify-write.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use base64::{engine::general_purpose, Engine as _};
use serde_json::{Map, Number, Value};

pub(crate) fn item_to_json(item: &HashMap<String, AttributeValue>) -> Map<String, Value> {
    item.iter()
        .map(|(k, v)| (k.clone(), attr_to_json(v)))
        .collect()
}

pub(crate) fn json_to_item(map: &Map<String, Value>) -> HashMap<String, AttributeValue> {
    map.iter()
        .map(|(k, v)| (k.clone(), json_to_attr(v)))
        .collect()
}

fn attr_to_json(attr: &AttributeValue) -> Value {
    match attr {
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::N(n) => number_to_json(n),
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::L(list) => Value::Array(list.iter().map(attr_to_json).collect()),
        AttributeValue::M(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), attr_to_json(v)))
                .collect(),
        ),
        AttributeValue::B(blob) => Value::String(general_purpose::STANDARD.encode(blob.as_ref())),
        AttributeValue::Ss(set) => Value::Array(set.iter().cloned().map(Value::String).collect()),
        AttributeValue::Ns(set) => Value::Array(set.iter().map(|n| number_to_json(n)).collect()),
        AttributeValue::Bs(set) => Value::Array(
            set.iter()
                .map(|b| Value::String(general_purpose::STANDARD.encode(b.as_ref())))
                .collect(),
        ),
        _ => Value::Null,
    }
}

fn json_to_attr(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(items) => AttributeValue::L(items.iter().map(json_to_attr).collect()),
        Value::Object(map) => AttributeValue::M(
            map.iter()
                .map(|(k, v)| (k.clone(), json_to_attr(v)))
                .collect(),
        ),
    }
}

/// DynamoDB numbers are decimal strings with more range than a JSON number;
/// anything that does not fit is passed through as a string.
fn number_to_json(n: &str) -> Value {
    if let Ok(i) = n.parse::<i64>() {
        return Value::Number(i.into());
    }
    if let Ok(u) = n.parse::<u64>() {
        return Value::Number(u.into());
    }
    match n.parse::<f64>().ok().and_then(Number::from_f64) {
        Some(num) => Value::Number(num),
        None => Value::String(n.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use aws_sdk_dynamodb::primitives::Blob;
    use aws_sdk_dynamodb::types::AttributeValue;
    use serde_json::{json, Value};

    use super::{attr_to_json, item_to_json, json_to_attr, json_to_item};

    #[test]
    fn nested_document_round_trips() {
        let doc = json!({
            "id": "k7x",
            "timestamp": 172498117000u64,
            "active": true,
            "notes": Value::Null,
            "tags": ["a", "b"],
            "nested": { "depth": 2, "ratio": 0.5 }
        });
        let map = doc.as_object().unwrap();

        let round_tripped = item_to_json(&json_to_item(map));
        assert_eq!(Value::Object(round_tripped), doc);
    }

    #[test]
    fn numbers_keep_their_shape() {
        assert_eq!(attr_to_json(&AttributeValue::N("42".into())), json!(42));
        assert_eq!(attr_to_json(&AttributeValue::N("-7".into())), json!(-7));
        assert_eq!(attr_to_json(&AttributeValue::N("2.5".into())), json!(2.5));
        // Beyond every numeric type: falls back to the raw decimal string.
        assert_eq!(
            attr_to_json(&AttributeValue::N("1e999".into())),
            json!("1e999")
        );
    }

    #[test]
    fn integers_do_not_become_floats() {
        let attr = json_to_attr(&json!(9_007_199_254_740_993u64));
        assert_eq!(attr, AttributeValue::N("9007199254740993".to_string()));
    }

    #[test]
    fn binary_attributes_decode_to_base64_strings() {
        let attr = AttributeValue::B(Blob::new(vec![0xde, 0xad, 0xbe, 0xef]));
        assert_eq!(attr_to_json(&attr), json!("3q2+7w=="));
    }

    #[test]
    fn string_sets_decode_to_arrays() {
        let attr = AttributeValue::Ss(vec!["x".to_string(), "y".to_string()]);
        assert_eq!(attr_to_json(&attr), json!(["x", "y"]));
    }
}
