//! Conversions between [`MsgPackValue`] and `serde_json::Value`.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use super::{MsgPackString, MsgPackValue};

const BINARY_URI_PREFIX: &str = "data:application/octet-stream;base64,";

fn bytes_to_data_uri(bytes: &[u8]) -> String {
    format!("{BINARY_URI_PREFIX}{}", BASE64.encode(bytes))
}

/// Renders a map key as JSON object-key text.
fn key_to_string(key: &MsgPackValue) -> String {
    match key {
        MsgPackValue::Str(s) => match s.try_str() {
            Some(text) => text.to_owned(),
            None => bytes_to_data_uri(s.as_bytes()),
        },
        MsgPackValue::Int(v) => v.to_string(),
        MsgPackValue::UInt(v) => v.to_string(),
        MsgPackValue::Bool(b) => b.to_string(),
        other => format!("{other:?}"),
    }
}

impl From<&MsgPackValue> for serde_json::Value {
    fn from(value: &MsgPackValue) -> Self {
        match value {
            MsgPackValue::Nil => serde_json::Value::Null,
            MsgPackValue::Bool(b) => serde_json::Value::Bool(*b),
            MsgPackValue::Int(v) => serde_json::json!(v),
            MsgPackValue::UInt(v) => serde_json::json!(v),
            MsgPackValue::F32(v) => serde_json::json!(*v as f64),
            MsgPackValue::F64(v) => serde_json::json!(v),
            MsgPackValue::Str(s) => match s.try_str() {
                Some(text) => serde_json::Value::String(text.to_owned()),
                None => serde_json::Value::String(bytes_to_data_uri(s.as_bytes())),
            },
            MsgPackValue::Bin(b) => serde_json::Value::String(bytes_to_data_uri(b)),
            MsgPackValue::Array(items) => {
                serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect())
            }
            MsgPackValue::Map(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (key_to_string(k), serde_json::Value::from(v)))
                    .collect(),
            ),
            MsgPackValue::Ext(_, data) => serde_json::Value::String(bytes_to_data_uri(data)),
        }
    }
}

impl From<MsgPackValue> for serde_json::Value {
    fn from(value: MsgPackValue) -> Self {
        serde_json::Value::from(&value)
    }
}

impl From<serde_json::Value> for MsgPackValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => MsgPackValue::Nil,
            serde_json::Value::Bool(b) => MsgPackValue::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    MsgPackValue::Int(i)
                } else if let Some(u) = n.as_u64() {
                    MsgPackValue::UInt(u)
                } else {
                    MsgPackValue::F64(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => MsgPackValue::Str(MsgPackString::from_string(s)),
            serde_json::Value::Array(items) => {
                MsgPackValue::Array(items.into_iter().map(MsgPackValue::from).collect())
            }
            serde_json::Value::Object(entries) => MsgPackValue::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| {
                        (
                            MsgPackValue::Str(MsgPackString::from_string(k)),
                            MsgPackValue::from(v),
                        )
                    })
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_round_trip_for_plain_values() {
        let cases = vec![
            json!(null),
            json!(true),
            json!(123),
            json!(-7),
            json!("hello"),
            json!([1, 2, 3]),
            json!({"a": 1, "b": [true, null, "x"]}),
        ];
        for case in cases {
            let value = MsgPackValue::from(case.clone());
            let back = serde_json::Value::from(value);
            assert_eq!(back, case);
        }
    }

    #[test]
    fn binary_renders_as_data_uri() {
        let value = MsgPackValue::Bin(vec![1, 2, 3]);
        let json = serde_json::Value::from(value);
        let s = json.as_str().unwrap();
        assert!(s.starts_with(BINARY_URI_PREFIX));
    }
}
