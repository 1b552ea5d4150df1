//! Standard response envelope: `{status, data}` on every response.

use axum::{http::StatusCode, Json};
use serde::Serialize;
use serde_json::Value;

pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

#[derive(Debug, Serialize)]
pub struct Envelope {
    pub status: u16,
    pub data: Value,
}

/// Empty and falsy payloads become `[]`, never `null`.
pub fn normalize(data: Value) -> Value {
    let empty = match &data {
        Value::Null => true,
        Value::Bool(b) => !*b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    };
    if empty {
        Value::Array(Vec::new())
    } else {
        data
    }
}

pub fn envelope(status: StatusCode, data: Value) -> (StatusCode, Json<Envelope>) {
    (
        status,
        Json(Envelope {
            status: status.as_u16(),
            data: normalize(data),
        }),
    )
}

pub fn success_ok<T: Serialize>(data: T) -> (StatusCode, Json<Envelope>) {
    envelope(StatusCode::OK, serde_json::to_value(data).unwrap_or(Value::Null))
}

pub fn success_created<T: Serialize>(data: T) -> (StatusCode, Json<Envelope>) {
    envelope(StatusCode::CREATED, serde_json::to_value(data).unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn falsy_payloads_become_empty_sequence() {
        for v in [json!(null), json!(false), json!(0), json!(""), json!([]), json!({})] {
            assert_eq!(normalize(v), json!([]));
        }
    }

    #[test]
    fn truthy_payloads_pass_through() {
        assert_eq!(normalize(json!({"Id": 1})), json!({"Id": 1}));
        assert_eq!(normalize(json!("ok")), json!("ok"));
        assert_eq!(normalize(json!(3)), json!(3));
    }

    #[test]
    fn envelope_carries_numeric_status() {
        let (status, Json(body)) = success_created(json!({"Id": 7}));
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(serde_json::to_value(&body).unwrap(), json!({"status": 201, "data": {"Id": 7}}));
    }
}
