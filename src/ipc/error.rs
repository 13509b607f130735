use crate::store::StoreError;
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

pub fn ok(id: &str, result: Value) -> Value {
    json!({ "id": id, "ok": true, "result": result })
}

pub fn err(id: &str, code: &str, message: impl Into<String>, details: Option<Value>) -> Value {
    let body = ErrorBody {
        code,
        message: message.into(),
        details,
    };
    json!({ "id": id, "ok": false, "error": body })
}

/// Store failures carry their own stable code.
pub fn store_error(id: &str, e: &StoreError, details: Option<Value>) -> Value {
    err(id, e.code(), e.to_string(), details)
}
