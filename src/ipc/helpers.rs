use crate::ipc::error::{err, store_error};
use crate::ipc::types::Request;
use crate::store::{EntityKind, Record, StoreError};
use serde_json::json;

pub fn store_err(req: &Request, e: StoreError) -> serde_json::Value {
    store_error(&req.id, &e, None)
}

pub fn str_param<'a>(req: &'a Request, name: &str) -> Result<&'a str, serde_json::Value> {
    req.params
        .get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {name}"), None))
}

pub fn kind_param(req: &Request) -> Result<EntityKind, serde_json::Value> {
    let raw = str_param(req, "kind")?;
    EntityKind::parse(raw).ok_or_else(|| {
        store_error(
            &req.id,
            &StoreError::UnknownKind(raw.to_string()),
            Some(json!({ "kinds": EntityKind::ALL.map(|k| k.key()) })),
        )
    })
}

pub fn object_param(
    req: &Request,
    name: &'static str,
) -> Result<Record, serde_json::Value> {
    match req.params.get(name) {
        Some(serde_json::Value::Object(map)) => Ok(map.clone()),
        _ => Err(store_err(req, StoreError::NotAnObject(name))),
    }
}
