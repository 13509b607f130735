use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{kind_param, object_param, store_err, str_param};
use crate::ipc::types::{AppState, Request};
use crate::model::checkbox_value;
use crate::store::{EntityKind, Record};
use serde_json::{json, Value};

/// Builds a mutation response, recomputing grades first when the changed
/// collection feeds them.
fn mutation_result(state: &mut AppState, kind: EntityKind, mut result: Value) -> Value {
    result["kind"] = json!(kind.key());
    if kind.feeds_grades() {
        state.refresh_grades();
        result["grades"] = json!(state.grades);
    }
    result
}

fn handle_kinds(req: &Request) -> Value {
    ok(
        &req.id,
        json!({ "kinds": EntityKind::ALL.map(|k| k.key()) }),
    )
}

fn handle_list(state: &mut AppState, req: &Request) -> Value {
    let kind = match kind_param(req) {
        Ok(k) => k,
        Err(resp) => return resp,
    };
    let records = state
        .store
        .as_mut()
        .map(|s| s.load_all(kind))
        .unwrap_or_default();
    ok(&req.id, json!({ "kind": kind.key(), "records": records }))
}

fn handle_add(state: &mut AppState, req: &Request) -> Value {
    let kind = match kind_param(req) {
        Ok(k) => k,
        Err(resp) => return resp,
    };
    let data = match object_param(req, "data") {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    let store = match state.store_mut() {
        Ok(s) => s,
        Err(e) => return store_err(req, e),
    };

    let records = store.add(kind, data);
    let record = records.last().cloned().unwrap_or_default();
    let result = mutation_result(
        state,
        kind,
        json!({ "record": record, "records": records }),
    );
    ok(&req.id, result)
}

fn handle_update(state: &mut AppState, req: &Request) -> Value {
    let kind = match kind_param(req) {
        Ok(k) => k,
        Err(resp) => return resp,
    };
    let id = match str_param(req, "id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let patch = match object_param(req, "patch") {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    let store = match state.store_mut() {
        Ok(s) => s,
        Err(e) => return store_err(req, e),
    };

    let records = store.update(kind, id, patch);
    let result = mutation_result(state, kind, json!({ "records": records }));
    ok(&req.id, result)
}

fn handle_remove(state: &mut AppState, req: &Request) -> Value {
    let kind = match kind_param(req) {
        Ok(k) => k,
        Err(resp) => return resp,
    };
    let id = match str_param(req, "id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let store = match state.store_mut() {
        Ok(s) => s,
        Err(e) => return store_err(req, e),
    };

    let records = store.remove(kind, id);
    let mut result = json!({ "records": records });
    if kind == EntityKind::Classes {
        result["assignments"] = json!(store.load_all(EntityKind::Assignments));
    }
    let result = mutation_result(state, kind, result);
    ok(&req.id, result)
}

fn handle_toggle_current_schedule(state: &mut AppState, req: &Request) -> Value {
    let id = match str_param(req, "id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let store = match state.store_mut() {
        Ok(s) => s,
        Err(e) => return store_err(req, e),
    };
    let Some(class) = store.find(EntityKind::Classes, id) else {
        return err(&req.id, "not_found", "class not found", None);
    };

    let current = class
        .get("isCurrentSchedule")
        .map(checkbox_value)
        .unwrap_or(false);
    let mut patch = Record::new();
    patch.insert("isCurrentSchedule".to_string(), Value::Bool(!current));
    let records = store.update(EntityKind::Classes, id, patch);
    let result = mutation_result(
        state,
        EntityKind::Classes,
        json!({ "isCurrentSchedule": !current, "records": records }),
    );
    ok(&req.id, result)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    match req.method.as_str() {
        "collections.kinds" => Some(handle_kinds(req)),
        "collections.list" => Some(handle_list(state, req)),
        "collections.add" => Some(handle_add(state, req)),
        "collections.update" => Some(handle_update(state, req)),
        "collections.remove" => Some(handle_remove(state, req)),
        "classes.toggleCurrentSchedule" => Some(handle_toggle_current_schedule(state, req)),
        _ => None,
    }
}
