use crate::calc::class_breakdown;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::str_param;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_grades_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!(state.grades))
}

fn handle_class_breakdown(state: &mut AppState, req: &Request) -> serde_json::Value {
    let class_id = match str_param(req, "classId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let (classes, assignments) = state.typed_collections();
    let Some(class) = classes.iter().find(|c| c.id == class_id) else {
        return err(&req.id, "not_found", "class not found", None);
    };
    ok(&req.id, json!(class_breakdown(class, &assignments)))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "grades.get" => Some(handle_grades_get(state, req)),
        "grades.classBreakdown" => Some(handle_class_breakdown(state, req)),
        _ => None,
    }
}
