use crate::ipc::error::ok;
use crate::ipc::types::{AppState, Request};
use crate::schedule::weekly_schedule;
use crate::store::EntityKind;
use serde_json::json;

fn handle_schedule_week(state: &mut AppState, req: &Request) -> serde_json::Value {
    let days = match state.store.as_mut() {
        Some(store) => weekly_schedule(store.records(EntityKind::Classes)),
        None => weekly_schedule(&[]),
    };
    ok(&req.id, json!({ "days": days }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "schedule.week" => Some(handle_schedule_week(state, req)),
        _ => None,
    }
}
