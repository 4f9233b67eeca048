use crate::ipc::helpers::{get_required_text, with_school, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::SchoolInfo;
use crate::school::SchoolStore;
use serde_json::json;

fn school_get(
    school: &SchoolStore,
    _params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    Ok(json!({ "school": school.school_info() }))
}

fn school_save(
    school: &SchoolStore,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let info = SchoolInfo {
        name: get_required_text(params, "name")?,
        address: params
            .get("address")
            .and_then(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    };
    school
        .save_school_info(&info)
        .map_err(|e| HandlerErr::update_failed(e, "schoolInfo"))?;
    Ok(json!({ "school": info }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "school.get" => Some(with_school(state, req, school_get)),
        "school.save" => Some(with_school(state, req, school_save)),
        _ => None,
    }
}
