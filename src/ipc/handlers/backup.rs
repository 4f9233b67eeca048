use crate::backup;
use crate::ipc::helpers::{get_required_text, with_school, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::school::SchoolStore;
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

fn io_failed(e: anyhow::Error, path: &str) -> HandlerErr {
    HandlerErr {
        code: "io_failed",
        message: format!("{e:#}"),
        details: Some(json!({ "path": path })),
    }
}

fn backup_export(
    school: &SchoolStore,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let out_path = get_required_text(params, "outPath")?;
    let slots = backup::export_bundle(school.store(), &PathBuf::from(&out_path))
        .map_err(|e| io_failed(e, &out_path))?;
    info!(path = %out_path, slots = slots.len(), "bundle exported");
    Ok(json!({
        "ok": true,
        "path": out_path,
        "bundleFormat": backup::BUNDLE_FORMAT_V1,
        "slots": slots
    }))
}

/// The bundle is validated in full first; a rejected bundle leaves the open
/// workspace as it was.
fn backup_import(
    school: &SchoolStore,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let in_path = get_required_text(params, "inPath")?;
    let src = PathBuf::from(&in_path);
    if !src.is_file() {
        return Err(HandlerErr {
            code: "not_found",
            message: "bundle file not found".to_string(),
            details: Some(json!({ "path": in_path })),
        });
    }
    let bundle = backup::read_bundle(&src).map_err(|e| io_failed(e, &in_path))?;
    backup::apply_bundle(school.store(), &bundle)
        .map_err(|e| HandlerErr::update_failed(e, "bundle"))?;
    info!(path = %in_path, slots = bundle.slots.len(), "bundle imported");
    Ok(json!({
        "ok": true,
        "bundleFormatDetected": bundle.format,
        "slots": bundle.slot_keys()
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "backup.export" => Some(with_school(state, req, backup_export)),
        "backup.import" => Some(with_school(state, req, backup_import)),
        _ => None,
    }
}
