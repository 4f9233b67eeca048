use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::today;
use crate::ipc::types::{AppState, Request};
use crate::school::SchoolStore;
use crate::seed::{self, SeedSummary};
use crate::store::Store;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::info;

/// Opens (creating if needed) the workspace database, seeds demo data on first
/// open and makes it the active store.
pub fn open_workspace(state: &mut AppState, path: &Path) -> anyhow::Result<SeedSummary> {
    let conn = db::open_db(path)?;
    let store = Store::new(conn);
    let summary = seed::initialize(&store, today())?;
    state.workspace = Some(path.to_path_buf());
    state.school = Some(SchoolStore::new(store));
    info!(workspace = %path.display(), "workspace opened");
    Ok(summary)
}

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string())
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    match open_workspace(state, &path) {
        Ok(summary) => ok(
            &req.id,
            json!({
                "workspacePath": path.to_string_lossy(),
                "seeded": summary.seeded
            }),
        ),
        Err(e) => err(&req.id, "db_open_failed", format!("{e:#}"), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        _ => None,
    }
}
