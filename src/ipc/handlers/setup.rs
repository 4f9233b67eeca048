use crate::db;
use crate::ipc::helpers::{with_school, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::AttendanceStatus;
use crate::school::SchoolStore;
use rusqlite::Connection;
use serde_json::{json, Map, Value};

pub const DEFAULT_MAX_DIARY_CHARS: usize = 2000;

#[derive(Clone, Copy)]
pub enum SetupSection {
    Attendance,
    Diary,
}

impl SetupSection {
    const ALL: [SetupSection; 2] = [SetupSection::Attendance, SetupSection::Diary];

    fn parse(s: &str) -> Option<Self> {
        match s {
            "attendance" => Some(Self::Attendance),
            "diary" => Some(Self::Diary),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Attendance => "attendance",
            Self::Diary => "diary",
        }
    }

    fn key(self) -> &'static str {
        match self {
            Self::Attendance => "setup.attendance",
            Self::Diary => "setup.diary",
        }
    }
}

fn default_section(section: SetupSection) -> Value {
    match section {
        SetupSection::Attendance => json!({
            "defaultStatus": "present"
        }),
        SetupSection::Diary => json!({
            "maxContentChars": DEFAULT_MAX_DIARY_CHARS
        }),
    }
}

/// Stored values laid over the defaults; unknown stored keys are dropped.
pub fn load_section(conn: &Connection, section: SetupSection) -> anyhow::Result<Value> {
    let mut out = default_section(section);
    let Some(stored) = db::settings_get_json(conn, section.key())? else {
        return Ok(out);
    };
    if let (Some(dst), Some(src)) = (out.as_object_mut(), stored.as_object()) {
        for (k, v) in src {
            if dst.contains_key(k) {
                dst.insert(k.clone(), v.clone());
            }
        }
    }
    Ok(out)
}

pub fn attendance_default_status(school: &SchoolStore) -> AttendanceStatus {
    load_section(school.store().conn(), SetupSection::Attendance)
        .ok()
        .and_then(|v| {
            v.get("defaultStatus")
                .and_then(|s| s.as_str())
                .and_then(AttendanceStatus::parse)
        })
        .unwrap_or(AttendanceStatus::Present)
}

pub fn diary_max_content_chars(school: &SchoolStore) -> usize {
    load_section(school.store().conn(), SetupSection::Diary)
        .ok()
        .and_then(|v| v.get("maxContentChars").and_then(|n| n.as_u64()))
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(DEFAULT_MAX_DIARY_CHARS)
}

fn parse_i64_range(v: &Value, key: &str, min: i64, max: i64) -> Result<i64, String> {
    let n = v
        .as_i64()
        .ok_or_else(|| format!("{} must be integer", key))?;
    if !(min..=max).contains(&n) {
        return Err(format!("{} must be in {}..={}", key, min, max));
    }
    Ok(n)
}

fn merge_section_patch(
    section: SetupSection,
    current: &mut Value,
    patch: &Map<String, Value>,
) -> Result<(), String> {
    let obj = current
        .as_object_mut()
        .ok_or_else(|| "internal setup object must be a JSON object".to_string())?;
    for (k, v) in patch {
        match (section, k.as_str()) {
            (SetupSection::Attendance, "defaultStatus") => {
                let s = v
                    .as_str()
                    .and_then(AttendanceStatus::parse)
                    .ok_or_else(|| "defaultStatus must be present, absent or late".to_string())?;
                obj.insert(k.clone(), json!(s.as_str()));
            }
            (SetupSection::Diary, "maxContentChars") => {
                let n = parse_i64_range(v, k, 1, 10_000)?;
                obj.insert(k.clone(), json!(n));
            }
            _ => return Err(format!("unknown {} setting: {}", section.name(), k)),
        }
    }
    Ok(())
}

fn setup_get(school: &SchoolStore, _params: &Value) -> Result<Value, HandlerErr> {
    let mut out = Map::new();
    for section in SetupSection::ALL {
        let v = load_section(school.store().conn(), section).map_err(|e| HandlerErr {
            code: "db_query_failed",
            message: e.to_string(),
            details: None,
        })?;
        out.insert(section.name().to_string(), v);
    }
    Ok(Value::Object(out))
}

fn setup_update(school: &SchoolStore, params: &Value) -> Result<Value, HandlerErr> {
    let section_raw = params
        .get("section")
        .and_then(|v| v.as_str())
        .ok_or_else(|| HandlerErr::bad_params("missing section"))?;
    let section =
        SetupSection::parse(section_raw).ok_or_else(|| HandlerErr::bad_params("unknown section"))?;
    let patch = params
        .get("patch")
        .and_then(|v| v.as_object())
        .ok_or_else(|| HandlerErr::bad_params("patch must be an object"))?;

    let conn = school.store().conn();
    let mut current = load_section(conn, section).map_err(|e| HandlerErr {
        code: "db_query_failed",
        message: e.to_string(),
        details: None,
    })?;
    merge_section_patch(section, &mut current, patch).map_err(HandlerErr::bad_params)?;
    db::settings_set_json(conn, section.key(), &current)
        .map_err(|e| HandlerErr::update_failed(e, section.key()))?;
    let mut out = json!({ "ok": true });
    out[section.name()] = current;
    Ok(out)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    match req.method.as_str() {
        "setup.get" => Some(with_school(state, req, setup_get)),
        "setup.update" => Some(with_school(state, req, setup_update)),
        _ => None,
    }
}
