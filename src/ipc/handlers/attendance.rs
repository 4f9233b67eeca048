use crate::ipc::handlers::setup::attendance_default_status;
use crate::ipc::helpers::{get_required_date, get_required_str, today, with_school, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::{AttendanceRecords, AttendanceStatus};
use crate::school::SchoolStore;
use serde_json::json;

fn parse_records(params: &serde_json::Value) -> Result<AttendanceRecords, HandlerErr> {
    let Some(obj) = params.get("records").and_then(|v| v.as_object()) else {
        return Err(HandlerErr::bad_params("records must be an object"));
    };
    let mut out = AttendanceRecords::new();
    for (student_id, v) in obj {
        let status = v.as_str().and_then(AttendanceStatus::parse).ok_or_else(|| HandlerErr {
            code: "bad_params",
            message: "status must be present, absent or late".to_string(),
            details: Some(json!({ "studentId": student_id })),
        })?;
        out.insert(student_id.clone(), status);
    }
    Ok(out)
}

fn attendance_get(
    school: &SchoolStore,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let date = get_required_date(params, "date")?;
    let class_id = get_required_str(params, "classId")?;
    let records = school.attendance(date, &class_id);
    Ok(json!({
        "saved": records.is_some(),
        "records": records.unwrap_or_default()
    }))
}

fn attendance_save(
    school: &SchoolStore,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let date = get_required_date(params, "date")?;
    let class_id = get_required_str(params, "classId")?;
    let records = parse_records(params)?;
    let count = records.len();
    school
        .save_attendance(date, &class_id, records)
        .map_err(|e| HandlerErr::update_failed(e, "attendance"))?;
    Ok(json!({ "ok": true, "count": count }))
}

/// The roster for a day with each student's saved status, or the configured
/// default when the day has not been saved yet.
fn attendance_sheet_open(
    school: &SchoolStore,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let date = get_required_date(params, "date")?;
    let class_id = get_required_str(params, "classId")?;
    let saved = school.attendance(date, &class_id);
    let default_status = attendance_default_status(school);

    let rows: Vec<serde_json::Value> = school
        .students(Some(class_id.as_str()))
        .into_iter()
        .map(|s| {
            let status = match saved.as_ref() {
                Some(records) => records.get(&s.id).copied(),
                None => Some(default_status),
            };
            json!({
                "studentId": s.id,
                "name": s.name,
                "status": status
            })
        })
        .collect();

    Ok(json!({
        "date": date.format("%Y-%m-%d").to_string(),
        "classId": class_id,
        "saved": saved.is_some(),
        "defaultStatus": default_status,
        "rows": rows
    }))
}

fn attendance_stats(
    school: &SchoolStore,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let class_id = get_required_str(params, "classId")?;
    Ok(json!({ "days": school.attendance_stats(&class_id, today()) }))
}

fn attendance_student_history(
    school: &SchoolStore,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    Ok(json!({ "history": school.student_attendance_history(&student_id) }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "attendance.get" => Some(with_school(state, req, attendance_get)),
        "attendance.save" => Some(with_school(state, req, attendance_save)),
        "attendance.sheetOpen" => Some(with_school(state, req, attendance_sheet_open)),
        "attendance.stats" => Some(with_school(state, req, attendance_stats)),
        "attendance.studentHistory" => Some(with_school(state, req, attendance_student_history)),
        _ => None,
    }
}
