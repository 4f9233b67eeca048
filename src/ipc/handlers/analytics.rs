use crate::ipc::helpers::{get_required_str, today, with_school, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::school::SchoolStore;
use crate::stats::{self, StatusCounts};
use serde_json::json;

fn student_performance(
    _school: &SchoolStore,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    Ok(json!({ "subjects": stats::student_performance(&student_id) }))
}

fn assignment_stats(
    _school: &SchoolStore,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let class_id = get_required_str(params, "classId")?;
    Ok(json!({ "days": stats::class_assignment_stats(&class_id) }))
}

/// Everything the teacher landing screen shows for one class.
fn teacher_dashboard(
    school: &SchoolStore,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let class_id = get_required_str(params, "classId")?;
    let day = today();
    let todays = school.attendance(day, &class_id);
    let counts = todays
        .as_ref()
        .map(StatusCounts::from_records)
        .unwrap_or_default();
    let marked = todays.as_ref().is_some_and(|r| !r.is_empty());

    Ok(json!({
        "classId": class_id,
        "date": day.format("%Y-%m-%d").to_string(),
        "studentCount": school.students(Some(class_id.as_str())).len(),
        "attendanceMarked": marked,
        "today": counts,
        "weekly": school.attendance_stats(&class_id, day),
        "assignments": stats::class_assignment_stats(&class_id)
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "analytics.studentPerformance" => Some(with_school(state, req, student_performance)),
        "analytics.assignmentStats" => Some(with_school(state, req, assignment_stats)),
        "dashboard.teacher" => Some(with_school(state, req, teacher_dashboard)),
        _ => None,
    }
}
