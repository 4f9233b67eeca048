use crate::ipc::helpers::{get_optional_str, get_required_text, with_school, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::NewStudent;
use crate::school::SchoolStore;
use serde_json::json;

fn students_list(
    school: &SchoolStore,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let class_id = get_optional_str(params, "classId")?;
    Ok(json!({ "students": school.students(class_id.as_deref()) }))
}

fn students_create(
    school: &SchoolStore,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let new = NewStudent {
        name: get_required_text(params, "name")?,
        class_id: get_required_text(params, "classId")?,
        parent_name: get_optional_str(params, "parentName")?.unwrap_or_default(),
    };
    let student = school
        .add_student(new)
        .map_err(|e| HandlerErr::update_failed(e, "students"))?;
    Ok(json!({ "studentId": student.id, "student": student }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(with_school(state, req, students_list)),
        "students.create" => Some(with_school(state, req, students_create)),
        _ => None,
    }
}
