use crate::ipc::helpers::{
    get_optional_str, get_required_str, get_required_text, get_string_list, parent_json,
    teacher_json, with_school, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{NewParent, NewTeacher};
use crate::school::SchoolStore;
use serde_json::json;
use tracing::info;

fn teachers_list(
    school: &SchoolStore,
    _params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let teachers: Vec<serde_json::Value> = school.teachers().iter().map(teacher_json).collect();
    Ok(json!({ "teachers": teachers }))
}

fn teachers_create(
    school: &SchoolStore,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let new = NewTeacher {
        name: get_required_text(params, "name")?,
        subject: get_optional_str(params, "subject")?.unwrap_or_default(),
        email: get_required_text(params, "email")?,
        password: get_required_str(params, "password")?,
        class_id: get_optional_str(params, "classId")?,
    };
    let teacher = school
        .add_teacher(new)
        .map_err(|e| HandlerErr::update_failed(e, "teachers"))?;
    Ok(json!({ "teacherId": teacher.id, "teacher": teacher_json(&teacher) }))
}

fn teachers_delete(
    school: &SchoolStore,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let teacher_id = get_required_str(params, "teacherId")?;
    let removed = school
        .delete_teacher(&teacher_id)
        .map_err(|e| HandlerErr::update_failed(e, "teachers"))?;
    Ok(json!({ "ok": true, "removed": removed }))
}

fn parents_list(
    school: &SchoolStore,
    _params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let parents: Vec<serde_json::Value> = school.parents().iter().map(parent_json).collect();
    Ok(json!({ "parents": parents }))
}

fn parents_create(
    school: &SchoolStore,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let new = NewParent {
        name: get_required_text(params, "name")?,
        email: get_required_text(params, "email")?,
        password: get_required_str(params, "password")?,
        student_ids: get_string_list(params, "studentIds")?,
    };
    let parent = school
        .add_parent(new)
        .map_err(|e| HandlerErr::update_failed(e, "parents"))?;
    Ok(json!({ "parentId": parent.id, "parent": parent_json(&parent) }))
}

fn parents_students(
    school: &SchoolStore,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let parent_id = get_required_str(params, "parentId")?;
    Ok(json!({ "students": school.parent_students(&parent_id) }))
}

// A wrong login is an ordinary result (null account), not an error.
fn auth_teacher(
    school: &SchoolStore,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let login = get_required_str(params, "login")?;
    let password = get_required_str(params, "password")?;
    let teacher = school.validate_teacher(&login, &password);
    info!(matched = teacher.is_some(), "teacher sign-in");
    Ok(json!({ "teacher": teacher.as_ref().map(teacher_json) }))
}

fn auth_parent(
    school: &SchoolStore,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let login = get_required_str(params, "login")?;
    let password = get_required_str(params, "password")?;
    let parent = school.validate_parent(&login, &password);
    info!(matched = parent.is_some(), "parent sign-in");
    Ok(json!({ "parent": parent.as_ref().map(parent_json) }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "teachers.list" => Some(with_school(state, req, teachers_list)),
        "teachers.create" => Some(with_school(state, req, teachers_create)),
        "teachers.delete" => Some(with_school(state, req, teachers_delete)),
        "parents.list" => Some(with_school(state, req, parents_list)),
        "parents.create" => Some(with_school(state, req, parents_create)),
        "parents.students" => Some(with_school(state, req, parents_students)),
        "auth.teacher" => Some(with_school(state, req, auth_teacher)),
        "auth.parent" => Some(with_school(state, req, auth_parent)),
        _ => None,
    }
}
