use crate::ipc::error::ok;
use crate::ipc::helpers::{get_required_text, with_school, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::school::SchoolStore;
use serde_json::json;

fn handle_classes_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(school) = state.school.as_ref() else {
        return ok(&req.id, json!({ "classes": [] }));
    };

    // Include student counts so the admin screen can show a useful overview.
    let students = school.students(None);
    let classes: Vec<serde_json::Value> = school
        .classes()
        .into_iter()
        .map(|c| {
            let student_count = students.iter().filter(|s| s.class_id == c.id).count();
            json!({
                "id": c.id,
                "name": c.name,
                "studentCount": student_count
            })
        })
        .collect();
    ok(&req.id, json!({ "classes": classes }))
}

fn classes_create(
    school: &SchoolStore,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let name = get_required_text(params, "name")?;
    let class = school
        .add_class(&name)
        .map_err(|e| HandlerErr::update_failed(e, "classes"))?;
    Ok(json!({ "classId": class.id, "name": class.name }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "classes.list" => Some(handle_classes_list(state, req)),
        "classes.create" => Some(with_school(state, req, classes_create)),
        _ => None,
    }
}
