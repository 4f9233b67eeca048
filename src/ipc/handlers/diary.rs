use crate::ipc::handlers::setup::diary_max_content_chars;
use crate::ipc::helpers::{
    get_optional_str, get_required_str, get_required_text, with_school, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{DiaryTarget, NewDiaryEntry};
use crate::school::SchoolStore;
use serde_json::json;

fn diary_send(
    school: &SchoolStore,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let class_id = get_required_text(params, "classId")?;
    let subject = get_required_text(params, "subject")?;
    let content = get_required_text(params, "content")?;
    let target = match get_optional_str(params, "target")? {
        Some(raw) => DiaryTarget::parse(&raw)
            .ok_or_else(|| HandlerErr::bad_params("target must be all or student"))?,
        None => DiaryTarget::All,
    };
    let student_id = get_optional_str(params, "studentId")?;
    let student_id = match target {
        DiaryTarget::Student => Some(student_id.ok_or_else(|| {
            HandlerErr::bad_params("studentId is required when target is student")
        })?),
        DiaryTarget::All => None,
    };

    let max_chars = diary_max_content_chars(school);
    let len = content.chars().count();
    if len > max_chars {
        return Err(HandlerErr {
            code: "bad_params",
            message: format!("content length must be <= {}", max_chars),
            details: Some(json!({ "length": len, "max": max_chars })),
        });
    }

    let entry = school
        .send_diary(NewDiaryEntry {
            class_id,
            subject,
            content,
            target,
            student_id,
        })
        .map_err(|e| HandlerErr::update_failed(e, "diary"))?;
    Ok(json!({ "entryId": entry.id, "entry": entry }))
}

fn diary_list(
    school: &SchoolStore,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let class_id = get_required_str(params, "classId")?;
    let student_id = get_optional_str(params, "studentId")?;
    Ok(json!({ "entries": school.diaries(&class_id, student_id.as_deref()) }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "diary.send" => Some(with_school(state, req, diary_send)),
        "diary.list" => Some(with_school(state, req, diary_list)),
        _ => None,
    }
}
