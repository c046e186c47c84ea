use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{SubjectService, validate_subject_fields};
use crate::access::{Action, Actor, EntityKind, RecordFacts, authorize};
use crate::errors::{AcademicError, Result};
use crate::models::subjects::{entities::Subject, requests::UpdateSubjectRequest};
use crate::models::{ApiResponse, ResourceCodes, error_response};
use crate::services::current_user;
use crate::services::facts::{load_subject, referenced_course, subject_facts};
use crate::storage::Storage;

pub async fn update_subject(
    service: &SubjectService,
    request: &HttpRequest,
    subject_id: i64,
    update_data: UpdateSubjectRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match update(storage.as_ref(), &Actor::from(&user), subject_id, update_data).await {
        Ok(subject) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            subject,
            "Subject updated successfully",
        ))),
        Err(e) => Ok(error_response(&e, ResourceCodes::SUBJECT)),
    }
}

async fn update(
    storage: &dyn Storage,
    actor: &Actor,
    subject_id: i64,
    mut data: UpdateSubjectRequest,
) -> Result<Subject> {
    let subject = load_subject(storage, subject_id).await?;
    let facts = subject_facts(storage, actor, &subject).await?;
    authorize(actor, EntityKind::Subject, Action::Write, &facts)?;

    data.code = data.code.map(|s| s.trim().to_string());
    data.name = data.name.map(|s| s.trim().to_string());
    validate_subject_fields(data.code.as_deref(), data.name.as_deref(), data.weekly_hours)?;

    // 移到其他课程时，目标课程同样需要写权限
    if let Some(course_id) = data.course_id
        && course_id != subject.course_id
    {
        let course = referenced_course(storage, course_id).await?;
        authorize(
            actor,
            EntityKind::Subject,
            Action::Write,
            &RecordFacts::in_course(course.teacher_id),
        )?;
    }

    if let Some(ref code) = data.code
        && storage.subject_code_taken(code, Some(subject_id)).await?
    {
        return Err(AcademicError::duplicate(format!(
            "Subject code {code} already exists"
        )));
    }

    storage
        .update_subject(subject_id, data)
        .await?
        .ok_or_else(|| AcademicError::not_found(format!("Subject {subject_id} not found")))
}
