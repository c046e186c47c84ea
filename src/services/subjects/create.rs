use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{SubjectService, validate_subject_fields};
use crate::access::{Action, Actor, EntityKind, RecordFacts, authorize, authorize_create};
use crate::errors::{AcademicError, Result};
use crate::models::subjects::{entities::Subject, requests::CreateSubjectRequest};
use crate::models::{ApiResponse, ResourceCodes, error_response};
use crate::services::current_user;
use crate::services::facts::referenced_course;
use crate::storage::Storage;

pub async fn create_subject(
    service: &SubjectService,
    request: &HttpRequest,
    subject_data: CreateSubjectRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match create(storage.as_ref(), &Actor::from(&user), subject_data).await {
        Ok(subject) => {
            info!("Subject {} created by user {}", subject.code, user.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                subject,
                "Subject created successfully",
            )))
        }
        Err(e) => Ok(error_response(&e, ResourceCodes::SUBJECT)),
    }
}

async fn create(
    storage: &dyn Storage,
    actor: &Actor,
    mut data: CreateSubjectRequest,
) -> Result<Subject> {
    authorize_create(actor, EntityKind::Subject)?;

    data.code = data.code.trim().to_string();
    data.name = data.name.trim().to_string();
    validate_subject_fields(Some(&data.code), Some(&data.name), Some(data.weekly_hours))?;

    // 教师只能在自己负责的课程下创建
    let course = referenced_course(storage, data.course_id).await?;
    authorize(
        actor,
        EntityKind::Subject,
        Action::Write,
        &RecordFacts::in_course(course.teacher_id),
    )?;

    if storage.subject_code_taken(&data.code, None).await? {
        return Err(AcademicError::duplicate(format!(
            "Subject code {} already exists",
            data.code
        )));
    }

    storage.create_subject(data).await
}
