use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{GradeService, SavedGrade, writable_subject};
use crate::access::{Actor, EntityKind, authorize_create, grade_creator};
use crate::errors::{AcademicError, Result};
use crate::models::grades::requests::CreateGradeRequest;
use crate::models::{ApiResponse, ResourceCodes, error_response};
use crate::services::current_user;
use crate::services::facts::{ensure_student_pickable, load_active_student};
use crate::storage::Storage;
use crate::utils::validate::validate_score;

pub async fn create_grade(
    service: &GradeService,
    request: &HttpRequest,
    grade_data: CreateGradeRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match create(storage.as_ref(), &Actor::from(&user), grade_data).await {
        Ok(saved) => {
            info!(
                "Grade {} recorded for student {} by user {}",
                saved.grade.id, saved.grade.student_id, user.id
            );
            service.notify_saved(request, &saved);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                saved.grade,
                "Grade created successfully",
            )))
        }
        Err(e) => Ok(error_response(&e, ResourceCodes::GRADE)),
    }
}

async fn create(
    storage: &dyn Storage,
    actor: &Actor,
    mut data: CreateGradeRequest,
) -> Result<SavedGrade> {
    authorize_create(actor, EntityKind::Grade)?;
    validate_score(data.score).map_err(AcademicError::validation)?;
    data.notes = data.notes.trim().to_string();

    let subject = writable_subject(storage, actor, data.subject_id).await?;
    let student = load_active_student(storage, data.student_id).await?;
    ensure_student_pickable(storage, actor, student.id).await?;

    let grade = storage.create_grade(data, grade_creator(actor)).await?;
    Ok(SavedGrade {
        grade,
        student,
        subject,
    })
}
