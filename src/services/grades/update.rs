use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{GradeService, SavedGrade, load_grade, writable_subject};
use crate::access::{Action, Actor, EntityKind, authorize};
use crate::errors::{AcademicError, Result};
use crate::models::grades::requests::UpdateGradeRequest;
use crate::models::{ApiResponse, ResourceCodes, error_response};
use crate::services::current_user;
use crate::services::facts::{
    ensure_student_pickable, grade_facts, load_active_student, load_subject, load_user,
};
use crate::storage::Storage;
use crate::utils::validate::validate_score;

pub async fn update_grade(
    service: &GradeService,
    request: &HttpRequest,
    grade_id: i64,
    update_data: UpdateGradeRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match update(storage.as_ref(), &Actor::from(&user), grade_id, update_data).await {
        Ok(saved) => {
            service.notify_saved(request, &saved);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                saved.grade,
                "Grade updated successfully",
            )))
        }
        Err(e) => Ok(error_response(&e, ResourceCodes::GRADE)),
    }
}

async fn update(
    storage: &dyn Storage,
    actor: &Actor,
    grade_id: i64,
    mut data: UpdateGradeRequest,
) -> Result<SavedGrade> {
    let grade = load_grade(storage, grade_id).await?;
    let facts = grade_facts(storage, &grade).await?;
    authorize(actor, EntityKind::Grade, Action::Write, &facts)?;

    if let Some(score) = data.score {
        validate_score(score).map_err(AcademicError::validation)?;
    }
    data.notes = data.notes.map(|s| s.trim().to_string());

    if let Some(subject_id) = data.subject_id
        && subject_id != grade.subject_id
    {
        writable_subject(storage, actor, subject_id).await?;
    }
    if let Some(student_id) = data.student_id
        && student_id != grade.student_id
    {
        load_active_student(storage, student_id).await?;
        ensure_student_pickable(storage, actor, student_id).await?;
    }

    let grade = storage
        .update_grade(grade_id, data)
        .await?
        .ok_or_else(|| AcademicError::not_found(format!("Grade {grade_id} not found")))?;
    let student = load_user(storage, grade.student_id).await?;
    let subject = load_subject(storage, grade.subject_id).await?;
    Ok(SavedGrade {
        grade,
        student,
        subject,
    })
}
