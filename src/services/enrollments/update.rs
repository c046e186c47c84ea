use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{EnrollmentService, ensure_not_enrolled, load_enrollment};
use crate::access::{Action, Actor, EntityKind, RecordFacts, authorize};
use crate::errors::{AcademicError, Result};
use crate::models::enrollments::{entities::Enrollment, requests::UpdateEnrollmentRequest};
use crate::models::{ApiResponse, ResourceCodes, error_response};
use crate::services::current_user;
use crate::services::facts::{enrollment_facts, load_active_student, referenced_course};
use crate::storage::Storage;

pub async fn update_enrollment(
    service: &EnrollmentService,
    request: &HttpRequest,
    enrollment_id: i64,
    update_data: UpdateEnrollmentRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match update(storage.as_ref(), &Actor::from(&user), enrollment_id, update_data).await {
        Ok(enrollment) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            enrollment,
            "Enrollment updated successfully",
        ))),
        Err(e) => Ok(error_response(&e, ResourceCodes::ENROLLMENT)),
    }
}

async fn update(
    storage: &dyn Storage,
    actor: &Actor,
    enrollment_id: i64,
    data: UpdateEnrollmentRequest,
) -> Result<Enrollment> {
    let enrollment = load_enrollment(storage, enrollment_id).await?;
    let facts = enrollment_facts(storage, &enrollment).await?;
    authorize(actor, EntityKind::Enrollment, Action::Write, &facts)?;

    let course_id = data.course_id.unwrap_or(enrollment.course_id);
    let student_id = data.student_id.unwrap_or(enrollment.student_id);

    if course_id != enrollment.course_id {
        let course = referenced_course(storage, course_id).await?;
        authorize(
            actor,
            EntityKind::Enrollment,
            Action::Write,
            &RecordFacts::in_course(course.teacher_id),
        )?;
    }
    if student_id != enrollment.student_id {
        load_active_student(storage, student_id).await?;
    }
    ensure_not_enrolled(storage, student_id, course_id, Some(enrollment_id)).await?;

    storage
        .update_enrollment(enrollment_id, data)
        .await?
        .ok_or_else(|| AcademicError::not_found(format!("Enrollment {enrollment_id} not found")))
}
