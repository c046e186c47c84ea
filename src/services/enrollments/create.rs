use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{EnrollmentService, ensure_not_enrolled};
use crate::access::{Action, Actor, EntityKind, RecordFacts, authorize, authorize_create};
use crate::errors::Result;
use crate::models::enrollments::{entities::Enrollment, requests::CreateEnrollmentRequest};
use crate::models::{ApiResponse, ResourceCodes, error_response};
use crate::services::current_user;
use crate::services::facts::{load_active_student, referenced_course};
use crate::storage::Storage;

pub async fn create_enrollment(
    service: &EnrollmentService,
    request: &HttpRequest,
    enrollment_data: CreateEnrollmentRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match create(storage.as_ref(), &Actor::from(&user), enrollment_data).await {
        Ok(enrollment) => {
            info!(
                "Student {} enrolled in course {} by user {}",
                enrollment.student_id, enrollment.course_id, user.id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                enrollment,
                "Enrollment created successfully",
            )))
        }
        Err(e) => Ok(error_response(&e, ResourceCodes::ENROLLMENT)),
    }
}

async fn create(
    storage: &dyn Storage,
    actor: &Actor,
    data: CreateEnrollmentRequest,
) -> Result<Enrollment> {
    authorize_create(actor, EntityKind::Enrollment)?;

    // 教师可选的课程只有自己负责的
    let course = referenced_course(storage, data.course_id).await?;
    authorize(
        actor,
        EntityKind::Enrollment,
        Action::Write,
        &RecordFacts::in_course(course.teacher_id),
    )?;
    load_active_student(storage, data.student_id).await?;
    ensure_not_enrolled(storage, data.student_id, data.course_id, None).await?;

    storage.create_enrollment(data).await
}
