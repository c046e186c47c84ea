use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{CourseService, ensure_teacher, validate_course_fields};
use crate::access::{Action, Actor, EntityKind, authorize};
use crate::errors::{AcademicError, Result};
use crate::models::courses::{entities::Course, requests::UpdateCourseRequest};
use crate::models::{ApiResponse, ResourceCodes, error_response};
use crate::services::current_user;
use crate::services::facts::{course_facts, load_course};
use crate::storage::Storage;

pub async fn update_course(
    service: &CourseService,
    request: &HttpRequest,
    course_id: i64,
    update_data: UpdateCourseRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match update(storage.as_ref(), &Actor::from(&user), course_id, update_data).await {
        Ok(course) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            course,
            "Course updated successfully",
        ))),
        Err(e) => Ok(error_response(&e, ResourceCodes::COURSE)),
    }
}

async fn update(
    storage: &dyn Storage,
    actor: &Actor,
    course_id: i64,
    mut data: UpdateCourseRequest,
) -> Result<Course> {
    let course = load_course(storage, course_id).await?;
    let facts = course_facts(storage, actor, &course).await?;
    authorize(actor, EntityKind::Course, Action::Write, &facts)?;

    data.code = data.code.map(|s| s.trim().to_string());
    data.name = data.name.map(|s| s.trim().to_string());
    data.academic_period = data.academic_period.map(|s| s.trim().to_string());
    validate_course_fields(
        data.code.as_deref(),
        data.name.as_deref(),
        data.academic_period.as_deref(),
    )?;

    if let Some(teacher_id) = data.teacher_id {
        ensure_teacher(storage, teacher_id).await?;
    }
    if let Some(ref code) = data.code
        && storage.course_code_taken(code, Some(course_id)).await?
    {
        return Err(AcademicError::duplicate(format!(
            "Course code {code} already exists"
        )));
    }

    storage
        .update_course(course_id, data)
        .await?
        .ok_or_else(|| AcademicError::not_found(format!("Course {course_id} not found")))
}
