use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{CourseService, ensure_teacher, validate_course_fields};
use crate::access::{Actor, EntityKind, authorize_create};
use crate::errors::{AcademicError, Result};
use crate::models::courses::{entities::Course, requests::CreateCourseRequest};
use crate::models::{ApiResponse, ResourceCodes, error_response};
use crate::services::current_user;
use crate::storage::Storage;

pub async fn create_course(
    service: &CourseService,
    request: &HttpRequest,
    course_data: CreateCourseRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match create(storage.as_ref(), &Actor::from(&user), course_data).await {
        Ok(course) => {
            info!("Course {} created by user {}", course.code, user.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                course,
                "Course created successfully",
            )))
        }
        Err(e) => Ok(error_response(&e, ResourceCodes::COURSE)),
    }
}

async fn create(storage: &dyn Storage, actor: &Actor, mut data: CreateCourseRequest) -> Result<Course> {
    authorize_create(actor, EntityKind::Course)?;

    data.code = data.code.trim().to_string();
    data.name = data.name.trim().to_string();
    data.academic_period = data.academic_period.trim().to_string();
    validate_course_fields(
        Some(&data.code),
        Some(&data.name),
        Some(&data.academic_period),
    )?;
    ensure_teacher(storage, data.teacher_id).await?;

    if storage.course_code_taken(&data.code, None).await? {
        return Err(AcademicError::duplicate(format!(
            "Course code {} already exists",
            data.code
        )));
    }

    storage.create_course(data).await
}
