use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::CourseService;
use crate::access::{Action, Actor, EntityKind, authorize};
use crate::errors::{AcademicError, Result};
use crate::models::{ApiResponse, ResourceCodes, error_response};
use crate::services::current_user;
use crate::services::facts::{course_facts, load_course};
use crate::storage::Storage;

pub async fn delete_course(
    service: &CourseService,
    request: &HttpRequest,
    course_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match delete(storage.as_ref(), &Actor::from(&user), course_id).await {
        Ok(()) => {
            info!("Course {} deleted by user {}", course_id, user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Course deleted successfully")))
        }
        Err(e) => Ok(error_response(&e, ResourceCodes::COURSE)),
    }
}

// 科目随课程级联删除
async fn delete(storage: &dyn Storage, actor: &Actor, course_id: i64) -> Result<()> {
    let course = load_course(storage, course_id).await?;
    let facts = course_facts(storage, actor, &course).await?;
    authorize(actor, EntityKind::Course, Action::Write, &facts)?;

    if storage.delete_course(course_id).await? {
        Ok(())
    } else {
        Err(AcademicError::not_found(format!("Course {course_id} not found")))
    }
}
