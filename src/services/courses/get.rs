use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CourseService;
use crate::access::{Action, Actor, EntityKind, authorize};
use crate::errors::Result;
use crate::models::courses::entities::Course;
use crate::models::{ApiResponse, ResourceCodes, error_response};
use crate::services::current_user;
use crate::services::facts::{course_facts, load_course};
use crate::storage::Storage;

pub async fn get_course(
    service: &CourseService,
    request: &HttpRequest,
    course_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match find_course(storage.as_ref(), &Actor::from(&user), course_id).await {
        Ok(course) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            course,
            "Course retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ResourceCodes::COURSE)),
    }
}

async fn find_course(storage: &dyn Storage, actor: &Actor, course_id: i64) -> Result<Course> {
    let course = load_course(storage, course_id).await?;
    let facts = course_facts(storage, actor, &course).await?;
    authorize(actor, EntityKind::Course, Action::Read, &facts)?;
    Ok(course)
}
