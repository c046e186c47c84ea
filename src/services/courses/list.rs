use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CourseService;
use crate::access::{Actor, EntityKind, visible_scope};
use crate::models::courses::requests::CourseListParams;
use crate::models::{ApiResponse, ResourceCodes, error_response};
use crate::services::current_user;

pub async fn list_courses(
    service: &CourseService,
    request: &HttpRequest,
    query: CourseListParams,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);
    let scope = visible_scope(&Actor::from(&user), EntityKind::Course);

    match storage.list_courses_with_pagination(&scope, query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Courses retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ResourceCodes::COURSE)),
    }
}
