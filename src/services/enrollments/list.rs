use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::EnrollmentService;
use crate::access::{Actor, EntityKind, visible_scope};
use crate::models::enrollments::requests::EnrollmentListParams;
use crate::models::{ApiResponse, ResourceCodes, error_response};
use crate::services::current_user;

pub async fn list_enrollments(
    service: &EnrollmentService,
    request: &HttpRequest,
    query: EnrollmentListParams,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);
    let scope = visible_scope(&Actor::from(&user), EntityKind::Enrollment);

    match storage.list_enrollments_with_pagination(&scope, query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Enrollments retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ResourceCodes::ENROLLMENT)),
    }
}
