use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::GradeService;
use crate::access::{Actor, EntityKind, visible_scope};
use crate::models::grades::requests::GradeListParams;
use crate::models::{ApiResponse, ResourceCodes, error_response};
use crate::services::current_user;

pub async fn list_grades(
    service: &GradeService,
    request: &HttpRequest,
    query: GradeListParams,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);
    let scope = visible_scope(&Actor::from(&user), EntityKind::Grade);

    match storage.list_grades_with_pagination(&scope, query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Grades retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ResourceCodes::GRADE)),
    }
}
