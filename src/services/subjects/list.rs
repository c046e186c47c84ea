use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SubjectService;
use crate::access::{Actor, EntityKind, visible_scope};
use crate::models::subjects::requests::SubjectListParams;
use crate::models::{ApiResponse, ResourceCodes, error_response};
use crate::services::current_user;

pub async fn list_subjects(
    service: &SubjectService,
    request: &HttpRequest,
    query: SubjectListParams,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);
    let scope = visible_scope(&Actor::from(&user), EntityKind::Subject);

    match storage.list_subjects_with_pagination(&scope, query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Subjects retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ResourceCodes::SUBJECT)),
    }
}
