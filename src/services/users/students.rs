use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::UserService;
use crate::access::{Actor, EntityKind, visible_scope};
use crate::models::users::requests::PickableStudentsParams;
use crate::models::{ApiResponse, ResourceCodes, error_response};
use crate::services::current_user;

/// 管理员看到全部学生，教师只看到自己课程中的学生
pub async fn list_pickable_students(
    service: &UserService,
    query: PickableStudentsParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);
    let scope = visible_scope(&Actor::from(&user), EntityKind::Student);
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    match storage.list_students(&scope, search).await {
        Ok(students) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            students,
            "Students retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ResourceCodes::USER)),
    }
}
