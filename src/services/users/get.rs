use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::UserService;
use crate::errors::Result;
use crate::models::users::responses::UserDetailResponse;
use crate::models::{ApiResponse, ResourceCodes, error_response};
use crate::services::facts::load_user;
use crate::storage::Storage;

pub async fn get_user(
    service: &UserService,
    user_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match user_detail(storage.as_ref(), user_id).await {
        Ok(detail) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            detail,
            "User retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ResourceCodes::USER)),
    }
}

pub(crate) async fn user_detail(storage: &dyn Storage, user_id: i64) -> Result<UserDetailResponse> {
    let user = load_user(storage, user_id).await?;
    let profile = storage.get_profile(&user).await?;
    Ok(UserDetailResponse { user, profile })
}
