use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::UserService;
use crate::models::{
    ApiResponse, ErrorCode, ResourceCodes, error_response,
    users::{requests::CreateUserRequest, responses::CreatedUserResponse},
};
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_password, validate_username};

pub async fn create_user(
    service: &UserService,
    mut user_data: CreateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    user_data.username = user_data.username.trim().to_string();
    user_data.email = user_data.email.trim().to_string();
    user_data.first_name = user_data.first_name.trim().to_string();
    user_data.last_name = user_data.last_name.trim().to_string();

    // 验证用户名
    if let Err(msg) = validate_username(&user_data.username) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserNameInvalid, msg)));
    }

    // 验证邮箱
    if let Err(msg) = validate_email(&user_data.email) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserEmailInvalid, msg)));
    }

    // 密码策略
    let policy = validate_password(&user_data.password);
    if !policy.is_valid {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::UserPasswordInvalid,
            policy.error_message(),
        )));
    }

    let storage = service.get_storage(request);

    match storage.username_taken(&user_data.username).await {
        Ok(false) => {}
        Ok(true) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::UserAlreadyExists,
                "Username already exists",
            )));
        }
        Err(e) => return Ok(error_response(&e, ResourceCodes::USER)),
    }

    let password_hash = match hash_password(&user_data.password) {
        Ok(hash) => hash,
        Err(e) => return Ok(error_response(&e, ResourceCodes::USER)),
    };

    match storage.create_user(user_data, password_hash).await {
        Ok((user, profile)) => {
            info!("User {} ({}) created", user.username, user.role);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                CreatedUserResponse { user, profile },
                "User created successfully",
            )))
        }
        Err(e) => Ok(error_response(&e, ResourceCodes::USER)),
    }
}
