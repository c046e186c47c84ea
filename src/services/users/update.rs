use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::UserService;
use crate::errors::{AcademicError, Result};
use crate::middlewares::RequireJWT;
use crate::models::users::entities::User;
use crate::models::users::requests::{ResetPasswordRequest, UpdateUserRequest};
use crate::models::{ApiResponse, ErrorCode, ResourceCodes, error_response};
use crate::services::facts::load_user;
use crate::storage::Storage;
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_password};

pub async fn update_user(
    service: &UserService,
    user_id: i64,
    mut update_data: UpdateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    update_data.email = update_data.email.map(|s| s.trim().to_string());
    update_data.first_name = update_data.first_name.map(|s| s.trim().to_string());
    update_data.last_name = update_data.last_name.map(|s| s.trim().to_string());

    if let Some(ref email) = update_data.email
        && let Err(msg) = validate_email(email)
    {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserEmailInvalid, msg)));
    }

    // 管理员不能停用自己
    if RequireJWT::extract_user_id(request) == Some(user_id) && update_data.is_active == Some(false)
    {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::CanNotDeleteCurrentUser,
            "Cannot deactivate current user",
        )));
    }

    let storage = service.get_storage(request);

    match update(storage.as_ref(), user_id, update_data).await {
        Ok(user) => {
            service.invalidate_sessions(request).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(user, "User updated successfully")))
        }
        Err(e) => Ok(error_response(&e, ResourceCodes::USER)),
    }
}

async fn update(storage: &dyn Storage, user_id: i64, data: UpdateUserRequest) -> Result<User> {
    let user = load_user(storage, user_id).await?;

    // 角色与档案互斥，已有档案的用户不能改成其他角色
    if let Some(role) = data.role
        && role != user.role
        && storage.get_profile(&user).await?.is_some()
    {
        return Err(AcademicError::validation(format!(
            "Cannot change role of {} while a {} profile exists",
            user.username, user.role
        )));
    }

    storage
        .update_user(user_id, data)
        .await?
        .ok_or_else(|| AcademicError::not_found(format!("User {user_id} not found")))
}

pub async fn toggle_active(
    service: &UserService,
    user_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if RequireJWT::extract_user_id(request) == Some(user_id) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::CanNotDeleteCurrentUser,
            "Cannot deactivate current user",
        )));
    }

    let storage = service.get_storage(request);

    match toggle(storage.as_ref(), user_id).await {
        Ok(user) => {
            info!("User {} active = {}", user.username, user.is_active);
            service.invalidate_sessions(request).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(user, "User status updated")))
        }
        Err(e) => Ok(error_response(&e, ResourceCodes::USER)),
    }
}

async fn toggle(storage: &dyn Storage, user_id: i64) -> Result<User> {
    let user = load_user(storage, user_id).await?;
    let update = UpdateUserRequest {
        is_active: Some(!user.is_active),
        ..UpdateUserRequest::default()
    };
    storage
        .update_user(user_id, update)
        .await?
        .ok_or_else(|| AcademicError::not_found(format!("User {user_id} not found")))
}

pub async fn reset_password(
    service: &UserService,
    user_id: i64,
    reset: ResetPasswordRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let policy = validate_password(&reset.new_password);
    if !policy.is_valid {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::UserPasswordInvalid,
            policy.error_message(),
        )));
    }

    let password_hash = match hash_password(&reset.new_password) {
        Ok(hash) => hash,
        Err(e) => return Ok(error_response(&e, ResourceCodes::USER)),
    };

    let storage = service.get_storage(request);

    match storage.update_user_password(user_id, password_hash).await {
        Ok(true) => {
            info!("Password reset for user {}", user_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Password reset successfully")))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::UserNotFound,
            "User not found",
        ))),
        Err(e) => Ok(error_response(&e, ResourceCodes::USER)),
    }
}
