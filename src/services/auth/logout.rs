use actix_web::{HttpResponse, Result as ActixResult};

use crate::models::ApiResponse;
use crate::utils::jwt::JwtUtils;

/// 处理用户登出
/// 覆盖 refresh_token cookie（max_age=0）清除客户端的登录状态
pub async fn handle_logout() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok()
        .cookie(JwtUtils::expired_refresh_cookie())
        .json(ApiResponse::success_empty("Logout successful")))
}
