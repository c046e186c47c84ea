use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::users::entities::UserRole;
use crate::models::users::requests::{
    CreateUserRequest, PickableStudentsParams, ResetPasswordRequest, UpdateStudentProfileRequest,
    UpdateTeacherProfileRequest, UpdateUserRequest, UserListParams,
};
use crate::services::UserService;
use crate::utils::SafeIDI64;

// 懒加载的全局 UserService 实例
static USER_SERVICE: Lazy<UserService> = Lazy::new(UserService::new_lazy);

pub async fn list_users(
    req: HttpRequest,
    query: web::Query<UserListParams>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE.list_users(query.into_inner(), &req).await
}

pub async fn create_user(
    req: HttpRequest,
    user_data: web::Json<CreateUserRequest>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE.create_user(user_data.into_inner(), &req).await
}

pub async fn get_user(req: HttpRequest, user_id: SafeIDI64) -> ActixResult<HttpResponse> {
    USER_SERVICE.get_user(user_id.0, &req).await
}

pub async fn update_user(
    req: HttpRequest,
    user_id: SafeIDI64,
    update_data: web::Json<UpdateUserRequest>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE
        .update_user(user_id.0, update_data.into_inner(), &req)
        .await
}

pub async fn toggle_active(req: HttpRequest, user_id: SafeIDI64) -> ActixResult<HttpResponse> {
    USER_SERVICE.toggle_active(user_id.0, &req).await
}

pub async fn reset_password(
    req: HttpRequest,
    user_id: SafeIDI64,
    reset: web::Json<ResetPasswordRequest>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE
        .reset_password(user_id.0, reset.into_inner(), &req)
        .await
}

pub async fn delete_user(req: HttpRequest, user_id: SafeIDI64) -> ActixResult<HttpResponse> {
    USER_SERVICE.delete_user(user_id.0, &req).await
}

pub async fn update_student_profile(
    req: HttpRequest,
    user_id: SafeIDI64,
    update_data: web::Json<UpdateStudentProfileRequest>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE
        .update_student_profile(user_id.0, update_data.into_inner(), &req)
        .await
}

pub async fn update_teacher_profile(
    req: HttpRequest,
    user_id: SafeIDI64,
    update_data: web::Json<UpdateTeacherProfileRequest>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE
        .update_teacher_profile(user_id.0, update_data.into_inner(), &req)
        .await
}

pub async fn list_pickable_students(
    req: HttpRequest,
    query: web::Query<PickableStudentsParams>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE
        .list_pickable_students(query.into_inner(), &req)
        .await
}

// 配置路由
pub fn configure_user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/users")
            .wrap(middlewares::RequireJWT)
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles()))
                    .route("", web::get().to(list_users))
                    .route("", web::post().to(create_user))
                    .route("/{id}", web::get().to(get_user))
                    .route("/{id}", web::put().to(update_user))
                    .route("/{id}", web::delete().to(delete_user))
                    .route("/{id}/toggle-active", web::post().to(toggle_active))
                    .route("/{id}/password", web::put().to(reset_password))
                    .route("/{id}/student-profile", web::put().to(update_student_profile))
                    .route("/{id}/teacher-profile", web::put().to(update_teacher_profile)),
            ),
    );
    cfg.service(
        web::scope("/api/v1/students")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("/pickable")
                    // 教师和管理员的学生选择器
                    .wrap(middlewares::RequireRole::new_any(UserRole::staff_roles()))
                    .route(web::get().to(list_pickable_students)),
            ),
    );
}
