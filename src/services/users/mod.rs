pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod profile;
pub mod students;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::sync::Arc;

use crate::cache::ObjectCache;
use crate::models::users::requests::{
    CreateUserRequest, PickableStudentsParams, ResetPasswordRequest, UpdateStudentProfileRequest,
    UpdateTeacherProfileRequest, UpdateUserRequest, UserListParams,
};
use crate::storage::Storage;

pub struct UserService {
    storage: Option<Arc<dyn Storage>>,
}

impl UserService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    /// 用户资料或状态变化后清空认证缓存，停用立即生效
    pub(crate) async fn invalidate_sessions(&self, request: &HttpRequest) {
        if let Some(cache) = request.app_data::<web::Data<Arc<dyn ObjectCache>>>() {
            cache.invalidate_all().await;
        }
    }

    // 获取用户列表（按用户名排序）
    pub async fn list_users(
        &self,
        query: UserListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_users(self, query, request).await
    }

    // 创建用户，同时按角色创建档案
    pub async fn create_user(
        &self,
        user_data: CreateUserRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_user(self, user_data, request).await
    }

    // 用户详情（含档案）
    pub async fn get_user(&self, user_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        get::get_user(self, user_id, request).await
    }

    pub async fn update_user(
        &self,
        user_id: i64,
        update_data: UpdateUserRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_user(self, user_id, update_data, request).await
    }

    // 切换启用状态
    pub async fn toggle_active(
        &self,
        user_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::toggle_active(self, user_id, request).await
    }

    // 管理员重置密码
    pub async fn reset_password(
        &self,
        user_id: i64,
        reset: ResetPasswordRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::reset_password(self, user_id, reset, request).await
    }

    pub async fn delete_user(
        &self,
        user_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_user(self, user_id, request).await
    }

    pub async fn update_student_profile(
        &self,
        user_id: i64,
        update_data: UpdateStudentProfileRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        profile::update_student_profile(self, user_id, update_data, request).await
    }

    pub async fn update_teacher_profile(
        &self,
        user_id: i64,
        update_data: UpdateTeacherProfileRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        profile::update_teacher_profile(self, user_id, update_data, request).await
    }

    // 选择器中的学生，按可见范围过滤
    pub async fn list_pickable_students(
        &self,
        query: PickableStudentsParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        students::list_pickable_students(self, query, request).await
    }
}
