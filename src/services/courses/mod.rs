pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::courses::requests::{CourseListParams, CreateCourseRequest, UpdateCourseRequest};
use crate::errors::{AcademicError, Result};
use crate::models::users::entities::UserRole;
use crate::storage::Storage;
use crate::utils::validate::{validate_code, validate_name, validate_period};

pub struct CourseService {
    storage: Option<Arc<dyn Storage>>,
}

impl CourseService {
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

    // 可见范围内的课程列表
    pub async fn list_courses(
        &self,
        request: &HttpRequest,
        query: CourseListParams,
    ) -> ActixResult<HttpResponse> {
        list::list_courses(self, request, query).await
    }

    pub async fn create_course(
        &self,
        request: &HttpRequest,
        course_data: CreateCourseRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_course(self, request, course_data).await
    }

    pub async fn get_course(&self, request: &HttpRequest, course_id: i64) -> ActixResult<HttpResponse> {
        get::get_course(self, request, course_id).await
    }

    pub async fn update_course(
        &self,
        request: &HttpRequest,
        course_id: i64,
        update_data: UpdateCourseRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_course(self, request, course_id, update_data).await
    }

    pub async fn delete_course(
        &self,
        request: &HttpRequest,
        course_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_course(self, request, course_id).await
    }
}

/// 负责教师必须是教师账号
pub(crate) async fn ensure_teacher(storage: &dyn Storage, teacher_id: i64) -> Result<()> {
    match storage.get_user_by_id(teacher_id).await? {
        Some(user) if user.role == UserRole::Teacher => Ok(()),
        Some(_) => Err(AcademicError::validation(format!(
            "User {teacher_id} is not a teacher"
        ))),
        None => Err(AcademicError::validation(format!(
            "Teacher {teacher_id} does not exist"
        ))),
    }
}

pub(crate) fn validate_course_fields(
    code: Option<&str>,
    name: Option<&str>,
    period: Option<&str>,
) -> Result<()> {
    if let Some(code) = code {
        validate_code("code", code).map_err(AcademicError::validation)?;
    }
    if let Some(name) = name {
        validate_name("name", name).map_err(AcademicError::validation)?;
    }
    if let Some(period) = period {
        validate_period(period).map_err(AcademicError::validation)?;
    }
    Ok(())
}
