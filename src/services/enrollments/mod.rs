pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::{AcademicError, Result};
use crate::models::enrollments::entities::Enrollment;
use crate::models::enrollments::requests::{
    CreateEnrollmentRequest, EnrollmentListParams, UpdateEnrollmentRequest,
};
use crate::storage::Storage;

pub struct EnrollmentService {
    storage: Option<Arc<dyn Storage>>,
}

impl EnrollmentService {
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

    pub async fn list_enrollments(
        &self,
        request: &HttpRequest,
        query: EnrollmentListParams,
    ) -> ActixResult<HttpResponse> {
        list::list_enrollments(self, request, query).await
    }

    // 管理员或课程负责教师为学生选课
    pub async fn create_enrollment(
        &self,
        request: &HttpRequest,
        enrollment_data: CreateEnrollmentRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_enrollment(self, request, enrollment_data).await
    }

    pub async fn get_enrollment(
        &self,
        request: &HttpRequest,
        enrollment_id: i64,
    ) -> ActixResult<HttpResponse> {
        get::get_enrollment(self, request, enrollment_id).await
    }

    pub async fn update_enrollment(
        &self,
        request: &HttpRequest,
        enrollment_id: i64,
        update_data: UpdateEnrollmentRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_enrollment(self, request, enrollment_id, update_data).await
    }

    pub async fn delete_enrollment(
        &self,
        request: &HttpRequest,
        enrollment_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_enrollment(self, request, enrollment_id).await
    }
}

pub(crate) async fn load_enrollment(storage: &dyn Storage, id: i64) -> Result<Enrollment> {
    storage
        .get_enrollment_by_id(id)
        .await?
        .ok_or_else(|| AcademicError::not_found(format!("Enrollment {id} not found")))
}

pub(crate) async fn ensure_not_enrolled(
    storage: &dyn Storage,
    student_id: i64,
    course_id: i64,
    exclude_id: Option<i64>,
) -> Result<()> {
    if storage
        .enrollment_exists(student_id, course_id, exclude_id)
        .await?
    {
        Err(AcademicError::duplicate(format!(
            "Student {student_id} is already enrolled in course {course_id}"
        )))
    } else {
        Ok(())
    }
}
