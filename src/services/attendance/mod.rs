pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::NaiveDate;
use std::sync::Arc;

use crate::access::{Action, Actor, EntityKind, RecordFacts, authorize};
use crate::errors::{AcademicError, Result};
use crate::models::attendance::entities::Attendance;
use crate::models::attendance::requests::{
    AttendanceListParams, CreateAttendanceRequest, UpdateAttendanceRequest,
};
use crate::services::facts::{load_course, referenced_subject};
use crate::storage::Storage;

pub struct AttendanceService {
    storage: Option<Arc<dyn Storage>>,
}

impl AttendanceService {
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

    pub async fn list_attendance(
        &self,
        request: &HttpRequest,
        query: AttendanceListParams,
    ) -> ActixResult<HttpResponse> {
        list::list_attendance(self, request, query).await
    }

    pub async fn create_attendance(
        &self,
        request: &HttpRequest,
        attendance_data: CreateAttendanceRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_attendance(self, request, attendance_data).await
    }

    pub async fn get_attendance(
        &self,
        request: &HttpRequest,
        attendance_id: i64,
    ) -> ActixResult<HttpResponse> {
        get::get_attendance(self, request, attendance_id).await
    }

    pub async fn update_attendance(
        &self,
        request: &HttpRequest,
        attendance_id: i64,
        update_data: UpdateAttendanceRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_attendance(self, request, attendance_id, update_data).await
    }

    pub async fn delete_attendance(
        &self,
        request: &HttpRequest,
        attendance_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_attendance(self, request, attendance_id).await
    }
}

pub(crate) async fn load_attendance(storage: &dyn Storage, id: i64) -> Result<Attendance> {
    storage
        .get_attendance_by_id(id)
        .await?
        .ok_or_else(|| AcademicError::not_found(format!("Attendance {id} not found")))
}

/// 目标科目必须在当前用户可写的课程下
pub(crate) async fn ensure_subject_writable(
    storage: &dyn Storage,
    actor: &Actor,
    subject_id: i64,
) -> Result<()> {
    let subject = referenced_subject(storage, subject_id).await?;
    let course = load_course(storage, subject.course_id).await?;
    authorize(
        actor,
        EntityKind::Attendance,
        Action::Write,
        &RecordFacts::in_course(course.teacher_id),
    )
}

/// 同一学生、科目、日期只能有一条考勤
pub(crate) async fn ensure_unique_mark(
    storage: &dyn Storage,
    student_id: i64,
    subject_id: i64,
    date: NaiveDate,
    exclude_id: Option<i64>,
) -> Result<()> {
    if storage
        .attendance_exists(student_id, subject_id, date, exclude_id)
        .await?
    {
        Err(AcademicError::duplicate(format!(
            "Attendance for student {student_id} in subject {subject_id} on {date} already exists"
        )))
    } else {
        Ok(())
    }
}
