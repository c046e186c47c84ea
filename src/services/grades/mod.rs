pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::sync::Arc;

use crate::access::{Action, Actor, EntityKind, RecordFacts, authorize};
use crate::errors::{AcademicError, Result};
use crate::models::grades::entities::Grade;
use crate::models::grades::requests::{CreateGradeRequest, GradeListParams, UpdateGradeRequest};
use crate::models::subjects::entities::Subject;
use crate::models::users::entities::User;
use crate::notify::{GradeNotice, GradeNotifier, dispatch};
use crate::services::facts::{load_course, referenced_subject};
use crate::storage::Storage;

pub struct GradeService {
    storage: Option<Arc<dyn Storage>>,
}

impl GradeService {
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

    // 通知器可选，未注入时不发送通知
    pub(crate) fn get_notifier(&self, request: &HttpRequest) -> Option<Arc<dyn GradeNotifier>> {
        request
            .app_data::<web::Data<Arc<dyn GradeNotifier>>>()
            .map(|data| data.get_ref().clone())
    }

    pub async fn list_grades(
        &self,
        request: &HttpRequest,
        query: GradeListParams,
    ) -> ActixResult<HttpResponse> {
        list::list_grades(self, request, query).await
    }

    pub async fn create_grade(
        &self,
        request: &HttpRequest,
        grade_data: CreateGradeRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_grade(self, request, grade_data).await
    }

    pub async fn get_grade(&self, request: &HttpRequest, grade_id: i64) -> ActixResult<HttpResponse> {
        get::get_grade(self, request, grade_id).await
    }

    pub async fn update_grade(
        &self,
        request: &HttpRequest,
        grade_id: i64,
        update_data: UpdateGradeRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_grade(self, request, grade_id, update_data).await
    }

    pub async fn delete_grade(
        &self,
        request: &HttpRequest,
        grade_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_grade(self, request, grade_id).await
    }

    /// 写入提交后派发通知
    pub(crate) fn notify_saved(&self, request: &HttpRequest, saved: &SavedGrade) {
        if let Some(notifier) = self.get_notifier(request) {
            dispatch(notifier, saved.notice());
        }
    }
}

/// 已提交的成绩及通知需要的关联信息
pub(crate) struct SavedGrade {
    pub grade: Grade,
    pub student: User,
    pub subject: Subject,
}

impl SavedGrade {
    fn notice(&self) -> GradeNotice {
        GradeNotice {
            student_name: self.student.display_name(),
            student_email: self.student.email.clone(),
            subject_name: self.subject.name.clone(),
            score: self.grade.score,
            kind: self.grade.kind,
            date: self.grade.date,
            notes: self.grade.notes.clone(),
        }
    }
}

pub(crate) async fn load_grade(storage: &dyn Storage, id: i64) -> Result<Grade> {
    storage
        .get_grade_by_id(id)
        .await?
        .ok_or_else(|| AcademicError::not_found(format!("Grade {id} not found")))
}

/// 目标科目必须在当前用户可写的课程下
pub(crate) async fn writable_subject(
    storage: &dyn Storage,
    actor: &Actor,
    subject_id: i64,
) -> Result<Subject> {
    let subject = referenced_subject(storage, subject_id).await?;
    let course = load_course(storage, subject.course_id).await?;
    authorize(
        actor,
        EntityKind::Grade,
        Action::Write,
        &RecordFacts::in_course(course.teacher_id),
    )?;
    Ok(subject)
}
