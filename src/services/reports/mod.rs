pub mod averages;
pub mod export;
pub mod roll;
pub mod roster;
pub mod transcript;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::Result;
use crate::models::reports::requests::{
    AttendanceExportParams, AveragesParams, ExportFormat, ExportParams, GradeExportParams,
};
use crate::render::{Sheet, attachment};
use crate::storage::Storage;

pub struct ReportService {
    storage: Option<Arc<dyn Storage>>,
}

impl ReportService {
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

    // 平均分面板
    pub async fn averages(
        &self,
        request: &HttpRequest,
        params: AveragesParams,
    ) -> ActixResult<HttpResponse> {
        averages::averages_panel(self, request, params).await
    }

    // 学生成绩单，未指定学生时为当前学生本人
    pub async fn transcript(
        &self,
        request: &HttpRequest,
        student_id: Option<i64>,
        params: ExportParams,
    ) -> ActixResult<HttpResponse> {
        transcript::export_transcript(self, request, student_id, params).await
    }

    // 课程成绩总表
    pub async fn course_roll(
        &self,
        request: &HttpRequest,
        course_id: i64,
        params: ExportParams,
    ) -> ActixResult<HttpResponse> {
        roll::export_course_roll(self, request, course_id, params).await
    }

    // 课程花名册
    pub async fn course_roster(
        &self,
        request: &HttpRequest,
        course_id: i64,
        params: ExportParams,
    ) -> ActixResult<HttpResponse> {
        roster::export_roster(self, request, course_id, params).await
    }

    pub async fn export_grades(
        &self,
        request: &HttpRequest,
        params: GradeExportParams,
    ) -> ActixResult<HttpResponse> {
        export::export_grades(self, request, params).await
    }

    pub async fn export_attendance(
        &self,
        request: &HttpRequest,
        params: AttendanceExportParams,
    ) -> ActixResult<HttpResponse> {
        export::export_attendance(self, request, params).await
    }
}

/// 渲染为下载文件
pub(crate) fn render_download(sheet: &Sheet, format: ExportFormat, file_stem: &str) -> Result<HttpResponse> {
    let body = sheet.render(format)?;
    tracing::debug!(
        "Rendered {} ({} rows, {} bytes)",
        file_stem,
        sheet.rows.len(),
        body.len()
    );
    Ok(attachment(format, file_stem, body))
}
