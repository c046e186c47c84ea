use crate::models::common::PaginationQuery;
use serde::Deserialize;
use ts_rs::TS;

// 课程列表查询参数
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct CourseListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub search: Option<String>,
}

// 创建课程请求，teacher_id 必须指向教师
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct CreateCourseRequest {
    pub code: String,
    pub name: String,
    pub academic_period: String,
    pub teacher_id: i64,
}

// 更新课程请求
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct UpdateCourseRequest {
    pub code: Option<String>,
    pub name: Option<String>,
    pub academic_period: Option<String>,
    pub teacher_id: Option<i64>,
}
