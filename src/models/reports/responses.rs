use rust_decimal::Decimal;
use serde::Serialize;
use ts_rs::TS;

use crate::models::courses::entities::Course;
use crate::models::users::responses::StudentOption;

// 科目平均分
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "report.ts")]
pub struct SubjectAverage {
    pub subject_id: i64,
    pub subject_name: String,
    #[ts(type = "string")]
    pub average: Decimal,
    pub grade_count: usize,
}

// 月度出勤率
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "report.ts")]
pub struct MonthlyRate {
    /// YYYY-MM
    pub label: String,
    pub present: usize,
    pub total: usize,
    #[ts(type = "string")]
    pub rate: Decimal,
}

// 图表数据
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "report.ts")]
pub struct ChartSeries {
    pub labels: Vec<String>,
    #[ts(type = "Array<string>")]
    pub values: Vec<Decimal>,
}

impl From<&[SubjectAverage]> for ChartSeries {
    fn from(items: &[SubjectAverage]) -> Self {
        Self {
            labels: items.iter().map(|a| a.subject_name.clone()).collect(),
            values: items.iter().map(|a| a.average).collect(),
        }
    }
}

impl From<&[MonthlyRate]> for ChartSeries {
    fn from(items: &[MonthlyRate]) -> Self {
        Self {
            labels: items.iter().map(|m| m.label.clone()).collect(),
            values: items.iter().map(|m| m.rate).collect(),
        }
    }
}

// 花名册导出行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "report.ts")]
pub struct RosterRow {
    pub display_name: String,
    pub student_code: String,
    pub email: String,
}

// 成绩导出行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "report.ts")]
pub struct GradeExportRow {
    pub student_name: String,
    pub subject_name: String,
    pub course_name: String,
    #[ts(type = "string")]
    pub score: Decimal,
    pub kind_label: String,
    pub date: String,
}

// 考勤导出行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "report.ts")]
pub struct AttendanceExportRow {
    pub student_name: String,
    pub subject_name: String,
    pub date: String,
    pub status_label: String,
}

// 成绩单行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "report.ts")]
pub struct TranscriptRow {
    pub subject_name: String,
    pub kind_label: String,
    #[ts(type = "string")]
    pub score: Decimal,
    pub date: String,
}

// 学生成绩单
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "report.ts")]
pub struct Transcript {
    pub student_name: String,
    pub student_code: String,
    pub username: String,
    pub rows: Vec<TranscriptRow>,
    #[ts(type = "string")]
    pub average: Decimal,
}

// 课程成绩总表行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "report.ts")]
pub struct RollRow {
    pub student_name: String,
    pub subject_name: String,
    #[ts(type = "string")]
    pub score: Decimal,
    pub kind_label: String,
}

// 课程成绩总表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "report.ts")]
pub struct CourseRoll {
    pub course_code: String,
    pub course_name: String,
    pub academic_period: String,
    pub rows: Vec<RollRow>,
}

// 平均分面板
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "report.ts")]
pub struct AveragesPanelResponse {
    pub averages: Vec<SubjectAverage>,
    pub courses: Vec<Course>,
}

// 搜索结果
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "report.ts")]
pub struct SearchResponse {
    pub students: Vec<StudentOption>,
    pub courses: Vec<Course>,
}
