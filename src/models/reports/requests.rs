use chrono::NaiveDate;
use serde::Deserialize;
use ts_rs::TS;

use crate::models::common::deserialize_optional_i64;

// 导出格式
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "report.ts")]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Csv => "text/csv; charset=utf-8",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }
}

// 通用导出参数
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "report.ts")]
pub struct ExportParams {
    #[serde(default)]
    pub format: ExportFormat,
}

// 平均分面板
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "report.ts")]
pub struct AveragesParams {
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub course_id: Option<i64>,
    pub period: Option<String>,
}

// 成绩导出，可按课程与科目过滤
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "report.ts")]
pub struct GradeExportParams {
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub course_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub subject_id: Option<i64>,
    #[serde(default)]
    pub format: ExportFormat,
}

// 考勤导出，日期区间包含两端
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "report.ts")]
pub struct AttendanceExportParams {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub format: ExportFormat,
}

// 搜索
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "report.ts")]
pub struct SearchParams {
    pub query: String,
}
