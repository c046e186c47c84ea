use super::entities::AttendanceStatus;
use crate::models::common::{PaginationQuery, deserialize_optional_i64};
use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct AttendanceListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub subject_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct CreateAttendanceRequest {
    pub student_id: i64,
    pub subject_id: i64,
    pub date: Option<chrono::NaiveDate>,
    pub status: AttendanceStatus,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct UpdateAttendanceRequest {
    pub student_id: Option<i64>,
    pub subject_id: Option<i64>,
    pub date: Option<chrono::NaiveDate>,
    pub status: Option<AttendanceStatus>,
    pub notes: Option<String>,
}
