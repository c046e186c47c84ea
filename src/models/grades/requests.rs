use super::entities::EvaluationKind;
use crate::models::common::{PaginationQuery, deserialize_optional_i64};
use rust_decimal::Decimal;
use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "grade.ts")]
pub struct GradeListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub subject_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub student_id: Option<i64>,
}

// 录入成绩，created_by 由服务端决定
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "grade.ts")]
pub struct CreateGradeRequest {
    pub student_id: i64,
    pub subject_id: i64,
    #[ts(type = "string")]
    pub score: Decimal,
    pub kind: EvaluationKind,
    pub date: Option<chrono::NaiveDate>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "grade.ts")]
pub struct UpdateGradeRequest {
    pub student_id: Option<i64>,
    pub subject_id: Option<i64>,
    #[ts(type = "string | null")]
    pub score: Option<Decimal>,
    pub kind: Option<EvaluationKind>,
    pub date: Option<chrono::NaiveDate>,
    pub notes: Option<String>,
}
