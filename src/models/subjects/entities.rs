use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 科目，属于唯一课程
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "subject.ts")]
pub struct Subject {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub course_id: i64,
    pub weekly_hours: i32,
}
