use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 选课记录：(student_id, course_id) 唯一
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "enrollment.ts")]
pub struct Enrollment {
    pub id: i64,
    pub student_id: i64,
    pub course_id: i64,
    pub enrolled_on: chrono::NaiveDate,
}
