//! 聚合计算的输入行
//!
//! 由存储层在可见范围内查询得到，聚合模块只读取这些结构。

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::attendance::entities::AttendanceStatus;
use crate::models::grades::entities::EvaluationKind;

/// 参与平均分计算的科目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectRef {
    pub id: i64,
    pub name: String,
    pub course_id: i64,
}

/// 只含科目与分数的成绩
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredGrade {
    pub subject_id: i64,
    pub score: Decimal,
}

/// 只含日期与状态的考勤
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttendanceMark {
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

/// 关联了学生、科目、课程名称的成绩
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeRecord {
    pub id: i64,
    pub student_id: i64,
    pub student_name: String,
    pub subject_id: i64,
    pub subject_name: String,
    pub course_id: i64,
    pub course_name: String,
    pub score: Decimal,
    pub kind: EvaluationKind,
    pub date: NaiveDate,
}

/// 关联了学生、科目名称的考勤
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRecord {
    pub id: i64,
    pub student_name: String,
    pub subject_name: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

/// 课程花名册中的学生
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterStudent {
    pub id: i64,
    pub display_name: String,
    pub student_code: Option<String>,
    pub email: String,
}
