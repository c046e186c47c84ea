use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 评价类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "grade.ts")]
pub enum EvaluationKind {
    Midterm,
    Final,
    Homework,
    Quiz,
}

impl EvaluationKind {
    /// 报表中显示的名称
    pub fn label(&self) -> &'static str {
        match self {
            EvaluationKind::Midterm => "Parcial",
            EvaluationKind::Final => "Final",
            EvaluationKind::Homework => "Tarea",
            EvaluationKind::Quiz => "Quiz",
        }
    }
}

impl std::fmt::Display for EvaluationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvaluationKind::Midterm => write!(f, "midterm"),
            EvaluationKind::Final => write!(f, "final"),
            EvaluationKind::Homework => write!(f, "homework"),
            EvaluationKind::Quiz => write!(f, "quiz"),
        }
    }
}

impl std::str::FromStr for EvaluationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "midterm" => Ok(EvaluationKind::Midterm),
            "final" => Ok(EvaluationKind::Final),
            "homework" => Ok(EvaluationKind::Homework),
            "quiz" => Ok(EvaluationKind::Quiz),
            _ => Err(format!("Invalid evaluation kind: {s}")),
        }
    }
}

// 成绩
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "grade.ts")]
pub struct Grade {
    pub id: i64,
    pub student_id: i64,
    pub subject_id: i64,
    #[ts(type = "string")]
    pub score: Decimal,
    pub kind: EvaluationKind,
    pub date: chrono::NaiveDate,
    pub notes: String,
    pub created_by: Option<i64>,
}

/// 分数以百分之一为单位存储
pub fn score_from_cents(cents: i32) -> Decimal {
    Decimal::new(cents as i64, 2)
}

/// 分数转为百分之一整数，调用前需已校验精度
pub fn score_to_cents(score: Decimal) -> i32 {
    (score * Decimal::ONE_HUNDRED).round().to_i32().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_score_cents_conversion() {
        assert_eq!(score_to_cents(Decimal::from_str("4.50").unwrap()), 450);
        assert_eq!(score_to_cents(Decimal::from_str("5").unwrap()), 500);
        assert_eq!(score_to_cents(Decimal::ZERO), 0);
        assert_eq!(score_from_cents(450).to_string(), "4.50");
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(EvaluationKind::Midterm.label(), "Parcial");
        assert_eq!(EvaluationKind::Homework.label(), "Tarea");
        assert_eq!("final".parse::<EvaluationKind>().unwrap(), EvaluationKind::Final);
    }
}
