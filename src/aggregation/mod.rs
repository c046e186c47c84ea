//! 聚合计算
//!
//! 对已按可见范围过滤的数据计算平均分、月度出勤率以及各类导出行。
//! 所有分数使用十进制定点运算，结果四舍五入（远离零）保留两位小数。

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::attendance::entities::AttendanceStatus;
use crate::models::courses::entities::Course;
use crate::models::reports::entities::{
    AttendanceMark, AttendanceRecord, GradeRecord, RosterStudent, ScoredGrade, SubjectRef,
};
use crate::models::reports::responses::{
    AttendanceExportRow, CourseRoll, GradeExportRow, MonthlyRate, RollRow, RosterRow,
    SubjectAverage, Transcript, TranscriptRow,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// 保留两位小数，0.005 进位
pub fn round2(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

fn mean(values: impl IntoIterator<Item = Decimal>) -> (Decimal, usize) {
    let (sum, count) = values
        .into_iter()
        .fold((Decimal::ZERO, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        (round2(Decimal::ZERO), 0)
    } else {
        (round2(sum / Decimal::from(count)), count)
    }
}

/// 科目平均分
///
/// 没有成绩的科目平均分为 0，结果按科目名称升序。
pub fn subject_averages(subjects: &[SubjectRef], grades: &[ScoredGrade]) -> Vec<SubjectAverage> {
    let mut by_subject: HashMap<i64, Vec<Decimal>> = HashMap::new();
    for grade in grades {
        by_subject.entry(grade.subject_id).or_default().push(grade.score);
    }

    let mut averages: Vec<SubjectAverage> = subjects
        .iter()
        .map(|subject| {
            let scores = by_subject.get(&subject.id).cloned().unwrap_or_default();
            let (average, grade_count) = mean(scores);
            SubjectAverage {
                subject_id: subject.id,
                subject_name: subject.name.clone(),
                average,
                grade_count,
            }
        })
        .collect();

    averages.sort_by(|a, b| {
        a.subject_name
            .cmp(&b.subject_name)
            .then(a.subject_id.cmp(&b.subject_id))
    });
    averages
}

/// 月度出勤率，按年月升序，标签为 YYYY-MM
pub fn monthly_attendance(marks: &[AttendanceMark]) -> Vec<MonthlyRate> {
    let mut buckets: BTreeMap<(i32, u32), (usize, usize)> = BTreeMap::new();
    for mark in marks {
        let entry = buckets
            .entry((mark.date.year(), mark.date.month()))
            .or_default();
        if mark.status == AttendanceStatus::Present {
            entry.0 += 1;
        }
        entry.1 += 1;
    }

    buckets
        .into_iter()
        .map(|((year, month), (present, total))| MonthlyRate {
            label: format!("{year:04}-{month:02}"),
            present,
            total,
            rate: round2(Decimal::from(present) * Decimal::ONE_HUNDRED / Decimal::from(total)),
        })
        .collect()
}

/// 花名册导出行，无学号时为空串
pub fn roster_rows(students: &[RosterStudent]) -> Vec<RosterRow> {
    students
        .iter()
        .map(|s| RosterRow {
            display_name: s.display_name.clone(),
            student_code: s.student_code.clone().unwrap_or_default(),
            email: s.email.clone(),
        })
        .collect()
}

/// 成绩默认排序：日期降序，同日按 id 降序
fn sort_recent_first(records: &mut [&GradeRecord]) {
    records.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
}

/// 成绩导出行，可按课程与科目进一步过滤
pub fn grade_export_rows(
    records: &[GradeRecord],
    course_id: Option<i64>,
    subject_id: Option<i64>,
) -> Vec<GradeExportRow> {
    let mut selected: Vec<&GradeRecord> = records
        .iter()
        .filter(|r| course_id.is_none_or(|id| r.course_id == id))
        .filter(|r| subject_id.is_none_or(|id| r.subject_id == id))
        .collect();
    sort_recent_first(&mut selected);

    selected
        .into_iter()
        .map(|r| GradeExportRow {
            student_name: r.student_name.clone(),
            subject_name: r.subject_name.clone(),
            course_name: r.course_name.clone(),
            score: r.score,
            kind_label: r.kind.label().to_string(),
            date: r.date.format(DATE_FORMAT).to_string(),
        })
        .collect()
}

/// 考勤导出行，日期区间两端都包含
pub fn attendance_export_rows(
    records: &[AttendanceRecord],
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Vec<AttendanceExportRow> {
    let mut selected: Vec<&AttendanceRecord> = records
        .iter()
        .filter(|r| from.is_none_or(|d| r.date >= d))
        .filter(|r| to.is_none_or(|d| r.date <= d))
        .collect();
    selected.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));

    selected
        .into_iter()
        .map(|r| AttendanceExportRow {
            student_name: r.student_name.clone(),
            subject_name: r.subject_name.clone(),
            date: r.date.format(DATE_FORMAT).to_string(),
            status_label: r.status.label().to_string(),
        })
        .collect()
}

/// 学生成绩单，总平均分覆盖所列全部成绩
pub fn transcript(student: &RosterStudent, username: &str, records: &[GradeRecord]) -> Transcript {
    let mut own: Vec<&GradeRecord> = records
        .iter()
        .filter(|r| r.student_id == student.id)
        .collect();
    sort_recent_first(&mut own);

    let (average, _) = mean(own.iter().map(|r| r.score));
    Transcript {
        student_name: student.display_name.clone(),
        student_code: student.student_code.clone().unwrap_or_default(),
        username: username.to_string(),
        rows: own
            .into_iter()
            .map(|r| TranscriptRow {
                subject_name: r.subject_name.clone(),
                kind_label: r.kind.label().to_string(),
                score: r.score,
                date: r.date.format(DATE_FORMAT).to_string(),
            })
            .collect(),
        average,
    }
}

/// 课程成绩总表，不做聚合
pub fn course_roll(course: &Course, records: &[GradeRecord]) -> CourseRoll {
    let mut in_course: Vec<&GradeRecord> = records
        .iter()
        .filter(|r| r.course_id == course.id)
        .collect();
    sort_recent_first(&mut in_course);

    CourseRoll {
        course_code: course.code.clone(),
        course_name: course.name.clone(),
        academic_period: course.academic_period.clone(),
        rows: in_course
            .into_iter()
            .map(|r| RollRow {
                student_name: r.student_name.clone(),
                subject_name: r.subject_name.clone(),
                score: r.score,
                kind_label: r.kind.label().to_string(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::grades::entities::EvaluationKind;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn subject(id: i64, name: &str) -> SubjectRef {
        SubjectRef {
            id,
            name: name.to_string(),
            course_id: 1,
        }
    }

    fn grade_record(id: i64, student_id: i64, score: &str, d: NaiveDate) -> GradeRecord {
        GradeRecord {
            id,
            student_id,
            student_name: format!("Student {student_id}"),
            subject_id: 1,
            subject_name: "Algebra".into(),
            course_id: 1,
            course_name: "Matematicas".into(),
            score: dec(score),
            kind: EvaluationKind::Quiz,
            date: d,
        }
    }

    #[test]
    fn test_subject_average_and_zero_for_empty() {
        let subjects = [subject(1, "Fisica"), subject(2, "Algebra")];
        let grades = [
            ScoredGrade {
                subject_id: 1,
                score: dec("4.00"),
            },
            ScoredGrade {
                subject_id: 1,
                score: dec("3.00"),
            },
            ScoredGrade {
                subject_id: 1,
                score: dec("5.00"),
            },
        ];
        let averages = subject_averages(&subjects, &grades);
        assert_eq!(averages.len(), 2);
        // 按名称排序
        assert_eq!(averages[0].subject_name, "Algebra");
        assert_eq!(averages[0].average.to_string(), "0.00");
        assert_eq!(averages[0].grade_count, 0);
        assert_eq!(averages[1].average.to_string(), "4.00");
        assert_eq!(averages[1].grade_count, 3);
    }

    #[test]
    fn test_average_rounds_half_up() {
        let subjects = [subject(1, "Quimica")];
        // (3.33 + 3.34) / 2 = 3.335
        let grades = [
            ScoredGrade {
                subject_id: 1,
                score: dec("3.33"),
            },
            ScoredGrade {
                subject_id: 1,
                score: dec("3.34"),
            },
        ];
        assert_eq!(subject_averages(&subjects, &grades)[0].average, dec("3.34"));
    }

    #[test]
    fn test_monthly_attendance_rate() {
        let mut marks = vec![
            AttendanceMark {
                date: date(2024, 3, 1),
                status: AttendanceStatus::Present,
            },
            AttendanceMark {
                date: date(2024, 3, 8),
                status: AttendanceStatus::Present,
            },
            AttendanceMark {
                date: date(2024, 3, 15),
                status: AttendanceStatus::Present,
            },
            AttendanceMark {
                date: date(2024, 3, 22),
                status: AttendanceStatus::Absent,
            },
        ];
        marks.push(AttendanceMark {
            date: date(2024, 2, 2),
            status: AttendanceStatus::Late,
        });
        let rates = monthly_attendance(&marks);
        assert_eq!(rates.len(), 2);
        assert_eq!(rates[0].label, "2024-02");
        assert_eq!(rates[0].rate.to_string(), "0.00");
        assert_eq!(rates[1].label, "2024-03");
        assert_eq!((rates[1].present, rates[1].total), (3, 4));
        assert_eq!(rates[1].rate.to_string(), "75.00");
    }

    #[test]
    fn test_monthly_buckets_are_chronological_across_years() {
        let marks = [
            AttendanceMark {
                date: date(2025, 1, 10),
                status: AttendanceStatus::Present,
            },
            AttendanceMark {
                date: date(2024, 12, 10),
                status: AttendanceStatus::Excused,
            },
        ];
        let labels: Vec<String> = monthly_attendance(&marks)
            .into_iter()
            .map(|m| m.label)
            .collect();
        assert_eq!(labels, vec!["2024-12", "2025-01"]);
    }

    #[test]
    fn test_roster_rows_blank_code_when_missing() {
        let students = [RosterStudent {
            id: 5,
            display_name: "Ana Gomez".into(),
            student_code: None,
            email: "ana@example.com".into(),
        }];
        let rows = roster_rows(&students);
        assert_eq!(rows[0].student_code, "");
        assert_eq!(rows[0].email, "ana@example.com");
    }

    #[test]
    fn test_grade_export_filters() {
        let mut other = grade_record(2, 7, "2.50", date(2024, 4, 1));
        other.course_id = 2;
        other.subject_id = 9;
        let records = [grade_record(1, 7, "4.50", date(2024, 3, 1)), other];

        assert_eq!(grade_export_rows(&records, None, None).len(), 2);
        let only_course = grade_export_rows(&records, Some(1), None);
        assert_eq!(only_course.len(), 1);
        assert_eq!(only_course[0].kind_label, "Quiz");
        assert_eq!(only_course[0].date, "2024-03-01");
        assert_eq!(grade_export_rows(&records, None, Some(9)).len(), 1);
        assert!(grade_export_rows(&records, Some(1), Some(9)).is_empty());
    }

    #[test]
    fn test_attendance_range_is_inclusive() {
        let records: Vec<AttendanceRecord> = [1, 10, 20]
            .into_iter()
            .enumerate()
            .map(|(i, day)| AttendanceRecord {
                id: i as i64,
                student_name: "Ana".into(),
                subject_name: "Algebra".into(),
                date: date(2024, 3, day),
                status: AttendanceStatus::Late,
            })
            .collect();
        let rows = attendance_export_rows(&records, Some(date(2024, 3, 1)), Some(date(2024, 3, 10)));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, "2024-03-10");
        assert_eq!(rows[0].status_label, "Tarde");
        assert_eq!(attendance_export_rows(&records, None, None).len(), 3);
    }

    #[test]
    fn test_transcript_average() {
        let student = RosterStudent {
            id: 7,
            display_name: "Student 7".into(),
            student_code: Some("S-007".into()),
            email: String::new(),
        };
        let records = [
            grade_record(1, 7, "4.50", date(2024, 3, 1)),
            grade_record(2, 8, "1.00", date(2024, 3, 2)),
        ];
        let t = transcript(&student, "s7", &records);
        assert_eq!(t.rows.len(), 1);
        assert_eq!(t.average.to_string(), "4.50");
        assert_eq!(t.student_code, "S-007");

        let empty = transcript(&student, "s7", &[]);
        assert!(empty.rows.is_empty());
        assert_eq!(empty.average.to_string(), "0.00");
    }

    #[test]
    fn test_course_roll_order_most_recent_first() {
        let course = Course {
            id: 1,
            code: "MATH101".into(),
            name: "Matematicas".into(),
            academic_period: "2024-1".into(),
            teacher_id: 3,
        };
        let records = [
            grade_record(1, 7, "3.00", date(2024, 3, 1)),
            grade_record(2, 8, "4.00", date(2024, 3, 5)),
            grade_record(3, 9, "5.00", date(2024, 3, 5)),
        ];
        let roll = course_roll(&course, &records);
        let students: Vec<&str> = roll.rows.iter().map(|r| r.student_name.as_str()).collect();
        assert_eq!(students, vec!["Student 9", "Student 8", "Student 7"]);
        assert_eq!(roll.course_code, "MATH101");
    }
}
