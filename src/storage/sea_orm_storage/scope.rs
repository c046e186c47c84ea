//! 可见范围到 SQL 条件的翻译

use sea_orm::sea_query::SelectStatement;
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QuerySelect, QueryTrait};

use crate::access::Scope;
use crate::entity::{attendances, courses, enrollments, grades, subjects, users};
use crate::models::users::entities::UserRole;

/// 教师负责的课程 id
fn courses_taught_by(teacher_id: i64) -> SelectStatement {
    courses::Entity::find()
        .select_only()
        .column(courses::Column::Id)
        .filter(courses::Column::TeacherId.eq(teacher_id))
        .into_query()
}

/// 学生已选的课程 id
fn courses_enrolled_by(student_id: i64) -> SelectStatement {
    enrollments::Entity::find()
        .select_only()
        .column(enrollments::Column::CourseId)
        .filter(enrollments::Column::StudentId.eq(student_id))
        .into_query()
}

/// 教师负责课程下的科目 id
fn subjects_taught_by(teacher_id: i64) -> SelectStatement {
    subjects::Entity::find()
        .select_only()
        .column(subjects::Column::Id)
        .filter(subjects::Column::CourseId.in_subquery(courses_taught_by(teacher_id)))
        .into_query()
}

/// 学生已选课程下的科目 id
fn subjects_enrolled_by(student_id: i64) -> SelectStatement {
    subjects::Entity::find()
        .select_only()
        .column(subjects::Column::Id)
        .filter(subjects::Column::CourseId.in_subquery(courses_enrolled_by(student_id)))
        .into_query()
}

/// 选了该教师课程的学生 id
fn students_taught_by(teacher_id: i64) -> SelectStatement {
    enrollments::Entity::find()
        .select_only()
        .column(enrollments::Column::StudentId)
        .filter(enrollments::Column::CourseId.in_subquery(courses_taught_by(teacher_id)))
        .into_query()
}

pub(crate) fn course_condition(scope: &Scope) -> Condition {
    match *scope {
        Scope::All => Condition::all(),
        Scope::TaughtBy(teacher_id) => {
            Condition::all().add(courses::Column::TeacherId.eq(teacher_id))
        }
        Scope::EnrolledStudent(student_id) | Scope::OwnedBy(student_id) => Condition::all()
            .add(courses::Column::Id.in_subquery(courses_enrolled_by(student_id))),
    }
}

pub(crate) fn subject_condition(scope: &Scope) -> Condition {
    match *scope {
        Scope::All => Condition::all(),
        Scope::TaughtBy(teacher_id) => Condition::all()
            .add(subjects::Column::CourseId.in_subquery(courses_taught_by(teacher_id))),
        Scope::EnrolledStudent(student_id) | Scope::OwnedBy(student_id) => Condition::all()
            .add(subjects::Column::CourseId.in_subquery(courses_enrolled_by(student_id))),
    }
}

pub(crate) fn enrollment_condition(scope: &Scope) -> Condition {
    match *scope {
        Scope::All => Condition::all(),
        Scope::TaughtBy(teacher_id) => Condition::all()
            .add(enrollments::Column::CourseId.in_subquery(courses_taught_by(teacher_id))),
        Scope::EnrolledStudent(student_id) | Scope::OwnedBy(student_id) => {
            Condition::all().add(enrollments::Column::StudentId.eq(student_id))
        }
    }
}

/// 教师除负责课程外，还能看到自己录入的成绩
pub(crate) fn grade_condition(scope: &Scope) -> Condition {
    match *scope {
        Scope::All => Condition::all(),
        Scope::TaughtBy(teacher_id) => Condition::any()
            .add(grades::Column::SubjectId.in_subquery(subjects_taught_by(teacher_id)))
            .add(grades::Column::CreatedBy.eq(teacher_id)),
        Scope::EnrolledStudent(student_id) => Condition::all()
            .add(grades::Column::SubjectId.in_subquery(subjects_enrolled_by(student_id))),
        Scope::OwnedBy(student_id) => Condition::all().add(grades::Column::StudentId.eq(student_id)),
    }
}

pub(crate) fn attendance_condition(scope: &Scope) -> Condition {
    match *scope {
        Scope::All => Condition::all(),
        Scope::TaughtBy(teacher_id) => Condition::all()
            .add(attendances::Column::SubjectId.in_subquery(subjects_taught_by(teacher_id))),
        Scope::EnrolledStudent(student_id) => Condition::all()
            .add(attendances::Column::SubjectId.in_subquery(subjects_enrolled_by(student_id))),
        Scope::OwnedBy(student_id) => {
            Condition::all().add(attendances::Column::StudentId.eq(student_id))
        }
    }
}

/// 学生名单，只包含学生角色
pub(crate) fn student_condition(scope: &Scope) -> Condition {
    let students = Condition::all().add(users::Column::Role.eq(UserRole::STUDENT));
    match *scope {
        Scope::All => students,
        Scope::TaughtBy(teacher_id) => {
            students.add(users::Column::Id.in_subquery(students_taught_by(teacher_id)))
        }
        Scope::EnrolledStudent(student_id) | Scope::OwnedBy(student_id) => {
            students.add(users::Column::Id.eq(student_id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    fn sql(condition: Condition) -> String {
        courses::Entity::find()
            .filter(condition)
            .build(DbBackend::Sqlite)
            .to_string()
    }

    #[test]
    fn test_all_scope_adds_no_filter() {
        let text = sql(course_condition(&Scope::All));
        assert!(!text.contains(" = "));
        assert!(!text.contains("IN (SELECT"));
    }

    #[test]
    fn test_teacher_scope_filters_by_teacher() {
        let text = sql(course_condition(&Scope::TaughtBy(7)));
        assert!(text.contains(r#""courses"."teacher_id" = 7"#));
    }

    #[test]
    fn test_student_scope_uses_enrollment_subquery() {
        let text = sql(course_condition(&Scope::EnrolledStudent(9)));
        assert!(text.contains("IN (SELECT"));
        assert!(text.contains(r#""enrollments"."student_id" = 9"#));
    }
}
