//! 学生名单与报表用的关联记录
//!
//! 先按范围取出成绩或考勤，再批量加载学生、科目、课程，在内存中拼接名称。

use std::collections::HashMap;

use super::SeaOrmStorage;
use super::scope::{attendance_condition, grade_condition, student_condition};
use crate::access::Scope;
use crate::entity::{attendances, courses, enrollments, grades, student_profiles, subjects, users};
use crate::errors::{AcademicError, Result};
use crate::models::{
    attendance::entities::AttendanceStatus,
    grades::entities::{EvaluationKind, score_from_cents},
    reports::entities::{AttendanceRecord, GradeRecord, RosterStudent},
    users::{entities::UserRole, responses::StudentOption},
};
use crate::utils::contains_pattern;
use chrono::NaiveDate;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    QueryTrait,
};
use tracing::warn;

impl SeaOrmStorage {
    async fn load_users(&self, ids: Vec<i64>) -> Result<HashMap<i64, users::Model>> {
        let rows = users::Entity::find()
            .filter(users::Column::Id.is_in(ids))
            .all(&self.db)
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询用户失败: {e}")))?;
        Ok(rows.into_iter().map(|m| (m.id, m)).collect())
    }

    async fn load_student_codes(&self, user_ids: Vec<i64>) -> Result<HashMap<i64, String>> {
        let rows = student_profiles::Entity::find()
            .filter(student_profiles::Column::UserId.is_in(user_ids))
            .all(&self.db)
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询学生档案失败: {e}")))?;
        Ok(rows.into_iter().map(|m| (m.user_id, m.student_code)).collect())
    }

    async fn load_subjects(&self, ids: Vec<i64>) -> Result<HashMap<i64, subjects::Model>> {
        let rows = subjects::Entity::find()
            .filter(subjects::Column::Id.is_in(ids))
            .all(&self.db)
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询科目失败: {e}")))?;
        Ok(rows.into_iter().map(|m| (m.id, m)).collect())
    }

    async fn load_course_names(&self, ids: Vec<i64>) -> Result<HashMap<i64, String>> {
        let rows = courses::Entity::find()
            .filter(courses::Column::Id.is_in(ids))
            .all(&self.db)
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询课程失败: {e}")))?;
        Ok(rows.into_iter().map(|m| (m.id, m.name)).collect())
    }

    async fn roster_from_users(&self, rows: Vec<users::Model>) -> Result<Vec<RosterStudent>> {
        let codes = self
            .load_student_codes(rows.iter().map(|u| u.id).collect())
            .await?;
        Ok(rows
            .into_iter()
            .map(|u| RosterStudent {
                id: u.id,
                display_name: u.display_name(),
                student_code: codes.get(&u.id).cloned(),
                email: u.email,
            })
            .collect())
    }

    /// 范围内的学生，可按用户名、姓名或学号搜索
    pub async fn list_students_impl(
        &self,
        scope: &Scope,
        search: Option<&str>,
    ) -> Result<Vec<StudentOption>> {
        let mut select = users::Entity::find().filter(student_condition(scope));

        if let Some(term) = search.map(str::trim).filter(|s| !s.is_empty()) {
            let by_code = student_profiles::Entity::find()
                .select_only()
                .column(student_profiles::Column::UserId)
                .filter(student_profiles::Column::StudentCode.like(contains_pattern(term)))
                .into_query();
            select = select.filter(
                Condition::any()
                    .add(users::Column::Username.like(contains_pattern(term)))
                    .add(users::Column::FirstName.like(contains_pattern(term)))
                    .add(users::Column::LastName.like(contains_pattern(term)))
                    .add(users::Column::Id.in_subquery(by_code)),
            );
        }

        let rows = select
            .order_by_asc(users::Column::LastName)
            .order_by_asc(users::Column::FirstName)
            .order_by_asc(users::Column::Username)
            .all(&self.db)
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询学生列表失败: {e}")))?;

        Ok(self
            .roster_from_users(rows)
            .await?
            .into_iter()
            .map(|s| StudentOption {
                id: s.id,
                display_name: s.display_name,
                student_code: s.student_code,
                email: s.email,
            })
            .collect())
    }

    pub async fn count_students_impl(&self, scope: &Scope) -> Result<u64> {
        users::Entity::find()
            .filter(student_condition(scope))
            .count(&self.db)
            .await
            .map_err(|e| AcademicError::database_operation(format!("统计学生数量失败: {e}")))
    }

    /// 学生所选课程的负责教师 id
    pub async fn student_course_teachers_impl(&self, student_id: i64) -> Result<Vec<i64>> {
        let enrolled = enrollments::Entity::find()
            .select_only()
            .column(enrollments::Column::CourseId)
            .filter(enrollments::Column::StudentId.eq(student_id))
            .into_query();

        courses::Entity::find()
            .select_only()
            .column(courses::Column::TeacherId)
            .distinct()
            .filter(courses::Column::Id.in_subquery(enrolled))
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询课程教师失败: {e}")))
    }

    /// 只返回学生角色的用户
    pub async fn get_roster_student_impl(&self, student_id: i64) -> Result<Option<RosterStudent>> {
        let Some(user) = users::Entity::find_by_id(student_id)
            .filter(users::Column::Role.eq(UserRole::STUDENT))
            .one(&self.db)
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询学生失败: {e}")))?
        else {
            return Ok(None);
        };

        Ok(self.roster_from_users(vec![user]).await?.pop())
    }

    /// 课程的选课学生，按姓氏排序
    pub async fn list_course_roster_impl(&self, course_id: i64) -> Result<Vec<RosterStudent>> {
        let enrolled = enrollments::Entity::find()
            .select_only()
            .column(enrollments::Column::StudentId)
            .filter(enrollments::Column::CourseId.eq(course_id))
            .into_query();

        let rows = users::Entity::find()
            .filter(users::Column::Id.in_subquery(enrolled))
            .order_by_asc(users::Column::LastName)
            .order_by_asc(users::Column::FirstName)
            .order_by_asc(users::Column::Username)
            .all(&self.db)
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询课程学生失败: {e}")))?;

        self.roster_from_users(rows).await
    }

    /// 范围内成绩及其学生、科目、课程名称
    pub async fn list_grade_records_impl(
        &self,
        scope: &Scope,
        student_id: Option<i64>,
        course_id: Option<i64>,
    ) -> Result<Vec<GradeRecord>> {
        let mut select = grades::Entity::find().filter(grade_condition(scope));
        if let Some(student_id) = student_id {
            select = select.filter(grades::Column::StudentId.eq(student_id));
        }
        if let Some(course_id) = course_id {
            let in_course = subjects::Entity::find()
                .select_only()
                .column(subjects::Column::Id)
                .filter(subjects::Column::CourseId.eq(course_id))
                .into_query();
            select = select.filter(grades::Column::SubjectId.in_subquery(in_course));
        }

        let rows = select
            .order_by_desc(grades::Column::Date)
            .order_by_desc(grades::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询成绩失败: {e}")))?;

        let students = self
            .load_users(rows.iter().map(|g| g.student_id).collect())
            .await?;
        let subjects = self
            .load_subjects(rows.iter().map(|g| g.subject_id).collect())
            .await?;
        let courses = self
            .load_course_names(subjects.values().map(|s| s.course_id).collect())
            .await?;

        let mut records = Vec::with_capacity(rows.len());
        for g in rows {
            let (Some(student), Some(subject)) =
                (students.get(&g.student_id), subjects.get(&g.subject_id))
            else {
                continue;
            };
            let kind = match g.kind.parse::<EvaluationKind>() {
                Ok(kind) => kind,
                Err(e) => {
                    warn!("Skipping grade {} with unknown kind: {e}", g.id);
                    continue;
                }
            };
            records.push(GradeRecord {
                id: g.id,
                student_id: g.student_id,
                student_name: student.display_name(),
                subject_id: g.subject_id,
                subject_name: subject.name.clone(),
                course_id: subject.course_id,
                course_name: courses.get(&subject.course_id).cloned().unwrap_or_default(),
                score: score_from_cents(g.score_cents),
                kind,
                date: g.date,
            });
        }
        Ok(records)
    }

    /// 范围内考勤及其学生、科目名称，日期区间包含两端
    pub async fn list_attendance_records_impl(
        &self,
        scope: &Scope,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<AttendanceRecord>> {
        let mut select = attendances::Entity::find().filter(attendance_condition(scope));
        if let Some(from) = from {
            select = select.filter(attendances::Column::Date.gte(from));
        }
        if let Some(to) = to {
            select = select.filter(attendances::Column::Date.lte(to));
        }

        let rows = select
            .order_by_desc(attendances::Column::Date)
            .order_by_desc(attendances::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询考勤失败: {e}")))?;

        let students = self
            .load_users(rows.iter().map(|a| a.student_id).collect())
            .await?;
        let subjects = self
            .load_subjects(rows.iter().map(|a| a.subject_id).collect())
            .await?;

        let mut records = Vec::with_capacity(rows.len());
        for a in rows {
            let (Some(student), Some(subject)) =
                (students.get(&a.student_id), subjects.get(&a.subject_id))
            else {
                continue;
            };
            let Ok(status) = a.status.parse::<AttendanceStatus>() else {
                warn!("Skipping attendance {} with unknown status", a.id);
                continue;
            };
            records.push(AttendanceRecord {
                id: a.id,
                student_name: student.display_name(),
                subject_name: subject.name.clone(),
                date: a.date,
                status,
            });
        }
        Ok(records)
    }
}
