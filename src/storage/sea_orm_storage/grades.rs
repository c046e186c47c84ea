//! 成绩存储操作

use super::SeaOrmStorage;
use super::scope::grade_condition;
use crate::access::Scope;
use crate::entity::grades::{ActiveModel, Column, Entity as Grades};
use crate::errors::{AcademicError, Result};
use crate::models::{
    PaginatedResponse, PaginationInfo,
    grades::{
        entities::{Grade, score_from_cents, score_to_cents},
        requests::{CreateGradeRequest, GradeListParams, UpdateGradeRequest},
    },
    reports::entities::ScoredGrade,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

impl SeaOrmStorage {
    /// 创建成绩，未给日期时取当天
    pub async fn create_grade_impl(
        &self,
        req: CreateGradeRequest,
        created_by: Option<i64>,
    ) -> Result<Grade> {
        let model = ActiveModel {
            student_id: Set(req.student_id),
            subject_id: Set(req.subject_id),
            score_cents: Set(score_to_cents(req.score)),
            kind: Set(req.kind.to_string()),
            date: Set(req.date.unwrap_or_else(|| chrono::Utc::now().date_naive())),
            notes: Set(req.notes),
            created_by: Set(created_by),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| AcademicError::from_db("创建成绩失败", e))?;

        Ok(result.into_grade())
    }

    pub async fn get_grade_by_id_impl(&self, id: i64) -> Result<Option<Grade>> {
        let result = Grades::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询成绩失败: {e}")))?;

        Ok(result.map(|m| m.into_grade()))
    }

    /// 分页列出可见成绩，日期新的在前
    pub async fn list_grades_with_pagination_impl(
        &self,
        scope: &Scope,
        query: GradeListParams,
    ) -> Result<PaginatedResponse<Grade>> {
        let (page, size) = query.pagination.normalized();

        let mut select = Grades::find().filter(grade_condition(scope));
        if let Some(subject_id) = query.subject_id {
            select = select.filter(Column::SubjectId.eq(subject_id));
        }
        if let Some(student_id) = query.student_id {
            select = select.filter(Column::StudentId.eq(student_id));
        }

        let paginator = select
            .order_by_desc(Column::Date)
            .order_by_desc(Column::Id)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询成绩总数失败: {e}")))?;
        let grades = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询成绩列表失败: {e}")))?;

        Ok(PaginatedResponse {
            items: grades.into_iter().map(|m| m.into_grade()).collect(),
            pagination: PaginationInfo::new(page, size, total),
        })
    }

    pub async fn update_grade_impl(
        &self,
        id: i64,
        update: UpdateGradeRequest,
    ) -> Result<Option<Grade>> {
        let Some(existing) = Grades::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询成绩失败: {e}")))?
        else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();
        if let Some(student_id) = update.student_id {
            model.student_id = Set(student_id);
        }
        if let Some(subject_id) = update.subject_id {
            model.subject_id = Set(subject_id);
        }
        if let Some(score) = update.score {
            model.score_cents = Set(score_to_cents(score));
        }
        if let Some(kind) = update.kind {
            model.kind = Set(kind.to_string());
        }
        if let Some(date) = update.date {
            model.date = Set(date);
        }
        if let Some(notes) = update.notes {
            model.notes = Set(notes);
        }

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| AcademicError::from_db("更新成绩失败", e))?;
        Ok(Some(updated.into_grade()))
    }

    pub async fn delete_grade_impl(&self, id: i64) -> Result<bool> {
        let result = Grades::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| AcademicError::from_db("删除成绩失败", e))?;

        Ok(result.rows_affected > 0)
    }

    /// 平均分计算只需要科目与分数
    pub async fn list_scored_grades_impl(&self, scope: &Scope) -> Result<Vec<ScoredGrade>> {
        let rows: Vec<(i64, i32)> = Grades::find()
            .select_only()
            .column(Column::SubjectId)
            .column(Column::ScoreCents)
            .filter(grade_condition(scope))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询成绩失败: {e}")))?;

        Ok(rows
            .into_iter()
            .map(|(subject_id, cents)| ScoredGrade {
                subject_id,
                score: score_from_cents(cents),
            })
            .collect())
    }
}
