//! 科目存储操作

use super::SeaOrmStorage;
use super::scope::subject_condition;
use crate::access::Scope;
use crate::entity::courses;
use crate::entity::subjects::{ActiveModel, Column, Entity as Subjects};
use crate::errors::{AcademicError, Result};
use crate::models::{
    PaginatedResponse, PaginationInfo,
    reports::entities::SubjectRef,
    subjects::{
        entities::Subject,
        requests::{CreateSubjectRequest, SubjectListParams, UpdateSubjectRequest},
    },
};
use crate::utils::contains_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, QueryTrait, Set,
};

impl SeaOrmStorage {
    pub async fn create_subject_impl(&self, req: CreateSubjectRequest) -> Result<Subject> {
        let model = ActiveModel {
            code: Set(req.code),
            name: Set(req.name),
            course_id: Set(req.course_id),
            weekly_hours: Set(req.weekly_hours),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| AcademicError::from_db("创建科目失败", e))?;

        Ok(result.into_subject())
    }

    pub async fn get_subject_by_id_impl(&self, id: i64) -> Result<Option<Subject>> {
        let result = Subjects::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询科目失败: {e}")))?;

        Ok(result.map(|m| m.into_subject()))
    }

    /// 分页列出可见科目，按名称排序
    pub async fn list_subjects_with_pagination_impl(
        &self,
        scope: &Scope,
        query: SubjectListParams,
    ) -> Result<PaginatedResponse<Subject>> {
        let (page, size) = query.pagination.normalized();

        let mut select = Subjects::find().filter(subject_condition(scope));

        if let Some(course_id) = query.course_id {
            select = select.filter(Column::CourseId.eq(course_id));
        }

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let term = search.trim();
            select = select.filter(
                Condition::any()
                    .add(Column::Name.like(contains_pattern(term)))
                    .add(Column::Code.like(contains_pattern(term))),
            );
        }

        let paginator = select
            .order_by_asc(Column::Name)
            .order_by_asc(Column::Id)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询科目总数失败: {e}")))?;
        let subjects = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询科目列表失败: {e}")))?;

        Ok(PaginatedResponse {
            items: subjects.into_iter().map(|m| m.into_subject()).collect(),
            pagination: PaginationInfo::new(page, size, total),
        })
    }

    pub async fn update_subject_impl(
        &self,
        id: i64,
        update: UpdateSubjectRequest,
    ) -> Result<Option<Subject>> {
        let Some(existing) = Subjects::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询科目失败: {e}")))?
        else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();
        if let Some(code) = update.code {
            model.code = Set(code);
        }
        if let Some(name) = update.name {
            model.name = Set(name);
        }
        if let Some(course_id) = update.course_id {
            model.course_id = Set(course_id);
        }
        if let Some(hours) = update.weekly_hours {
            model.weekly_hours = Set(hours);
        }

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| AcademicError::from_db("更新科目失败", e))?;
        Ok(Some(updated.into_subject()))
    }

    pub async fn delete_subject_impl(&self, id: i64) -> Result<bool> {
        let result = Subjects::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| AcademicError::from_db("删除科目失败", e))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn subject_code_taken_impl(
        &self,
        code: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool> {
        let mut select = Subjects::find().filter(Column::Code.eq(code));
        if let Some(id) = exclude_id {
            select = select.filter(Column::Id.ne(id));
        }
        let count = select
            .count(&self.db)
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询科目代码失败: {e}")))?;
        Ok(count > 0)
    }

    pub async fn count_subjects_impl(&self, scope: &Scope) -> Result<u64> {
        Subjects::find()
            .filter(subject_condition(scope))
            .count(&self.db)
            .await
            .map_err(|e| AcademicError::database_operation(format!("统计科目数量失败: {e}")))
    }

    /// 平均分面板使用的科目，学期按包含关系匹配
    pub async fn list_subject_refs_impl(
        &self,
        scope: &Scope,
        course_id: Option<i64>,
        period: Option<&str>,
    ) -> Result<Vec<SubjectRef>> {
        let mut select = Subjects::find().filter(subject_condition(scope));

        if let Some(course_id) = course_id {
            select = select.filter(Column::CourseId.eq(course_id));
        }

        if let Some(period) = period.map(str::trim).filter(|p| !p.is_empty()) {
            let in_period = courses::Entity::find()
                .select_only()
                .column(courses::Column::Id)
                .filter(courses::Column::AcademicPeriod.like(contains_pattern(period)))
                .into_query();
            select = select.filter(Column::CourseId.in_subquery(in_period));
        }

        let subjects = select
            .order_by_asc(Column::Name)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询科目列表失败: {e}")))?;

        Ok(subjects
            .into_iter()
            .map(|m| SubjectRef {
                id: m.id,
                name: m.name,
                course_id: m.course_id,
            })
            .collect())
    }
}
