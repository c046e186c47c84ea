//! 课程存储操作

use super::SeaOrmStorage;
use super::scope::course_condition;
use crate::access::Scope;
use crate::entity::courses::{ActiveModel, Column, Entity as Courses};
use crate::errors::{AcademicError, Result};
use crate::models::{
    PaginatedResponse, PaginationInfo,
    courses::{
        entities::Course,
        requests::{CourseListParams, CreateCourseRequest, UpdateCourseRequest},
    },
};
use crate::utils::contains_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Select, Set,
};

/// 名称或代码包含关键字
fn search_condition(search: Option<&str>) -> Condition {
    match search.map(str::trim).filter(|s| !s.is_empty()) {
        Some(term) => Condition::any()
            .add(Column::Name.like(contains_pattern(term)))
            .add(Column::Code.like(contains_pattern(term))),
        None => Condition::all(),
    }
}

fn scoped(scope: &Scope, search: Option<&str>) -> Select<Courses> {
    Courses::find()
        .filter(course_condition(scope))
        .filter(search_condition(search))
}

impl SeaOrmStorage {
    /// 创建课程
    pub async fn create_course_impl(&self, req: CreateCourseRequest) -> Result<Course> {
        let model = ActiveModel {
            code: Set(req.code),
            name: Set(req.name),
            academic_period: Set(req.academic_period),
            teacher_id: Set(req.teacher_id),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| AcademicError::from_db("创建课程失败", e))?;

        Ok(result.into_course())
    }

    pub async fn get_course_by_id_impl(&self, id: i64) -> Result<Option<Course>> {
        let result = Courses::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询课程失败: {e}")))?;

        Ok(result.map(|m| m.into_course()))
    }

    /// 分页列出可见课程，按代码排序
    pub async fn list_courses_with_pagination_impl(
        &self,
        scope: &Scope,
        query: CourseListParams,
    ) -> Result<PaginatedResponse<Course>> {
        let (page, size) = query.pagination.normalized();

        let paginator = scoped(scope, query.search.as_deref())
            .order_by_asc(Column::Code)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询课程总数失败: {e}")))?;
        let courses = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询课程列表失败: {e}")))?;

        Ok(PaginatedResponse {
            items: courses.into_iter().map(|m| m.into_course()).collect(),
            pagination: PaginationInfo::new(page, size, total),
        })
    }

    pub async fn list_courses_impl(
        &self,
        scope: &Scope,
        search: Option<&str>,
    ) -> Result<Vec<Course>> {
        let courses = scoped(scope, search)
            .order_by_asc(Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询课程列表失败: {e}")))?;

        Ok(courses.into_iter().map(|m| m.into_course()).collect())
    }

    pub async fn update_course_impl(
        &self,
        id: i64,
        update: UpdateCourseRequest,
    ) -> Result<Option<Course>> {
        let Some(existing) = Courses::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询课程失败: {e}")))?
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
        if let Some(period) = update.academic_period {
            model.academic_period = Set(period);
        }
        if let Some(teacher_id) = update.teacher_id {
            model.teacher_id = Set(teacher_id);
        }

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| AcademicError::from_db("更新课程失败", e))?;
        Ok(Some(updated.into_course()))
    }

    /// 删除课程，科目、选课及其成绩考勤级联删除
    pub async fn delete_course_impl(&self, id: i64) -> Result<bool> {
        let result = Courses::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| AcademicError::from_db("删除课程失败", e))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn course_code_taken_impl(&self, code: &str, exclude_id: Option<i64>) -> Result<bool> {
        let mut select = Courses::find().filter(Column::Code.eq(code));
        if let Some(id) = exclude_id {
            select = select.filter(Column::Id.ne(id));
        }
        let count = select
            .count(&self.db)
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询课程代码失败: {e}")))?;
        Ok(count > 0)
    }

    pub async fn count_courses_impl(&self, scope: &Scope) -> Result<u64> {
        scoped(scope, None)
            .count(&self.db)
            .await
            .map_err(|e| AcademicError::database_operation(format!("统计课程数量失败: {e}")))
    }
}
