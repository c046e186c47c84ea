//! 选课存储操作

use super::SeaOrmStorage;
use super::scope::enrollment_condition;
use crate::access::Scope;
use crate::entity::enrollments::{ActiveModel, Column, Entity as Enrollments};
use crate::errors::{AcademicError, Result};
use crate::models::{
    PaginatedResponse, PaginationInfo,
    enrollments::{
        entities::Enrollment,
        requests::{CreateEnrollmentRequest, EnrollmentListParams, UpdateEnrollmentRequest},
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    /// 创建选课，未给日期时取当天
    pub async fn create_enrollment_impl(&self, req: CreateEnrollmentRequest) -> Result<Enrollment> {
        let model = ActiveModel {
            student_id: Set(req.student_id),
            course_id: Set(req.course_id),
            enrolled_on: Set(req
                .enrolled_on
                .unwrap_or_else(|| chrono::Utc::now().date_naive())),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| AcademicError::from_db("创建选课失败", e))?;

        Ok(result.into_enrollment())
    }

    pub async fn get_enrollment_by_id_impl(&self, id: i64) -> Result<Option<Enrollment>> {
        let result = Enrollments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询选课失败: {e}")))?;

        Ok(result.map(|m| m.into_enrollment()))
    }

    /// 分页列出可见选课，最近的在前
    pub async fn list_enrollments_with_pagination_impl(
        &self,
        scope: &Scope,
        query: EnrollmentListParams,
    ) -> Result<PaginatedResponse<Enrollment>> {
        let (page, size) = query.pagination.normalized();

        let mut select = Enrollments::find().filter(enrollment_condition(scope));
        if let Some(course_id) = query.course_id {
            select = select.filter(Column::CourseId.eq(course_id));
        }

        let paginator = select
            .order_by_desc(Column::EnrolledOn)
            .order_by_desc(Column::Id)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询选课总数失败: {e}")))?;
        let enrollments = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询选课列表失败: {e}")))?;

        Ok(PaginatedResponse {
            items: enrollments
                .into_iter()
                .map(|m| m.into_enrollment())
                .collect(),
            pagination: PaginationInfo::new(page, size, total),
        })
    }

    pub async fn update_enrollment_impl(
        &self,
        id: i64,
        update: UpdateEnrollmentRequest,
    ) -> Result<Option<Enrollment>> {
        let Some(existing) = Enrollments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询选课失败: {e}")))?
        else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();
        if let Some(student_id) = update.student_id {
            model.student_id = Set(student_id);
        }
        if let Some(course_id) = update.course_id {
            model.course_id = Set(course_id);
        }
        if let Some(enrolled_on) = update.enrolled_on {
            model.enrolled_on = Set(enrolled_on);
        }

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| AcademicError::from_db("更新选课失败", e))?;
        Ok(Some(updated.into_enrollment()))
    }

    pub async fn delete_enrollment_impl(&self, id: i64) -> Result<bool> {
        let result = Enrollments::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| AcademicError::from_db("删除选课失败", e))?;

        Ok(result.rows_affected > 0)
    }

    /// 学生与课程的组合是否已存在，编辑时排除自身
    pub async fn enrollment_exists_impl(
        &self,
        student_id: i64,
        course_id: i64,
        exclude_id: Option<i64>,
    ) -> Result<bool> {
        let mut select = Enrollments::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::CourseId.eq(course_id));
        if let Some(id) = exclude_id {
            select = select.filter(Column::Id.ne(id));
        }
        let count = select
            .count(&self.db)
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询选课失败: {e}")))?;
        Ok(count > 0)
    }
}
