//! 考勤存储操作

use super::SeaOrmStorage;
use super::scope::attendance_condition;
use crate::access::Scope;
use crate::entity::attendances::{ActiveModel, Column, Entity as Attendances};
use crate::errors::{AcademicError, Result};
use crate::models::{
    PaginatedResponse, PaginationInfo,
    attendance::{
        entities::{Attendance, AttendanceStatus},
        requests::{AttendanceListParams, CreateAttendanceRequest, UpdateAttendanceRequest},
    },
    reports::entities::AttendanceMark,
};
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use tracing::warn;

impl SeaOrmStorage {
    pub async fn create_attendance_impl(&self, req: CreateAttendanceRequest) -> Result<Attendance> {
        let model = ActiveModel {
            student_id: Set(req.student_id),
            subject_id: Set(req.subject_id),
            date: Set(req.date.unwrap_or_else(|| chrono::Utc::now().date_naive())),
            status: Set(req.status.to_string()),
            notes: Set(req.notes),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| AcademicError::from_db("创建考勤失败", e))?;

        Ok(result.into_attendance())
    }

    pub async fn get_attendance_by_id_impl(&self, id: i64) -> Result<Option<Attendance>> {
        let result = Attendances::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询考勤失败: {e}")))?;

        Ok(result.map(|m| m.into_attendance()))
    }

    /// 分页列出可见考勤，日期新的在前
    pub async fn list_attendance_with_pagination_impl(
        &self,
        scope: &Scope,
        query: AttendanceListParams,
    ) -> Result<PaginatedResponse<Attendance>> {
        let (page, size) = query.pagination.normalized();

        let mut select = Attendances::find().filter(attendance_condition(scope));
        if let Some(subject_id) = query.subject_id {
            select = select.filter(Column::SubjectId.eq(subject_id));
        }

        let paginator = select
            .order_by_desc(Column::Date)
            .order_by_desc(Column::Id)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询考勤总数失败: {e}")))?;
        let rows = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询考勤列表失败: {e}")))?;

        Ok(PaginatedResponse {
            items: rows.into_iter().map(|m| m.into_attendance()).collect(),
            pagination: PaginationInfo::new(page, size, total),
        })
    }

    pub async fn update_attendance_impl(
        &self,
        id: i64,
        update: UpdateAttendanceRequest,
    ) -> Result<Option<Attendance>> {
        let Some(existing) = Attendances::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询考勤失败: {e}")))?
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
        if let Some(date) = update.date {
            model.date = Set(date);
        }
        if let Some(status) = update.status {
            model.status = Set(status.to_string());
        }
        if let Some(notes) = update.notes {
            model.notes = Set(notes);
        }

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| AcademicError::from_db("更新考勤失败", e))?;
        Ok(Some(updated.into_attendance()))
    }

    pub async fn delete_attendance_impl(&self, id: i64) -> Result<bool> {
        let result = Attendances::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| AcademicError::from_db("删除考勤失败", e))?;

        Ok(result.rows_affected > 0)
    }

    /// 同一学生、科目、日期只能有一条考勤
    pub async fn attendance_exists_impl(
        &self,
        student_id: i64,
        subject_id: i64,
        date: NaiveDate,
        exclude_id: Option<i64>,
    ) -> Result<bool> {
        let mut select = Attendances::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::SubjectId.eq(subject_id))
            .filter(Column::Date.eq(date));
        if let Some(id) = exclude_id {
            select = select.filter(Column::Id.ne(id));
        }
        let count = select
            .count(&self.db)
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询考勤失败: {e}")))?;
        Ok(count > 0)
    }

    /// 月度出勤率只需要日期与状态
    pub async fn list_attendance_marks_impl(&self, scope: &Scope) -> Result<Vec<AttendanceMark>> {
        let rows: Vec<(NaiveDate, String)> = Attendances::find()
            .select_only()
            .column(Column::Date)
            .column(Column::Status)
            .filter(attendance_condition(scope))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询考勤失败: {e}")))?;

        Ok(rows
            .into_iter()
            .filter_map(|(date, status)| match status.parse::<AttendanceStatus>() {
                Ok(status) => Some(AttendanceMark { date, status }),
                Err(e) => {
                    warn!("Skipping attendance with unknown status: {e}");
                    None
                }
            })
            .collect())
    }
}
