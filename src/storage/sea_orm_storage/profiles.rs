//! 教师与学生档案

use super::SeaOrmStorage;
use crate::entity::student_profiles::{
    ActiveModel as StudentActiveModel, Column as StudentColumn, Entity as StudentProfiles,
};
use crate::entity::teacher_profiles::{
    ActiveModel as TeacherActiveModel, Column as TeacherColumn, Entity as TeacherProfiles,
};
use crate::errors::{AcademicError, Result};
use crate::models::users::{
    entities::{Profile, StudentProfile, TeacherProfile, User, UserRole},
    requests::{UpdateStudentProfileRequest, UpdateTeacherProfileRequest},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};

impl SeaOrmStorage {
    /// 按角色读取档案，管理员没有档案
    pub async fn get_profile_impl(&self, user: &User) -> Result<Option<Profile>> {
        match user.role {
            UserRole::Teacher => Ok(self
                .find_teacher_profile(user.id)
                .await?
                .map(Profile::Teacher)),
            UserRole::Student => Ok(self
                .find_student_profile(user.id)
                .await?
                .map(Profile::Student)),
            UserRole::Admin => Ok(None),
        }
    }

    async fn find_teacher_profile(&self, user_id: i64) -> Result<Option<TeacherProfile>> {
        let model = TeacherProfiles::find()
            .filter(TeacherColumn::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询教师档案失败: {e}")))?;
        Ok(model.map(|m| m.into_profile()))
    }

    async fn find_student_profile(&self, user_id: i64) -> Result<Option<StudentProfile>> {
        let model = StudentProfiles::find()
            .filter(StudentColumn::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询学生档案失败: {e}")))?;
        Ok(model.map(|m| m.into_profile()))
    }

    pub async fn update_student_profile_impl(
        &self,
        user_id: i64,
        update: UpdateStudentProfileRequest,
    ) -> Result<Option<StudentProfile>> {
        let Some(existing) = StudentProfiles::find()
            .filter(StudentColumn::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询学生档案失败: {e}")))?
        else {
            return Ok(None);
        };

        let mut model: StudentActiveModel = existing.into();
        if let Some(code) = update.student_code {
            model.student_code = Set(code);
        }
        if let Some(program) = update.program {
            model.program = Set(program);
        }
        if update.birth_date.is_some() {
            model.birth_date = Set(update.birth_date);
        }

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| AcademicError::from_db("更新学生档案失败", e))?;
        Ok(Some(updated.into_profile()))
    }

    pub async fn update_teacher_profile_impl(
        &self,
        user_id: i64,
        update: UpdateTeacherProfileRequest,
    ) -> Result<Option<TeacherProfile>> {
        let Some(existing) = TeacherProfiles::find()
            .filter(TeacherColumn::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询教师档案失败: {e}")))?
        else {
            return Ok(None);
        };

        let mut model: TeacherActiveModel = existing.into();
        if let Some(speciality) = update.speciality {
            model.speciality = Set(speciality);
        }
        if let Some(phone) = update.phone {
            model.phone = Set(phone);
        }

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| AcademicError::from_db("更新教师档案失败", e))?;
        Ok(Some(updated.into_profile()))
    }

    pub async fn student_code_taken_impl(
        &self,
        code: &str,
        exclude_user_id: Option<i64>,
    ) -> Result<bool> {
        let mut select = StudentProfiles::find().filter(StudentColumn::StudentCode.eq(code));
        if let Some(user_id) = exclude_user_id {
            select = select.filter(StudentColumn::UserId.ne(user_id));
        }
        let count = select
            .count(&self.db)
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询学号失败: {e}")))?;
        Ok(count > 0)
    }
}
