//! 用户存储操作

use super::SeaOrmStorage;
use crate::entity::student_profiles::ActiveModel as StudentProfileActiveModel;
use crate::entity::teacher_profiles::ActiveModel as TeacherProfileActiveModel;
use crate::entity::users::{ActiveModel, Column, Entity as Users};
use crate::errors::{AcademicError, Result};
use crate::models::{
    PaginationInfo,
    users::{
        entities::{Profile, User, UserRole},
        requests::{CreateUserRequest, UpdateUserRequest, UserListParams},
        responses::UserListResponse,
    },
};
use crate::utils::contains_pattern;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};

/// 新建学生档案的临时学号前缀
const AUTO_CODE_PREFIX: &str = "AUTO-";
/// 新建学生档案的默认专业
const PENDING_PROGRAM: &str = "Pendiente";

impl SeaOrmStorage {
    /// 创建用户，并在同一事务中创建对应角色的档案
    pub async fn create_user_impl(
        &self,
        req: CreateUserRequest,
        password_hash: String,
    ) -> Result<(User, Option<Profile>)> {
        let now = chrono::Utc::now().timestamp();
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AcademicError::from_db("开启事务失败", e))?;

        let user = ActiveModel {
            username: Set(req.username),
            email: Set(req.email),
            password_hash: Set(password_hash),
            first_name: Set(req.first_name),
            last_name: Set(req.last_name),
            role: Set(req.role.to_string()),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| AcademicError::from_db("创建用户失败", e))?;

        let profile = match req.role {
            UserRole::Teacher => {
                let model = TeacherProfileActiveModel {
                    user_id: Set(user.id),
                    speciality: Set(String::new()),
                    phone: Set(String::new()),
                    ..Default::default()
                }
                .insert(&txn)
                .await
                .map_err(|e| AcademicError::from_db("创建教师档案失败", e))?;
                Some(Profile::Teacher(model.into_profile()))
            }
            UserRole::Student => {
                let model = StudentProfileActiveModel {
                    user_id: Set(user.id),
                    student_code: Set(format!("{AUTO_CODE_PREFIX}{}", user.id)),
                    program: Set(PENDING_PROGRAM.to_string()),
                    birth_date: Set(None),
                    ..Default::default()
                }
                .insert(&txn)
                .await
                .map_err(|e| AcademicError::from_db("创建学生档案失败", e))?;
                Some(Profile::Student(model.into_profile()))
            }
            UserRole::Admin => None,
        };

        txn.commit()
            .await
            .map_err(|e| AcademicError::from_db("提交事务失败", e))?;

        Ok((user.into_user(), profile))
    }

    /// 通过 ID 获取用户
    pub async fn get_user_by_id_impl(&self, id: i64) -> Result<Option<User>> {
        let result = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 通过用户名或邮箱获取用户
    pub async fn get_user_by_username_or_email_impl(
        &self,
        identifier: &str,
    ) -> Result<Option<User>> {
        let result = Users::find()
            .filter(
                Condition::any()
                    .add(Column::Username.eq(identifier))
                    .add(Column::Email.eq(identifier)),
            )
            .order_by_asc(Column::Id)
            .one(&self.db)
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    pub async fn username_taken_impl(&self, username: &str) -> Result<bool> {
        let count = Users::find()
            .filter(Column::Username.eq(username))
            .count(&self.db)
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询用户名失败: {e}")))?;

        Ok(count > 0)
    }

    /// 分页列出用户，按用户名排序
    pub async fn list_users_with_pagination_impl(
        &self,
        query: UserListParams,
    ) -> Result<UserListResponse> {
        let (page, size) = query.pagination.normalized();

        let mut select = Users::find();

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let pattern = search.trim();
            select = select.filter(
                Condition::any()
                    .add(Column::Username.like(contains_pattern(pattern)))
                    .add(Column::Email.like(contains_pattern(pattern)))
                    .add(Column::FirstName.like(contains_pattern(pattern)))
                    .add(Column::LastName.like(contains_pattern(pattern))),
            );
        }

        if let Some(role) = query.role {
            select = select.filter(Column::Role.eq(role.to_string()));
        }

        let paginator = select
            .order_by_asc(Column::Username)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询用户总数失败: {e}")))?;

        let users = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| AcademicError::database_operation(format!("查询用户列表失败: {e}")))?;

        Ok(UserListResponse {
            items: users.into_iter().map(|m| m.into_user()).collect(),
            pagination: PaginationInfo::new(page, size, total),
        })
    }

    /// 更新用户信息
    pub async fn update_user_impl(
        &self,
        id: i64,
        update: UpdateUserRequest,
    ) -> Result<Option<User>> {
        if self.get_user_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(email) = update.email {
            model.email = Set(email);
        }
        if let Some(first_name) = update.first_name {
            model.first_name = Set(first_name);
        }
        if let Some(last_name) = update.last_name {
            model.last_name = Set(last_name);
        }
        if let Some(role) = update.role {
            model.role = Set(role.to_string());
        }
        if let Some(is_active) = update.is_active {
            model.is_active = Set(is_active);
        }

        model
            .update(&self.db)
            .await
            .map_err(|e| AcademicError::from_db("更新用户失败", e))?;

        self.get_user_by_id_impl(id).await
    }

    pub async fn update_user_password_impl(&self, id: i64, password_hash: String) -> Result<bool> {
        let result = Users::update_many()
            .col_expr(Column::PasswordHash, Expr::value(password_hash))
            .col_expr(Column::UpdatedAt, Expr::value(chrono::Utc::now().timestamp()))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| AcademicError::database_operation(format!("更新密码失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 更新用户最后登录时间
    pub async fn update_last_login_impl(&self, id: i64) -> Result<bool> {
        let result = Users::update_many()
            .col_expr(Column::LastLogin, Expr::value(chrono::Utc::now().timestamp()))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| AcademicError::database_operation(format!("更新最后登录时间失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 删除用户；仍负责课程的教师不可删除
    pub async fn delete_user_impl(&self, id: i64) -> Result<bool> {
        let result = Users::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| AcademicError::from_db("删除用户失败", e))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count_users_impl(&self) -> Result<u64> {
        Users::find()
            .count(&self.db)
            .await
            .map_err(|e| AcademicError::database_operation(format!("统计用户数量失败: {e}")))
    }
}
