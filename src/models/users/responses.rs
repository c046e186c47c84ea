use super::entities::{Profile, User};
use crate::models::common::PaginationInfo;
use serde::Serialize;
use ts_rs::TS;

// 用户详情（含档案）
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "user.ts")]
pub struct UserDetailResponse {
    pub user: User,
    pub profile: Option<Profile>,
}

// 用户列表响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "user.ts")]
pub struct UserListResponse {
    pub items: Vec<User>,
    pub pagination: PaginationInfo,
}

// 选择器中的学生条目
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "user.ts")]
pub struct StudentOption {
    pub id: i64,
    pub display_name: String,
    pub student_code: Option<String>,
    pub email: String,
}

// 管理员创建用户的结果
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "user.ts")]
pub struct CreatedUserResponse {
    pub user: User,
    pub profile: Option<Profile>,
}
