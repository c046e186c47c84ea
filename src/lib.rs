//! 学籍记录服务后端
//!
//! 基于 Actix Web 与 SeaORM，按角色管理课程、科目、选课、成绩与考勤。
//!
//! # 架构
//! - `access`: 角色可见范围与读写判定
//! - `aggregation`: 平均分、出勤率与报表行的纯计算
//! - `cache`: 缓存层（Moka）
//! - `config`: 配置管理
//! - `entity`: SeaORM 数据库实体
//! - `errors`: 统一错误处理
//! - `middlewares`: 认证授权与限流中间件
//! - `models`: 数据模型定义
//! - `notify`: 期末成绩邮件通知
//! - `render`: xlsx / csv 表格输出
//! - `routes`: API 路由层
//! - `runtime`: 运行时生命周期管理
//! - `services`: 业务逻辑层
//! - `storage`: 数据存储层（SeaORM）
//! - `utils`: 工具函数

pub mod access;
pub mod aggregation;
pub mod cache;
pub mod config;
pub mod entity;
pub mod errors;
pub mod middlewares;
pub mod models;
pub mod notify;
pub mod render;
pub mod routes;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod utils;
