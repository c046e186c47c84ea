use serde::Serialize;
use ts_rs::TS;

use crate::models::reports::responses::ChartSeries;
use crate::models::users::entities::UserRole;

// 可见范围内的实体数量
#[derive(Debug, Clone, Default, Serialize, TS)]
#[ts(export, export_to = "dashboard.ts")]
pub struct DashboardCounts {
    pub students: u64,
    pub courses: u64,
    pub subjects: u64,
}

// 角色仪表盘
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "dashboard.ts")]
pub struct DashboardResponse {
    pub role: UserRole,
    pub counts: DashboardCounts,
    pub subject_averages: ChartSeries,
    pub attendance_rates: ChartSeries,
}
