// ==========================================
// GEEstor 维护计划 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供命令行调用
// ==========================================

pub mod config_api;
pub mod error;
pub mod maintenance_plan_api;

// 重导出核心类型
pub use config_api::ConfigApi;
pub use error::{ApiError, ApiResult};
pub use maintenance_plan_api::{
    current_year, ConvertResponse, DistributionPreview, ExportResponse, MaintenancePlanApi,
    TablePage, MAX_PAGE_LIMIT,
};
