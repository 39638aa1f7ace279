// ==========================================
// GEEstor 维护计划 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod denomination;
pub mod plan;
pub mod text;
pub mod types;

// 重导出核心类型
pub use denomination::{
    DenominationPatch, DenominationSort, DenominationTable, DqSummary, DqViolation, ImportReport,
    MaintenanceDenomination, RawDenominationRecord, StoredDenomination, DEFAULT_HOURS_PER_EVENT,
};
pub use plan::{MaintenancePlan, MaintenancePlanRow, MonthlyDistribution};
pub use types::{DqLevel, FrequencyCategory, Month, MONTHS_PER_YEAR};
