// ==========================================
// GEEstor 维护计划 - 引擎层
// ==========================================
// 职责: 月度工时分配规则 + 计划生成
// 红线: 引擎不访问数据库，不做 I/O
// ==========================================

pub mod distributor;
pub mod maintenance_plan;

// 重导出核心引擎
pub use distributor::{
    distribute, round2, standard_rules, Allocation, DistributionRule, FrequencyMatcher,
    MonthlyHourDistributor, PlacementRule,
};
pub use maintenance_plan::MaintenancePlanBuilder;
