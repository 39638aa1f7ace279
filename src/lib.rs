// ==========================================
// GEEstor 维护计划 - 核心库
// ==========================================
// 职责: 设备分组表导入 → 年度维护工时按月分配 → 计划 CSV 导出
// 技术栈: Rust + SQLite
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 月度分配与计划生成
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 导出层 - 计划 CSV
pub mod exporter;

// 配置层 - 分配器关键字与缺省值
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 命令行
pub mod cli;

// ==========================================
// 重导出核心类型
// ==========================================

pub use domain::{
    DenominationTable, FrequencyCategory, MaintenanceDenomination, MaintenancePlan, Month,
    MonthlyDistribution,
};
pub use engine::{distribute, MaintenancePlanBuilder, MonthlyHourDistributor};
pub use api::{ConfigApi, MaintenancePlanApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "GEEstor 维护计划";
