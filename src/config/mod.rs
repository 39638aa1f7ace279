// ==========================================
// GEEstor 维护计划 - 配置层
// ==========================================
// 职责: 分配器关键字与导入缺省值管理
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod distributor_keywords;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigError, ConfigManager, ConfigResult};
pub use distributor_keywords::{DistributorKeywords, EquipmentKeywords};
