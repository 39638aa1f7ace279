// ==========================================
// GEEstor 维护计划 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod denomination_repo;
pub mod denomination_repo_impl;
pub mod error;

// 重导出核心仓储
pub use denomination_repo::{DenominationRepository, PageRequest};
pub use denomination_repo_impl::DenominationRepositoryImpl;
pub use error::{RepositoryError, RepositoryResult};
