// ==========================================
// GEEstor 维护计划 - 分组表仓储 Trait
// ==========================================
// 红线: Repository 不含业务逻辑
// 实现者: DenominationRepositoryImpl（SQLite）
// ==========================================

use crate::domain::{DenominationSort, DenominationTable, MaintenanceDenomination, StoredDenomination};
use crate::repository::error::RepositoryResult;

/// 分页查询参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub sort: DenominationSort,
    pub descending: bool,
    pub limit: usize,
    pub offset: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            sort: DenominationSort::RowNumber,
            descending: false,
            limit: 50,
            offset: 0,
        }
    }
}

pub trait DenominationRepository: Send + Sync {
    /// 新建分组表及其全部行（单事务）
    fn create_table(
        &self,
        table: &DenominationTable,
        rows: &[StoredDenomination],
    ) -> RepositoryResult<()>;

    fn find_table(&self, table_id: &str) -> RepositoryResult<Option<DenominationTable>>;

    /// 按导入时间倒序
    fn list_tables(&self) -> RepositoryResult<Vec<DenominationTable>>;

    /// 全部行（按原始行号）
    fn list_denominations(&self, table_id: &str) -> RepositoryResult<Vec<StoredDenomination>>;

    /// 分页 + 排序；返回 (当前页, 总行数)
    fn page_denominations(
        &self,
        table_id: &str,
        page: PageRequest,
    ) -> RepositoryResult<(Vec<StoredDenomination>, usize)>;

    fn find_denomination(
        &self,
        table_id: &str,
        code: &str,
    ) -> RepositoryResult<Option<StoredDenomination>>;

    /// 更新单行（按 table_id + code 定位）
    fn update_denomination(
        &self,
        table_id: &str,
        denomination: &MaintenanceDenomination,
    ) -> RepositoryResult<()>;

    /// 删除分组表（级联删除行）；返回删除的行数
    fn delete_table(&self, table_id: &str) -> RepositoryResult<usize>;
}
