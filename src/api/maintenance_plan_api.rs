// ==========================================
// GEEstor 维护计划 - 维护计划 API
// ==========================================
// 职责: 分组表导入、浏览、编辑，维护计划预览与导出
// 流程: 导入文件 → 分组表（可编辑） → 年度计划 → CSV
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::db::open_and_migrate;
use crate::domain::{
    DenominationPatch, DenominationTable, DqSummary, DqViolation, FrequencyCategory,
    ImportReport, MaintenancePlan, MonthlyDistribution, StoredDenomination,
};
use crate::engine::{MaintenancePlanBuilder, MonthlyHourDistributor};
use crate::exporter::PlanCsvWriter;
use crate::importer::{DenominationImporter, DenominationLoader};
use crate::repository::{DenominationRepository, DenominationRepositoryImpl, PageRequest};
use chrono::{Datelike, Local};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{info, instrument};

/// 单页最大行数
pub const MAX_PAGE_LIMIT: usize = 1000;

/// 分组表分页响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TablePage {
    pub table: DenominationTable,
    pub rows: Vec<StoredDenomination>,
    /// 总记录数
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

/// 计划导出响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportResponse {
    pub file_path: PathBuf,
    pub year: i32,
    pub row_count: usize,
    pub total_hours: f64,
}

/// 一次性转换（文件 → CSV，不落库）响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertResponse {
    pub summary: DqSummary,
    pub violations: Vec<DqViolation>,
    pub export: ExportResponse,
}

/// 单行分配预览
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionPreview {
    pub category: FrequencyCategory,
    pub total_hours: f64,
    pub months: MonthlyDistribution,
}

/// 当前年份（本地时区）
pub fn current_year() -> i32 {
    Local::now().year()
}

// ==========================================
// MaintenancePlanApi
// ==========================================
pub struct MaintenancePlanApi {
    conn: Arc<Mutex<Connection>>,
    repo: DenominationRepositoryImpl,
    config: Arc<ConfigManager>,
    csv_writer: PlanCsvWriter,
}

impl MaintenancePlanApi {
    /// 基于共享连接创建
    pub fn new(conn: Arc<Mutex<Connection>>, config: Arc<ConfigManager>) -> ApiResult<Self> {
        let repo = DenominationRepositoryImpl::from_connection(conn.clone())?;
        Ok(Self {
            conn,
            repo,
            config,
            csv_writer: PlanCsvWriter,
        })
    }

    /// 打开数据库文件（不存在则创建并初始化表结构）
    pub fn open(db_path: &str) -> ApiResult<Self> {
        let conn = open_and_migrate(db_path)
            .map_err(|e| ApiError::DatabaseConnectionError(format!("{}: {}", db_path, e)))?;
        let conn = Arc::new(Mutex::new(conn));
        let config = Arc::new(ConfigManager::from_connection(conn.clone())?);
        Self::new(conn, config)
    }

    pub fn config_manager(&self) -> Arc<ConfigManager> {
        self.config.clone()
    }

    /// 按当前配置构造分配器
    pub fn distributor(&self) -> ApiResult<MonthlyHourDistributor> {
        let keywords = self.config.get_distributor_keywords()?;
        Ok(MonthlyHourDistributor::new(&keywords))
    }

    fn loader(&self) -> ApiResult<DenominationLoader> {
        let default_hours = self.config.get_default_hours_per_event()?;
        Ok(DenominationLoader::standard(self.distributor()?, default_hours))
    }

    fn plan_builder(&self) -> ApiResult<MaintenancePlanBuilder> {
        Ok(MaintenancePlanBuilder::new(self.distributor()?))
    }

    // ==========================================
    // 分组表
    // ==========================================

    /// 导入文件为新的分组表
    pub fn import_table(&self, file_path: &Path, table_name: Option<&str>) -> ApiResult<ImportReport> {
        if file_path.as_os_str().is_empty() {
            return Err(ApiError::InvalidInput("文件路径不能为空".to_string()));
        }

        let repo = DenominationRepositoryImpl::from_connection(self.conn.clone())?;
        let importer = DenominationImporter::new(repo, self.loader()?);
        Ok(importer.import_file(file_path, table_name)?)
    }

    pub fn list_tables(&self) -> ApiResult<Vec<DenominationTable>> {
        Ok(self.repo.list_tables()?)
    }

    pub fn get_table(&self, table_id: &str) -> ApiResult<DenominationTable> {
        self.repo
            .find_table(table_id)?
            .ok_or_else(|| ApiError::NotFound(format!("分组表(id={})不存在", table_id)))
    }

    /// 分页浏览分组表
    pub fn get_table_page(&self, table_id: &str, page: PageRequest) -> ApiResult<TablePage> {
        if page.limit == 0 || page.limit > MAX_PAGE_LIMIT {
            return Err(ApiError::InvalidInput(format!(
                "limit 必须在 1..={} 之间: {}",
                MAX_PAGE_LIMIT, page.limit
            )));
        }

        let table = self.get_table(table_id)?;
        let (rows, total) = self.repo.page_denominations(table_id, page)?;

        Ok(TablePage {
            table,
            rows,
            total,
            limit: page.limit,
            offset: page.offset,
        })
    }

    /// 修改单行（可编辑表格）
    #[instrument(skip(self, patch))]
    pub fn update_denomination(
        &self,
        table_id: &str,
        code: &str,
        patch: &DenominationPatch,
    ) -> ApiResult<StoredDenomination> {
        if patch.is_empty() {
            return Err(ApiError::InvalidInput("没有需要修改的字段".to_string()));
        }
        if let Some(hours) = patch.hours_per_event {
            if !hours.is_finite() || hours < 0.0 {
                return Err(ApiError::InvalidInput(format!("单次工时必须为非负数: {}", hours)));
            }
        }

        let mut stored = self.repo.find_denomination(table_id, code)?.ok_or_else(|| {
            ApiError::NotFound(format!("分组记录(table={}, code={})不存在", table_id, code))
        })?;

        patch.apply_to(&mut stored.denomination);
        self.repo.update_denomination(table_id, &stored.denomination)?;

        info!(table_id, code, "分组记录已修改");
        Ok(stored)
    }

    /// 删除分组表；返回删除的行数
    pub fn delete_table(&self, table_id: &str) -> ApiResult<usize> {
        let rows = self.repo.delete_table(table_id)?;
        info!(table_id, rows, "分组表已删除");
        Ok(rows)
    }

    // ==========================================
    // 维护计划
    // ==========================================

    /// 预览年度计划（year 缺省为当前年份）
    pub fn preview_plan(&self, table_id: &str, year: Option<i32>) -> ApiResult<MaintenancePlan> {
        self.get_table(table_id)?;
        let denominations: Vec<_> = self
            .repo
            .list_denominations(table_id)?
            .into_iter()
            .map(|s| s.denomination)
            .collect();

        let year = year.unwrap_or_else(current_year);
        Ok(self.plan_builder()?.build(year, &denominations))
    }

    /// 导出年度计划 CSV 到目录
    #[instrument(skip(self, dir), fields(dir = %dir.display()))]
    pub fn export_plan(&self, table_id: &str, dir: &Path, year: Option<i32>) -> ApiResult<ExportResponse> {
        let plan = self.preview_plan(table_id, year)?;
        self.write_plan(&plan, dir)
    }

    /// 文件直接生成计划 CSV（不落库）
    #[instrument(skip(self, file_path, dir), fields(file = %file_path.display()))]
    pub fn convert_file(&self, file_path: &Path, dir: &Path, year: Option<i32>) -> ApiResult<ConvertResponse> {
        let loaded = self.loader()?.load_file(file_path)?;
        let year = year.unwrap_or_else(current_year);
        let plan = self.plan_builder()?.build(year, &loaded.denominations());
        let export = self.write_plan(&plan, dir)?;

        Ok(ConvertResponse {
            summary: loaded.summary,
            violations: loaded.violations,
            export,
        })
    }

    /// 单行分配预览
    pub fn preview_distribution(
        &self,
        frequency_label: &str,
        total_hours: f64,
        equipment_name: &str,
    ) -> ApiResult<DistributionPreview> {
        let (category, months) = self.distributor()?.distribute_classified(
            frequency_label,
            total_hours,
            equipment_name,
        );
        Ok(DistributionPreview {
            category,
            total_hours,
            months,
        })
    }

    fn write_plan(&self, plan: &MaintenancePlan, dir: &Path) -> ApiResult<ExportResponse> {
        let file_path = self.csv_writer.export_to_dir(plan, dir)?;
        Ok(ExportResponse {
            file_path,
            year: plan.year,
            row_count: plan.rows.len(),
            total_hours: plan.total_hours,
        })
    }
}
