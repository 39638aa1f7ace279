// ==========================================
// GEEstor 维护计划 - 分组表导入器
// ==========================================
// 职责: 整合导入流程，从文件到分组表
// 流程: 解析 → 映射 → DQ 校验 → 清洗/默认值 → 落库
// ==========================================

use crate::domain::{
    DenominationTable, DqLevel, DqSummary, DqViolation, ImportReport, MaintenanceDenomination,
    StoredDenomination,
};
use crate::engine::MonthlyHourDistributor;
use crate::importer::data_cleaner::DataCleaner as DataCleanerImpl;
use crate::importer::dq_validator::DqValidator as DqValidatorImpl;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::FieldMapper as FieldMapperImpl;
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::importer_trait::{
    DataCleaner, DqValidator, FieldMapper, FileParser, SourceRow,
};
use crate::repository::DenominationRepository;
use chrono::Utc;
use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// LoadedDenominations - 未落库的解析结果
// ==========================================
#[derive(Debug, Clone)]
pub struct LoadedRow {
    pub row_number: usize,
    pub denomination: MaintenanceDenomination,
}

#[derive(Debug, Clone)]
pub struct LoadedDenominations {
    pub rows: Vec<LoadedRow>,
    pub violations: Vec<DqViolation>,
    pub summary: DqSummary,
}

impl LoadedDenominations {
    pub fn denominations(&self) -> Vec<MaintenanceDenomination> {
        self.rows.iter().map(|r| r.denomination.clone()).collect()
    }
}

// ==========================================
// DenominationLoader - 文件 → 分组记录（不落库）
// ==========================================
pub struct DenominationLoader {
    file_parser: Box<dyn FileParser>,
    field_mapper: Box<dyn FieldMapper>,
    data_cleaner: Box<dyn DataCleaner>,
    dq_validator: Box<dyn DqValidator>,
    default_hours: f64,
}

impl DenominationLoader {
    pub fn new(
        file_parser: Box<dyn FileParser>,
        field_mapper: Box<dyn FieldMapper>,
        data_cleaner: Box<dyn DataCleaner>,
        dq_validator: Box<dyn DqValidator>,
        default_hours: f64,
    ) -> Self {
        Self {
            file_parser,
            field_mapper,
            data_cleaner,
            dq_validator,
            default_hours,
        }
    }

    /// 标准组件组合（按扩展名选择解析器）
    pub fn standard(distributor: MonthlyHourDistributor, default_hours: f64) -> Self {
        Self::new(
            Box::new(UniversalFileParser),
            Box::new(FieldMapperImpl),
            Box::new(DataCleanerImpl),
            Box::new(DqValidatorImpl::new(distributor)),
            default_hours,
        )
    }

    /// 从文件加载
    #[instrument(skip(self, file_path), fields(file = %file_path.display()))]
    pub fn load_file(&self, file_path: &Path) -> ImportResult<LoadedDenominations> {
        let raw_rows = self.file_parser.parse_to_raw_records(file_path)?;
        if raw_rows.is_empty() {
            return Err(ImportError::EmptyFile(file_path.display().to_string()));
        }
        info!(total_rows = raw_rows.len(), "文件解析完成");
        self.load_rows(&raw_rows)
    }

    /// 从已解析的原始行加载（DQ 记录沿用源文件行号）
    pub fn load_rows(&self, raw_rows: &[SourceRow]) -> ImportResult<LoadedDenominations> {
        // === 步骤 1: 表头检查 ===
        if let Some(first) = raw_rows.first() {
            let headers: Vec<String> = first.cells.keys().cloned().collect();
            if !self.field_mapper.has_code_column(&headers) {
                return Err(ImportError::MissingColumn("CÓDIGO".to_string()));
            }
        }

        // === 步骤 2: 字段映射 ===
        let records: Vec<_> = raw_rows
            .iter()
            .map(|row| {
                self.field_mapper
                    .map_to_raw_denomination(&row.cells, row.row_number)
            })
            .collect();
        debug!(count = records.len(), "字段映射完成");

        // === 步骤 3: DQ 校验 ===
        let mut violations = self.dq_validator.validate_primary_key(&records);
        let blocked_rows: HashSet<usize> = violations
            .iter()
            .filter(|v| v.level.blocks_row())
            .map(|v| v.row_number)
            .collect();

        // === 步骤 4: 清洗 + 缺省值 ===
        let mut rows = Vec::new();
        for record in &records {
            if blocked_rows.contains(&record.row_number) {
                continue;
            }
            violations.extend(self.dq_validator.validate_fields(record));

            let (denomination, fixes) = self.data_cleaner.clean_record(record, self.default_hours);
            violations.extend(fixes);
            rows.push(LoadedRow {
                row_number: record.row_number,
                denomination,
            });
        }
        violations.sort_by_key(|v| v.row_number);

        let summary = summarize(records.len(), rows.len(), &violations);
        if summary.blocked + summary.conflict > 0 {
            warn!(
                blocked = summary.blocked,
                conflict = summary.conflict,
                "部分行未通过校验"
            );
        }
        info!(
            total = summary.total_rows,
            success = summary.success,
            warning = summary.warning,
            "分组记录加载完成"
        );

        Ok(LoadedDenominations {
            rows,
            violations,
            summary,
        })
    }
}

fn summarize(total_rows: usize, success: usize, violations: &[DqViolation]) -> DqSummary {
    let rows_with = |level: DqLevel| {
        violations
            .iter()
            .filter(|v| v.level == level)
            .map(|v| v.row_number)
            .collect::<HashSet<_>>()
            .len()
    };

    DqSummary {
        total_rows,
        success,
        blocked: rows_with(DqLevel::Error),
        warning: rows_with(DqLevel::Warning),
        conflict: rows_with(DqLevel::Conflict),
    }
}

// ==========================================
// DenominationImporter - 文件 → 分组表（落库）
// ==========================================
pub struct DenominationImporter<R>
where
    R: DenominationRepository,
{
    repo: R,
    loader: DenominationLoader,
}

impl<R> DenominationImporter<R>
where
    R: DenominationRepository,
{
    pub fn new(repo: R, loader: DenominationLoader) -> Self {
        Self { repo, loader }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// 导入文件为新的分组表
    ///
    /// # 参数
    /// - file_path: .xlsx/.xls/.csv 文件
    /// - table_name: 表名（缺省取文件名）
    #[instrument(skip(self, file_path), fields(table_id))]
    pub fn import_file(&self, file_path: &Path, table_name: Option<&str>) -> ImportResult<ImportReport> {
        let start = Instant::now();
        let table_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("table_id", table_id.as_str());
        info!(file = %file_path.display(), "开始导入分组表");

        let loaded = self.loader.load_file(file_path)?;

        let name = table_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| {
                file_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("unknown")
                    .to_string()
            });

        let table = DenominationTable {
            table_id: table_id.clone(),
            name,
            source_file: Some(file_path.display().to_string()),
            imported_at: Utc::now(),
            row_count: loaded.rows.len(),
        };

        let stored: Vec<StoredDenomination> = loaded
            .rows
            .into_iter()
            .map(|r| StoredDenomination {
                table_id: table_id.clone(),
                row_number: r.row_number,
                denomination: r.denomination,
            })
            .collect();

        self.repo.create_table(&table, &stored)?;

        let elapsed = start.elapsed();
        info!(
            table_id = %table_id,
            rows = stored.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "分组表导入完成"
        );

        Ok(ImportReport {
            table,
            summary: loaded.summary,
            violations: loaded.violations,
            elapsed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::importer_trait::RawRow;

    fn raw(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// 连续数据行，首行位于表格第 2 行
    fn sheet(rows: Vec<RawRow>) -> Vec<SourceRow> {
        rows.into_iter()
            .enumerate()
            .map(|(idx, cells)| SourceRow {
                row_number: idx + 2,
                cells,
            })
            .collect()
    }

    fn loader() -> DenominationLoader {
        DenominationLoader::standard(MonthlyHourDistributor::default(), 2.0)
    }

    #[test]
    fn test_load_rows_blocks_missing_and_duplicate_codes() {
        let rows = sheet(vec![
            raw(&[("CODIGO", "A"), ("NOMBRE", "Autoclave"), ("CANTIDAD", "1"), ("FRECUENCIA", "anual"), ("TIEMPO", "4")]),
            raw(&[("CODIGO", ""), ("NOMBRE", "Sin código"), ("CANTIDAD", "1"), ("FRECUENCIA", "anual"), ("TIEMPO", "4")]),
            raw(&[("CODIGO", "A"), ("NOMBRE", "Duplicado"), ("CANTIDAD", "1"), ("FRECUENCIA", "anual"), ("TIEMPO", "4")]),
            raw(&[("CODIGO", "B"), ("NOMBRE", "Monitor"), ("CANTIDAD", "3"), ("FRECUENCIA", "mensual"), ("TIEMPO", "")]),
        ]);

        let loaded = loader().load_rows(&rows).unwrap();

        assert_eq!(loaded.rows.len(), 2);
        assert_eq!(loaded.rows[0].denomination.code, "A");
        assert_eq!(loaded.rows[1].denomination.code, "B");
        assert_eq!(loaded.rows[1].denomination.hours_per_event, 2.0);
        assert_eq!(loaded.rows[1].row_number, 5);
        assert_eq!(
            loaded.summary,
            DqSummary {
                total_rows: 4,
                success: 2,
                blocked: 1,
                warning: 0,
                conflict: 1,
            }
        );
    }

    #[test]
    fn test_load_rows_missing_code_column() {
        let rows = sheet(vec![raw(&[("NOMBRE", "Autoclave")])]);
        let result = loader().load_rows(&rows);
        assert!(matches!(result, Err(ImportError::MissingColumn(_))));
    }

    #[test]
    fn test_violations_sorted_by_row() {
        let rows = sheet(vec![
            raw(&[("CODIGO", "A"), ("CANTIDAD", "x"), ("FRECUENCIA", "anual"), ("TIEMPO", "1")]),
            raw(&[("CODIGO", "")]),
        ]);
        let loaded = loader().load_rows(&rows).unwrap();
        let row_numbers: Vec<usize> = loaded.violations.iter().map(|v| v.row_number).collect();
        let mut sorted = row_numbers.clone();
        sorted.sort();
        assert_eq!(row_numbers, sorted);
        assert_eq!(loaded.summary.warning, 1);
    }

    #[test]
    fn test_row_numbers_follow_source_rows() {
        // 源文件第 3 行为空白行已被解析器跳过
        let rows = vec![
            SourceRow {
                row_number: 2,
                cells: raw(&[("CODIGO", "A"), ("FRECUENCIA", "anual"), ("TIEMPO", "1")]),
            },
            SourceRow {
                row_number: 4,
                cells: raw(&[("CODIGO", ""), ("NOMBRE", "Sin código")]),
            },
        ];
        let loaded = loader().load_rows(&rows).unwrap();

        assert_eq!(loaded.rows[0].row_number, 2);
        let errors: Vec<usize> = loaded
            .violations
            .iter()
            .filter(|v| v.level == DqLevel::Error)
            .map(|v| v.row_number)
            .collect();
        assert_eq!(errors, vec![4]);
    }
}
