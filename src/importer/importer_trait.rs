// ==========================================
// GEEstor 维护计划 - 导入管道 Trait
// ==========================================
// 职责: 定义导入各阶段接口（不包含实现）
// 流程: 文件解析 → 字段映射 → DQ 校验 → 清洗/默认值
// ==========================================

use crate::domain::{DqViolation, MaintenanceDenomination, RawDenominationRecord};
use crate::importer::error::ImportResult;
use std::collections::HashMap;
use std::path::Path;

/// 原始行: 列名 → 单元格文本
pub type RawRow = HashMap<String, String>;

/// 源文件中的一行数据
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceRow {
    /// 表格行号（表头为第 1 行，与 Excel 行号一致）
    pub row_number: usize,
    pub cells: RawRow,
}

// ==========================================
// FileParser Trait
// ==========================================
// 实现者: CsvParser, ExcelParser, UniversalFileParser
pub trait FileParser: Send + Sync {
    /// 解析文件为原始行记录（首行为表头，完全空白行跳过，行号保留源文件行号）
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<SourceRow>>;
}

// ==========================================
// FieldMapper Trait
// ==========================================
pub trait FieldMapper: Send + Sync {
    /// 将原始行映射为 RawDenominationRecord
    ///
    /// # 参数
    /// - row: 原始行记录
    /// - row_number: 表格行号（表头为第 1 行，用于 DQ 报告）
    fn map_to_raw_denomination(&self, row: &RawRow, row_number: usize) -> RawDenominationRecord;

    /// 表头中是否存在可识别的编码列
    fn has_code_column(&self, headers: &[String]) -> bool;
}

// ==========================================
// DataCleaner Trait
// ==========================================
pub trait DataCleaner: Send + Sync {
    /// 清洗文本字段（TRIM）
    fn clean_text(&self, value: &str) -> String;

    /// 解析小数（支持小数逗号 "1,5"）
    fn parse_decimal(&self, value: &str) -> Option<f64>;

    /// 清洗一行并补默认值，返回修正过程中产生的 DQ 记录
    ///
    /// # 参数
    /// - raw: 映射后的原始记录（code 已经过主键校验）
    /// - default_hours: 单次工时缺省值
    fn clean_record(
        &self,
        raw: &RawDenominationRecord,
        default_hours: f64,
    ) -> (MaintenanceDenomination, Vec<DqViolation>);
}

// ==========================================
// DqValidator Trait
// ==========================================
pub trait DqValidator: Send + Sync {
    /// 校验主键（code 非空且表内唯一）
    fn validate_primary_key(&self, records: &[RawDenominationRecord]) -> Vec<DqViolation>;

    /// 校验单行（名称、频次标签）
    fn validate_fields(&self, record: &RawDenominationRecord) -> Vec<DqViolation>;
}
