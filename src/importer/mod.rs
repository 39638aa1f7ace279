// ==========================================
// GEEstor 维护计划 - 导入层
// ==========================================
// 职责: 外部分组表文件导入，生成内部分组记录
// 支持: Excel (.xlsx/.xls), CSV
// ==========================================

// 模块声明
pub mod data_cleaner;
pub mod denomination_importer;
pub mod dq_validator;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod importer_trait;

// 重导出核心类型
pub use data_cleaner::DataCleaner as DataCleanerImpl;
pub use denomination_importer::{
    DenominationImporter, DenominationLoader, LoadedDenominations, LoadedRow,
};
pub use dq_validator::DqValidator as DqValidatorImpl;
pub use error::{ImportError, ImportResult};
pub use field_mapper::FieldMapper as FieldMapperImpl;
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};

// 重导出 Trait 接口
pub use importer_trait::{DataCleaner, DqValidator, FieldMapper, FileParser, RawRow, SourceRow};
