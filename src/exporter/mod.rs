// ==========================================
// GEEstor 维护计划 - 导出层
// ==========================================
// 职责: 维护计划 → CSV 文档
// ==========================================

pub mod error;
pub mod plan_csv;

pub use error::{ExportError, ExportResult};
pub use plan_csv::{format_hours, headers, plan_file_name, PlanCsvWriter};
