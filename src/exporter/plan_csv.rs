// ==========================================
// GEEstor 维护计划 - 计划 CSV 导出
// ==========================================
// 格式: 所有字段双引号包裹，逗号分隔，"\n" 换行
// 列序: 名称, 台数, 维护类型, 单次工时, 总工时, ENE..DIC
// 文件名: plan_mantenimiento_<年份>.csv
// ==========================================

use crate::domain::{MaintenancePlan, MaintenancePlanRow, Month};
use crate::engine::round2;
use crate::exporter::error::{ExportError, ExportResult};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// 固定列（月份列之前）
pub const LEADING_HEADERS: [&str; 5] = [
    "NOMBRE EQUIPO",
    "Nº DE EQUIPOS",
    "TIPO DE MANTENIMIENTO",
    "HORA POR MANTENIMIENTO",
    "TOTAL HORAS",
];

/// 导出文件名
pub fn plan_file_name(year: i32) -> String {
    format!("plan_mantenimiento_{}.csv", year)
}

/// 完整表头（17 列）
pub fn headers() -> Vec<&'static str> {
    LEADING_HEADERS
        .iter()
        .copied()
        .chain(Month::ALL.iter().map(|m| m.abbreviation()))
        .collect()
}

/// 数值格式: 先四舍五入到 2 位，再输出最短表示（20 / 33.33 / 0）
pub fn format_hours(value: f64) -> String {
    let rounded = round2(value) + 0.0;
    format!("{}", rounded)
}

fn row_fields(row: &MaintenancePlanRow) -> Vec<String> {
    let mut fields = vec![
        row.name.clone(),
        row.quantity.to_string(),
        row.maintenance_type.clone(),
        format_hours(row.hours_per_event),
        format_hours(row.total_hours),
    ];
    fields.extend(row.months.values().iter().map(|v| format_hours(*v)));
    fields
}

// ==========================================
// PlanCsvWriter
// ==========================================
pub struct PlanCsvWriter;

impl PlanCsvWriter {
    /// 写入任意 Writer
    pub fn write<W: Write>(&self, plan: &MaintenancePlan, writer: W) -> ExportResult<()> {
        let mut csv_writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(writer);

        csv_writer.write_record(headers())?;
        for row in &plan.rows {
            csv_writer.write_record(row_fields(row))?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// 生成 CSV 文本
    pub fn to_csv_string(&self, plan: &MaintenancePlan) -> ExportResult<String> {
        let mut buffer = Vec::new();
        self.write(plan, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| ExportError::EncodingError(e.to_string()))
    }

    /// 写入目录，文件名按计划年份生成；返回文件路径
    #[instrument(skip(self, plan), fields(year = plan.year, rows = plan.rows.len()))]
    pub fn export_to_dir(&self, plan: &MaintenancePlan, dir: &Path) -> ExportResult<PathBuf> {
        if !dir.is_dir() {
            return Err(ExportError::DirectoryNotFound(dir.display().to_string()));
        }

        let path = dir.join(plan_file_name(plan.year));
        let file = File::create(&path)?;
        self.write(plan, file)?;

        info!(path = %path.display(), "维护计划 CSV 已导出");
        Ok(path)
    }
}
