// ==========================================
// GEEstor 维护计划 - 命令行
// ==========================================
// 职责: 参数解析 + 命令分发（API 层之上的薄壳）
// 输出: 默认文本；--json 时输出 JSON 到 stdout
// ==========================================

use crate::api::{ConfigApi, MaintenancePlanApi, TablePage};
use crate::config::DistributorKeywords;
use crate::domain::{
    DenominationPatch, DenominationSort, DqViolation, ImportReport, MaintenancePlan, Month,
};
use crate::exporter::format_hours;
use crate::repository::PageRequest;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const DB_PATH_ENV: &str = "GEESTOR_DB_PATH";

/// 缺省数据库路径: <用户数据目录>/geestor/geestor_plan.db
pub fn default_db_path() -> PathBuf {
    match dirs::data_dir() {
        Some(data_dir) => data_dir.join("geestor").join("geestor_plan.db"),
        None => PathBuf::from("./geestor_plan.db"),
    }
}

#[derive(Parser, Debug)]
#[command(name = "geestor-plan")]
#[command(version)]
#[command(about = "Annual preventive maintenance plan generator for hospital equipment", long_about = None)]
pub struct Cli {
    /// SQLite database file (defaults to the user data directory)
    #[arg(long, global = true, env = DB_PATH_ENV, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long = "log-json", global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Import an .xlsx/.xls/.csv denomination table
    Import {
        file: PathBuf,
        /// Table name (defaults to the file name)
        #[arg(long)]
        name: Option<String>,
    },

    /// List imported tables, newest first
    Tables,

    /// Show one page of a table
    Show {
        table_id: String,
        #[arg(long, value_enum, default_value = "row")]
        sort: SortColumn,
        #[arg(long)]
        desc: bool,
        #[arg(long, default_value = "50")]
        limit: usize,
        #[arg(long, default_value = "0")]
        offset: usize,
    },

    /// Edit one denomination of a table
    Edit {
        table_id: String,
        code: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        frequency: Option<String>,
        #[arg(long)]
        hours: Option<f64>,
        #[arg(long)]
        quantity: Option<u32>,
        #[arg(long = "type")]
        maintenance_type: Option<String>,
    },

    /// Delete a table and its rows
    Delete { table_id: String },

    /// Preview the annual plan of a table
    Plan {
        table_id: String,
        #[arg(long)]
        year: Option<i32>,
    },

    /// Export the annual plan of a table as CSV
    Export {
        table_id: String,
        #[arg(long, default_value = ".")]
        out: PathBuf,
        #[arg(long)]
        year: Option<i32>,
    },

    /// Convert a file straight to a plan CSV without storing it
    Convert {
        file: PathBuf,
        #[arg(long, default_value = ".")]
        out: PathBuf,
        #[arg(long)]
        year: Option<i32>,
    },

    /// Distribute annual hours for a single item
    Distribute {
        frequency: String,
        #[arg(allow_negative_numbers = true)]
        hours: f64,
        name: String,
    },

    /// Distributor keywords and import defaults
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the active configuration
    Show,
    /// Replace keyword lists from a JSON file
    SetKeywords {
        /// JSON file with `semiannual` and `annual` keyword sets
        #[arg(required_unless_present = "reset")]
        file: Option<PathBuf>,
        /// Restore the built-in keywords
        #[arg(long, conflicts_with = "file")]
        reset: bool,
    },
    /// Default hours per event used when the file has none
    SetDefaultHours { hours: f64 },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortColumn {
    Row,
    Code,
    Name,
    Quantity,
    Frequency,
    Hours,
}

impl From<SortColumn> for DenominationSort {
    fn from(value: SortColumn) -> Self {
        match value {
            SortColumn::Row => DenominationSort::RowNumber,
            SortColumn::Code => DenominationSort::Code,
            SortColumn::Name => DenominationSort::Name,
            SortColumn::Quantity => DenominationSort::Quantity,
            SortColumn::Frequency => DenominationSort::Frequency,
            SortColumn::Hours => DenominationSort::Hours,
        }
    }
}

#[derive(Serialize)]
struct ConfigView {
    distributor_keywords: DistributorKeywords,
    default_hours_per_event: f64,
}

// ==========================================
// 命令分发
// ==========================================
pub fn run(cli: Cli) -> Result<()> {
    let db_path = cli.db.clone().unwrap_or_else(default_db_path);
    let json = cli.json;

    match cli.command {
        Command::Distribute {
            frequency,
            hours,
            name,
        } => {
            let api = open_api(&db_path)?;
            let preview = api.preview_distribution(&frequency, hours, &name)?;
            if json {
                return print_json(&preview);
            }
            println!("{} ({})", preview.category, format_hours(preview.total_hours));
            print_month_header();
            println!("{}", month_cells(preview.months.values()));
        }
        Command::Import { file, name } => {
            let api = open_api(&db_path)?;
            let report = api
                .import_table(&file, name.as_deref())
                .with_context(|| format!("导入失败: {}", file.display()))?;
            if json {
                return print_json(&report);
            }
            print_import_report(&report);
        }
        Command::Tables => {
            let api = open_api(&db_path)?;
            let tables = api.list_tables()?;
            if json {
                return print_json(&tables);
            }
            for t in &tables {
                println!(
                    "{}  {}  rows={}  {}",
                    t.table_id,
                    t.imported_at.format("%Y-%m-%d %H:%M"),
                    t.row_count,
                    t.name
                );
            }
        }
        Command::Show {
            table_id,
            sort,
            desc,
            limit,
            offset,
        } => {
            let api = open_api(&db_path)?;
            let page = api.get_table_page(
                &table_id,
                PageRequest {
                    sort: sort.into(),
                    descending: desc,
                    limit,
                    offset,
                },
            )?;
            if json {
                return print_json(&page);
            }
            print_table_page(&page);
        }
        Command::Edit {
            table_id,
            code,
            name,
            frequency,
            hours,
            quantity,
            maintenance_type,
        } => {
            let patch = DenominationPatch {
                name,
                quantity,
                frequency_label: frequency,
                maintenance_type,
                hours_per_event: hours,
            };
            let api = open_api(&db_path)?;
            let updated = api.update_denomination(&table_id, &code, &patch)?;
            if json {
                return print_json(&updated);
            }
            let d = &updated.denomination;
            println!(
                "{}  {}  x{}  {}  {}h",
                d.code,
                d.name,
                d.quantity,
                d.frequency_label,
                format_hours(d.hours_per_event)
            );
        }
        Command::Delete { table_id } => {
            let api = open_api(&db_path)?;
            let rows = api.delete_table(&table_id)?;
            if json {
                return print_json(&serde_json::json!({ "table_id": table_id, "rows": rows }));
            }
            println!("deleted {} ({} rows)", table_id, rows);
        }
        Command::Plan { table_id, year } => {
            let api = open_api(&db_path)?;
            let plan = api.preview_plan(&table_id, year)?;
            if json {
                return print_json(&plan);
            }
            print_plan(&plan);
        }
        Command::Export {
            table_id,
            out,
            year,
        } => {
            let api = open_api(&db_path)?;
            let export = api.export_plan(&table_id, &out, year)?;
            if json {
                return print_json(&export);
            }
            println!("{}", export.file_path.display());
        }
        Command::Convert { file, out, year } => {
            let api = open_api(&db_path)?;
            let converted = api
                .convert_file(&file, &out, year)
                .with_context(|| format!("转换失败: {}", file.display()))?;
            if json {
                return print_json(&converted);
            }
            print_violations(&converted.violations);
            println!("{}", converted.export.file_path.display());
        }
        Command::Config { action } => {
            let api = open_api(&db_path)?;
            let config_api = ConfigApi::new(api.config_manager());
            match action {
                ConfigAction::Show => {}
                ConfigAction::SetKeywords { file, reset } => {
                    let keywords = if reset {
                        DistributorKeywords::default()
                    } else {
                        let Some(file) = file else {
                            bail!("缺少关键字 JSON 文件");
                        };
                        read_keywords(&file)?
                    };
                    config_api.update_distributor_keywords(&keywords)?;
                }
                ConfigAction::SetDefaultHours { hours } => {
                    config_api.update_default_hours_per_event(hours)?;
                }
            }

            let view = ConfigView {
                distributor_keywords: config_api.get_distributor_keywords()?,
                default_hours_per_event: config_api.get_default_hours_per_event()?,
            };
            if json {
                return print_json(&view);
            }
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
    }

    Ok(())
}

fn open_api(db_path: &Path) -> Result<MaintenancePlanApi> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("无法创建数据目录: {}", parent.display()))?;
        }
    }
    let path = db_path.to_string_lossy();
    MaintenancePlanApi::open(&path).with_context(|| format!("无法打开数据库: {}", path))
}

fn read_keywords(file: &Path) -> Result<DistributorKeywords> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("无法读取文件: {}", file.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("关键字 JSON 格式错误: {}", file.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ==========================================
// 文本输出
// ==========================================

fn month_cells(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| format!("{:>8}", format_hours(*v)))
        .collect::<Vec<_>>()
        .join("")
}

fn print_month_header() {
    let header: String = Month::ALL
        .iter()
        .map(|m| format!("{:>8}", m.abbreviation()))
        .collect();
    println!("{}", header);
}

fn print_violations(violations: &[DqViolation]) {
    for v in violations {
        println!(
            "  row {:>4}  {:<8}  {:<10} {}",
            v.row_number,
            format!("{:?}", v.level),
            v.field,
            v.message
        );
    }
}

fn print_import_report(report: &ImportReport) {
    let s = &report.summary;
    println!("table   {} ({})", report.table.table_id, report.table.name);
    println!(
        "rows    total={} success={} blocked={} conflict={} warning={}",
        s.total_rows, s.success, s.blocked, s.conflict, s.warning
    );
    println!("elapsed {} ms", report.elapsed.as_millis());
    print_violations(&report.violations);
}

fn print_table_page(page: &TablePage) {
    println!(
        "{} ({}): {}-{} of {}",
        page.table.name,
        page.table.table_id,
        page.offset + usize::from(!page.rows.is_empty()),
        page.offset + page.rows.len(),
        page.total
    );
    for row in &page.rows {
        let d = &row.denomination;
        println!(
            "{:>4}  {:<12} {:<40} {:>4}  {:<14} {:<12} {:>6}",
            row.row_number,
            d.code,
            d.name,
            d.quantity,
            d.frequency_label,
            d.maintenance_type,
            format_hours(d.hours_per_event)
        );
    }
}

fn print_plan(plan: &MaintenancePlan) {
    println!("plan {}  total={}h", plan.year, format_hours(plan.total_hours));
    print!("{:<40}{:>8}", "", "TOTAL");
    print_month_header();
    for row in &plan.rows {
        println!(
            "{:<40}{:>8}{}",
            row.name,
            format_hours(row.total_hours),
            month_cells(row.months.values())
        );
    }
    println!(
        "{:<40}{:>8}{}",
        "",
        format_hours(plan.total_hours),
        month_cells(plan.monthly_totals.values())
    );
}
