// ==========================================
// GEEstor 维护计划 - 文件解析器实现
// ==========================================
// 支持: Excel (.xlsx/.xls) / CSV (.csv, 逗号或分号分隔)
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::{FileParser, SourceRow};
use calamine::{open_workbook_auto, Reader};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// 把一行单元格按表头组装为 SourceRow；完全空白的行返回 None
fn assemble_row(
    headers: &[String],
    row_number: usize,
    cells: impl Iterator<Item = String>,
) -> Option<SourceRow> {
    let mut row_map = HashMap::new();
    for (header, value) in headers.iter().zip(cells) {
        if header.is_empty() {
            continue;
        }
        row_map.insert(header.clone(), value.trim().to_string());
    }

    if row_map.values().all(|v| v.is_empty()) {
        None
    } else {
        Some(SourceRow {
            row_number,
            cells: row_map,
        })
    }
}

fn check_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// 按首行判定分隔符（西语区域的 Excel 导出常用分号）
fn detect_delimiter(content: &str) -> u8 {
    let first_line = content.lines().next().unwrap_or("");
    let semicolons = first_line.matches(';').count();
    let commas = first_line.matches(',').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<SourceRow>> {
        check_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let bytes = std::fs::read(file_path)?;
        let content = String::from_utf8_lossy(&bytes);
        let content = content.trim_start_matches('\u{feff}');
        let delimiter = detect_delimiter(content);
        debug!(delimiter = %(delimiter as char), "CSV 分隔符");

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .flexible(true) // 允许行长度不一致
            .from_reader(content.as_bytes());

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        if headers.iter().all(|h| h.is_empty()) {
            return Err(ImportError::EmptyFile(file_path.display().to_string()));
        }

        let mut records = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            // 带引号的多行字段会跨行，优先取记录起始行
            let row_number = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(idx + 2);
            if let Some(row) =
                assemble_row(&headers, row_number, record.iter().map(|v| v.to_string()))
            {
                records.push(row);
            }
        }

        Ok(records)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
// 仅读取第一个工作表
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<SourceRow>> {
        check_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "xlsx" && ext != "xls" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(file_path)?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;

        let range = workbook.worksheet_range(&sheet_name)?;
        // 区域可能不从 A1 开始（前置空行不计入 range）
        let header_row_number = range.start().map(|(row, _)| row as usize + 1).unwrap_or(1);

        let mut rows = range.rows();
        let header_row = rows
            .next()
            .ok_or_else(|| ImportError::EmptyFile(file_path.display().to_string()))?;

        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        let mut records = Vec::new();
        for (idx, data_row) in rows.enumerate() {
            let row_number = header_row_number + idx + 1;
            if let Some(row) =
                assemble_row(&headers, row_number, data_row.iter().map(|c| c.to_string()))
            {
                records.push(row);
            }
        }

        debug!(sheet = %sheet_name, rows = records.len(), "Excel 工作表解析完成");
        Ok(records)
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<SourceRow>> {
        match extension_of(file_path).as_str() {
            "csv" => CsvParser.parse_to_raw_records(file_path),
            "xlsx" | "xls" => ExcelParser.parse_to_raw_records(file_path),
            other => Err(ImportError::UnsupportedFormat(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn csv_file(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    #[test]
    fn test_csv_parser_valid_file() {
        let file = csv_file(&[
            "CÓDIGO,DENOMINACIÓN,CANTIDAD",
            "DH001,Autoclave,2",
            "DH002, Bomba de infusión ,40",
        ]);

        let records = CsvParser.parse_to_raw_records(file.path()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].row_number, 2);
        assert_eq!(records[0].cells.get("CÓDIGO"), Some(&"DH001".to_string()));
        assert_eq!(
            records[1].cells.get("DENOMINACIÓN"),
            Some(&"Bomba de infusión".to_string())
        );
    }

    #[test]
    fn test_csv_parser_semicolon_and_bom() {
        let file = csv_file(&["\u{feff}CODIGO;TIEMPO", "DH001;1,5"]);

        let records = CsvParser.parse_to_raw_records(file.path()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].cells.get("CODIGO"), Some(&"DH001".to_string()));
        assert_eq!(records[0].cells.get("TIEMPO"), Some(&"1,5".to_string()));
    }

    #[test]
    fn test_csv_parser_skip_empty_rows() {
        let file = csv_file(&["CODIGO,CANTIDAD", "DH001,2", ",", "DH002,3"]);

        let records = CsvParser.parse_to_raw_records(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        // 空白行跳过但不重排行号
        let row_numbers: Vec<usize> = records.iter().map(|r| r.row_number).collect();
        assert_eq!(row_numbers, vec![2, 4]);
    }

    fn fixture(name: &str) -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join(name)
    }

    #[test]
    fn test_excel_parser_reads_first_sheet_only() {
        let records = UniversalFileParser
            .parse_to_raw_records(&fixture("equipos.xlsx"))
            .unwrap();

        // 第二个工作表 "Notas" 不读取
        let codes: Vec<&str> = records
            .iter()
            .filter_map(|r| r.cells.get("CÓDIGO").map(String::as_str))
            .collect();
        assert_eq!(codes, vec!["DH010", "DH011"]);
        assert!(records.iter().all(|r| !r.cells.contains_key("NOTA")));
    }

    #[test]
    fn test_excel_parser_numeric_cells_and_row_numbers() {
        let records = ExcelParser
            .parse_to_raw_records(&fixture("equipos.xlsx"))
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].row_number, 2);
        assert_eq!(records[0].cells.get("CANTIDAD"), Some(&"3".to_string()));
        assert_eq!(records[0].cells.get("TIEMPO"), Some(&"1.5".to_string()));

        // 第 3 行为空白行
        assert_eq!(records[1].row_number, 4);
        assert_eq!(records[1].cells.get("TIEMPO"), Some(&"2.25".to_string()));
    }

    #[test]
    fn test_excel_parser_rejects_csv_extension() {
        let file = csv_file(&["CODIGO", "DH001"]);
        let result = ExcelParser.parse_to_raw_records(file.path());
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_csv_parser_file_not_found() {
        let result = CsvParser.parse_to_raw_records(Path::new("non_existent.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_universal_parser_rejects_unknown_extension() {
        let result = UniversalFileParser.parse_to_raw_records(Path::new("plan.pdf"));
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), b';');
        assert_eq!(detect_delimiter("a,b\n"), b',');
        assert_eq!(detect_delimiter(""), b',');
    }
}
