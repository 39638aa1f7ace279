// ==========================================
// GEEstor 维护计划 - 导出模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 导出模块错误类型
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("导出目录不存在: {0}")]
    DirectoryNotFound(String),

    #[error("文件写入失败: {0}")]
    FileWriteError(String),

    #[error("CSV 生成失败: {0}")]
    CsvWriteError(String),

    #[error("CSV 编码失败: {0}")]
    EncodingError(String),
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::FileWriteError(err.to_string())
    }
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        ExportError::CsvWriteError(err.to_string())
    }
}

/// Result 类型别名
pub type ExportResult<T> = Result<T, ExportError>;
