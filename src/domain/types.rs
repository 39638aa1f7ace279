// ==========================================
// GEEstor 维护计划 - 领域类型定义
// ==========================================
// 职责: 月份、频次类别、数据质量等级等枚举
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 一年的月份数（月度分配数组的固定长度）
pub const MONTHS_PER_YEAR: usize = 12;

// ==========================================
// 月份 (Month)
// ==========================================
// 索引约定: 0 = 一月(ENE) ... 11 = 十二月(DIC)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Month {
    Enero,
    Febrero,
    Marzo,
    Abril,
    Mayo,
    Junio,
    Julio,
    Agosto,
    Septiembre,
    Octubre,
    Noviembre,
    Diciembre,
}

impl Month {
    /// 按日历顺序排列的全部月份
    pub const ALL: [Month; MONTHS_PER_YEAR] = [
        Month::Enero,
        Month::Febrero,
        Month::Marzo,
        Month::Abril,
        Month::Mayo,
        Month::Junio,
        Month::Julio,
        Month::Agosto,
        Month::Septiembre,
        Month::Octubre,
        Month::Noviembre,
        Month::Diciembre,
    ];

    /// 月度数组中的下标（0-based）
    pub fn index(self) -> usize {
        self as usize
    }

    /// 由下标构造月份，越界返回 None
    pub fn from_index(index: usize) -> Option<Month> {
        Self::ALL.get(index).copied()
    }

    /// CSV 表头使用的三字母缩写
    pub fn abbreviation(self) -> &'static str {
        match self {
            Month::Enero => "ENE",
            Month::Febrero => "FEB",
            Month::Marzo => "MAR",
            Month::Abril => "ABR",
            Month::Mayo => "MAY",
            Month::Junio => "JUN",
            Month::Julio => "JUL",
            Month::Agosto => "AGO",
            Month::Septiembre => "SEP",
            Month::Octubre => "OCT",
            Month::Noviembre => "NOV",
            Month::Diciembre => "DIC",
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

// ==========================================
// 维护频次类别 (Frequency Category)
// ==========================================
// 由频次标签经规则匹配得出；Uniform 为兜底（未识别/空标签）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FrequencyCategory {
    Monthly,    // mensual
    Quarterly,  // trimestral
    Semiannual, // semestral
    Annual,     // anual
    Uniform,    // 兜底：按月平均
}

impl fmt::Display for FrequencyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrequencyCategory::Monthly => write!(f, "MONTHLY"),
            FrequencyCategory::Quarterly => write!(f, "QUARTERLY"),
            FrequencyCategory::Semiannual => write!(f, "SEMIANNUAL"),
            FrequencyCategory::Annual => write!(f, "ANNUAL"),
            FrequencyCategory::Uniform => write!(f, "UNIFORM"),
        }
    }
}

// ==========================================
// 数据质量等级 (DQ Level)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DqLevel {
    Error,    // 阻断：该行不入库
    Warning,  // 警告：已按默认值修正
    Info,     // 提示
    Conflict, // 冲突：同表内编码重复，该行不入库
}

impl DqLevel {
    /// 该等级是否阻断行入库
    pub fn blocks_row(self) -> bool {
        matches!(self, DqLevel::Error | DqLevel::Conflict)
    }
}

impl fmt::Display for DqLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DqLevel::Error => write!(f, "ERROR"),
            DqLevel::Warning => write!(f, "WARNING"),
            DqLevel::Info => write!(f, "INFO"),
            DqLevel::Conflict => write!(f, "CONFLICT"),
        }
    }
}
