// ==========================================
// GEEstor 维护计划 - 设备分组（Denominación Homogénea）领域模型
// ==========================================
// 职责: 分组记录、导入中间结构、导入批次与 DQ 报告
// ==========================================

use crate::domain::types::DqLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 缺省的单次维护工时（小时）
pub const DEFAULT_HOURS_PER_EVENT: f64 = 2.0;

// ==========================================
// MaintenanceDenomination - 设备分组
// ==========================================
// 用途: 维护计划的输入行；分配算法只读
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceDenomination {
    pub code: String,             // 分组编码（表内唯一）
    pub name: String,             // 设备/分组名称（展示 + 月份放置启发式）
    pub quantity: u32,            // 设备台数
    pub frequency_label: String,  // 频次标签（mensual/trimestral/...，自由文本）
    pub maintenance_type: String, // 维护类型（预防/纠正/...，仅透传）
    pub hours_per_event: f64,     // 单次维护工时
}

impl MaintenanceDenomination {
    /// 年度总工时 = 台数 × 单次工时
    pub fn total_annual_hours(&self) -> f64 {
        f64::from(self.quantity) * self.hours_per_event
    }
}

// ==========================================
// RawDenominationRecord - 导入中间结构体
// ==========================================
// 生命周期: 仅在导入流程内（文件解析 → 字段映射 → 此结构 → 清洗）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawDenominationRecord {
    pub code: Option<String>,
    pub name: Option<String>,
    pub quantity_raw: Option<String>,
    pub frequency_label: Option<String>,
    pub maintenance_type: Option<String>,
    pub hours_raw: Option<String>,

    // 元信息
    pub row_number: usize, // 原始文件行号（表头为第 1 行）
}

// ==========================================
// StoredDenomination - 已入库的分组行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDenomination {
    pub table_id: String,
    pub row_number: usize,
    #[serde(flatten)]
    pub denomination: MaintenanceDenomination,
}

// ==========================================
// DenominationTable - 分组表（一次导入 = 一张表）
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenominationTable {
    pub table_id: String,            // UUID
    pub name: String,                // 表名（默认取源文件名）
    pub source_file: Option<String>, // 源文件路径
    pub imported_at: DateTime<Utc>,
    pub row_count: usize,
}

// ==========================================
// DenominationPatch - 可编辑表格的单行修改
// ==========================================
// None 字段保持原值
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DenominationPatch {
    pub name: Option<String>,
    pub quantity: Option<u32>,
    pub frequency_label: Option<String>,
    pub maintenance_type: Option<String>,
    pub hours_per_event: Option<f64>,
}

impl DenominationPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.quantity.is_none()
            && self.frequency_label.is_none()
            && self.maintenance_type.is_none()
            && self.hours_per_event.is_none()
    }

    /// 将修改应用到记录上
    pub fn apply_to(&self, target: &mut MaintenanceDenomination) {
        if let Some(name) = &self.name {
            target.name = name.trim().to_string();
        }
        if let Some(quantity) = self.quantity {
            target.quantity = quantity;
        }
        if let Some(label) = &self.frequency_label {
            target.frequency_label = label.trim().to_string();
        }
        if let Some(kind) = &self.maintenance_type {
            target.maintenance_type = kind.trim().to_string();
        }
        if let Some(hours) = self.hours_per_event {
            target.hours_per_event = hours;
        }
    }
}

// ==========================================
// DenominationSort - 分页排序列
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenominationSort {
    #[default]
    RowNumber,
    Code,
    Name,
    Quantity,
    Frequency,
    Hours,
}

impl DenominationSort {
    /// 对应的数据库列名（白名单，避免拼接任意 SQL）
    pub fn column(self) -> &'static str {
        match self {
            DenominationSort::RowNumber => "row_number",
            DenominationSort::Code => "code",
            DenominationSort::Name => "name",
            DenominationSort::Quantity => "quantity",
            DenominationSort::Frequency => "frequency_label",
            DenominationSort::Hours => "hours_per_event",
        }
    }
}

// ==========================================
// DqViolation - 数据质量违规记录
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DqViolation {
    pub row_number: usize,
    pub code: Option<String>,
    pub level: DqLevel,
    pub field: String,
    pub message: String,
}

// ==========================================
// DqSummary - DQ 汇总统计
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DqSummary {
    pub total_rows: usize,
    pub success: usize,
    pub blocked: usize,
    pub warning: usize,
    pub conflict: usize,
}

// ==========================================
// ImportReport - 导入结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    pub table: DenominationTable,
    pub summary: DqSummary,
    pub violations: Vec<DqViolation>,
    #[serde(with = "duration_ms")]
    pub elapsed: Duration,
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MaintenanceDenomination {
        MaintenanceDenomination {
            code: "DH-001".to_string(),
            name: "Bomba de infusión".to_string(),
            quantity: 12,
            frequency_label: "mensual".to_string(),
            maintenance_type: "Preventivo".to_string(),
            hours_per_event: 1.5,
        }
    }

    #[test]
    fn test_total_annual_hours() {
        assert_eq!(sample().total_annual_hours(), 18.0);
    }

    #[test]
    fn test_patch_applies_only_present_fields() {
        let mut record = sample();
        let patch = DenominationPatch {
            frequency_label: Some("  Semestral ".to_string()),
            hours_per_event: Some(3.0),
            ..Default::default()
        };
        assert!(!patch.is_empty());
        patch.apply_to(&mut record);

        assert_eq!(record.frequency_label, "Semestral");
        assert_eq!(record.hours_per_event, 3.0);
        assert_eq!(record.quantity, 12);
        assert_eq!(record.name, "Bomba de infusión");
    }

    #[test]
    fn test_empty_patch() {
        assert!(DenominationPatch::default().is_empty());
    }
}
