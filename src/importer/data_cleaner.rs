// ==========================================
// GEEstor 维护计划 - 数据清洗器实现
// ==========================================
// 职责: TRIM / 空值标准化 / 数值解析 / 缺省值回填
// 规则:
// - 单次工时缺失 → 缺省值（INFO）；无法解析或为负 → 缺省值（WARNING）
// - 台数缺失/无法解析/为负 → 0（WARNING）；非整数 → 四舍五入（WARNING）
// ==========================================

use crate::domain::{DqLevel, DqViolation, MaintenanceDenomination, RawDenominationRecord};
use crate::importer::importer_trait::DataCleaner as DataCleanerTrait;

pub struct DataCleaner;

impl DataCleanerTrait for DataCleaner {
    fn clean_text(&self, value: &str) -> String {
        value.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn parse_decimal(&self, value: &str) -> Option<f64> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }
        // "1,5" → "1.5"；含千分位点的 "1.234,5" → "1234.5"
        let normalized = if trimmed.contains(',') {
            trimmed.replace('.', "").replace(',', ".")
        } else {
            trimmed.to_string()
        };
        normalized.parse::<f64>().ok().filter(|v| v.is_finite())
    }

    fn clean_record(
        &self,
        raw: &RawDenominationRecord,
        default_hours: f64,
    ) -> (MaintenanceDenomination, Vec<DqViolation>) {
        let mut violations = Vec::new();

        let quantity = self.clean_quantity(raw, &mut violations);
        let hours_per_event = self.clean_hours(raw, default_hours, &mut violations);

        let denomination = MaintenanceDenomination {
            code: self.clean_optional(&raw.code),
            name: self.clean_optional(&raw.name),
            quantity,
            frequency_label: self.clean_optional(&raw.frequency_label),
            maintenance_type: self.clean_optional(&raw.maintenance_type),
            hours_per_event,
        };

        (denomination, violations)
    }
}

impl DataCleaner {
    fn clean_optional(&self, value: &Option<String>) -> String {
        value
            .as_deref()
            .map(|v| self.clean_text(v))
            .unwrap_or_default()
    }

    fn violation(raw: &RawDenominationRecord, level: DqLevel, field: &str, message: String) -> DqViolation {
        DqViolation {
            row_number: raw.row_number,
            code: raw.code.clone(),
            level,
            field: field.to_string(),
            message,
        }
    }

    fn clean_quantity(&self, raw: &RawDenominationRecord, violations: &mut Vec<DqViolation>) -> u32 {
        let value = match raw.quantity_raw.as_deref() {
            None => {
                violations.push(Self::violation(
                    raw,
                    DqLevel::Warning,
                    "quantity",
                    "台数缺失，按 0 处理".to_string(),
                ));
                return 0;
            }
            Some(text) => match self.parse_decimal(text) {
                Some(v) => v,
                None => {
                    violations.push(Self::violation(
                        raw,
                        DqLevel::Warning,
                        "quantity",
                        format!("台数无法解析: {}，按 0 处理", text),
                    ));
                    return 0;
                }
            },
        };

        if value < 0.0 {
            violations.push(Self::violation(
                raw,
                DqLevel::Warning,
                "quantity",
                format!("台数为负数: {}，按 0 处理", value),
            ));
            return 0;
        }

        if value.fract() != 0.0 {
            violations.push(Self::violation(
                raw,
                DqLevel::Warning,
                "quantity",
                format!("台数非整数: {}，已四舍五入", value),
            ));
        }

        if value == 0.0 {
            violations.push(Self::violation(
                raw,
                DqLevel::Warning,
                "quantity",
                "台数为 0，该行不产生工时".to_string(),
            ));
        }

        value.round().min(f64::from(u32::MAX)) as u32
    }

    fn clean_hours(
        &self,
        raw: &RawDenominationRecord,
        default_hours: f64,
        violations: &mut Vec<DqViolation>,
    ) -> f64 {
        match raw.hours_raw.as_deref() {
            None => {
                violations.push(Self::violation(
                    raw,
                    DqLevel::Info,
                    "hours_per_event",
                    format!("单次工时缺失，使用缺省值 {}", default_hours),
                ));
                default_hours
            }
            Some(text) => match self.parse_decimal(text) {
                Some(v) if v >= 0.0 => v,
                Some(v) => {
                    violations.push(Self::violation(
                        raw,
                        DqLevel::Warning,
                        "hours_per_event",
                        format!("单次工时为负数: {}，使用缺省值 {}", v, default_hours),
                    ));
                    default_hours
                }
                None => {
                    violations.push(Self::violation(
                        raw,
                        DqLevel::Warning,
                        "hours_per_event",
                        format!("单次工时无法解析: {}，使用缺省值 {}", text, default_hours),
                    ));
                    default_hours
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DEFAULT_HOURS_PER_EVENT;

    fn raw(quantity: Option<&str>, hours: Option<&str>) -> RawDenominationRecord {
        RawDenominationRecord {
            code: Some("DH1".to_string()),
            name: Some("  Monitor   de  constantes ".to_string()),
            quantity_raw: quantity.map(String::from),
            frequency_label: Some("Semestral".to_string()),
            maintenance_type: None,
            hours_raw: hours.map(String::from),
            row_number: 3,
        }
    }

    #[test]
    fn test_parse_decimal() {
        let c = DataCleaner;
        assert_eq!(c.parse_decimal("1,5"), Some(1.5));
        assert_eq!(c.parse_decimal(" 2.25 "), Some(2.25));
        assert_eq!(c.parse_decimal("1.234,5"), Some(1234.5));
        assert_eq!(c.parse_decimal("abc"), None);
        assert_eq!(c.parse_decimal(""), None);
        assert_eq!(c.parse_decimal("NaN"), None);
    }

    #[test]
    fn test_clean_record_valid() {
        let (d, violations) = DataCleaner.clean_record(&raw(Some("4"), Some("1,5")), DEFAULT_HOURS_PER_EVENT);
        assert!(violations.is_empty());
        assert_eq!(d.code, "DH1");
        assert_eq!(d.name, "Monitor de constantes");
        assert_eq!(d.quantity, 4);
        assert_eq!(d.hours_per_event, 1.5);
        assert_eq!(d.maintenance_type, "");
    }

    #[test]
    fn test_missing_hours_defaults_with_info() {
        let (d, violations) = DataCleaner.clean_record(&raw(Some("1"), None), DEFAULT_HOURS_PER_EVENT);
        assert_eq!(d.hours_per_event, 2.0);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].level, DqLevel::Info);
    }

    #[test]
    fn test_bad_hours_defaults_with_warning() {
        for bad in ["dos", "-3"] {
            let (d, violations) = DataCleaner.clean_record(&raw(Some("1"), Some(bad)), 2.0);
            assert_eq!(d.hours_per_event, 2.0);
            assert_eq!(violations[0].level, DqLevel::Warning);
            assert_eq!(violations[0].field, "hours_per_event");
        }
    }

    #[test]
    fn test_quantity_defects() {
        let (d, v) = DataCleaner.clean_record(&raw(None, Some("1")), 2.0);
        assert_eq!(d.quantity, 0);
        assert_eq!(v[0].field, "quantity");

        let (d, v) = DataCleaner.clean_record(&raw(Some("-2"), Some("1")), 2.0);
        assert_eq!(d.quantity, 0);
        assert_eq!(v.len(), 1);

        let (d, v) = DataCleaner.clean_record(&raw(Some("2,6"), Some("1")), 2.0);
        assert_eq!(d.quantity, 3);
        assert_eq!(v.len(), 1);
    }
}
