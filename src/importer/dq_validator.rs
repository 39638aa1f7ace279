// ==========================================
// GEEstor 维护计划 - 数据质量校验器实现
// ==========================================
// 职责: 主键（编码）校验 + 行级字段校验
// 等级:
// - ERROR:    编码缺失（该行阻断）
// - CONFLICT: 同表内编码重复（后出现的行阻断）
// - WARNING:  名称缺失
// - INFO:     频次标签未识别（按月平均分配）
// ==========================================

use crate::domain::{DqLevel, DqViolation, FrequencyCategory, RawDenominationRecord};
use crate::domain::text::fold_for_match;
use crate::engine::MonthlyHourDistributor;
use crate::importer::importer_trait::DqValidator as DqValidatorTrait;
use std::collections::HashSet;

pub struct DqValidator {
    distributor: MonthlyHourDistributor,
}

impl DqValidator {
    pub fn new(distributor: MonthlyHourDistributor) -> Self {
        Self { distributor }
    }
}

impl DqValidatorTrait for DqValidator {
    fn validate_primary_key(&self, records: &[RawDenominationRecord]) -> Vec<DqViolation> {
        let mut violations = Vec::new();
        let mut seen = HashSet::new();

        for record in records {
            let code = match &record.code {
                Some(code) => code,
                None => {
                    violations.push(DqViolation {
                        row_number: record.row_number,
                        code: None,
                        level: DqLevel::Error,
                        field: "code".to_string(),
                        message: "编码缺失".to_string(),
                    });
                    continue;
                }
            };

            // 编码比较忽略大小写/重音（"dh-01" 与 "DH-01" 视为同一分组）
            if !seen.insert(fold_for_match(code)) {
                violations.push(DqViolation {
                    row_number: record.row_number,
                    code: Some(code.clone()),
                    level: DqLevel::Conflict,
                    field: "code".to_string(),
                    message: "重复编码（同表内）".to_string(),
                });
            }
        }

        violations
    }

    fn validate_fields(&self, record: &RawDenominationRecord) -> Vec<DqViolation> {
        let mut violations = Vec::new();

        if record.name.is_none() {
            violations.push(DqViolation {
                row_number: record.row_number,
                code: record.code.clone(),
                level: DqLevel::Warning,
                field: "name".to_string(),
                message: "名称缺失，月份放置使用默认规则".to_string(),
            });
        }

        let label = record.frequency_label.as_deref().unwrap_or("");
        if self.distributor.classify(label) == FrequencyCategory::Uniform {
            let message = if label.is_empty() {
                "频次缺失，按月平均分配".to_string()
            } else {
                format!("频次未识别: {}，按月平均分配", label)
            };
            violations.push(DqViolation {
                row_number: record.row_number,
                code: record.code.clone(),
                level: DqLevel::Info,
                field: "frequency_label".to_string(),
                message,
            });
        }

        violations
    }
}
