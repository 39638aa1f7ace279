// ==========================================
// GEEstor 维护计划 - 月度工时分配引擎
// ==========================================
// 职责: 频次标签 + 年度总工时 + 设备名称 → 12 个月的工时
// 红线: 纯函数，任何输入都返回 12 个值，不报错
// ==========================================
// 规则按顺序匹配（命中即返回）:
// 1) 含 "mensual"   → 12 个月平均
// 2) 含 "trimestral" → 3/6/9/12 月各 1/4
// 3) 含 "semestral"  → 按设备名称放置 2 个月，各 1/2
// 4) 词首 "anual"    → 按设备名称放置 1 个月
// 5) 其他/空         → 12 个月平均
// 每月值独立四舍五入到 2 位小数，不修正累计误差
// ==========================================

use crate::config::DistributorKeywords;
use crate::domain::text::{contains_any, contains_word_prefix, fold_for_match};
use crate::domain::types::{FrequencyCategory, Month, MONTHS_PER_YEAR};
use crate::domain::MonthlyDistribution;
use tracing::debug;

/// 四舍五入到 2 位小数
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ==========================================
// FrequencyMatcher - 频次标签匹配方式
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrequencyMatcher {
    /// 子串包含（忽略大小写/重音）
    Contains(String),
    /// 单词前缀（"anuales" 命中 "anual"，"bianual" 不命中）
    WordPrefix(String),
}

impl FrequencyMatcher {
    fn matches(&self, folded_label: &str) -> bool {
        match self {
            FrequencyMatcher::Contains(needle) => folded_label.contains(&fold_for_match(needle)),
            FrequencyMatcher::WordPrefix(prefix) => contains_word_prefix(folded_label, prefix),
        }
    }
}

// ==========================================
// PlacementRule - 按设备名称的月份放置
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementRule {
    pub label: &'static str,
    pub keywords: Vec<String>,
    pub months: Vec<Month>,
}

// ==========================================
// Allocation - 分配策略
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Allocation {
    /// 12 个月平均
    Uniform,
    /// 固定月份等分
    Fixed(Vec<Month>),
    /// 按设备名称选择月份（依次匹配，均不命中用 default）
    ByEquipment {
        placements: Vec<PlacementRule>,
        default: Vec<Month>,
    },
}

impl Allocation {
    /// 计算该策略下的目标月份
    pub fn target_months(&self, folded_name: &str) -> Vec<Month> {
        match self {
            Allocation::Uniform => Month::ALL.to_vec(),
            Allocation::Fixed(months) => months.clone(),
            Allocation::ByEquipment {
                placements,
                default,
            } => placements
                .iter()
                .find(|p| contains_any(folded_name, &p.keywords))
                .map(|p| p.months.clone())
                .unwrap_or_else(|| default.clone()),
        }
    }

    fn allocate(&self, total_hours: f64, folded_name: &str) -> MonthlyDistribution {
        let months = self.target_months(folded_name);
        let mut dist = MonthlyDistribution::zeros();
        if months.is_empty() {
            return dist;
        }

        let share = round2(total_hours / months.len() as f64);
        for month in months {
            dist.set(month, share);
        }
        dist
    }
}

// ==========================================
// DistributionRule - (匹配条件, 分配策略) 对
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionRule {
    pub category: FrequencyCategory,
    pub matcher: FrequencyMatcher,
    pub allocation: Allocation,
}

// ==========================================
// MonthlyHourDistributor - 月度工时分配器
// ==========================================
#[derive(Debug, Clone)]
pub struct MonthlyHourDistributor {
    rules: Vec<DistributionRule>,
}

impl MonthlyHourDistributor {
    /// 以给定关键字构造标准规则表
    pub fn new(keywords: &DistributorKeywords) -> Self {
        Self::with_rules(standard_rules(&keywords.normalized()))
    }

    /// 以自定义规则表构造（未命中任何规则时按月平均）
    pub fn with_rules(rules: Vec<DistributionRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[DistributionRule] {
        &self.rules
    }

    /// 频次标签命中的类别
    pub fn classify(&self, frequency_label: &str) -> FrequencyCategory {
        let folded = fold_for_match(frequency_label);
        self.match_rule(&folded)
            .map(|r| r.category)
            .unwrap_or(FrequencyCategory::Uniform)
    }

    /// 分配年度工时到 12 个月
    pub fn distribute(
        &self,
        frequency_label: &str,
        total_annual_hours: f64,
        equipment_name: &str,
    ) -> MonthlyDistribution {
        self.distribute_classified(frequency_label, total_annual_hours, equipment_name)
            .1
    }

    /// 分配并返回命中的类别
    pub fn distribute_classified(
        &self,
        frequency_label: &str,
        total_annual_hours: f64,
        equipment_name: &str,
    ) -> (FrequencyCategory, MonthlyDistribution) {
        let total = if total_annual_hours.is_finite() && total_annual_hours > 0.0 {
            total_annual_hours
        } else {
            if total_annual_hours != 0.0 {
                debug!(total_annual_hours, "年度工时非法，按 0 处理");
            }
            0.0
        };

        let folded_label = fold_for_match(frequency_label);
        let folded_name = fold_for_match(equipment_name);

        match self.match_rule(&folded_label) {
            Some(rule) => (rule.category, rule.allocation.allocate(total, &folded_name)),
            None => (
                FrequencyCategory::Uniform,
                Allocation::Uniform.allocate(total, &folded_name),
            ),
        }
    }

    fn match_rule(&self, folded_label: &str) -> Option<&DistributionRule> {
        self.rules.iter().find(|r| r.matcher.matches(folded_label))
    }
}

impl Default for MonthlyHourDistributor {
    fn default() -> Self {
        Self::new(&DistributorKeywords::default())
    }
}

/// 标准规则表（顺序即优先级）
pub fn standard_rules(keywords: &DistributorKeywords) -> Vec<DistributionRule> {
    use Month::*;

    vec![
        DistributionRule {
            category: FrequencyCategory::Monthly,
            matcher: FrequencyMatcher::Contains("mensual".to_string()),
            allocation: Allocation::Uniform,
        },
        DistributionRule {
            category: FrequencyCategory::Quarterly,
            matcher: FrequencyMatcher::Contains("trimestral".to_string()),
            allocation: Allocation::Fixed(vec![Marzo, Junio, Septiembre, Diciembre]),
        },
        DistributionRule {
            category: FrequencyCategory::Semiannual,
            matcher: FrequencyMatcher::Contains("semestral".to_string()),
            allocation: Allocation::ByEquipment {
                placements: vec![
                    PlacementRule {
                        label: "cold_chain",
                        keywords: keywords.semiannual.cold_chain.clone(),
                        months: vec![Abril, Octubre],
                    },
                    PlacementRule {
                        label: "surgical",
                        keywords: keywords.semiannual.surgical.clone(),
                        months: vec![Julio, Agosto],
                    },
                ],
                default: vec![Junio, Diciembre],
            },
        },
        DistributionRule {
            category: FrequencyCategory::Annual,
            matcher: FrequencyMatcher::WordPrefix("anual".to_string()),
            allocation: Allocation::ByEquipment {
                placements: vec![
                    PlacementRule {
                        label: "surgical",
                        keywords: keywords.annual.surgical.clone(),
                        months: vec![Agosto],
                    },
                    PlacementRule {
                        label: "cold_chain",
                        keywords: keywords.annual.cold_chain.clone(),
                        months: vec![Abril],
                    },
                ],
                default: vec![Junio],
            },
        },
    ]
}

/// 便捷函数：使用默认关键字分配
pub fn distribute(
    frequency_label: &str,
    total_annual_hours: f64,
    equipment_name: &str,
) -> [f64; MONTHS_PER_YEAR] {
    MonthlyHourDistributor::default()
        .distribute(frequency_label, total_annual_hours, equipment_name)
        .into_array()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EquipmentKeywords;

    fn approx(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    fn non_zero_indices(values: &[f64; 12]) -> Vec<usize> {
        values
            .iter()
            .enumerate()
            .filter(|(_, v)| **v != 0.0)
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn test_monthly_even_split() {
        let out = distribute("mensual", 240.0, "Bomba de infusión");
        assert_eq!(out, [20.0; 12]);
    }

    #[test]
    fn test_quarterly_fixed_months() {
        let out = distribute("trimestral", 400.0, "Autoclave");
        assert_eq!(non_zero_indices(&out), vec![2, 5, 8, 11]);
        for i in [2, 5, 8, 11] {
            assert_eq!(out[i], 100.0);
        }
    }

    #[test]
    fn test_annual_surgical_goes_to_august() {
        let out = distribute("anual", 120.0, "Quirófano 2 - Torre de laparoscopia");
        assert_eq!(non_zero_indices(&out), vec![7]);
        assert_eq!(out[7], 120.0);
    }

    #[test]
    fn test_annual_cold_chain_goes_to_april() {
        let out = distribute("Anual", 10.0, "Cámara de frío");
        assert_eq!(non_zero_indices(&out), vec![3]);
        assert_eq!(out[3], 10.0);
    }

    #[test]
    fn test_annual_default_june() {
        let out = distribute("ANUAL", 7.5, "Electrocardiógrafo");
        assert_eq!(non_zero_indices(&out), vec![5]);
        assert_eq!(out[5], 7.5);
    }

    #[test]
    fn test_annual_surgical_wins_over_cold_chain() {
        let out = distribute("anual", 4.0, "Frigorífico quirófano 3");
        assert_eq!(non_zero_indices(&out), vec![7]);
    }

    #[test]
    fn test_annual_keyword_set_is_narrower() {
        // "refriger" 仅用于半年频次
        let out = distribute("anual", 4.0, "Refrigerador de sangre");
        assert_eq!(non_zero_indices(&out), vec![5]);
    }

    #[test]
    fn test_semiannual_cold_chain_wins_tie() {
        let out = distribute("Semestral", 10.0, "Frigorífico quirófano 3");
        assert_eq!(non_zero_indices(&out), vec![3, 9]);
        assert_eq!(out[3], 5.0);
        assert_eq!(out[9], 5.0);
    }

    #[test]
    fn test_semiannual_surgical() {
        let out = distribute("semestral", 9.0, "Mesa quirúrgica");
        assert_eq!(non_zero_indices(&out), vec![6, 7]);
        assert_eq!(out[6], 4.5);
    }

    #[test]
    fn test_semiannual_default() {
        let out = distribute("semestral", 3.0, "Desfibrilador");
        assert_eq!(non_zero_indices(&out), vec![5, 11]);
        assert_eq!(out[5], 1.5);
    }

    #[test]
    fn test_annual_inflected_forms() {
        let d = MonthlyHourDistributor::default();
        for label in ["Anuales", "anualmente", "revisión anual"] {
            assert_eq!(d.classify(label), FrequencyCategory::Annual, "{}", label);
            let out = distribute(label, 12.0, "Autoclave");
            assert_eq!(non_zero_indices(&out), vec![5], "{}", label);
            assert_eq!(out[5], 12.0);
        }
        assert_eq!(d.classify("plurianual"), FrequencyCategory::Uniform);
    }

    #[test]
    fn test_case_insensitive_monthly() {
        for label in ["MENSUAL", "Mensual", "mensual (preventivo)"] {
            let d = MonthlyHourDistributor::default();
            assert_eq!(d.classify(label), FrequencyCategory::Monthly, "{}", label);
        }
    }

    #[test]
    fn test_unknown_frequency_falls_back_to_uniform() {
        let d = MonthlyHourDistributor::default();
        assert_eq!(d.classify("bianual"), FrequencyCategory::Uniform);
        assert_eq!(d.classify(""), FrequencyCategory::Uniform);
        assert_eq!(d.classify("diario"), FrequencyCategory::Uniform);

        let out = distribute("bianual", 24.0, "Autoclave");
        assert_eq!(out, [2.0; 12]);
    }

    #[test]
    fn test_substring_precedence() {
        let d = MonthlyHourDistributor::default();
        assert_eq!(d.classify("bimensual"), FrequencyCategory::Monthly);
        assert_eq!(d.classify("cuatrimestral"), FrequencyCategory::Quarterly);
    }

    #[test]
    fn test_uniform_rounding_is_not_corrected() {
        let out = distribute("mensual", 100.0, "x");
        assert_eq!(out, [8.33; 12]);
        let sum: f64 = out.iter().sum();
        assert!(approx(sum, 100.0, 0.06));
        assert!(sum != 100.0);
    }

    #[test]
    fn test_conservation_tolerances() {
        for total in [0.0, 1.0, 7.77, 13.0, 100.0, 1234.56, 99_999.99] {
            let sum = |v: [f64; 12]| v.iter().sum::<f64>();
            assert!(approx(sum(distribute("mensual", total, "x")), total, 0.06));
            assert!(approx(sum(distribute("", total, "x")), total, 0.06));
            assert!(approx(sum(distribute("trimestral", total, "x")), total, 0.02));
            assert!(approx(sum(distribute("semestral", total, "x")), total, 0.02));
            assert!(approx(sum(distribute("anual", total, "x")), total, 0.01));
        }
    }

    #[test]
    fn test_negative_and_nan_totals_clamp_to_zero() {
        assert_eq!(distribute("mensual", -10.0, "x"), [0.0; 12]);
        assert_eq!(distribute("anual", f64::NAN, "x"), [0.0; 12]);
    }

    #[test]
    fn test_injected_keywords() {
        let mut kw = DistributorKeywords::default();
        kw.semiannual = EquipmentKeywords {
            cold_chain: vec!["vacuna".to_string()],
            surgical: vec![],
        };
        let d = MonthlyHourDistributor::new(&kw);

        let out = d.distribute("semestral", 2.0, "Nevera de vacunas").into_array();
        assert_eq!(non_zero_indices(&out), vec![3, 9]);

        // 默认关键字不再生效
        let out = d.distribute("semestral", 2.0, "Frigorífico").into_array();
        assert_eq!(non_zero_indices(&out), vec![5, 11]);
    }

    #[test]
    fn test_custom_rule_table() {
        let d = MonthlyHourDistributor::with_rules(vec![DistributionRule {
            category: FrequencyCategory::Annual,
            matcher: FrequencyMatcher::Contains("revision".to_string()),
            allocation: Allocation::Fixed(vec![Month::Enero]),
        }]);
        let (category, dist) = d.distribute_classified("Revisión", 5.0, "x");
        assert_eq!(category, FrequencyCategory::Annual);
        assert_eq!(dist.get(Month::Enero), 5.0);
        assert_eq!(d.classify("mensual"), FrequencyCategory::Uniform);
    }
}
