// ==========================================
// GEEstor 维护计划 - 计划领域模型
// ==========================================
// 职责: 月度分配结果、计划行、年度计划
// ==========================================

use crate::domain::types::{FrequencyCategory, Month, MONTHS_PER_YEAR};
use serde::{Deserialize, Serialize};

// ==========================================
// MonthlyDistribution - 月度工时分配
// ==========================================
// 不变量: 恰好 12 个非负值，下标 0 = 一月
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MonthlyDistribution([f64; MONTHS_PER_YEAR]);

impl MonthlyDistribution {
    pub fn new(values: [f64; MONTHS_PER_YEAR]) -> Self {
        Self(values)
    }

    pub fn zeros() -> Self {
        Self([0.0; MONTHS_PER_YEAR])
    }

    pub fn get(&self, month: Month) -> f64 {
        self.0[month.index()]
    }

    pub fn values(&self) -> &[f64; MONTHS_PER_YEAR] {
        &self.0
    }

    pub fn into_array(self) -> [f64; MONTHS_PER_YEAR] {
        self.0
    }

    /// 12 个月之和（含逐月四舍五入误差）
    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    /// 非零月份（按日历顺序）
    pub fn active_months(&self) -> Vec<Month> {
        Month::ALL
            .iter()
            .copied()
            .filter(|m| self.0[m.index()] != 0.0)
            .collect()
    }

    pub(crate) fn set(&mut self, month: Month, hours: f64) {
        self.0[month.index()] = hours;
    }

    pub(crate) fn accumulate(&mut self, other: &MonthlyDistribution) {
        for (acc, value) in self.0.iter_mut().zip(other.0.iter()) {
            *acc += value;
        }
    }
}

impl From<MonthlyDistribution> for [f64; MONTHS_PER_YEAR] {
    fn from(value: MonthlyDistribution) -> Self {
        value.0
    }
}

// ==========================================
// MaintenancePlanRow - 计划行（对应 CSV 一行）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenancePlanRow {
    pub code: String,
    pub name: String,
    pub quantity: u32,
    pub maintenance_type: String,
    pub hours_per_event: f64,
    pub total_hours: f64,
    pub category: FrequencyCategory, // 命中的分配规则
    pub months: MonthlyDistribution,
}

// ==========================================
// MaintenancePlan - 年度维护计划
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenancePlan {
    pub year: i32,
    pub rows: Vec<MaintenancePlanRow>,
    pub monthly_totals: MonthlyDistribution, // 各月合计（逐行值直接相加）
    pub total_hours: f64,
}

impl MaintenancePlan {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_months() {
        let mut dist = MonthlyDistribution::zeros();
        dist.set(Month::Abril, 5.0);
        dist.set(Month::Octubre, 5.0);
        assert_eq!(dist.active_months(), vec![Month::Abril, Month::Octubre]);
        assert_eq!(dist.total(), 10.0);
    }

    #[test]
    fn test_accumulate() {
        let mut acc = MonthlyDistribution::zeros();
        acc.accumulate(&MonthlyDistribution::new([1.0; 12]));
        acc.accumulate(&MonthlyDistribution::new([0.5; 12]));
        assert_eq!(acc.get(Month::Julio), 1.5);
    }
}
