// ==========================================
// GEEstor 维护计划 - 计划生成引擎
// ==========================================
// 职责: 逐行调用分配器，生成年度维护计划
// 输入: MaintenanceDenomination 列表（只读）
// 输出: MaintenancePlan（计划行 + 月度合计）
// ==========================================

use crate::domain::{MaintenanceDenomination, MaintenancePlan, MaintenancePlanRow, MonthlyDistribution};
use crate::engine::distributor::{round2, MonthlyHourDistributor};
use tracing::{debug, instrument};

// ==========================================
// MaintenancePlanBuilder - 计划生成器
// ==========================================
pub struct MaintenancePlanBuilder {
    distributor: MonthlyHourDistributor,
}

impl MaintenancePlanBuilder {
    pub fn new(distributor: MonthlyHourDistributor) -> Self {
        Self { distributor }
    }

    pub fn distributor(&self) -> &MonthlyHourDistributor {
        &self.distributor
    }

    /// 单行计划
    pub fn build_row(&self, denomination: &MaintenanceDenomination) -> MaintenancePlanRow {
        let total_hours = denomination.total_annual_hours();
        let (category, months) = self.distributor.distribute_classified(
            &denomination.frequency_label,
            total_hours,
            &denomination.name,
        );

        MaintenancePlanRow {
            code: denomination.code.clone(),
            name: denomination.name.clone(),
            quantity: denomination.quantity,
            maintenance_type: denomination.maintenance_type.clone(),
            hours_per_event: denomination.hours_per_event,
            total_hours,
            category,
            months,
        }
    }

    /// 生成年度计划（保持输入行顺序）
    #[instrument(skip(self, denominations), fields(count = denominations.len()))]
    pub fn build(&self, year: i32, denominations: &[MaintenanceDenomination]) -> MaintenancePlan {
        let rows: Vec<MaintenancePlanRow> =
            denominations.iter().map(|d| self.build_row(d)).collect();

        let mut monthly_totals = MonthlyDistribution::zeros();
        for row in &rows {
            monthly_totals.accumulate(&row.months);
        }
        let monthly_totals = MonthlyDistribution::new(monthly_totals.into_array().map(round2));
        let total_hours = round2(rows.iter().map(|r| r.total_hours).sum());

        debug!(year, rows = rows.len(), total_hours, "维护计划生成完成");

        MaintenancePlan {
            year,
            rows,
            monthly_totals,
            total_hours,
        }
    }
}

impl Default for MaintenancePlanBuilder {
    fn default() -> Self {
        Self::new(MonthlyHourDistributor::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FrequencyCategory, Month};

    fn denomination(code: &str, name: &str, qty: u32, freq: &str, hours: f64) -> MaintenanceDenomination {
        MaintenanceDenomination {
            code: code.to_string(),
            name: name.to_string(),
            quantity: qty,
            frequency_label: freq.to_string(),
            maintenance_type: "Preventivo".to_string(),
            hours_per_event: hours,
        }
    }

    #[test]
    fn test_build_row_uses_total_annual_hours() {
        let builder = MaintenancePlanBuilder::default();
        let row = builder.build_row(&denomination("DH1", "Autoclave", 4, "Trimestral", 25.0));

        assert_eq!(row.total_hours, 100.0);
        assert_eq!(row.category, FrequencyCategory::Quarterly);
        assert_eq!(row.months.get(Month::Marzo), 25.0);
        assert_eq!(row.months.get(Month::Enero), 0.0);
    }

    #[test]
    fn test_build_plan_totals() {
        let builder = MaintenancePlanBuilder::default();
        let input = vec![
            denomination("DH1", "Bomba de infusión", 12, "mensual", 2.0),
            denomination("DH2", "Quirófano 1 - Lámpara", 1, "anual", 6.0),
        ];
        let plan = builder.build(2026, &input);

        assert_eq!(plan.year, 2026);
        assert_eq!(plan.rows.len(), 2);
        assert_eq!(plan.rows[0].code, "DH1");
        assert_eq!(plan.total_hours, 30.0);
        assert_eq!(plan.monthly_totals.get(Month::Agosto), 8.0);
        assert_eq!(plan.monthly_totals.get(Month::Enero), 2.0);
    }

    #[test]
    fn test_build_does_not_mutate_input() {
        let builder = MaintenancePlanBuilder::default();
        let input = vec![denomination("DH1", "Autoclave", 1, "semestral", 3.0)];
        let before = input.clone();
        let _ = builder.build(2026, &input);
        assert_eq!(input, before);
    }

    #[test]
    fn test_empty_plan() {
        let plan = MaintenancePlanBuilder::default().build(2026, &[]);
        assert!(plan.is_empty());
        assert_eq!(plan.total_hours, 0.0);
    }
}
