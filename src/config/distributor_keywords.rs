// ==========================================
// GEEstor 维护计划 - 设备名称启发式关键字
// ==========================================
// 存储: config_kv (key = maintenance.distributor_keywords, JSON)
// 用途: 半年/年度频次按设备名称决定月份放置
// ==========================================

use serde::{Deserialize, Serialize};

/// 一组设备类别关键字（冷链 / 手术室）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentKeywords {
    /// 冷链设备（冰箱、冷柜、制冷设备）
    pub cold_chain: Vec<String>,
    /// 手术室设备
    pub surgical: Vec<String>,
}

/// 分配器使用的全部关键字集合
///
/// 半年与年度频次使用各自的关键字列表，且判定优先级不同：
/// - 半年: 冷链优先于手术室
/// - 年度: 手术室优先于冷链
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributorKeywords {
    pub semiannual: EquipmentKeywords,
    pub annual: EquipmentKeywords,
}

impl Default for DistributorKeywords {
    fn default() -> Self {
        Self {
            semiannual: EquipmentKeywords {
                cold_chain: to_owned(&["frigorifico", "frio", "refriger"]),
                surgical: to_owned(&["quirofano", "cirugia", "quirurgic"]),
            },
            annual: EquipmentKeywords {
                cold_chain: to_owned(&["frigorifico", "frio"]),
                surgical: to_owned(&["quirofano", "cirugia"]),
            },
        }
    }
}

impl EquipmentKeywords {
    /// 去空白、去空项、去重（保持原顺序）
    pub fn normalized(&self) -> Self {
        Self {
            cold_chain: normalize_list(&self.cold_chain),
            surgical: normalize_list(&self.surgical),
        }
    }
}

impl DistributorKeywords {
    pub fn normalized(&self) -> Self {
        Self {
            semiannual: self.semiannual.normalized(),
            annual: self.annual.normalized(),
        }
    }
}

fn to_owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn normalize_list(values: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for v in values {
        let trimmed = v.trim();
        if trimmed.is_empty() || out.iter().any(|x| x == trimmed) {
            continue;
        }
        out.push(trimmed.to_string());
    }
    out
}
