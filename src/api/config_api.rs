// ==========================================
// GEEstor 维护计划 - 配置管理 API
// ==========================================
// 职责: 分配器关键字与单次工时缺省值的查询、更新
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, DistributorKeywords};
use std::collections::BTreeMap;
use std::sync::Arc;

pub struct ConfigApi {
    config_manager: Arc<ConfigManager>,
}

impl ConfigApi {
    pub fn new(config_manager: Arc<ConfigManager>) -> Self {
        Self { config_manager }
    }

    /// 所有 global 配置
    pub fn list_configs(&self) -> ApiResult<BTreeMap<String, String>> {
        Ok(self.config_manager.get_config_snapshot()?)
    }

    pub fn get_distributor_keywords(&self) -> ApiResult<DistributorKeywords> {
        Ok(self.config_manager.get_distributor_keywords()?)
    }

    /// 更新关键字；返回归一化后的结果
    pub fn update_distributor_keywords(
        &self,
        keywords: &DistributorKeywords,
    ) -> ApiResult<DistributorKeywords> {
        self.config_manager.set_distributor_keywords(keywords)?;
        self.get_distributor_keywords()
    }

    pub fn get_default_hours_per_event(&self) -> ApiResult<f64> {
        Ok(self.config_manager.get_default_hours_per_event()?)
    }

    pub fn update_default_hours_per_event(&self, hours: f64) -> ApiResult<f64> {
        if !hours.is_finite() || hours < 0.0 {
            return Err(ApiError::InvalidInput(format!(
                "单次工时必须为非负数: {}",
                hours
            )));
        }
        self.config_manager.set_default_hours_per_event(hours)?;
        self.get_default_hours_per_event()
    }
}
