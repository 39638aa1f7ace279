// ==========================================
// GEEstor 维护计划 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::distributor_keywords::DistributorKeywords;
use crate::db::{configure_sqlite_connection, ensure_schema, open_sqlite_connection};
use crate::domain::DEFAULT_HOURS_PER_EVENT;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, info};

const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ConfigError - 配置层错误
// ==========================================
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("数据库错误: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("锁获取失败: {0}")]
    LockError(String),

    #[error("配置值格式错误: key={key}, {message}")]
    InvalidValue { key: String, message: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        ensure_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager（PRAGMA 与 schema 幂等）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| ConfigError::LockError(e.to_string()))?;
            configure_sqlite_connection(&guard)?;
            ensure_schema(&guard)?;
        }

        Ok(Self { conn })
    }

    fn get_conn(&self) -> ConfigResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ConfigError::LockError(e.to_string()))
    }

    /// 读取 global scope 的配置值
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
                params![GLOBAL_SCOPE, key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3, updated_at = datetime('now')",
            params![GLOBAL_SCOPE, key, value],
        )?;
        debug!(key = key, "配置已写入");
        Ok(())
    }

    /// 获取所有 global 配置的快照
    pub fn get_config_snapshot(&self) -> ConfigResult<BTreeMap<String, String>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key")?;
        let rows = stmt.query_map(params![GLOBAL_SCOPE], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut snapshot = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            snapshot.insert(key, value);
        }
        Ok(snapshot)
    }

    // ===== 分配器关键字 =====

    /// 获取设备名称关键字（缺省为内置关键字）
    pub fn get_distributor_keywords(&self) -> ConfigResult<DistributorKeywords> {
        match self.get_global_config_value(config_keys::DISTRIBUTOR_KEYWORDS)? {
            Some(raw) => serde_json::from_str(&raw).map_err(|e| ConfigError::InvalidValue {
                key: config_keys::DISTRIBUTOR_KEYWORDS.to_string(),
                message: e.to_string(),
            }),
            None => Ok(DistributorKeywords::default()),
        }
    }

    /// 覆写设备名称关键字（写入前归一化）
    pub fn set_distributor_keywords(&self, keywords: &DistributorKeywords) -> ConfigResult<()> {
        let normalized = keywords.normalized();
        let raw = serde_json::to_string(&normalized).map_err(|e| ConfigError::InvalidValue {
            key: config_keys::DISTRIBUTOR_KEYWORDS.to_string(),
            message: e.to_string(),
        })?;
        self.set_global_config_value(config_keys::DISTRIBUTOR_KEYWORDS, &raw)?;
        info!("分配器关键字已更新");
        Ok(())
    }

    // ===== 导入缺省值 =====

    /// 获取单次维护工时缺省值（缺省 2）
    pub fn get_default_hours_per_event(&self) -> ConfigResult<f64> {
        match self.get_global_config_value(config_keys::DEFAULT_HOURS_PER_EVENT)? {
            Some(raw) => parse_hours(&raw),
            None => Ok(DEFAULT_HOURS_PER_EVENT),
        }
    }

    pub fn set_default_hours_per_event(&self, hours: f64) -> ConfigResult<()> {
        if !hours.is_finite() || hours < 0.0 {
            return Err(ConfigError::InvalidValue {
                key: config_keys::DEFAULT_HOURS_PER_EVENT.to_string(),
                message: format!("工时必须为非负数: {}", hours),
            });
        }
        self.set_global_config_value(config_keys::DEFAULT_HOURS_PER_EVENT, &hours.to_string())?;
        info!(hours = hours, "单次工时缺省值已更新");
        Ok(())
    }
}

fn parse_hours(raw: &str) -> ConfigResult<f64> {
    let invalid = |message: String| ConfigError::InvalidValue {
        key: config_keys::DEFAULT_HOURS_PER_EVENT.to_string(),
        message,
    };
    let hours = raw
        .trim()
        .parse::<f64>()
        .map_err(|e| invalid(format!("{}: {}", raw, e)))?;
    if !hours.is_finite() || hours < 0.0 {
        return Err(invalid(format!("工时必须为非负数: {}", raw)));
    }
    Ok(hours)
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    /// 设备名称关键字 (JSON)
    pub const DISTRIBUTOR_KEYWORDS: &str = "maintenance.distributor_keywords";
    /// 单次维护工时缺省值
    pub const DEFAULT_HOURS_PER_EVENT: &str = "maintenance.default_hours_per_event";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EquipmentKeywords;

    fn manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_defaults_when_missing() {
        let mgr = manager();
        assert_eq!(mgr.get_distributor_keywords().unwrap(), DistributorKeywords::default());
        assert_eq!(mgr.get_default_hours_per_event().unwrap(), 2.0);
    }

    #[test]
    fn test_keywords_roundtrip_normalized() {
        let mgr = manager();
        let mut keywords = DistributorKeywords::default();
        keywords.annual = EquipmentKeywords {
            cold_chain: vec![" nevera ".to_string(), "".to_string(), "nevera".to_string()],
            surgical: vec!["quirofano".to_string()],
        };
        mgr.set_distributor_keywords(&keywords).unwrap();

        let loaded = mgr.get_distributor_keywords().unwrap();
        assert_eq!(loaded.annual.cold_chain, vec!["nevera".to_string()]);
        assert_eq!(loaded.semiannual, DistributorKeywords::default().semiannual);
    }

    #[test]
    fn test_malformed_keywords_is_error() {
        let mgr = manager();
        mgr.set_global_config_value(config_keys::DISTRIBUTOR_KEYWORDS, "{not json")
            .unwrap();
        let result = mgr.get_distributor_keywords();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_default_hours() {
        let mgr = manager();
        mgr.set_default_hours_per_event(3.5).unwrap();
        assert_eq!(mgr.get_default_hours_per_event().unwrap(), 3.5);

        assert!(mgr.set_default_hours_per_event(-1.0).is_err());

        mgr.set_global_config_value(config_keys::DEFAULT_HOURS_PER_EVENT, "abc")
            .unwrap();
        assert!(mgr.get_default_hours_per_event().is_err());
    }

    #[test]
    fn test_snapshot() {
        let mgr = manager();
        mgr.set_default_hours_per_event(1.0).unwrap();
        let snapshot = mgr.get_config_snapshot().unwrap();
        assert_eq!(
            snapshot.get(config_keys::DEFAULT_HOURS_PER_EVENT),
            Some(&"1".to_string())
        );
    }
}
