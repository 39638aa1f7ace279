// ==========================================
// 配置集成测试
// ==========================================
// 测试目标: 关键字/缺省工时配置对分配与导入的影响
// ==========================================


use geestor_plan::api::{ApiError, ConfigApi, MaintenancePlanApi};
use geestor_plan::config::{config_keys, ConfigManager, DistributorKeywords, EquipmentKeywords};
use geestor_plan::domain::{FrequencyCategory, Month};
use std::sync::Arc;
use tempfile::TempDir;
use test_helpers::{create_test_db, write_file};

fn open(db_path: &str) -> (MaintenancePlanApi, ConfigApi) {
    let api = MaintenancePlanApi::open(db_path).unwrap();
    let config_api = ConfigApi::new(api.config_manager());
    (api, config_api)
}

#[test]
fn test_defaults_on_fresh_database() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let (_api, config_api) = open(&db_path);

    assert_eq!(
        config_api.get_distributor_keywords().unwrap(),
        DistributorKeywords::default()
    );
    assert_eq!(config_api.get_default_hours_per_event().unwrap(), 2.0);
    assert!(config_api.list_configs().unwrap().is_empty());
}

#[test]
fn test_custom_keywords_change_placement() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let (api, config_api) = open(&db_path);

    let before = api.preview_distribution("anual", 10.0, "Nevera vacunas").unwrap();
    assert_eq!(before.months.active_months(), vec![Month::Junio]);

    let mut keywords = DistributorKeywords::default();
    keywords.annual = EquipmentKeywords {
        cold_chain: vec!["nevera".to_string(), "frigorifico".to_string()],
        surgical: vec!["quirofano".to_string()],
    };
    config_api.update_distributor_keywords(&keywords).unwrap();

    let after = api.preview_distribution("anual", 10.0, "Nevera vacunas").unwrap();
    assert_eq!(after.category, FrequencyCategory::Annual);
    assert_eq!(after.months.active_months(), vec![Month::Abril]);
    assert_eq!(after.months.get(Month::Abril), 10.0);

    // 半年频次关键字未改动
    let semi = api.preview_distribution("semestral", 10.0, "Nevera vacunas").unwrap();
    assert_eq!(semi.months.active_months(), vec![Month::Junio, Month::Diciembre]);
}

#[test]
fn test_keywords_persist_across_connections() {
    let (_tmp, db_path) = create_test_db().unwrap();
    {
        let (_api, config_api) = open(&db_path);
        let mut keywords = DistributorKeywords::default();
        keywords.semiannual.surgical.push("  endoscopia ".to_string());
        config_api.update_distributor_keywords(&keywords).unwrap();
    }

    let manager = ConfigManager::new(&db_path).unwrap();
    let keywords = manager.get_distributor_keywords().unwrap();
    assert!(keywords.semiannual.surgical.contains(&"endoscopia".to_string()));
}

#[test]
fn test_default_hours_applies_to_import() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let (api, config_api) = open(&db_path);

    assert_eq!(config_api.update_default_hours_per_event(3.0).unwrap(), 3.0);
    assert!(matches!(
        config_api.update_default_hours_per_event(f64::NAN),
        Err(ApiError::InvalidInput(_))
    ));

    let dir = TempDir::new().unwrap();
    let file = write_file(
        dir.path(),
        "equipos.csv",
        "CÓDIGO;DENOMINACIÓN;CANTIDAD;FRECUENCIA\nDH1;Monitor;4;mensual\n",
    );
    let report = api.import_table(&file, None).unwrap();

    let plan = api.preview_plan(&report.table.table_id, Some(2025)).unwrap();
    assert_eq!(plan.rows[0].hours_per_event, 3.0);
    assert_eq!(plan.rows[0].total_hours, 12.0);
    assert_eq!(plan.rows[0].months.values(), &[1.0; 12]);
}

#[test]
fn test_malformed_stored_value_is_config_error() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let manager = Arc::new(ConfigManager::new(&db_path).unwrap());
    manager
        .set_global_config_value(config_keys::DISTRIBUTOR_KEYWORDS, "[1, 2")
        .unwrap();

    let config_api = ConfigApi::new(manager);
    assert!(matches!(
        config_api.get_distributor_keywords(),
        Err(ApiError::ConfigError(_))
    ));

    let api = MaintenancePlanApi::open(&db_path).unwrap();
    assert!(matches!(
        api.preview_distribution("anual", 1.0, "x"),
        Err(ApiError::ConfigError(_))
    ));
}
