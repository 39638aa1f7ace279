// ==========================================
// GEEstor 维护计划 - 字段映射器实现
// ==========================================
// 职责: 源列名（西语表头，含别名） → 标准字段
// 列名匹配忽略大小写与重音
// ==========================================

use crate::domain::text::fold_for_match;
use crate::domain::RawDenominationRecord;
use crate::importer::importer_trait::{FieldMapper as FieldMapperTrait, RawRow};
use std::collections::HashMap;

/// 标准字段及其列名别名（按优先级）
pub mod columns {
    pub const CODE: &[&str] = &["CÓDIGO", "CODIGO", "COD", "CÓDIGO DH", "CODE"];
    pub const NAME: &[&str] = &[
        "DENOMINACIÓN",
        "DENOMINACIÓN HOMOGÉNEA",
        "NOMBRE",
        "NOMBRE EQUIPO",
        "NAME",
    ];
    pub const QUANTITY: &[&str] = &["CANTIDAD", "Nº DE EQUIPOS", "Nº EQUIPOS", "UNIDADES"];
    pub const FREQUENCY: &[&str] = &["FRECUENCIA", "PERIODICIDAD"];
    pub const MAINTENANCE_TYPE: &[&str] = &["TIPO", "TIPO DE MANTENIMIENTO", "TIPO MANTENIMIENTO"];
    pub const HOURS: &[&str] = &["TIEMPO", "HORAS", "HORA POR MANTENIMIENTO"];
}

pub struct FieldMapper;

impl FieldMapperTrait for FieldMapper {
    fn map_to_raw_denomination(&self, row: &RawRow, row_number: usize) -> RawDenominationRecord {
        let folded: HashMap<String, &str> = row
            .iter()
            .map(|(k, v)| (fold_for_match(k), v.as_str()))
            .collect();

        RawDenominationRecord {
            code: self.get_string(&folded, columns::CODE),
            name: self.get_string(&folded, columns::NAME),
            quantity_raw: self.get_string(&folded, columns::QUANTITY),
            frequency_label: self.get_string(&folded, columns::FREQUENCY),
            maintenance_type: self.get_string(&folded, columns::MAINTENANCE_TYPE),
            hours_raw: self.get_string(&folded, columns::HOURS),
            row_number,
        }
    }

    fn has_code_column(&self, headers: &[String]) -> bool {
        let wanted: Vec<String> = columns::CODE.iter().map(|c| fold_for_match(c)).collect();
        headers.iter().any(|h| wanted.contains(&fold_for_match(h)))
    }
}

impl FieldMapper {
    /// 按别名顺序取第一个非空值
    fn get_string(&self, folded_row: &HashMap<String, &str>, aliases: &[&str]) -> Option<String> {
        aliases.iter().find_map(|alias| {
            folded_row
                .get(&fold_for_match(alias))
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(|v| v.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_field_mapper_basic() {
        let r = row(&[
            ("Código", "DH001"),
            ("Denominación", "Autoclave"),
            ("Cantidad", "3"),
            ("Frecuencia", "Trimestral"),
            ("Tipo", "Preventivo"),
            ("Tiempo", "1,5"),
        ]);

        let record = FieldMapper.map_to_raw_denomination(&r, 2);

        assert_eq!(record.code, Some("DH001".to_string()));
        assert_eq!(record.name, Some("Autoclave".to_string()));
        assert_eq!(record.quantity_raw, Some("3".to_string()));
        assert_eq!(record.frequency_label, Some("Trimestral".to_string()));
        assert_eq!(record.maintenance_type, Some("Preventivo".to_string()));
        assert_eq!(record.hours_raw, Some("1,5".to_string()));
        assert_eq!(record.row_number, 2);
    }

    #[test]
    fn test_field_mapper_aliases_from_export_headers() {
        let r = row(&[
            ("CODIGO", "DH9"),
            ("NOMBRE EQUIPO", "Monitor"),
            ("Nº DE EQUIPOS", "5"),
            ("TIPO DE MANTENIMIENTO", "Correctivo"),
            ("HORA POR MANTENIMIENTO", "2"),
        ]);

        let record = FieldMapper.map_to_raw_denomination(&r, 7);

        assert_eq!(record.code, Some("DH9".to_string()));
        assert_eq!(record.name, Some("Monitor".to_string()));
        assert_eq!(record.quantity_raw, Some("5".to_string()));
        assert_eq!(record.maintenance_type, Some("Correctivo".to_string()));
        assert_eq!(record.hours_raw, Some("2".to_string()));
        assert_eq!(record.frequency_label, None);
    }

    #[test]
    fn test_field_mapper_empty_as_none() {
        let r = row(&[("CODIGO", "DH1"), ("TIEMPO", "   ")]);
        let record = FieldMapper.map_to_raw_denomination(&r, 2);
        assert_eq!(record.hours_raw, None);
    }

    #[test]
    fn test_has_code_column() {
        let headers = vec!["código".to_string(), "NOMBRE".to_string()];
        assert!(FieldMapper.has_code_column(&headers));
        let headers = vec!["NOMBRE".to_string()];
        assert!(!FieldMapper.has_code_column(&headers));
    }
}
