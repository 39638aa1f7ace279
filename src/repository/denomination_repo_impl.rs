// ==========================================
// GEEstor 维护计划 - 分组表仓储 SQLite 实现
// ==========================================
// 表: denomination_table / denomination
// 约束: 所有查询参数化；排序列走白名单
// ==========================================

use crate::db::{ensure_schema, open_sqlite_connection};
use crate::domain::{DenominationTable, MaintenanceDenomination, StoredDenomination};
use crate::repository::denomination_repo::{DenominationRepository, PageRequest};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

const DENOMINATION_COLUMNS: &str =
    "table_id, code, name, quantity, frequency_label, maintenance_type, hours_per_event, row_number";

pub struct DenominationRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl DenominationRepositoryImpl {
    /// 打开数据库并确保表存在
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        ensure_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        let repo = Self { conn };
        {
            let guard = repo.get_conn()?;
            ensure_schema(&guard)?;
        }
        Ok(repo)
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_table(row: &Row<'_>) -> rusqlite::Result<DenominationTable> {
        Ok(DenominationTable {
            table_id: row.get(0)?,
            name: row.get(1)?,
            source_file: row.get(2)?,
            imported_at: row.get::<_, DateTime<Utc>>(3)?,
            row_count: row.get::<_, i64>(4)?.max(0) as usize,
        })
    }

    fn map_denomination(row: &Row<'_>) -> rusqlite::Result<StoredDenomination> {
        Ok(StoredDenomination {
            table_id: row.get(0)?,
            row_number: row.get::<_, i64>(7)?.max(0) as usize,
            denomination: MaintenanceDenomination {
                code: row.get(1)?,
                name: row.get(2)?,
                quantity: row.get(3)?,
                frequency_label: row.get(4)?,
                maintenance_type: row.get(5)?,
                hours_per_event: row.get(6)?,
            },
        })
    }
}

impl DenominationRepository for DenominationRepositoryImpl {
    fn create_table(
        &self,
        table: &DenominationTable,
        rows: &[StoredDenomination],
    ) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tx.execute(
            "INSERT INTO denomination_table (table_id, name, source_file, imported_at, row_count)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                table.table_id,
                table.name,
                table.source_file,
                table.imported_at,
                rows.len() as i64,
            ],
        )?;

        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO denomination ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                DENOMINATION_COLUMNS
            ))?;
            for row in rows {
                let d = &row.denomination;
                stmt.execute(params![
                    table.table_id,
                    d.code,
                    d.name,
                    d.quantity,
                    d.frequency_label,
                    d.maintenance_type,
                    d.hours_per_event,
                    row.row_number as i64,
                ])?;
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        debug!(table_id = %table.table_id, rows = rows.len(), "分组表已保存");
        Ok(())
    }

    fn find_table(&self, table_id: &str) -> RepositoryResult<Option<DenominationTable>> {
        let conn = self.get_conn()?;
        let table = conn
            .query_row(
                "SELECT table_id, name, source_file, imported_at, row_count
                 FROM denomination_table WHERE table_id = ?1",
                params![table_id],
                Self::map_table,
            )
            .optional()?;
        Ok(table)
    }

    fn list_tables(&self) -> RepositoryResult<Vec<DenominationTable>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT table_id, name, source_file, imported_at, row_count
             FROM denomination_table ORDER BY imported_at DESC, name ASC",
        )?;
        let tables = stmt
            .query_map([], Self::map_table)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tables)
    }

    fn list_denominations(&self, table_id: &str) -> RepositoryResult<Vec<StoredDenomination>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM denomination WHERE table_id = ?1 ORDER BY row_number ASC",
            DENOMINATION_COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![table_id], Self::map_denomination)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn page_denominations(
        &self,
        table_id: &str,
        page: PageRequest,
    ) -> RepositoryResult<(Vec<StoredDenomination>, usize)> {
        let conn = self.get_conn()?;

        let total: i64 = conn.query_row(
            "SELECT COUNT(*) FROM denomination WHERE table_id = ?1",
            params![table_id],
            |row| row.get(0),
        )?;

        let direction = if page.descending { "DESC" } else { "ASC" };
        let sql = format!(
            "SELECT {} FROM denomination WHERE table_id = ?1
             ORDER BY {} {}, row_number ASC LIMIT ?2 OFFSET ?3",
            DENOMINATION_COLUMNS,
            page.sort.column(),
            direction
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(
                params![table_id, page.limit as i64, page.offset as i64],
                Self::map_denomination,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((rows, total.max(0) as usize))
    }

    fn find_denomination(
        &self,
        table_id: &str,
        code: &str,
    ) -> RepositoryResult<Option<StoredDenomination>> {
        let conn = self.get_conn()?;
        let row = conn
            .query_row(
                &format!(
                    "SELECT {} FROM denomination WHERE table_id = ?1 AND code = ?2",
                    DENOMINATION_COLUMNS
                ),
                params![table_id, code],
                Self::map_denomination,
            )
            .optional()?;
        Ok(row)
    }

    fn update_denomination(
        &self,
        table_id: &str,
        denomination: &MaintenanceDenomination,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE denomination
             SET name = ?3, quantity = ?4, frequency_label = ?5,
                 maintenance_type = ?6, hours_per_event = ?7
             WHERE table_id = ?1 AND code = ?2",
            params![
                table_id,
                denomination.code,
                denomination.name,
                denomination.quantity,
                denomination.frequency_label,
                denomination.maintenance_type,
                denomination.hours_per_event,
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Denomination".to_string(),
                id: format!("{}/{}", table_id, denomination.code),
            });
        }
        Ok(())
    }

    fn delete_table(&self, table_id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows: i64 = conn.query_row(
            "SELECT COUNT(*) FROM denomination WHERE table_id = ?1",
            params![table_id],
            |row| row.get(0),
        )?;
        let affected = conn.execute(
            "DELETE FROM denomination_table WHERE table_id = ?1",
            params![table_id],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "DenominationTable".to_string(),
                id: table_id.to_string(),
            });
        }
        Ok(rows.max(0) as usize)
    }
}
