use crate::domain::schedule::ScheduleEntry;
use crate::repository::codec::{
    date_col, fmt_date, fmt_timestamp, opt_timestamp_col, opt_uuid_col, timestamp_col, uuid_col,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub(super) const ENTRY_COLUMNS: &str = r#"
    id, customer_id, shopfloor_id, shift_id, workcenter_id, job_id, operator_id,
    date, "order", start_time, end_time, is_completed, created_at, updated_at
"#;

// ==========================================
// ScheduleEntryRepository - 排产明细仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
pub struct ScheduleEntryRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ScheduleEntryRepository {
    /// 创建新的排产明细仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    pub(super) fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 插入排产明细
    pub fn insert(&self, entry: &ScheduleEntry) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        write_entry(&conn, entry)?;
        Ok(())
    }

    /// 更新排产明细（全字段写回）
    ///
    /// # 返回
    /// - `Err(NotFound)`: 记录不存在
    pub fn update(&self, entry: &ScheduleEntry) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE schedule_entries SET
                customer_id = ?2, shopfloor_id = ?3, shift_id = ?4,
                workcenter_id = ?5, job_id = ?6, operator_id = ?7,
                date = ?8, "order" = ?9, start_time = ?10, end_time = ?11,
                is_completed = ?12, updated_at = ?13
            WHERE id = ?1
            "#,
            params![
                entry.id.to_string(),
                entry.customer_id.to_string(),
                entry.shopfloor_id.to_string(),
                entry.shift_id.to_string(),
                entry.workcenter_id.map(|id| id.to_string()),
                entry.job_id.map(|id| id.to_string()),
                entry.operator_id.map(|id| id.to_string()),
                fmt_date(entry.date),
                entry.order,
                entry.start_time.map(fmt_timestamp),
                entry.end_time.map(fmt_timestamp),
                if entry.is_completed { 1 } else { 0 },
                fmt_timestamp(entry.updated_at),
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::not_found("ScheduleEntry", entry.id));
        }
        Ok(())
    }

    /// 删除排产明细
    pub fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM schedule_entries WHERE id = ?1",
            params![id.to_string()],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("ScheduleEntry", id));
        }
        Ok(())
    }

    // ==========================================
    // 基础查询
    // ==========================================

    /// 按ID查询
    pub fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<ScheduleEntry>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM schedule_entries WHERE id = ?1", ENTRY_COLUMNS);
        let entry = conn
            .query_row(&sql, params![id.to_string()], map_entry_row)
            .optional()?;
        Ok(entry)
    }

    /// 查询全部明细（平台管理员视图）
    pub fn find_all(&self) -> RepositoryResult<Vec<ScheduleEntry>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"SELECT {} FROM schedule_entries ORDER BY date DESC, "order" ASC"#,
            ENTRY_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let entries = stmt
            .query_map([], map_entry_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    /// 查询租户下全部明细
    pub fn find_by_customer_id(&self, customer_id: Uuid) -> RepositoryResult<Vec<ScheduleEntry>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"SELECT {} FROM schedule_entries WHERE customer_id = ?1 ORDER BY date DESC, "order" ASC"#,
            ENTRY_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let entries = stmt
            .query_map(params![customer_id.to_string()], map_entry_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    /// 明细总数
    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        Ok(conn.query_row("SELECT COUNT(*) FROM schedule_entries", [], |row| row.get(0))?)
    }
}

// ==========================================
// 行映射 / 写入（连接与事务共用）
// ==========================================

pub(super) fn map_entry_row(row: &Row) -> rusqlite::Result<ScheduleEntry> {
    Ok(ScheduleEntry {
        id: uuid_col(row, 0)?,
        customer_id: uuid_col(row, 1)?,
        shopfloor_id: uuid_col(row, 2)?,
        shift_id: uuid_col(row, 3)?,
        workcenter_id: opt_uuid_col(row, 4)?,
        job_id: opt_uuid_col(row, 5)?,
        operator_id: opt_uuid_col(row, 6)?,
        date: date_col(row, 7)?,
        order: row.get(8)?,
        start_time: opt_timestamp_col(row, 9)?,
        end_time: opt_timestamp_col(row, 10)?,
        is_completed: row.get::<_, i64>(11)? != 0,
        created_at: timestamp_col(row, 12)?,
        updated_at: timestamp_col(row, 13)?,
    })
}

/// 写入一条明细（主键已存在时报唯一约束错误，不覆盖）
pub(super) fn write_entry(conn: &Connection, entry: &ScheduleEntry) -> rusqlite::Result<usize> {
    let sql = format!(
        r#"INSERT INTO schedule_entries ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"#,
        ENTRY_COLUMNS
    );
    conn.execute(
        &sql,
        params![
            entry.id.to_string(),
            entry.customer_id.to_string(),
            entry.shopfloor_id.to_string(),
            entry.shift_id.to_string(),
            entry.workcenter_id.map(|id| id.to_string()),
            entry.job_id.map(|id| id.to_string()),
            entry.operator_id.map(|id| id.to_string()),
            fmt_date(entry.date),
            entry.order,
            entry.start_time.map(fmt_timestamp),
            entry.end_time.map(fmt_timestamp),
            if entry.is_completed { 1 } else { 0 },
            fmt_timestamp(entry.created_at),
            fmt_timestamp(entry.updated_at),
        ],
    )
}
