// ==========================================
// 车间排班计划系统 - 班次数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 重叠校验由调用方以回调形式传入，仓储只负责把
//       "读取同伴集合 + 写入" 放进同一个 IMMEDIATE 事务
// ==========================================

use crate::domain::shift::Shift;
use crate::domain::types::ShiftScope;
use crate::repository::codec::{
    fmt_time_of_day, fmt_timestamp, opt_uuid_col, time_of_day_col, timestamp_col, uuid_col,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

const SHIFT_COLUMNS: &str = r#"
    id, customer_id, shopfloor_id, name, color,
    start_time, end_time, is_active, created_at, updated_at
"#;

// ==========================================
// ShiftRepository - 班次仓储
// ==========================================
/// 班次仓储
/// 职责: 管理 shifts 表的 CRUD 操作
pub struct ShiftRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ShiftRepository {
    /// 创建新的ShiftRepository实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 按ID查询
    ///
    /// # 返回
    /// - Ok(Some(Shift)): 找到班次
    /// - Ok(None): 未找到
    /// - Err: 数据库错误
    pub fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Shift>> {
        let conn = self.get_conn()?;
        Ok(select_shift_by_id(&conn, id)?)
    }

    /// 查询车间下的班次
    pub fn find_by_shopfloor_id(&self, shopfloor_id: Uuid) -> RepositoryResult<Vec<Shift>> {
        let conn = self.get_conn()?;
        Ok(select_shifts_by_scope(&conn, ShiftScope::Shopfloor(shopfloor_id))?)
    }

    /// 查询租户下的全部班次（含车间级与租户级）
    pub fn find_by_customer_id(&self, customer_id: Uuid) -> RepositoryResult<Vec<Shift>> {
        let conn = self.get_conn()?;
        Ok(select_shifts_by_scope(&conn, ShiftScope::Customer(customer_id))?)
    }

    /// 删除班次（硬删除，不处理引用它的排产明细）
    pub fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM shifts WHERE id = ?1", params![id.to_string()])?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Shift", id));
        }
        Ok(())
    }

    /// 班次总数
    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        Ok(conn.query_row("SELECT COUNT(*) FROM shifts", [], |row| row.get(0))?)
    }

    /// 在写事务内校验并插入
    ///
    /// # 参数
    /// - `shift`: 待插入班次
    /// - `check`: 以作用域列表为入参的校验回调，返回 Err 时不写入
    ///
    /// # 说明
    /// BEGIN IMMEDIATE 在事务开始时即持有写锁，
    /// 同一库上的并发写入方在 busy_timeout 内排队，随后读取到已提交的同伴集合。
    pub fn create_checked<E, F>(&self, shift: &Shift, check: F) -> Result<(), E>
    where
        E: From<RepositoryError>,
        F: FnOnce(&[Shift]) -> Result<(), E>,
    {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(RepositoryError::from)?;

        let listed = select_shifts_by_scope(&tx, shift.scope()).map_err(RepositoryError::from)?;
        check(&listed)?;

        insert_shift(&tx, shift).map_err(RepositoryError::from)?;
        tx.commit().map_err(RepositoryError::from)?;
        Ok(())
    }

    /// 在写事务内读取、变更、校验并写回
    ///
    /// # 参数
    /// - `id`: 班次ID
    /// - `scope`: 变更后的作用域（用于读取同伴集合）
    /// - `apply`: 回调，入参为当前记录与作用域列表，返回变更后的记录
    ///
    /// # 返回
    /// - Ok(Shift): 写回后的记录
    /// - Err: 记录不存在 / 回调拒绝 / 数据库错误（均不写入）
    pub fn update_checked<E, F>(&self, id: Uuid, scope: ShiftScope, apply: F) -> Result<Shift, E>
    where
        E: From<RepositoryError>,
        F: FnOnce(Shift, &[Shift]) -> Result<Shift, E>,
    {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(RepositoryError::from)?;

        let existing = select_shift_by_id(&tx, id)
            .map_err(RepositoryError::from)?
            .ok_or_else(|| RepositoryError::not_found("Shift", id))?;

        let listed = select_shifts_by_scope(&tx, scope).map_err(RepositoryError::from)?;
        let updated = apply(existing, &listed)?;

        update_shift(&tx, &updated).map_err(RepositoryError::from)?;
        tx.commit().map_err(RepositoryError::from)?;
        Ok(updated)
    }
}

// ==========================================
// 辅助函数（连接与事务共用）
// ==========================================

fn map_shift_row(row: &Row) -> rusqlite::Result<Shift> {
    Ok(Shift {
        id: uuid_col(row, 0)?,
        customer_id: uuid_col(row, 1)?,
        shopfloor_id: opt_uuid_col(row, 2)?,
        name: row.get(3)?,
        color: row.get(4)?,
        start_time: time_of_day_col(row, 5)?,
        end_time: time_of_day_col(row, 6)?,
        is_active: row.get::<_, i64>(7)? != 0,
        created_at: timestamp_col(row, 8)?,
        updated_at: timestamp_col(row, 9)?,
    })
}

fn insert_shift(conn: &Connection, shift: &Shift) -> rusqlite::Result<usize> {
    conn.execute(
        r#"
        INSERT INTO shifts (
            id, customer_id, shopfloor_id, name, color,
            start_time, end_time, is_active, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
        params![
            shift.id.to_string(),
            shift.customer_id.to_string(),
            shift.shopfloor_id.map(|id| id.to_string()),
            shift.name,
            shift.color,
            fmt_time_of_day(shift.start_time),
            fmt_time_of_day(shift.end_time),
            if shift.is_active { 1 } else { 0 },
            fmt_timestamp(shift.created_at),
            fmt_timestamp(shift.updated_at),
        ],
    )
}

fn update_shift(conn: &Connection, shift: &Shift) -> rusqlite::Result<usize> {
    conn.execute(
        r#"
        UPDATE shifts SET
            customer_id = ?2, shopfloor_id = ?3, name = ?4, color = ?5,
            start_time = ?6, end_time = ?7, is_active = ?8, updated_at = ?9
        WHERE id = ?1
        "#,
        params![
            shift.id.to_string(),
            shift.customer_id.to_string(),
            shift.shopfloor_id.map(|id| id.to_string()),
            shift.name,
            shift.color,
            fmt_time_of_day(shift.start_time),
            fmt_time_of_day(shift.end_time),
            if shift.is_active { 1 } else { 0 },
            fmt_timestamp(shift.updated_at),
        ],
    )
}

fn select_shift_by_id(conn: &Connection, id: Uuid) -> rusqlite::Result<Option<Shift>> {
    let sql = format!("SELECT {} FROM shifts WHERE id = ?1", SHIFT_COLUMNS);
    conn.query_row(&sql, params![id.to_string()], map_shift_row)
        .optional()
}

/// 按作用域列出班次
///
/// 车间作用域按 shopfloor_id，租户作用域按 customer_id（结果含该租户所有车间的班次，
/// 精确作用域过滤在引擎层完成）
fn select_shifts_by_scope(conn: &Connection, scope: ShiftScope) -> rusqlite::Result<Vec<Shift>> {
    let (column, key) = match scope {
        ShiftScope::Shopfloor(id) => ("shopfloor_id", id),
        ShiftScope::Customer(id) => ("customer_id", id),
    };
    let sql = format!(
        "SELECT {} FROM shifts WHERE {} = ?1 ORDER BY start_time ASC, name ASC",
        SHIFT_COLUMNS, column
    );

    let mut stmt = conn.prepare(&sql)?;
    let shifts = stmt
        .query_map(params![key.to_string()], map_shift_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(shifts)
}
