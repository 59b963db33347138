use super::core::{write_entry, ScheduleEntryRepository};
use crate::domain::schedule::ScheduleEntry;
use crate::repository::codec::fmt_date;
use crate::repository::error::RepositoryResult;
use chrono::NaiveDate;
use rusqlite::{params, TransactionBehavior};
use uuid::Uuid;

impl ScheduleEntryRepository {
    // ==========================================
    // 日计划同步
    // ==========================================

    /// 整体替换车间某日的计划
    ///
    /// # 参数
    /// - `shopfloor_id` / `date`: 目标车间与日期
    /// - `entries`: 新的完整计划（调用方已保证 shopfloor/date 与目标一致）
    ///
    /// # 返回
    /// - `Ok(count)`: 写入的明细数
    /// - `Err`: 任一步失败则整体回滚，原计划保持不变
    ///
    /// # 红线
    /// - 删除与写入在同一个 IMMEDIATE 事务中完成
    /// - 只删除目标车间当日的明细；批次中的 ID 若仍被其他车间/日期占用，
    ///   插入触发唯一约束错误并整体回滚，不会改写其他计划
    /// - 先删后插，重复提交同一批明细结果不变
    pub fn replace_day(
        &self,
        shopfloor_id: Uuid,
        date: NaiveDate,
        entries: &[ScheduleEntry],
    ) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let removed = tx.execute(
            "DELETE FROM schedule_entries WHERE shopfloor_id = ?1 AND date = ?2",
            params![shopfloor_id.to_string(), fmt_date(date)],
        )?;

        for entry in entries {
            write_entry(&tx, entry)?;
        }

        tx.commit()?;

        tracing::debug!(
            shopfloor_id = %shopfloor_id,
            date = %date,
            removed,
            inserted = entries.len(),
            "日计划替换完成"
        );
        Ok(entries.len())
    }
}
