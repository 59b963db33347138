use super::core::{map_entry_row, ScheduleEntryRepository, ENTRY_COLUMNS};
use crate::domain::schedule::{ScheduleEntry, ScheduleFilter};
use crate::repository::codec::fmt_date;
use crate::repository::error::RepositoryResult;
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter};
use uuid::Uuid;

impl ScheduleEntryRepository {
    // ==========================================
    // 条件查询
    // ==========================================

    /// 按过滤条件查询（条件均为 AND，日期闭区间）
    ///
    /// 排序: date DESC, order ASC
    pub fn search(&self, filter: &ScheduleFilter) -> RepositoryResult<Vec<ScheduleEntry>> {
        let conn = self.get_conn()?;

        let mut where_parts: Vec<&str> = Vec::new();
        let mut binds: Vec<Value> = Vec::new();

        let id_conditions = [
            ("customer_id = ?", filter.customer_id),
            ("shopfloor_id = ?", filter.shopfloor_id),
            ("shift_id = ?", filter.shift_id),
            ("workcenter_id = ?", filter.workcenter_id),
            ("job_id = ?", filter.job_id),
            ("operator_id = ?", filter.operator_id),
        ];
        for (clause, value) in id_conditions {
            if let Some(id) = value {
                where_parts.push(clause);
                binds.push(Value::Text(id.to_string()));
            }
        }
        if let Some(start) = filter.start_date {
            where_parts.push("date >= ?");
            binds.push(Value::Text(fmt_date(start)));
        }
        if let Some(end) = filter.end_date {
            where_parts.push("date <= ?");
            binds.push(Value::Text(fmt_date(end)));
        }

        let mut sql = format!("SELECT {} FROM schedule_entries", ENTRY_COLUMNS);
        if !where_parts.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_parts.join(" AND "));
        }
        sql.push_str(r#" ORDER BY date DESC, "order" ASC"#);

        let mut stmt = conn.prepare(&sql)?;
        let entries = stmt
            .query_map(params_from_iter(binds.iter()), map_entry_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    /// 查询车间某日的计划
    ///
    /// 排序: order ASC
    pub fn find_by_shopfloor_and_date(
        &self,
        shopfloor_id: Uuid,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<ScheduleEntry>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"SELECT {} FROM schedule_entries WHERE shopfloor_id = ?1 AND date = ?2 ORDER BY "order" ASC"#,
            ENTRY_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let entries = stmt
            .query_map(params![shopfloor_id.to_string(), fmt_date(date)], map_entry_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    /// 查询人员某日的计划（可限定租户）
    pub fn find_by_operator_and_date(
        &self,
        operator_id: Uuid,
        date: NaiveDate,
        customer_id: Option<Uuid>,
    ) -> RepositoryResult<Vec<ScheduleEntry>> {
        let conn = self.get_conn()?;
        let mut sql = format!(
            "SELECT {} FROM schedule_entries WHERE operator_id = ? AND date = ?",
            ENTRY_COLUMNS
        );
        let mut binds = vec![
            Value::Text(operator_id.to_string()),
            Value::Text(fmt_date(date)),
        ];
        if let Some(customer_id) = customer_id {
            sql.push_str(" AND customer_id = ?");
            binds.push(Value::Text(customer_id.to_string()));
        }
        sql.push_str(r#" ORDER BY "order" ASC"#);

        let mut stmt = conn.prepare(&sql)?;
        let entries = stmt
            .query_map(params_from_iter(binds.iter()), map_entry_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }
}
