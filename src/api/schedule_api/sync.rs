use super::*;

use std::collections::{BTreeSet, HashSet};

use crate::api::error::ApiError;
use crate::api::parse::current_timestamp;

impl ScheduleApi {
    // ==========================================
    // 日计划同步
    // ==========================================

    /// 整体替换车间某日的计划
    ///
    /// # 参数
    /// - `shopfloor_id` / `date`: 目标车间与日期（日期支持 YYYY-MM-DD 与 RFC 3339）
    /// - `requests`: 新的完整计划；空列表表示清空当日
    ///
    /// # 返回
    /// - Ok(count): 当日计划中的明细数
    /// - Err: 任一明细解析失败、批次不合法、引用的班次不存在或已停用、
    ///   存储失败时，原计划保持不变
    ///
    /// # 说明
    /// - 每条明细的日期强制为同步日期
    /// - 提供合法 id 时沿用，否则生成新 id；该 id 若仍属于其他车间或日期，
    ///   写入因主键冲突失败并整体回滚
    /// - 全部明细解析完成后才读取配置与班次
    pub fn sync_planning(
        &self,
        shopfloor_id: &str,
        date: &str,
        requests: &[ScheduleEntryRequest],
    ) -> ApiResult<usize> {
        let shopfloor_id = parse_uuid("shopfloor_id", shopfloor_id)?;
        let date = parse_schedule_date("date", date)?;

        let now = current_timestamp();
        let mut entries = Vec::with_capacity(requests.len());
        let mut seen_ids = HashSet::with_capacity(requests.len());

        for (idx, request) in requests.iter().enumerate() {
            let id = request
                .id
                .as_deref()
                .and_then(|raw| Uuid::parse_str(raw).ok())
                .unwrap_or_else(Uuid::new_v4);
            let entry = parse_entry_request(request, id, date, now)?;

            if entry.shopfloor_id != shopfloor_id {
                tracing::warn!(
                    target_shopfloor = %shopfloor_id,
                    entry_shopfloor = %entry.shopfloor_id,
                    index = idx,
                    "同步批次中的明细不属于目标车间"
                );
                return Err(ApiError::InvalidInput(format!(
                    "第{}条明细的车间({})与同步目标车间({})不一致",
                    idx + 1,
                    entry.shopfloor_id,
                    shopfloor_id
                )));
            }
            if !seen_ids.insert(entry.id) {
                return Err(ApiError::InvalidInput(format!(
                    "同步批次中明细ID重复: {}",
                    entry.id
                )));
            }
            entries.push(entry);
        }

        self.check_sync_batch_size(shopfloor_id, date, &entries)?;

        let shift_ids: BTreeSet<Uuid> = entries.iter().map(|e| e.shift_id).collect();
        for shift_id in shift_ids {
            self.ensure_shift_assignable(shift_id)?;
        }

        let count = self.entry_repo.replace_day(shopfloor_id, date, &entries)?;

        tracing::info!(shopfloor_id = %shopfloor_id, date = %date, count, "日计划已同步");
        Ok(count)
    }
}

impl ScheduleApi {
    /// 批次明细数不得超过所涉租户的同步上限（多租户时取最小值）
    fn check_sync_batch_size(
        &self,
        shopfloor_id: Uuid,
        date: NaiveDate,
        entries: &[ScheduleEntry],
    ) -> ApiResult<()> {
        let customers: BTreeSet<Uuid> = entries.iter().map(|e| e.customer_id).collect();

        let mut max_entries = None;
        for customer_id in customers {
            let limit = self
                .config_manager
                .sync_max_entries(Some(customer_id))
                .map_err(|e| ApiError::InternalError(format!("读取同步配置失败: {}", e)))?;
            max_entries = Some(max_entries.map_or(limit, |current: usize| current.min(limit)));
        }

        match max_entries {
            Some(max_entries) if entries.len() > max_entries => {
                tracing::warn!(
                    shopfloor_id = %shopfloor_id,
                    date = %date,
                    submitted = entries.len(),
                    max_entries,
                    "同步批次超过上限"
                );
                Err(ApiError::InvalidInput(format!(
                    "同步批次明细数{}超过上限{}",
                    entries.len(),
                    max_entries
                )))
            }
            _ => Ok(()),
        }
    }
}
