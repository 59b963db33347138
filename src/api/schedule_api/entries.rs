use super::*;

use crate::api::error::ApiError;
use crate::api::parse::{current_timestamp, parse_optional_date};
use crate::domain::schedule::ScheduleEntryPatch;
use crate::domain::types::CallerScope;

impl ScheduleApi {
    // ==========================================
    // 排产明细维护
    // ==========================================

    /// 新建排产明细
    ///
    /// # 返回
    /// - Err(ApiError::ParseError): 字段格式错误（未访问存储）
    /// - Err(ApiError::NotFound): 引用的班次不存在
    /// - Err(ApiError::BusinessRuleViolation): 引用的班次已停用
    pub fn create_entry(&self, request: &ScheduleEntryRequest) -> ApiResult<ScheduleEntry> {
        let date = required_date("date", request.date.as_deref())?;
        let entry = parse_entry_request(request, Uuid::new_v4(), date, current_timestamp())?;

        self.ensure_shift_assignable(entry.shift_id)?;
        self.entry_repo.insert(&entry)?;

        tracing::info!(
            entry_id = %entry.id,
            shopfloor_id = %entry.shopfloor_id,
            shift_id = %entry.shift_id,
            date = %entry.date,
            "排产明细已创建"
        );
        Ok(entry)
    }

    /// 修改排产明细
    ///
    /// - 标识符与日期: 提供且非空时重新解析并覆盖，否则保持原值
    /// - 更换班次时，新班次必须存在且处于启用状态
    /// - order / start_time / end_time / is_completed: 总是覆盖（包括覆盖为空）
    pub fn update_entry(&self, id: &str, request: &ScheduleEntryRequest) -> ApiResult<ScheduleEntry> {
        let id = parse_uuid("id", id)?;
        let patch = ScheduleEntryPatch {
            customer_id: parse_optional_uuid("customer_id", request.customer_id.as_deref())?,
            shopfloor_id: parse_optional_uuid("shopfloor_id", request.shopfloor_id.as_deref())?,
            shift_id: parse_optional_uuid("shift_id", request.shift_id.as_deref())?,
            workcenter_id: parse_optional_uuid("workcenter_id", request.workcenter_id.as_deref())?,
            job_id: parse_optional_uuid("job_id", request.job_id.as_deref())?,
            operator_id: parse_optional_uuid("operator_id", request.operator_id.as_deref())?,
            date: parse_optional_date("date", request.date.as_deref())?,
            order: request.order,
            start_time: clock_timestamp(request.start_time),
            end_time: clock_timestamp(request.end_time),
            is_completed: request.is_completed,
        };

        let mut entry = self
            .entry_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::NotFound(format!("ScheduleEntry(id={})不存在", id)))?;

        if let Some(shift_id) = patch.shift_id.filter(|shift_id| *shift_id != entry.shift_id) {
            self.ensure_shift_assignable(shift_id)?;
        }

        entry.apply_patch(patch, current_timestamp());
        self.entry_repo.update(&entry)?;

        tracing::info!(entry_id = %entry.id, "排产明细已更新");
        Ok(entry)
    }

    /// 按ID查询排产明细
    pub fn get_entry(&self, id: &str) -> ApiResult<ScheduleEntry> {
        let id = parse_uuid("id", id)?;
        self.entry_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::NotFound(format!("ScheduleEntry(id={})不存在", id)))
    }

    /// 删除排产明细
    pub fn delete_entry(&self, id: &str) -> ApiResult<()> {
        let id = parse_uuid("id", id)?;
        self.entry_repo.delete(id)?;
        tracing::info!(entry_id = %id, "排产明细已删除");
        Ok(())
    }

    // ==========================================
    // 日计划查询
    // ==========================================

    /// 查询车间某日的计划（按 order 升序）
    pub fn get_planning(&self, shopfloor_id: &str, date: &str) -> ApiResult<Vec<ScheduleEntry>> {
        let shopfloor_id = parse_uuid("shopfloor_id", shopfloor_id)?;
        let date = parse_schedule_date("date", date)?;
        Ok(self.entry_repo.find_by_shopfloor_and_date(shopfloor_id, date)?)
    }

    /// 查询人员某日的计划（按 order 升序；租户调用方仅本租户数据）
    pub fn get_operator_planning(
        &self,
        scope: &CallerScope,
        operator_id: &str,
        date: &str,
    ) -> ApiResult<Vec<ScheduleEntry>> {
        let operator_id = parse_uuid("operator_id", operator_id)?;
        let date = parse_schedule_date("date", date)?;
        Ok(self
            .entry_repo
            .find_by_operator_and_date(operator_id, date, scope.customer_id())?)
    }
}
