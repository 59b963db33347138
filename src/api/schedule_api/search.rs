use super::*;

use crate::api::parse::parse_optional_date;
use crate::domain::schedule::ScheduleFilter;
use crate::domain::types::CallerScope;

impl ScheduleApi {
    // ==========================================
    // 作用域检索
    // ==========================================

    /// 列出调用方可见的全部明细
    ///
    /// 平台管理员: 全部；租户: 仅本租户
    pub fn list_entries(&self, scope: &CallerScope) -> ApiResult<Vec<ScheduleEntry>> {
        let entries = match scope {
            CallerScope::PlatformAdmin => self.entry_repo.find_all()?,
            CallerScope::Tenant { customer_id } => {
                self.entry_repo.find_by_customer_id(*customer_id)?
            }
        };
        Ok(entries)
    }

    /// 按过滤条件检索（date DESC, order ASC）
    ///
    /// 租户调用方: customer_id 强制为本租户，operator_id 条件被忽略
    pub fn search_entries(
        &self,
        scope: &CallerScope,
        filter: ScheduleFilter,
    ) -> ApiResult<Vec<ScheduleEntry>> {
        let filter = scoped_filter(scope, filter);
        tracing::debug!(caller = %scope, ?filter, "检索排产明细");
        Ok(self.entry_repo.search(&filter)?)
    }

    /// 按查询字符串形式的请求检索
    pub fn search_entries_by_request(
        &self,
        scope: &CallerScope,
        request: &ScheduleSearchRequest,
    ) -> ApiResult<Vec<ScheduleEntry>> {
        let filter = parse_search_request(request)?;
        self.search_entries(scope, filter)
    }
}

/// 按调用方作用域收紧过滤条件
fn scoped_filter(scope: &CallerScope, mut filter: ScheduleFilter) -> ScheduleFilter {
    if let CallerScope::Tenant { customer_id } = scope {
        filter.customer_id = Some(*customer_id);
        filter.operator_id = None;
    }
    filter
}

fn parse_search_request(request: &ScheduleSearchRequest) -> ApiResult<ScheduleFilter> {
    let mut filter = ScheduleFilter {
        customer_id: parse_optional_uuid("customer_id", request.customer_id.as_deref())?,
        shopfloor_id: parse_optional_uuid("shopfloor_id", request.shopfloor_id.as_deref())?,
        shift_id: parse_optional_uuid("shift_id", request.shift_id.as_deref())?,
        workcenter_id: parse_optional_uuid("workcenter_id", request.workcenter_id.as_deref())?,
        job_id: parse_optional_uuid("job_id", request.job_id.as_deref())?,
        operator_id: parse_optional_uuid("operator_id", request.operator_id.as_deref())?,
        ..Default::default()
    };

    if let Some(date) = parse_optional_date("date", request.date.as_deref())? {
        filter = filter.on_date(date);
    }
    if let Some(from) = parse_optional_date("from", request.from.as_deref())? {
        filter.start_date = Some(from);
    }
    if let Some(to) = parse_optional_date("to", request.to.as_deref())? {
        filter.end_date = Some(to);
    }
    Ok(filter)
}
