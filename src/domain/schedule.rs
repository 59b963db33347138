// ==========================================
// 车间排班计划系统 - 排产明细领域模型
// ==========================================
// 职责: 某日某班次内的一条人员/工作中心/工单安排
// 对齐: schedule_entries 表
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// ScheduleEntry - 排产明细
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub id: Uuid,

    // ===== 归属与引用 (必填) =====
    pub customer_id: Uuid,
    pub shopfloor_id: Uuid,
    pub shift_id: Uuid,

    // ===== 可空引用 (相互独立) =====
    pub workcenter_id: Option<Uuid>,
    pub job_id: Option<Uuid>,
    pub operator_id: Option<Uuid>,

    // ===== 排产位置 =====
    pub date: NaiveDate,
    pub order: i32, // 同班次同日内的显示顺序

    // ===== 实际上下班时间 (与班次标称时间无关) =====
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,

    pub is_completed: bool,

    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

// ==========================================
// ScheduleEntryPatch - 部分更新
// ==========================================
// 两类字段两种语义:
// - 引用字段与日期: None 表示保持原值（合并）
// - 排产字段(order/start/end/is_completed): 总是覆盖（替换），包括覆盖为空
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleEntryPatch {
    // 合并字段
    pub customer_id: Option<Uuid>,
    pub shopfloor_id: Option<Uuid>,
    pub shift_id: Option<Uuid>,
    pub workcenter_id: Option<Uuid>,
    pub job_id: Option<Uuid>,
    pub operator_id: Option<Uuid>,
    pub date: Option<NaiveDate>,

    // 替换字段
    pub order: i32,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub is_completed: bool,
}

impl ScheduleEntry {
    /// 应用部分更新
    ///
    /// 注意: 可空引用只能被设置为新值，不能通过部分更新清空。
    pub fn apply_patch(&mut self, patch: ScheduleEntryPatch, now: NaiveDateTime) {
        if let Some(id) = patch.customer_id {
            self.customer_id = id;
        }
        if let Some(id) = patch.shopfloor_id {
            self.shopfloor_id = id;
        }
        if let Some(id) = patch.shift_id {
            self.shift_id = id;
        }
        if let Some(id) = patch.workcenter_id {
            self.workcenter_id = Some(id);
        }
        if let Some(id) = patch.job_id {
            self.job_id = Some(id);
        }
        if let Some(id) = patch.operator_id {
            self.operator_id = Some(id);
        }
        if let Some(date) = patch.date {
            self.date = date;
        }

        self.order = patch.order;
        self.start_time = patch.start_time;
        self.end_time = patch.end_time;
        self.is_completed = patch.is_completed;
        self.updated_at = now;
    }
}

// ==========================================
// ScheduleFilter - 明细查询条件
// ==========================================
/// 所有条件为 AND 关系；日期区间两端均为闭区间
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleFilter {
    pub customer_id: Option<Uuid>,
    pub shopfloor_id: Option<Uuid>,
    pub shift_id: Option<Uuid>,
    pub workcenter_id: Option<Uuid>,
    pub job_id: Option<Uuid>,
    pub operator_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ScheduleFilter {
    /// 单日过滤
    pub fn on_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self.end_date = Some(date);
        self
    }
}
