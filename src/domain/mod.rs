// ==========================================
// 车间排班计划系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、值类型、更新规则
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod schedule;
pub mod shift;
pub mod types;

// 重导出核心类型
pub use schedule::{ScheduleEntry, ScheduleEntryPatch, ScheduleFilter};
pub use shift::{Shift, ShiftDraft};
pub use types::{CallerScope, ShiftScope};
