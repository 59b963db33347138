// ==========================================
// 车间排班计划系统 - API 层
// ==========================================
// 职责: 解析外部请求、执行业务规则、转换仓储错误
// ==========================================

pub mod error;
pub mod parse;
pub mod schedule_api;
pub mod shift_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult, ErrorKind};
pub use schedule_api::{ScheduleApi, ScheduleEntryRequest, ScheduleSearchRequest};
pub use shift_api::{ShiftApi, ShiftRequest};
