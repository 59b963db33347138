// ==========================================
// 车间排班计划系统 - 引擎层
// ==========================================
// 职责: 实现纯业务规则,不拼 SQL
// ==========================================

pub mod shift_overlap;
pub mod time_span;

// 重导出核心引擎
pub use shift_overlap::{OverlapVerdict, ShiftCandidate, ShiftOverlapEngine, ShiftOverlapPolicy};
pub use time_span::{intervals_overlap, spans_overlap, split_span, to_minutes, MinuteInterval};
