// ==========================================
// 车间排班计划系统 - 排产明细数据仓储
// ==========================================
// 对齐: schedule_entries 表
// 红线: Repository 不含业务逻辑
// 红线: 日计划同步必须在单个事务中完成（删除 + 写入）
// ==========================================

mod core;
mod queries;
mod sync;


pub use self::core::ScheduleEntryRepository;
