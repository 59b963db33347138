// ==========================================
// 车间排班计划系统 - 时间区间模型
// ==========================================
// 职责: 以"自零点起的分钟数"表示一天内的时间段，不带日历日期
// 规则: 半开区间 [lo, hi)，端点相接不算重叠
// 规则: start >= end 视为跨零点，拆成 [start, 1440) 与 [0, end)
// ==========================================

use chrono::{NaiveTime, Timelike};

/// 一天的分钟数
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// 一天内的半开分钟区间 [lo, hi)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinuteInterval {
    pub lo: u32,
    pub hi: u32,
}

impl MinuteInterval {
    pub fn new(lo: u32, hi: u32) -> Self {
        Self { lo, hi }
    }
}

/// 时间转换为自零点起的分钟数，范围 [0, 1440)
///
/// 秒及以下精度被忽略。
pub fn to_minutes(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// 拆分时间段
///
/// - `start < end`: 返回单个区间 `[start, end)`
/// - `start >= end`: 跨零点，返回 `[start, 1440)` 与 `[0, end)`
///
/// 注意: `start == end` 同样按跨零点处理，结果覆盖全天。
/// 零时长班次的拦截在班次服务层按配置完成。
pub fn split_span(start: NaiveTime, end: NaiveTime) -> Vec<MinuteInterval> {
    let s = to_minutes(start);
    let e = to_minutes(end);

    if s < e {
        vec![MinuteInterval::new(s, e)]
    } else {
        vec![
            MinuteInterval::new(s, MINUTES_PER_DAY),
            MinuteInterval::new(0, e),
        ]
    }
}

/// 两个半开区间是否相交: max(lo) < min(hi)
pub fn intervals_overlap(a: &MinuteInterval, b: &MinuteInterval) -> bool {
    a.lo.max(b.lo) < a.hi.min(b.hi)
}

/// 两个时间段是否重叠（任一拆分区间相交即重叠）
pub fn spans_overlap(
    start1: NaiveTime,
    end1: NaiveTime,
    start2: NaiveTime,
    end2: NaiveTime,
) -> bool {
    let left = split_span(start1, end1);
    let right = split_span(start2, end2);

    left.iter()
        .any(|a| right.iter().any(|b| intervals_overlap(a, b)))
}

/// 时间段是否为零时长（start == end，精确到分钟）
pub fn is_zero_length(start: NaiveTime, end: NaiveTime) -> bool {
    to_minutes(start) == to_minutes(end)
}
