// ==========================================
// 车间排班计划系统 - 请求字段解析
// ==========================================
// 职责: 把外部传入的字符串字段解析为强类型值
// 红线: 解析失败一律返回 ParseError，且发生在任何存储访问之前
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::types::CallerScope;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, SubsecRound, Timelike};
use uuid::Uuid;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_OF_DAY_FORMATS: [&str; 2] = ["%H:%M", "%H:%M:%S"];
const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// 解析必填 UUID
pub fn parse_uuid(field: &str, value: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(value).map_err(|_| ApiError::parse(field, value))
}

/// 解析可空 UUID（缺省或空串视为 None）
pub fn parse_optional_uuid(field: &str, value: Option<&str>) -> ApiResult<Option<Uuid>> {
    match value {
        None => Ok(None),
        Some(raw) if raw.is_empty() => Ok(None),
        Some(raw) => parse_uuid(field, raw).map(Some),
    }
}

/// 解析时刻（HH:MM，兼容 HH:MM:SS，秒被舍弃）
pub fn parse_time_of_day(field: &str, value: &str) -> ApiResult<NaiveTime> {
    let parsed = TIME_OF_DAY_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(value, fmt).ok())
        .ok_or_else(|| ApiError::parse(field, value))?;

    NaiveTime::from_hms_opt(parsed.hour(), parsed.minute(), 0)
        .ok_or_else(|| ApiError::parse(field, value))
}

/// 解析排产日期
///
/// 先按 YYYY-MM-DD 解析；失败后按 RFC 3339 时间戳解析，
/// 取该时间戳自身时区下的日期部分，时刻部分丢弃。
pub fn parse_schedule_date(field: &str, value: &str) -> ApiResult<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(value, DATE_FORMAT) {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.date_naive())
        .map_err(|_| ApiError::parse(field, value))
}

/// 解析可空日期（缺省或空串视为 None）
pub fn parse_optional_date(field: &str, value: Option<&str>) -> ApiResult<Option<NaiveDate>> {
    match value {
        None => Ok(None),
        Some(raw) if raw.is_empty() => Ok(None),
        Some(raw) => parse_schedule_date(field, raw).map(Some),
    }
}

/// 当前时间（秒级精度，与存储精度一致）
pub fn current_timestamp() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(0)
}

/// 实际上下班时间按存储精度截断到秒
pub fn clock_timestamp(value: Option<NaiveDateTime>) -> Option<NaiveDateTime> {
    value.map(|ts| ts.trunc_subsecs(0))
}

/// 解析请求中的时间戳
///
/// - 带时区偏移的 RFC 3339（如 `2024-06-03T06:05:00Z`）换算为 UTC
/// - 不带偏移的 `YYYY-MM-DDTHH:MM:SS[.f]` / `YYYY-MM-DD HH:MM:SS[.f]` 原样采用
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

// ==========================================
// 调用方上下文
// ==========================================

impl CallerScope {
    /// 从请求边界的身份声明构造调用方作用域
    ///
    /// # 参数
    /// - `is_admin`: 是否平台管理员（缺失即拒绝）
    /// - `customer_id`: 租户ID（非管理员时必填，且必须是合法 UUID）
    pub fn from_claims(is_admin: Option<bool>, customer_id: Option<&str>) -> ApiResult<Self> {
        match is_admin {
            None => Err(ApiError::MissingCallerContext(
                "缺少 is_admin 声明".to_string(),
            )),
            Some(true) => Ok(CallerScope::PlatformAdmin),
            Some(false) => {
                let raw = customer_id.ok_or_else(|| {
                    ApiError::MissingCallerContext("缺少 customer_id 声明".to_string())
                })?;
                let customer_id = Uuid::parse_str(raw).map_err(|_| {
                    ApiError::MissingCallerContext(format!("customer_id 声明格式错误: {}", raw))
                })?;
                Ok(CallerScope::Tenant { customer_id })
            }
        }
    }
}
