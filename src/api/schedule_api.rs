// ==========================================
// 车间排班计划系统 - 日计划 API
// ==========================================
// 职责: 排产明细维护、条件查询、车间日计划整体同步
// 红线: 租户调用方只能看到本租户数据
// 红线: 日计划同步要么整体生效，要么原计划保持不变
// ==========================================

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::api::parse::{clock_timestamp, parse_optional_uuid, parse_schedule_date, parse_uuid};
use crate::config::ConfigManager;
use crate::domain::schedule::ScheduleEntry;
use crate::repository::schedule_entry_repo::ScheduleEntryRepository;
use crate::repository::shift_repo::ShiftRepository;

mod entries;
mod search;
mod sync;

// ==========================================
// 请求 DTO
// ==========================================

/// 排产明细请求
///
/// 标识符与日期均为原始字符串；缺省或空串在新建时视为缺失，
/// 在修改时视为"保持原值"。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleEntryRequest {
    /// 仅同步时使用：合法则沿用，否则生成新ID
    pub id: Option<String>,
    pub customer_id: Option<String>,
    pub shopfloor_id: Option<String>,
    pub shift_id: Option<String>,
    pub workcenter_id: Option<String>,
    pub job_id: Option<String>,
    pub operator_id: Option<String>,
    /// YYYY-MM-DD 或 RFC 3339 时间戳
    pub date: Option<String>,
    pub order: i32,
    /// RFC 3339（带偏移时换算为 UTC）或不带偏移的本地时间
    #[serde(with = "timestamp_serde")]
    pub start_time: Option<NaiveDateTime>,
    #[serde(with = "timestamp_serde")]
    pub end_time: Option<NaiveDateTime>,
    pub is_completed: bool,
}

/// 请求时间戳的序列化格式
///
/// 输出 `YYYY-MM-DDTHH:MM:SS`；输入兼容带偏移的 RFC 3339，空串与 null 视为缺失
mod timestamp_serde {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    use crate::api::parse::parse_timestamp;

    const OUTPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_str(&ts.format(OUTPUT_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => parse_timestamp(raw.trim())
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("无法解析时间戳: {}", raw))),
        }
    }
}

/// 查询字符串形式的检索请求
///
/// `date` 同时设定起止日期；`from` / `to` 分别覆盖起止日期。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleSearchRequest {
    pub customer_id: Option<String>,
    pub shopfloor_id: Option<String>,
    pub shift_id: Option<String>,
    pub workcenter_id: Option<String>,
    pub job_id: Option<String>,
    pub operator_id: Option<String>,
    pub date: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

// ==========================================
// ScheduleApi - 日计划 API
// ==========================================

/// 日计划API
///
/// 职责：
/// 1. 排产明细增删改查
/// 2. 按调用方作用域检索
/// 3. 车间日计划整体同步
pub struct ScheduleApi {
    entry_repo: Arc<ScheduleEntryRepository>,
    shift_repo: Arc<ShiftRepository>,
    config_manager: Arc<ConfigManager>,
}

impl ScheduleApi {
    /// 创建新的ScheduleApi实例
    pub fn new(
        entry_repo: Arc<ScheduleEntryRepository>,
        shift_repo: Arc<ShiftRepository>,
        config_manager: Arc<ConfigManager>,
    ) -> Self {
        Self {
            entry_repo,
            shift_repo,
            config_manager,
        }
    }

    /// 校验班次可用于排产：必须存在且处于启用状态
    ///
    /// # 返回
    /// - Err(ApiError::NotFound): 班次不存在
    /// - Err(ApiError::BusinessRuleViolation): 班次已停用
    fn ensure_shift_assignable(&self, shift_id: Uuid) -> ApiResult<()> {
        let shift = self
            .shift_repo
            .find_by_id(shift_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Shift(id={})不存在", shift_id)))?;
        if !shift.is_active {
            tracing::warn!(shift_id = %shift.id, shift_name = %shift.name, "引用已停用班次，拒绝排产");
            return Err(ApiError::BusinessRuleViolation(format!(
                "班次{}({})已停用，不能新增排产",
                shift.name, shift.id
            )));
        }
        Ok(())
    }
}

// ==========================================
// 辅助函数
// ==========================================

/// 解析必填标识符（缺省按空串报告）
fn required_uuid(field: &str, value: Option<&str>) -> ApiResult<Uuid> {
    parse_uuid(field, value.unwrap_or(""))
}

/// 解析必填日期（缺省按空串报告）
fn required_date(field: &str, value: Option<&str>) -> ApiResult<NaiveDate> {
    parse_schedule_date(field, value.unwrap_or(""))
}

/// 把请求完整解析为一条新明细（日期由调用方给出）
fn parse_entry_request(
    request: &ScheduleEntryRequest,
    id: Uuid,
    date: NaiveDate,
    now: NaiveDateTime,
) -> ApiResult<ScheduleEntry> {
    Ok(ScheduleEntry {
        id,
        customer_id: required_uuid("customer_id", request.customer_id.as_deref())?,
        shopfloor_id: required_uuid("shopfloor_id", request.shopfloor_id.as_deref())?,
        shift_id: required_uuid("shift_id", request.shift_id.as_deref())?,
        workcenter_id: parse_optional_uuid("workcenter_id", request.workcenter_id.as_deref())?,
        job_id: parse_optional_uuid("job_id", request.job_id.as_deref())?,
        operator_id: parse_optional_uuid("operator_id", request.operator_id.as_deref())?,
        date,
        order: request.order,
        start_time: clock_timestamp(request.start_time),
        end_time: clock_timestamp(request.end_time),
        is_completed: request.is_completed,
        created_at: now,
        updated_at: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn full_request() -> ScheduleEntryRequest {
        ScheduleEntryRequest {
            customer_id: Some(Uuid::new_v4().to_string()),
            shopfloor_id: Some(Uuid::new_v4().to_string()),
            shift_id: Some(Uuid::new_v4().to_string()),
            date: Some("2024-06-03".to_string()),
            order: 4,
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_entry_request_optional_ids() {
        let mut req = full_request();
        req.workcenter_id = Some(String::new());
        let op = Uuid::new_v4();
        req.operator_id = Some(op.to_string());

        let date = required_date("date", req.date.as_deref()).unwrap();
        let entry = parse_entry_request(&req, Uuid::new_v4(), date, now()).unwrap();
        assert_eq!(entry.workcenter_id, None);
        assert_eq!(entry.job_id, None);
        assert_eq!(entry.operator_id, Some(op));
        assert_eq!(entry.date, NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());
        assert_eq!(entry.order, 4);
    }

    #[test]
    fn test_parse_entry_request_missing_required() {
        let mut req = full_request();
        req.shift_id = None;
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        match parse_entry_request(&req, Uuid::new_v4(), date, now()) {
            Err(ApiError::ParseError { field, value }) => {
                assert_eq!(field, "shift_id");
                assert!(value.is_empty());
            }
            other => panic!("Expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_entry_request_deserialize_with_clock_times() {
        let json = r#"{
            "customer_id": "5f1c2b0e-8a4e-4c55-9a57-2f7b9d3c1a11",
            "date": "2024-06-03",
            "start_time": "2024-06-03T06:05:00",
            "is_completed": true
        }"#;
        let req: ScheduleEntryRequest = serde_json::from_str(json).unwrap();
        assert!(req.is_completed);
        assert_eq!(req.order, 0);
        assert!(req.end_time.is_none());
        assert_eq!(
            req.start_time,
            Some(
                NaiveDate::from_ymd_opt(2024, 6, 3)
                    .unwrap()
                    .and_hms_opt(6, 5, 0)
                    .unwrap()
            )
        );
    }

    #[test]
    fn test_entry_request_deserialize_offset_clock_times() {
        let json = r#"{
            "shift_id": "5f1c2b0e-8a4e-4c55-9a57-2f7b9d3c1a11",
            "start_time": "2024-06-03T06:05:00Z",
            "end_time": "2024-06-03T16:30:00+02:00"
        }"#;
        let req: ScheduleEntryRequest = serde_json::from_str(json).unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        assert_eq!(req.start_time, Some(day.and_hms_opt(6, 5, 0).unwrap()));
        assert_eq!(req.end_time, Some(day.and_hms_opt(14, 30, 0).unwrap()));

        let json = r#"{"start_time": "", "end_time": null}"#;
        let req: ScheduleEntryRequest = serde_json::from_str(json).unwrap();
        assert!(req.start_time.is_none());
        assert!(req.end_time.is_none());

        let json = r#"{"start_time": "six o'clock"}"#;
        assert!(serde_json::from_str::<ScheduleEntryRequest>(json).is_err());
    }

    #[test]
    fn test_entry_request_serialize_clock_times_round_trip() {
        let mut req = full_request();
        req.start_time = Some(now());
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains(r#""start_time":"2024-06-01T09:00:00""#));
        assert!(json.contains(r#""end_time":null"#));

        let back: ScheduleEntryRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.start_time, req.start_time);
    }
}
