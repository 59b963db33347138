// ==========================================
// 车间排班计划系统 - 班次领域模型
// ==========================================
// 红线: 同一作用域内的启用班次，时间段两两不重叠
// 对齐: shifts 表
// ==========================================

use crate::domain::types::ShiftScope;
use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// Shift - 班次定义
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    // ===== 主键与归属 =====
    pub id: Uuid,
    pub customer_id: Uuid,           // 所属租户
    pub shopfloor_id: Option<Uuid>,  // 所属车间 (None 表示租户级)

    // ===== 展示信息 =====
    pub name: String,
    pub color: String,

    // ===== 时间段 (end <= start 表示跨零点) =====
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,

    // ===== 状态 =====
    pub is_active: bool,

    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// 已解析的班次请求（创建/更新共用）
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftDraft {
    pub customer_id: Uuid,
    pub shopfloor_id: Option<Uuid>,
    pub name: String,
    pub color: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_active: bool,
}

impl ShiftDraft {
    pub fn scope(&self) -> ShiftScope {
        ShiftScope::of(self.customer_id, self.shopfloor_id)
    }
}

impl Shift {
    /// 由草稿创建新班次（新ID、当前时间戳）
    pub fn from_draft(draft: ShiftDraft, now: NaiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_id: draft.customer_id,
            shopfloor_id: draft.shopfloor_id,
            name: draft.name,
            color: draft.color,
            start_time: draft.start_time,
            end_time: draft.end_time,
            is_active: draft.is_active,
            created_at: now,
            updated_at: now,
        }
    }

    /// 全量覆盖更新
    ///
    /// 请求中的每个字段都覆盖已有值（与排产明细的部分更新不同）。
    /// id 与 created_at 保持不变。
    pub fn replace_with(&mut self, draft: ShiftDraft, now: NaiveDateTime) {
        self.customer_id = draft.customer_id;
        self.shopfloor_id = draft.shopfloor_id;
        self.name = draft.name;
        self.color = draft.color;
        self.start_time = draft.start_time;
        self.end_time = draft.end_time;
        self.is_active = draft.is_active;
        self.updated_at = now;
    }

    pub fn scope(&self) -> ShiftScope {
        ShiftScope::of(self.customer_id, self.shopfloor_id)
    }
}

// ==========================================
// HH:MM 序列化
// ==========================================
pub(crate) mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map_err(serde::de::Error::custom)
    }
}
