// ==========================================
// 车间排班计划系统 - 领域类型定义
// ==========================================
// 职责: 调用方作用域、班次作用域等值类型
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ==========================================
// 调用方作用域 (Caller Scope)
// ==========================================
// 在请求边界由认证信息构造一次，显式传入每个需要租户隔离的调用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallerScope {
    /// 平台管理员：可见全部租户数据
    PlatformAdmin,
    /// 租户用户：只可见本租户数据
    Tenant { customer_id: Uuid },
}

impl CallerScope {
    /// 租户ID（管理员返回 None）
    pub fn customer_id(&self) -> Option<Uuid> {
        match self {
            CallerScope::PlatformAdmin => None,
            CallerScope::Tenant { customer_id } => Some(*customer_id),
        }
    }
}

impl fmt::Display for CallerScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallerScope::PlatformAdmin => write!(f, "PLATFORM_ADMIN"),
            CallerScope::Tenant { customer_id } => write!(f, "TENANT({})", customer_id),
        }
    }
}

// ==========================================
// 班次作用域 (Shift Scope)
// ==========================================
// 重叠校验的边界: 指定车间时按车间，否则按整个租户（且无车间）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShiftScope {
    Shopfloor(Uuid),
    Customer(Uuid),
}

impl ShiftScope {
    /// 由班次归属字段推导作用域
    pub fn of(customer_id: Uuid, shopfloor_id: Option<Uuid>) -> Self {
        match shopfloor_id {
            Some(id) => ShiftScope::Shopfloor(id),
            None => ShiftScope::Customer(customer_id),
        }
    }
}

impl fmt::Display for ShiftScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShiftScope::Shopfloor(id) => write!(f, "SHOPFLOOR({})", id),
            ShiftScope::Customer(id) => write!(f, "CUSTOMER({})", id),
        }
    }
}
