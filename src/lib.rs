// ==========================================
// 车间排班计划系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 多租户车间班次定义与日计划同步
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则（纯函数，不访问存储）
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{CallerScope, ShiftScope};

// 领域实体
pub use domain::{ScheduleEntry, ScheduleEntryPatch, ScheduleFilter, Shift, ShiftDraft};

// 引擎
pub use engine::{OverlapVerdict, ShiftOverlapEngine, ShiftOverlapPolicy};

// API
pub use api::{
    ApiError, ApiResult, ErrorKind, ScheduleApi, ScheduleEntryRequest, ScheduleSearchRequest,
    ShiftApi, ShiftRequest,
};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "车间排班计划系统";

// 数据库版本
pub const DB_VERSION: &str = "v1";
