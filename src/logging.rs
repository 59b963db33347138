// ==========================================
// 车间排班计划系统 - 日志初始化
// ==========================================
// 使用 tracing 和 tracing-subscriber
// 级别由 RUST_LOG 控制，输出格式由 SHOPFLOOR_PLANNER_LOG_FORMAT 控制
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 日志格式环境变量（取值 json 时输出结构化日志）
pub const LOG_FORMAT_ENV: &str = "SHOPFLOOR_PLANNER_LOG_FORMAT";

/// 未设置 RUST_LOG 时的默认过滤器：本 crate info，依赖库 warn
const DEFAULT_FILTER: &str = "warn,shopfloor_planner=info";

/// 初始化日志系统
///
/// # 环境变量
/// - RUST_LOG: 日志级别过滤器
///   例如: RUST_LOG=shopfloor_planner::repository=debug
/// - SHOPFLOOR_PLANNER_LOG_FORMAT: `json` 输出 JSON 行，其余为文本
///
/// # 示例
/// ```no_run
/// use shopfloor_planner::logging;
/// logging::init();
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true);

    if wants_json(std::env::var(LOG_FORMAT_ENV).ok().as_deref()) {
        builder.json().with_current_span(false).init();
    } else {
        builder.with_thread_ids(false).init();
    }
}

/// 初始化测试环境的日志系统
///
/// debug 级别，输出到测试捕获器，可重复调用
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

fn wants_json(format: Option<&str>) -> bool {
    format
        .map(|f| f.trim().eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}
