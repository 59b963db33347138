// ==========================================
// 车间排班计划系统 - 主入口
// ==========================================
// 职责: 初始化日志、打开数据库并完成建表、输出启动自检信息
// ==========================================

use anyhow::{anyhow, Context};
use shopfloor_planner::app::{get_default_db_path, AppState};
use shopfloor_planner::logging;

fn main() -> anyhow::Result<()> {
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", shopfloor_planner::APP_NAME);
    tracing::info!("系统版本: {}", shopfloor_planner::VERSION);
    tracing::info!("==================================================");

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    let app_state = AppState::new(db_path).map_err(|e| anyhow!(e))?;

    let schema_version = app_state.schema_version().map_err(|e| anyhow!(e))?;
    let shift_count = app_state
        .shift_repo
        .count()
        .context("统计班次数量失败")?;
    let entry_count = app_state
        .entry_repo
        .count()
        .context("统计排产明细数量失败")?;

    tracing::info!(
        schema_version = ?schema_version,
        shifts = shift_count,
        schedule_entries = entry_count,
        "启动自检完成"
    );

    Ok(())
}
