// ==========================================
// 车间排班计划系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::api::{ScheduleApi, ShiftApi};
use crate::config::ConfigManager;
use crate::db::{ensure_schema, open_sqlite_connection, read_schema_version};
use crate::repository::{ScheduleEntryRepository, ShiftRepository};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "SHOPFLOOR_PLANNER_DB_PATH";

// ==========================================
// AppState - 应用状态
// ==========================================

/// 应用状态
///
/// 所有仓储共享同一个数据库连接
pub struct AppState {
    db_path: String,
    pub conn: Arc<Mutex<Connection>>,

    // API 实例
    pub shift_api: Arc<ShiftApi>,
    pub schedule_api: Arc<ScheduleApi>,

    // 直接暴露的依赖（供启动自检与维护操作使用）
    pub config_manager: Arc<ConfigManager>,
    pub shift_repo: Arc<ShiftRepository>,
    pub entry_repo: Arc<ScheduleEntryRepository>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 返回
    /// - Ok(AppState): 成功创建的应用状态
    /// - Err(String): 初始化错误
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开数据库并建表（幂等）
    /// 2. 初始化所有Repository
    /// 3. 创建所有API实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        ensure_schema(&conn).map_err(|e| format!("数据库建表失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let shift_repo = Arc::new(ShiftRepository::new(conn.clone()));
        let entry_repo = Arc::new(ScheduleEntryRepository::new(conn.clone()));

        // 配置管理器
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        // ==========================================
        // 初始化API层
        // ==========================================
        let shift_api = Arc::new(ShiftApi::new(shift_repo.clone(), config_manager.clone()));
        let schedule_api = Arc::new(ScheduleApi::new(
            entry_repo.clone(),
            shift_repo.clone(),
            config_manager.clone(),
        ));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            conn,
            shift_api,
            schedule_api,
            config_manager,
            shift_repo,
            entry_repo,
        })
    }

    /// 获取数据库路径
    pub fn get_db_path(&self) -> &str {
        &self.db_path
    }

    /// 读取当前 schema 版本
    pub fn schema_version(&self) -> Result<Option<i64>, String> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| format!("锁获取失败: {}", e))?;
        read_schema_version(&conn).map_err(|e| format!("读取schema版本失败: {}", e))
    }
}

// ==========================================
// 默认数据库路径辅助函数
// ==========================================

/// 获取默认数据库路径
///
/// # 返回
/// - 环境变量 SHOPFLOOR_PLANNER_DB_PATH（非空时优先）
/// - 开发环境: 用户数据目录/shopfloor-planner-dev/shopfloor_planner.db
/// - 生产环境: 用户数据目录/shopfloor-planner/shopfloor_planner.db
/// - 无法获取用户数据目录时: ./shopfloor_planner.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./shopfloor_planner.db");

    if let Some(data_dir) = dirs::data_dir() {
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("shopfloor-planner-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("shopfloor-planner");
        }

        // 确保目录存在
        std::fs::create_dir_all(&path).ok();
        path = path.join("shopfloor_planner.db");
    }

    path.to_string_lossy().to_string()
}
