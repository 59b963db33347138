// ==========================================
// API集成测试辅助工具
// ==========================================
// 职责: 提供API层集成测试的通用辅助函数
// ==========================================

#[path = "../test_helpers.rs"]
mod test_helpers;

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use tempfile::NamedTempFile;
use uuid::Uuid;

use shopfloor_planner::api::{ScheduleApi, ScheduleEntryRequest, ShiftApi, ShiftRequest};
use shopfloor_planner::config::ConfigManager;
use shopfloor_planner::db::open_sqlite_connection;
use shopfloor_planner::domain::Shift;
use shopfloor_planner::repository::{ScheduleEntryRepository, ShiftRepository};

// ==========================================
// API测试环境
// ==========================================

/// API测试环境
///
/// 包含所有API实例和必要的依赖
pub struct ApiTestEnv {
    pub db_path: String,
    pub conn: Arc<Mutex<Connection>>,
    pub shift_api: Arc<ShiftApi>,
    pub schedule_api: Arc<ScheduleApi>,
    pub config_manager: Arc<ConfigManager>,

    // Repository层（用于测试数据准备与断言）
    pub shift_repo: Arc<ShiftRepository>,
    pub entry_repo: Arc<ScheduleEntryRepository>,

    // 临时文件（确保生命周期）
    _temp_file: NamedTempFile,
}

impl ApiTestEnv {
    /// 创建新的API测试环境
    ///
    /// # 说明
    /// - 使用临时数据库文件
    /// - 初始化所有Repository和API
    pub fn new() -> Result<Self, String> {
        shopfloor_planner::logging::init_test();

        let (temp_file, db_path) = test_helpers::create_test_db()
            .map_err(|e| format!("创建测试数据库失败: {}", e))?;

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        let shift_repo = Arc::new(ShiftRepository::new(conn.clone()));
        let entry_repo = Arc::new(ScheduleEntryRepository::new(conn.clone()));
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        let shift_api = Arc::new(ShiftApi::new(shift_repo.clone(), config_manager.clone()));
        let schedule_api = Arc::new(ScheduleApi::new(
            entry_repo.clone(),
            shift_repo.clone(),
            config_manager.clone(),
        ));

        Ok(Self {
            db_path,
            conn,
            shift_api,
            schedule_api,
            config_manager,
            shift_repo,
            entry_repo,
            _temp_file: temp_file,
        })
    }

    /// 在同一数据库文件上打开独立连接的 ShiftApi（模拟另一个进程/实例）
    pub fn independent_shift_api(&self) -> Result<ShiftApi, String> {
        let conn = open_sqlite_connection(&self.db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        Ok(ShiftApi::new(
            Arc::new(ShiftRepository::new(conn)),
            config_manager,
        ))
    }

    /// 在同一数据库文件上打开独立连接的 ScheduleApi
    pub fn independent_schedule_api(&self) -> Result<ScheduleApi, String> {
        let conn = open_sqlite_connection(&self.db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        Ok(ScheduleApi::new(
            Arc::new(ScheduleEntryRepository::new(conn.clone())),
            Arc::new(ShiftRepository::new(conn)),
            config_manager,
        ))
    }

    /// 创建一个启用的班次（测试数据准备）
    pub fn create_active_shift(
        &self,
        customer_id: Uuid,
        shopfloor_id: Option<Uuid>,
        name: &str,
        start: &str,
        end: &str,
    ) -> Shift {
        self.shift_api
            .create_shift(&shift_request(customer_id, shopfloor_id, name, start, end))
            .expect("创建班次失败")
    }
}

// ==========================================
// 请求构造
// ==========================================

/// 构造启用班次请求
pub fn shift_request(
    customer_id: Uuid,
    shopfloor_id: Option<Uuid>,
    name: &str,
    start: &str,
    end: &str,
) -> ShiftRequest {
    ShiftRequest {
        customer_id: customer_id.to_string(),
        shopfloor_id: shopfloor_id.map(|id| id.to_string()),
        name: name.to_string(),
        color: "#3366ff".to_string(),
        start_time: start.to_string(),
        end_time: end.to_string(),
        is_active: true,
    }
}

/// 构造排产明细请求
pub fn entry_request(
    customer_id: Uuid,
    shopfloor_id: Uuid,
    shift_id: Uuid,
    date: &str,
    order: i32,
) -> ScheduleEntryRequest {
    ScheduleEntryRequest {
        customer_id: Some(customer_id.to_string()),
        shopfloor_id: Some(shopfloor_id.to_string()),
        shift_id: Some(shift_id.to_string()),
        date: Some(date.to_string()),
        order,
        ..Default::default()
    }
}
