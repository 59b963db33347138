// ==========================================
// 车间排班计划系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// 覆写: 租户级配置 > 全局配置 > 代码默认值
// ==========================================

use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取指定作用域的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, scope: &ConfigScope, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
            params![scope.scope_id(), key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(&ConfigScope::Global, key)
    }

    /// 按覆写顺序解析配置值：租户级 > 全局
    pub fn resolve_config_value(
        &self,
        key: &str,
        customer_id: Option<Uuid>,
    ) -> Result<Option<String>, Box<dyn Error>> {
        if let Some(customer_id) = customer_id {
            let scope = ConfigScope::Customer { customer_id };
            if let Some(value) = self.get_config_value(&scope, key)? {
                return Ok(Some(value));
            }
        }
        self.get_global_config_value(key)
    }

    /// 写入配置值（存在则覆盖）
    pub fn set_config_value(
        &self,
        scope: &ConfigScope,
        key: &str,
        value: &str,
    ) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at)
             VALUES (?1, ?2, ?3, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3, updated_at = datetime('now')",
            params![scope.scope_id(), key, value],
        )?;

        tracing::info!(scope = %scope.scope_id(), key, value, "配置已更新");
        Ok(())
    }

    /// 获取所有 global 配置的快照（JSON格式，键有序）
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt = conn.prepare(
            "SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key"
        )?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
            ))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        let json_value = json!(config_map);
        Ok(serde_json::to_string(&json_value)?)
    }

    // ===== 班次配置 =====

    /// 是否拒绝零时长班次（默认 true）
    pub fn reject_zero_length_shifts(&self, customer_id: Option<Uuid>) -> Result<bool, Box<dyn Error>> {
        let value = self.resolve_config_value(config_keys::SHIFT_REJECT_ZERO_LENGTH, customer_id)?;
        Ok(match value.as_deref().map(str::trim) {
            None => true,
            Some("true") | Some("1") => true,
            Some("false") | Some("0") => false,
            Some(other) => {
                tracing::warn!(
                    config_key = config_keys::SHIFT_REJECT_ZERO_LENGTH,
                    raw_value = %other,
                    "零时长班次配置格式错误，使用默认值 true"
                );
                true
            }
        })
    }

    // ===== 日计划配置 =====

    /// 单次同步允许的最大明细数（默认 500）
    pub fn sync_max_entries(&self, customer_id: Option<Uuid>) -> Result<usize, Box<dyn Error>> {
        let value = self.resolve_config_value(config_keys::SCHEDULE_SYNC_MAX_ENTRIES, customer_id)?;
        let Some(raw) = value else {
            return Ok(DEFAULT_SYNC_MAX_ENTRIES);
        };
        Ok(raw.trim().parse::<usize>().unwrap_or_else(|_| {
            tracing::warn!(
                config_key = config_keys::SCHEDULE_SYNC_MAX_ENTRIES,
                raw_value = %raw,
                "同步上限配置格式错误，使用默认值"
            );
            DEFAULT_SYNC_MAX_ENTRIES
        }))
    }
}

/// 单次同步最大明细数默认值
pub const DEFAULT_SYNC_MAX_ENTRIES: usize = 500;

// ==========================================
// ConfigScope - 配置作用域
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigScope {
    Global,                         // 全局
    Customer { customer_id: Uuid }, // 租户
}

impl ConfigScope {
    /// config_kv.scope_id 取值
    pub fn scope_id(&self) -> String {
        match self {
            ConfigScope::Global => "global".to_string(),
            ConfigScope::Customer { customer_id } => format!("customer/{}", customer_id),
        }
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 班次
    pub const SHIFT_REJECT_ZERO_LENGTH: &str = "shift.reject_zero_length";

    // 日计划同步
    pub const SCHEDULE_SYNC_MAX_ENTRIES: &str = "schedule.sync_max_entries";
}
