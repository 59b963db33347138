// ==========================================
// 车间排班计划系统 - 班次管理 API
// ==========================================
// 职责: 班次定义的创建、修改、查询、删除
// 红线: 同一作用域内的启用班次时间段不得重叠（含跨零点班次）
// 红线: 校验与写入在同一个写事务内完成
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::api::parse::{current_timestamp, parse_optional_uuid, parse_time_of_day, parse_uuid};
use crate::config::ConfigManager;
use crate::domain::shift::{Shift, ShiftDraft};
use crate::engine::shift_overlap::{
    OverlapVerdict, ShiftCandidate, ShiftOverlapEngine, ShiftOverlapPolicy,
};
use crate::repository::shift_repo::ShiftRepository;
use uuid::Uuid;

// ==========================================
// ShiftRequest - 班次请求
// ==========================================

/// 班次创建/修改请求（字段均为外部传入的原始字符串）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShiftRequest {
    pub customer_id: String,
    /// 为空或缺省表示租户级班次
    #[serde(default)]
    pub shopfloor_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: String,
    /// HH:MM
    pub start_time: String,
    /// HH:MM，不晚于 start_time 表示跨零点
    pub end_time: String,
    #[serde(default)]
    pub is_active: bool,
}

// ==========================================
// ShiftApi - 班次管理 API
// ==========================================

/// 班次管理API
///
/// 职责：
/// 1. 请求解析（在访问存储之前完成）
/// 2. 作用域内重叠校验
/// 3. 班次读写
pub struct ShiftApi {
    shift_repo: Arc<ShiftRepository>,
    config_manager: Arc<ConfigManager>,
}

impl ShiftApi {
    /// 创建新的ShiftApi实例
    pub fn new(shift_repo: Arc<ShiftRepository>, config_manager: Arc<ConfigManager>) -> Self {
        Self {
            shift_repo,
            config_manager,
        }
    }

    /// 创建班次
    ///
    /// # 返回
    /// - Ok(Shift): 新建的班次
    /// - Err(ApiError::ParseError): 字段格式错误（未访问存储）
    /// - Err(ApiError::InvalidInput): 零时长班次
    /// - Err(ApiError::ShiftOverlap): 与同作用域启用班次冲突（未写入）
    pub fn create_shift(&self, request: &ShiftRequest) -> ApiResult<Shift> {
        let draft = parse_shift_request(request)?;
        let engine = self.overlap_engine(draft.customer_id)?;

        let shift = Shift::from_draft(draft, current_timestamp());
        let candidate = ShiftCandidate {
            id: None,
            scope: shift.scope(),
            start_time: shift.start_time,
            end_time: shift.end_time,
        };
        reject_zero_length(&engine, &candidate)?;

        self.shift_repo.create_checked(&shift, |listed| {
            let peers = engine.peers_in_scope(candidate.scope, listed);
            tracing::debug!(scope = %candidate.scope, peers = peers.len(), "班次重叠校验");
            verdict_to_result(engine.check(&candidate, &peers), &candidate)
        })?;

        tracing::info!(
            shift_id = %shift.id,
            scope = %candidate.scope,
            start = %shift.start_time.format("%H:%M"),
            end = %shift.end_time.format("%H:%M"),
            "班次已创建"
        );
        Ok(shift)
    }

    /// 修改班次（全量替换）
    ///
    /// 除 id 与 created_at 外，请求中的每个字段都会覆盖原值。
    pub fn update_shift(&self, id: &str, request: &ShiftRequest) -> ApiResult<Shift> {
        let id = parse_uuid("id", id)?;
        let draft = parse_shift_request(request)?;
        let engine = self.overlap_engine(draft.customer_id)?;

        let scope = draft.scope();
        let candidate = ShiftCandidate {
            id: Some(id),
            scope,
            start_time: draft.start_time,
            end_time: draft.end_time,
        };
        reject_zero_length(&engine, &candidate)?;

        let now = current_timestamp();
        let updated = self
            .shift_repo
            .update_checked(id, scope, |mut existing, listed| -> ApiResult<Shift> {
                let peers = engine.peers_in_scope(candidate.scope, listed);
                tracing::debug!(scope = %candidate.scope, peers = peers.len(), "班次重叠校验");
                verdict_to_result(engine.check(&candidate, &peers), &candidate)?;
                existing.replace_with(draft, now);
                Ok(existing)
            })?;

        tracing::info!(shift_id = %updated.id, scope = %candidate.scope, "班次已更新");
        Ok(updated)
    }

    /// 按ID查询班次
    pub fn get_shift(&self, id: &str) -> ApiResult<Shift> {
        let id = parse_uuid("id", id)?;
        self.shift_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::NotFound(format!("Shift(id={})不存在", id)))
    }

    /// 查询车间下的班次（按开始时刻排序）
    pub fn list_shifts_by_shopfloor(&self, shopfloor_id: &str) -> ApiResult<Vec<Shift>> {
        let shopfloor_id = parse_uuid("shopfloor_id", shopfloor_id)?;
        Ok(self.shift_repo.find_by_shopfloor_id(shopfloor_id)?)
    }

    /// 查询租户下的全部班次（按开始时刻排序）
    pub fn list_shifts_by_customer(&self, customer_id: &str) -> ApiResult<Vec<Shift>> {
        let customer_id = parse_uuid("customer_id", customer_id)?;
        Ok(self.shift_repo.find_by_customer_id(customer_id)?)
    }

    /// 删除班次
    ///
    /// 引用该班次的排产明细不做处理。
    pub fn delete_shift(&self, id: &str) -> ApiResult<()> {
        let id = parse_uuid("id", id)?;
        self.shift_repo.delete(id)?;
        tracing::info!(shift_id = %id, "班次已删除");
        Ok(())
    }

    /// 按租户配置构建重叠校验引擎
    fn overlap_engine(&self, customer_id: Uuid) -> ApiResult<ShiftOverlapEngine> {
        let reject_zero_length = self
            .config_manager
            .reject_zero_length_shifts(Some(customer_id))
            .map_err(|e| ApiError::InternalError(format!("读取班次配置失败: {}", e)))?;
        Ok(ShiftOverlapEngine::new(ShiftOverlapPolicy { reject_zero_length }))
    }
}

// ==========================================
// 辅助函数
// ==========================================

fn parse_shift_request(request: &ShiftRequest) -> ApiResult<ShiftDraft> {
    Ok(ShiftDraft {
        customer_id: parse_uuid("customer_id", &request.customer_id)?,
        shopfloor_id: parse_optional_uuid("shopfloor_id", request.shopfloor_id.as_deref())?,
        name: request.name.clone(),
        color: request.color.clone(),
        start_time: parse_time_of_day("start_time", &request.start_time)?,
        end_time: parse_time_of_day("end_time", &request.end_time)?,
        is_active: request.is_active,
    })
}

fn reject_zero_length(engine: &ShiftOverlapEngine, candidate: &ShiftCandidate) -> ApiResult<()> {
    match engine.check(candidate, &[]) {
        OverlapVerdict::ZeroLength => verdict_to_result(OverlapVerdict::ZeroLength, candidate),
        _ => Ok(()),
    }
}

fn verdict_to_result(verdict: OverlapVerdict, candidate: &ShiftCandidate) -> ApiResult<()> {
    match verdict {
        OverlapVerdict::Clear => Ok(()),
        OverlapVerdict::ZeroLength => Err(ApiError::InvalidInput(format!(
            "班次开始与结束时刻相同({})，时长不能为零",
            candidate.start_time.format("%H:%M")
        ))),
        OverlapVerdict::Conflict {
            shift_id,
            shift_name,
        } => {
            tracing::warn!(
                scope = %candidate.scope,
                conflicting_shift_id = %shift_id,
                conflicting_shift_name = %shift_name,
                "班次时间重叠，拒绝写入"
            );
            Err(ApiError::ShiftOverlap {
                conflicting_shift_id: shift_id,
                conflicting_shift_name: shift_name,
            })
        }
    }
}
