// ==========================================
// 车间排班计划系统 - 班次重叠校验引擎
// ==========================================
// 规则: 同一作用域内的启用班次，时间段不得相交（含跨零点）
// 规则: 编辑时排除自身；停用班次不参与比较
// 红线: Engine 不拼 SQL，同伴集合由调用方从仓储读取后传入
// ==========================================

use crate::domain::shift::Shift;
use crate::domain::types::ShiftScope;
use crate::engine::time_span::{is_zero_length, spans_overlap};
use chrono::NaiveTime;
use uuid::Uuid;

/// 重叠校验策略
#[derive(Debug, Clone)]
pub struct ShiftOverlapPolicy {
    /// 拒绝零时长班次（start == end）
    pub reject_zero_length: bool,
}

impl Default for ShiftOverlapPolicy {
    fn default() -> Self {
        Self {
            reject_zero_length: true,
        }
    }
}

/// 候选班次（新建或编辑后的值）
#[derive(Debug, Clone, Copy)]
pub struct ShiftCandidate {
    /// 编辑时为自身ID，新建时为 None
    pub id: Option<Uuid>,
    pub scope: ShiftScope,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// 校验结论
#[derive(Debug, Clone, PartialEq)]
pub enum OverlapVerdict {
    Clear,
    ZeroLength,
    Conflict { shift_id: Uuid, shift_name: String },
}

/// ShiftOverlapEngine - 班次重叠校验引擎
pub struct ShiftOverlapEngine {
    policy: ShiftOverlapPolicy,
}

impl ShiftOverlapEngine {
    pub fn new(policy: ShiftOverlapPolicy) -> Self {
        Self { policy }
    }

    /// 从仓储列表中筛出与作用域完全匹配的同伴班次
    ///
    /// 车间级列表可能混入其他分区的数据，必须在这里按作用域值再次过滤:
    /// - 车间作用域: shopfloor_id 完全相等
    /// - 租户作用域: 同一租户且 shopfloor_id 为空
    pub fn peers_in_scope<'a>(&self, scope: ShiftScope, listed: &'a [Shift]) -> Vec<&'a Shift> {
        listed.iter().filter(|s| in_scope(scope, s)).collect()
    }

    /// 校验候选班次
    ///
    /// # 参数
    /// - `candidate`: 候选班次
    /// - `peers`: 同伴班次；不属于 `candidate.scope` 的会被忽略
    ///
    /// # 返回
    /// 第一个冲突的同伴班次，或 Clear / ZeroLength
    pub fn check(&self, candidate: &ShiftCandidate, peers: &[&Shift]) -> OverlapVerdict {
        if self.policy.reject_zero_length
            && is_zero_length(candidate.start_time, candidate.end_time)
        {
            return OverlapVerdict::ZeroLength;
        }

        let conflict = peers
            .iter()
            .filter(|peer| in_scope(candidate.scope, peer))
            .filter(|peer| Some(peer.id) != candidate.id)
            .filter(|peer| peer.is_active)
            .find(|peer| {
                spans_overlap(
                    candidate.start_time,
                    candidate.end_time,
                    peer.start_time,
                    peer.end_time,
                )
            });

        match conflict {
            Some(peer) => OverlapVerdict::Conflict {
                shift_id: peer.id,
                shift_name: peer.name.clone(),
            },
            None => OverlapVerdict::Clear,
        }
    }
}

fn in_scope(scope: ShiftScope, shift: &Shift) -> bool {
    match scope {
        ShiftScope::Shopfloor(id) => shift.shopfloor_id == Some(id),
        ShiftScope::Customer(id) => shift.customer_id == id && shift.shopfloor_id.is_none(),
    }
}

impl Default for ShiftOverlapEngine {
    fn default() -> Self {
        Self::new(ShiftOverlapPolicy::default())
    }
}
