// ==========================================
// 车间排班计划系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换Repository错误为用户友好的错误消息
// 约束: 所有错误信息必须包含显式原因
// ==========================================

use crate::repository::error::RepositoryError;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 请求解析错误
    // ==========================================
    /// 标识符 / 日期 / 时刻格式错误（在访问存储之前返回）
    #[error("字段解析失败: field={field}, value={value:?}")]
    ParseError { field: String, value: String },

    /// 调用方上下文缺失或类型不符
    #[error("调用方上下文缺失: {0}")]
    MissingCallerContext(String),

    // ==========================================
    // 业务规则错误
    // ==========================================
    /// 同一作用域内启用班次时间重叠
    #[error("班次时间重叠: 与班次 {conflicting_shift_name}({conflicting_shift_id}) 冲突")]
    ShiftOverlap {
        conflicting_shift_id: Uuid,
        conflicting_shift_name: String,
    },

    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// 调用方可见的错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    BadRequest,
    Conflict,
    Forbidden,
    NotFound,
    Internal,
}

impl ApiError {
    /// 构造解析错误
    pub fn parse(field: &str, value: &str) -> Self {
        ApiError::ParseError {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    /// 错误类别
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::ParseError { .. } | ApiError::InvalidInput(_) => ErrorKind::BadRequest,
            ApiError::ShiftOverlap { .. } | ApiError::BusinessRuleViolation(_) => {
                ErrorKind::Conflict
            }
            ApiError::MissingCallerContext(_) => ErrorKind::Forbidden,
            ApiError::NotFound(_) => ErrorKind::NotFound,
            ApiError::DatabaseError(_)
            | ApiError::DatabaseConnectionError(_)
            | ApiError::DatabaseTransactionError(_)
            | ApiError::InternalError(_)
            | ApiError::Other(_) => ErrorKind::Internal,
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            // 数据库错误
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("外键约束违反: {}", msg))
            }

            // 业务规则错误
            RepositoryError::BusinessRuleViolation(msg) => ApiError::BusinessRuleViolation(msg),

            // 通用错误
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_conversion() {
        // NotFound错误转换
        let repo_err = RepositoryError::not_found("Shift", "S001");
        let api_err: ApiError = repo_err.into();
        match api_err {
            ApiError::NotFound(msg) => {
                assert!(msg.contains("Shift"));
                assert!(msg.contains("S001"));
            }
            _ => panic!("Expected NotFound"),
        }

        // 锁等待超时 -> 事务错误
        let api_err: ApiError =
            RepositoryError::DatabaseTransactionError("database is locked".to_string()).into();
        assert!(matches!(api_err, ApiError::DatabaseTransactionError(_)));
        assert_eq!(api_err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_error_kind_classes() {
        assert_eq!(ApiError::parse("shift_id", "abc").kind(), ErrorKind::BadRequest);
        assert_eq!(
            ApiError::ShiftOverlap {
                conflicting_shift_id: Uuid::nil(),
                conflicting_shift_name: "Morning".to_string(),
            }
            .kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            ApiError::MissingCallerContext("is_admin".to_string()).kind(),
            ErrorKind::Forbidden
        );
        assert_eq!(ApiError::NotFound("x".to_string()).kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_overlap_message_names_conflicting_shift() {
        let err = ApiError::ShiftOverlap {
            conflicting_shift_id: Uuid::nil(),
            conflicting_shift_name: "Evening".to_string(),
        };
        assert!(err.to_string().contains("Evening"));
    }
}
