//! 错误定义模块

use thiserror::Error;

/// EHR影像系统统一错误类型
///
/// 分析引擎本身没有错误路径，这里的错误全部来自外围：上传校验、患者查询、配置加载。
#[derive(Error, Debug)]
pub enum EhrError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("验证错误: {0}")]
    Validation(String),

    #[error("请求体过大: {0}")]
    PayloadTooLarge(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("系统内部错误: {0}")]
    Internal(String),
}

impl EhrError {
    /// 面向调用方的错误描述（不带分类前缀）
    pub fn detail(&self) -> String {
        match self {
            EhrError::Config(msg)
            | EhrError::Validation(msg)
            | EhrError::PayloadTooLarge(msg)
            | EhrError::NotFound(msg)
            | EhrError::Internal(msg) => msg.clone(),
            EhrError::Io(e) => e.to_string(),
            EhrError::Serialization(e) => e.to_string(),
        }
    }
}

/// EHR系统统一结果类型
pub type Result<T> = std::result::Result<T, EhrError>;
