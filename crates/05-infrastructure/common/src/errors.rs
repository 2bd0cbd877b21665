//! 错误类型定义

use thiserror::Error;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败: {path}, 原因: {source}")]
    FileReadError {
        path: String,
        source: std::io::Error,
    },

    #[error("配置项 {key} 不是有效的整数: {value:?}, 原因: {source}")]
    InvalidInteger {
        key: String,
        value: String,
        source: std::num::ParseIntError,
    },

    #[error("配置项 {key} 不是有效的浮点数: {value:?}, 原因: {source}")]
    InvalidFloat {
        key: String,
        value: String,
        source: std::num::ParseFloatError,
    },

    #[error("配置项 {key} 不是有效的布尔值: {value:?}")]
    InvalidBool { key: String, value: String },

    #[error("必需的配置项缺失: {key}")]
    RequiredPropertyMissing { key: String },
}

/// 依赖注入错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DependencyError {
    /// Bean 名称冲突。对于已转移所有权的实例，调用方必须视为致命错误
    #[error("Bean 名称冲突: {name} ({type_name})")]
    BeanNameConflict { name: String, type_name: String },

    #[error("Bean 不存在: {name}")]
    BeanNotFound { name: String },
}

/// 基础设施错误类型
#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("配置错误: {source}")]
    ConfigError {
        #[from]
        source: ConfigError,
    },

    #[error("依赖注入错误: {source}")]
    DependencyError {
        #[from]
        source: DependencyError,
    },

    #[error("基础设施启动失败: {message}")]
    BootstrapFailed { message: String },
}

impl InfrastructureError {
    /// 创建启动失败错误
    pub fn bootstrap_failed(message: impl Into<String>) -> Self {
        Self::BootstrapFailed {
            message: message.into(),
        }
    }
}

/// 结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type DependencyResult<T> = Result<T, DependencyError>;
pub type InfrastructureResult<T> = Result<T, InfrastructureError>;
