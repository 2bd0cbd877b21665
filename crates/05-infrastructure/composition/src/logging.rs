//! 日志初始化

use infrastructure_common::{InfrastructureError, InfrastructureResult};
use tracing::info;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// 日志级别，设置了 `RUST_LOG` 时以环境变量为准
    pub level: tracing::Level,
    /// 是否显示目标
    pub show_target: bool,
    /// 是否显示线程ID
    pub show_thread_ids: bool,
    /// 是否显示文件名
    pub show_file: bool,
    /// 是否显示行号
    pub show_line_number: bool,
    /// 是否使用 JSON 格式
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: true,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// 开发环境：DEBUG 级别，带源码位置
    pub fn development() -> Self {
        Self {
            level: tracing::Level::DEBUG,
            show_file: true,
            show_line_number: true,
            ..Self::default()
        }
    }

    /// 生产环境：INFO 级别，JSON 输出
    pub fn production() -> Self {
        Self {
            show_target: false,
            json_format: true,
            ..Self::default()
        }
    }

    /// 设置日志级别
    pub fn with_level(mut self, level: tracing::Level) -> Self {
        self.level = level;
        self
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::default().add_directive(LevelFilter::from_level(self.level).into()))
    }
}

/// 初始化全局日志订阅者
///
/// 全局订阅者只能设置一次，重复调用返回 [`InfrastructureError::BootstrapFailed`]。
pub fn init_logging(config: &LoggingConfig) -> InfrastructureResult<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(config.env_filter())
        .with_target(config.show_target)
        .with_thread_ids(config.show_thread_ids)
        .with_file(config.show_file)
        .with_line_number(config.show_line_number);

    if config.json_format {
        subscriber.json().try_init()
    } else {
        subscriber.try_init()
    }
    .map_err(|e| InfrastructureError::bootstrap_failed(format!("日志初始化失败: {}", e)))?;

    info!("日志系统初始化完成");
    Ok(())
}
