//! # 示例应用程序
//!
//! 演示属性分层、导入、变更通知和 Bean 注入。
//!
//! ```text
//! example-app --config-dir ./config --profile dev --app-name demo
//! ```

use anyhow::{Context as _, Result};
use clap::Parser;
use config_abstractions::PropertyResolver;
use config_impl::MapPropertySource;
use di_abstractions::{ApplicationContext, ApplicationContextAware, BeanFactory, BeanFactoryExt, BeanNameAware};
use infrastructure_composition::{
    init_logging, Bean, ContextArgs, ContextBootstrapper, DefaultApplicationContext, LoggingConfig,
};
use std::rc::{Rc, Weak};
use tracing::{info, warn};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "example-app")]
#[command(about = "属性与 Bean 容器示例")]
struct Args {
    #[command(flatten)]
    context: ContextArgs,

    /// 日志级别
    #[arg(long, default_value = "info")]
    log_level: tracing::Level,

    /// 以 JSON 输出日志
    #[arg(long)]
    json: bool,
}

/// 读取服务端配置的 Bean
#[derive(Bean, Default)]
#[bean(context_aware, name_aware)]
struct ServerSettings {
    bean_name: String,
    host: String,
    port: i64,
    debug: bool,
}

impl ApplicationContextAware for ServerSettings {
    fn set_application_context(&mut self, context: Weak<dyn ApplicationContext>) {
        let Some(context) = context.upgrade() else {
            return;
        };

        self.host = context.get_property_as_string("server.host", "127.0.0.1");
        self.port = context.get_property_as_int("server.port", 8080).unwrap_or_else(|e| {
            warn!("端口配置无效，使用默认值: {}", e);
            8080
        });
        self.debug = context.get_property_as_bool("server.debug", false).unwrap_or(false);
    }
}

impl BeanNameAware for ServerSettings {
    fn set_bean_name(&mut self, name: &str) {
        self.bean_name = name.to_string();
    }
}

/// 问候服务，作为单例注册
#[derive(Bean)]
struct Greeter {
    greeting: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let logging = if args.json {
        LoggingConfig::production()
    } else {
        LoggingConfig::default()
    };
    init_logging(&logging.with_level(args.log_level))?;

    let context = ContextBootstrapper::new(args.context)
        .with_program_name(env!("CARGO_PKG_NAME"))
        .bootstrap();
    context.initialize();
    info!("应用 {} 已启动，profile: {:?}", context.name(), context.active_profiles());

    demonstrate_properties(&context)?;
    demonstrate_beans(&context)?;

    info!("示例结束，共 {} 个 Bean", context.bean_count());
    Ok(())
}

fn demonstrate_properties(context: &Rc<DefaultApplicationContext>) -> Result<()> {
    info!("属性源: {:?}", context.source_names());

    context.on_value_changed(Rc::new(|name| info!("属性已变更: {}", name)));

    let overrides = MapPropertySource::with_name("runtime-overrides");
    context.register_property_source(Box::new(overrides.clone()));
    overrides.set_property("server.debug", true);
    overrides.set_property("server.workers", 4);

    let workers = context
        .get_property_as_int("server.workers", 1)
        .context("server.workers 不是整数")?;
    info!("工作线程数: {}", workers);
    Ok(())
}

fn demonstrate_beans(context: &Rc<DefaultApplicationContext>) -> Result<()> {
    let settings = context
        .create_named("serverSettings", ServerSettings::default)
        .context("serverSettings 已存在")?;
    if let Some(settings) = settings.get() {
        info!(
            "{}: {}:{} (debug={})",
            settings.bean_name, settings.host, settings.port, settings.debug
        );
    }

    let greeting = context.get_property_as_string("greeting", "你好");
    context
        .create_singleton(|| Greeter { greeting })
        .context("Greeter 单例已存在")?;

    let greeter = context.require_by_name::<Greeter>("Greeter")?;
    if let Some(greeter) = greeter.get() {
        println!("{}, {}!", greeter.greeting, context.name());
    }

    context.destroy(&settings);
    info!("serverSettings 已销毁: {}", !context.is_known(&settings));
    Ok(())
}
