//! 应用上下文启动器

use crate::context::{ContextOptions, DefaultApplicationContext, BOOTSTRAP_PROPERTIES};
use clap::Parser;
use config_abstractions::PropertySource;
use config_impl::{CharSeparatedPropertySource, EnvironmentPropertySource, PropertyFilePropertySource};
use infrastructure_common::{InfrastructureError, InfrastructureResult};
use std::ffi::OsString;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::{debug, info};

/// 应用名称使用的属性键
pub const APPLICATION_NAME_KEY: &str = "application.name";

/// 激活 profile 使用的属性键，值以逗号分隔
pub const ACTIVE_PROFILES_KEY: &str = "profiles.active";

const UNKNOWN_APPLICATION_NAME: &str = "<unknown>";

/// 上下文命令行参数
#[derive(Parser, Debug, Clone, Default)]
#[command(about = "Sprout 应用上下文")]
pub struct ContextArgs {
    /// 应用名称，优先于环境变量和 bootstrap.properties
    #[arg(long = "app-name")]
    pub app_name: Option<String>,

    /// 激活的 profile，可重复
    #[arg(long = "profile")]
    pub profiles: Vec<String>,

    /// 属性文件所在目录
    #[arg(long = "config-dir")]
    pub config_dir: Option<PathBuf>,
}

/// 应用上下文启动器
///
/// 按以下顺序确定应用身份并创建上下文：
///
/// 1. 读取进程环境与 `bootstrap.properties`
/// 2. 应用名称依次取 `bootstrap.properties`、环境变量、程序名，`--app-name` 最终覆盖
/// 3. 注册 `file`、`env`、`inline` 属性源工厂
/// 4. 合并环境变量、`bootstrap.properties` 中的 `profiles.active` 以及 `--profile`
///
/// 启动器不会调用 [`DefaultApplicationContext::initialize`]。
#[derive(Debug, Clone, Default)]
pub struct ContextBootstrapper {
    args: ContextArgs,
    program_name: Option<String>,
}

impl ContextBootstrapper {
    /// 使用已解析的参数创建启动器
    pub fn new(args: ContextArgs) -> Self {
        Self {
            args,
            program_name: None,
        }
    }

    /// 解析命令行参数，第一个参数视为程序名
    pub fn from_args<I, T>(args: I) -> InfrastructureResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let program_name = args
            .first()
            .map(|name| name.to_string_lossy().into_owned())
            .filter(|name| !name.is_empty());

        let parsed = ContextArgs::try_parse_from(&args)
            .map_err(|e| InfrastructureError::bootstrap_failed(format!("命令行参数解析失败: {}", e)))?;

        Ok(Self {
            args: parsed,
            program_name,
        })
    }

    /// 设置程序名，作为最后的应用名称候选
    pub fn with_program_name(mut self, program_name: impl Into<String>) -> Self {
        self.program_name = Some(program_name.into());
        self
    }

    /// 已解析的参数
    pub fn args(&self) -> &ContextArgs {
        &self.args
    }

    /// 创建应用上下文
    pub fn bootstrap(self) -> Rc<DefaultApplicationContext> {
        let options = match &self.args.config_dir {
            Some(config_dir) => ContextOptions::with_config_dir(config_dir),
            None => ContextOptions::default(),
        };

        let environment = EnvironmentPropertySource::new();
        let bootstrap_properties = PropertyFilePropertySource::open(options.config_file(BOOTSTRAP_PROPERTIES));

        let application_name = self.resolve_application_name(&environment, &bootstrap_properties);
        let context = DefaultApplicationContext::with_options(application_name, options.clone());

        // 相对路径的导入以配置目录为基准
        let config_dir = options.config_dir.clone();
        context.register_property_source_factory(
            "file",
            Rc::new(move |path: &str| -> Box<dyn PropertySource> {
                Box::new(PropertyFilePropertySource::open(config_dir.join(path)))
            }),
        );
        context.register_source_type::<EnvironmentPropertySource>("env");
        context.register_source_type::<CharSeparatedPropertySource>("inline");

        extract_active_profiles(&context, &environment);
        extract_active_profiles(&context, &bootstrap_properties);
        for profile in &self.args.profiles {
            context.add_active_profile(profile);
        }

        info!("应用上下文启动完成: {:?}", context);
        context
    }

    fn resolve_application_name(
        &self,
        environment: &EnvironmentPropertySource,
        bootstrap_properties: &PropertyFilePropertySource,
    ) -> String {
        if let Some(name) = self.args.app_name.as_deref().filter(|name| !name.is_empty()) {
            debug!("应用名称来自命令行: {}", name);
            return name.to_string();
        }

        extract_application_name(bootstrap_properties)
            .or_else(|| extract_application_name(environment))
            .or_else(|| self.program_name.clone())
            .unwrap_or_else(|| UNKNOWN_APPLICATION_NAME.to_string())
    }
}

/// 解析命令行参数并创建应用上下文
pub fn create<I, T>(args: I) -> InfrastructureResult<Rc<DefaultApplicationContext>>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Ok(ContextBootstrapper::from_args(args)?.bootstrap())
}

/// 使用当前进程的命令行参数创建应用上下文
pub fn create_from_env() -> InfrastructureResult<Rc<DefaultApplicationContext>> {
    create(std::env::args_os())
}

fn extract_application_name(source: &dyn PropertySource) -> Option<String> {
    source
        .get_property(APPLICATION_NAME_KEY)
        .as_str()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

fn extract_active_profiles(context: &DefaultApplicationContext, source: &dyn PropertySource) {
    if let Some(profiles) = source.get_property(ACTIVE_PROFILES_KEY).as_str() {
        for profile in profiles.split(',') {
            context.add_active_profile(profile);
        }
    }
}
