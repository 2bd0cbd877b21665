//! 默认应用上下文

use config_abstractions::{
    ConfigurablePropertyResolver, PropertyChangedCallback, PropertyResolver, PropertySource,
    PropertySourceFactory,
};
use config_impl::{CompositingPropertyResolver, EnvironmentPropertySource, PropertyFilePropertySource};
use di_abstractions::{ApplicationContext, ApplicationContextAware, BeanDeleter, BeanFactory, BeanId};
use di_impl::DefaultBeanFactory;
use infrastructure_common::{PropertyValue, TypeInfo};
use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::{Rc, Weak};
use tracing::{debug, info, trace};

/// 应用配置文件名
pub const APPLICATION_PROPERTIES: &str = "application.properties";

/// 启动配置文件名
pub const BOOTSTRAP_PROPERTIES: &str = "bootstrap.properties";

/// 上下文选项
#[derive(Debug, Clone)]
pub struct ContextOptions {
    /// 属性文件所在目录
    pub config_dir: PathBuf,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from("."),
        }
    }
}

impl ContextOptions {
    /// 指定配置目录
    pub fn with_config_dir(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    /// 配置目录下的文件路径
    pub fn config_file(&self, file_name: &str) -> PathBuf {
        self.config_dir.join(file_name)
    }
}

/// 默认应用上下文
///
/// 持有一个复合属性解析器和一个 Bean 工厂，并记录应用名称与激活的 profile。
/// 上下文通过 `Rc` 共享，上下文感知的 Bean 拿到的是它的弱引用。
pub struct DefaultApplicationContext {
    self_handle: Weak<DefaultApplicationContext>,
    name: String,
    active_profiles: RefCell<BTreeSet<String>>,
    resolver: RefCell<CompositingPropertyResolver>,
    bean_factory: Rc<DefaultBeanFactory>,
    options: ContextOptions,
}

impl DefaultApplicationContext {
    /// 以默认选项创建上下文
    pub fn new(name: impl Into<String>) -> Rc<Self> {
        Self::with_options(name, ContextOptions::default())
    }

    /// 创建上下文
    pub fn with_options(name: impl Into<String>, options: ContextOptions) -> Rc<Self> {
        let name = name.into();
        info!("创建应用上下文: {}", name);

        let context = Rc::new_cyclic(|self_handle| Self {
            self_handle: self_handle.clone(),
            name,
            active_profiles: RefCell::new(BTreeSet::new()),
            resolver: RefCell::new(CompositingPropertyResolver::new()),
            bean_factory: DefaultBeanFactory::new(),
            options,
        });

        // 直接通过内部工厂创建的 Bean 同样需要注入上下文
        let handle: Weak<dyn ApplicationContext> = context.self_handle.clone();
        context
            .bean_factory
            .set_context_hook(Rc::new(move |aware: &mut dyn ApplicationContextAware| {
                aware.set_application_context(handle.clone());
            }));

        context
    }

    /// 注册标准属性源
    ///
    /// 依次注册 `application.properties`、每个激活 profile 的
    /// `application-{profile}.properties`，最后是进程环境变量。
    /// 后注册者优先，因此环境变量覆盖 profile 文件，profile 文件覆盖基础文件。
    pub fn initialize(&self) {
        info!("初始化应用上下文: {}", self.name);

        self.register_property_source(Box::new(PropertyFilePropertySource::open(
            self.options.config_file(APPLICATION_PROPERTIES),
        )));

        for profile in self.active_profiles() {
            let file_name = format!("application-{}.properties", profile);
            self.register_property_source(Box::new(PropertyFilePropertySource::open(
                self.options.config_file(&file_name),
            )));
        }

        self.register_property_source(Box::new(EnvironmentPropertySource::new()));
    }

    /// 激活 profile，去掉首尾空白，空名称忽略
    pub fn add_active_profile(&self, profile: &str) {
        let profile = profile.trim();
        if profile.is_empty() {
            return;
        }
        if self.active_profiles.borrow_mut().insert(profile.to_string()) {
            debug!("激活 profile: {}", profile);
        }
    }

    /// 注册属性源
    ///
    /// 导入链上的属性源工厂在解析器借用释放后调用，工厂内部可以读取上下文。
    pub fn register_property_source(&self, source: Box<dyn PropertySource>) {
        CompositingPropertyResolver::register_shared(&self.resolver, source);
    }

    /// 注册属性源工厂
    pub fn register_property_source_factory(&self, source_name: &str, factory: PropertySourceFactory) {
        self.resolver
            .borrow_mut()
            .register_property_source_factory(source_name, factory);
    }

    /// 把类型 `T` 绑定到符号名称，用于 `import.config`
    pub fn register_source_type<T>(&self, source_name: &str)
    where
        T: PropertySource + for<'a> From<&'a str> + 'static,
    {
        self.resolver.borrow_mut().register_source_type::<T>(source_name);
    }

    /// 注册属性变更监听器
    pub fn on_value_changed(&self, callback: PropertyChangedCallback) {
        self.resolver.borrow().on_value_changed(callback);
    }

    /// 广播一次属性变更
    pub fn value_changed(&self, property_name: &str) {
        let listeners = self.resolver.borrow().change_listeners();
        trace!("属性变更: {}", property_name);
        for listener in listeners {
            listener(property_name);
        }
    }

    /// 已注册的属性源数量
    pub fn source_count(&self) -> usize {
        self.resolver.borrow().source_count()
    }

    /// 已注册属性源的名称，按注册顺序
    pub fn source_names(&self) -> Vec<String> {
        self.resolver.borrow().source_names()
    }

    /// 上下文选项
    pub fn options(&self) -> &ContextOptions {
        &self.options
    }

    /// 配置目录
    pub fn config_dir(&self) -> &Path {
        &self.options.config_dir
    }

    /// 内部 Bean 工厂
    pub fn bean_factory(&self) -> &Rc<DefaultBeanFactory> {
        &self.bean_factory
    }

    /// 指向自身的弱引用
    pub fn handle(&self) -> Weak<dyn ApplicationContext> {
        self.self_handle.clone()
    }
}

impl PropertyResolver for DefaultApplicationContext {
    fn get_property(&self, property_name: &str) -> PropertyValue {
        self.resolver.borrow().get_property(property_name)
    }
}

impl BeanFactory for DefaultApplicationContext {
    fn reserve_bean(&self, type_info: TypeInfo, name: &str) -> Option<BeanId> {
        self.bean_factory.reserve_bean(type_info, name)
    }

    fn complete_bean(&self, id: BeanId, bean: Rc<dyn Any>, deleter: BeanDeleter) {
        self.bean_factory.complete_bean(id, bean, deleter);
    }

    fn cancel_reservation(&self, id: BeanId) {
        self.bean_factory.cancel_reservation(id);
    }

    fn bean_by_name(&self, type_id: TypeId, name: &str) -> Option<(BeanId, Rc<dyn Any>)> {
        self.bean_factory.bean_by_name(type_id, name)
    }

    fn first_bean_of_type(&self, type_id: TypeId) -> Option<(BeanId, Rc<dyn Any>)> {
        self.bean_factory.first_bean_of_type(type_id)
    }

    fn is_bean_known(&self, id: BeanId) -> bool {
        self.bean_factory.is_bean_known(id)
    }

    fn bean_name(&self, id: BeanId) -> String {
        self.bean_factory.bean_name(id)
    }

    fn destroy_bean(&self, id: BeanId) {
        self.bean_factory.destroy_bean(id);
    }

    fn default_bean_name(&self, type_info: &TypeInfo) -> String {
        self.bean_factory.default_bean_name(type_info)
    }

    fn singleton_bean_name(&self, type_info: &TypeInfo) -> String {
        self.bean_factory.singleton_bean_name(type_info)
    }

    fn application_context_aware_created(&self, bean: &mut dyn ApplicationContextAware) {
        bean.set_application_context(self.handle());
    }

    fn factory_handle(&self) -> Weak<dyn BeanFactory> {
        self.bean_factory.factory_handle()
    }

    fn bean_count(&self) -> usize {
        self.bean_factory.bean_count()
    }

    fn bean_names(&self) -> Vec<String> {
        self.bean_factory.bean_names()
    }
}

impl ApplicationContext for DefaultApplicationContext {
    fn name(&self) -> &str {
        &self.name
    }

    fn active_profiles(&self) -> Vec<String> {
        self.active_profiles.borrow().iter().cloned().collect()
    }

    fn is_profile_enabled(&self, profile: &str) -> bool {
        self.active_profiles.borrow().contains(profile)
    }
}

impl Drop for DefaultApplicationContext {
    fn drop(&mut self) {
        info!("销毁应用上下文: {}", self.name);
        self.bean_factory.clear_context_hook();
    }
}

impl fmt::Debug for DefaultApplicationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultApplicationContext")
            .field("name", &self.name)
            .field("active_profiles", &self.active_profiles.borrow())
            .field("resolver", &self.resolver.borrow())
            .field("bean_factory", &self.bean_factory)
            .field("options", &self.options)
            .finish()
    }
}
