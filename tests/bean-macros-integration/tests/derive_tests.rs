//! `#[derive(Bean)]` 与 Bean 工厂的集成测试

use bean_macros::Bean;
use di_abstractions::{
    ApplicationContext, ApplicationContextAware, Bean, BeanFactory, BeanFactoryAware, BeanFactoryExt,
    BeanNameAware,
};
use di_impl::DefaultBeanFactory;
use infrastructure_composition::DefaultApplicationContext;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// 不需要任何注入的服务
#[derive(Bean, Debug, Default)]
struct PlainService {
    hits: u32,
}

/// 需要工厂和名称的服务
#[derive(Bean, Default)]
#[bean(factory_aware, name_aware)]
struct NamedService {
    factory: Option<Weak<dyn BeanFactory>>,
    name: String,
}

impl BeanFactoryAware for NamedService {
    fn set_bean_factory(&mut self, factory: Weak<dyn BeanFactory>) {
        self.factory = Some(factory);
    }
}

impl BeanNameAware for NamedService {
    fn set_bean_name(&mut self, name: &str) {
        self.name = name.to_string();
    }
}

/// 三种能力都需要，按注入顺序记录
#[derive(Bean)]
#[bean(name_aware, factory_aware, context_aware)]
struct OrderedService {
    log: Rc<RefCell<Vec<&'static str>>>,
}

impl ApplicationContextAware for OrderedService {
    fn set_application_context(&mut self, _context: Weak<dyn ApplicationContext>) {
        self.log.borrow_mut().push("context");
    }
}

impl BeanFactoryAware for OrderedService {
    fn set_bean_factory(&mut self, _factory: Weak<dyn BeanFactory>) {
        self.log.borrow_mut().push("factory");
    }
}

impl BeanNameAware for OrderedService {
    fn set_bean_name(&mut self, _name: &str) {
        self.log.borrow_mut().push("name");
    }
}

/// 带泛型参数的 Bean
#[derive(Bean)]
struct Holder<T> {
    value: T,
}

#[test]
fn test_plain_derive_has_no_capabilities() {
    let mut service = PlainService::default();
    assert!(service.as_context_aware().is_none());
    assert!(service.as_factory_aware().is_none());
    assert!(service.as_name_aware().is_none());

    let factory = DefaultBeanFactory::new();
    let bean = factory.create_default::<PlainService>().unwrap();
    assert_eq!(bean.get().unwrap().hits, 0);
}

#[test]
fn test_factory_and_name_are_injected() {
    let factory = DefaultBeanFactory::new();
    let bean = factory.create_named("named", NamedService::default).unwrap();
    let service = bean.get().unwrap();

    assert_eq!(service.name, "named");
    let injected = service.factory.as_ref().unwrap().upgrade().unwrap();
    assert_eq!(injected.bean_names(), vec!["named"]);
}

#[test]
fn test_registered_instance_is_injected_too() {
    let factory = DefaultBeanFactory::new();
    let bean = factory
        .register_existing(NamedService::default(), None)
        .unwrap();
    assert_eq!(bean.get().unwrap().name, "NamedService_0");
}

#[test]
fn test_injection_order_ignores_attribute_order() {
    let context = DefaultApplicationContext::new("ordered-app");

    let log = Rc::new(RefCell::new(Vec::new()));
    let bean_log = Rc::clone(&log);
    context
        .create_managed(move || OrderedService { log: bean_log })
        .unwrap();

    assert_eq!(*log.borrow(), vec!["context", "factory", "name"]);
}

#[test]
fn test_context_injection_is_skipped_without_context() {
    let factory = DefaultBeanFactory::new();

    let log = Rc::new(RefCell::new(Vec::new()));
    let bean_log = Rc::clone(&log);
    factory
        .create_managed(move || OrderedService { log: bean_log })
        .unwrap();

    assert_eq!(*log.borrow(), vec!["factory", "name"]);
}

#[test]
fn test_generic_bean_is_typed_by_parameter() {
    let factory = DefaultBeanFactory::new();
    factory.create_managed(|| Holder { value: 1_u8 }).unwrap();
    factory
        .create_managed(|| Holder {
            value: "text".to_string(),
        })
        .unwrap();

    let text = factory.find_first_of_type::<Holder<String>>().unwrap();
    assert_eq!(text.get().unwrap().value, "text");
    assert_eq!(factory.name_of(&text), "Holder<String>_0");
    assert!(factory.find_first_of_type::<Holder<u16>>().is_none());
}
