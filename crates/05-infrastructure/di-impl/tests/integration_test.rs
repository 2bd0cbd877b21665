//! Bean 工厂的集成测试

use di_abstractions::{
    ApplicationContextAware, ApplicationContext, Bean, BeanFactory, BeanFactoryAware, BeanFactoryExt,
    BeanNameAware,
};
use di_impl::DefaultBeanFactory;
use infrastructure_common::DependencyError;
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};

/// 测试服务
#[derive(Debug, Default)]
struct TestService {
    name: String,
}

impl Bean for TestService {}

#[derive(Debug)]
struct OtherService;

impl Bean for OtherService {}

/// 析构时记录日志的 Bean
struct Tracked {
    label: &'static str,
    log: Rc<RefCell<Vec<String>>>,
}

impl Bean for Tracked {}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.log.borrow_mut().push(format!("drop:{}", self.label));
    }
}

#[test]
fn test_create_then_find_first_of_type() {
    let factory = DefaultBeanFactory::new();
    let created = factory
        .create_managed(|| TestService {
            name: "first".to_string(),
        })
        .unwrap();
    factory.create_managed(|| TestService::default()).unwrap();

    let found = factory.find_first_of_type::<TestService>().unwrap();
    assert_eq!(found, created);
    assert_eq!(found.get().unwrap().name, "first");
    assert!(factory.find_first_of_type::<OtherService>().is_none());
}

#[test]
fn test_default_names_use_type_ordinals() {
    let factory = DefaultBeanFactory::new();
    let first = factory.create_managed(|| TestService::default()).unwrap();
    let second = factory.create_default::<TestService>().unwrap();

    assert_eq!(factory.name_of(&first), "TestService_0");
    assert_eq!(factory.name_of(&second), "TestService_1");
    assert_eq!(factory.bean_names(), vec!["TestService_0", "TestService_1"]);
}

#[test]
fn test_register_existing_and_find_by_name() {
    let factory = DefaultBeanFactory::new();
    let registered = factory
        .register_existing(
            TestService {
                name: "named".to_string(),
            },
            Some("primary"),
        )
        .unwrap();

    assert!(factory.find_by_name::<TestService>("secondary").is_none());
    assert!(factory.find_by_name::<OtherService>("primary").is_none(), "类型不同不应命中");

    let found = factory.find_by_name::<TestService>("primary").unwrap();
    assert_eq!(found, registered);
    assert_eq!(found.get().unwrap().name, "named");
    assert_eq!(
        factory.require_by_name::<TestService>("absent").unwrap_err(),
        DependencyError::BeanNotFound {
            name: "absent".to_string()
        }
    );
}

#[test]
fn test_register_existing_without_name_uses_default_name() {
    let factory = DefaultBeanFactory::new();
    let bean = factory.register_existing(OtherService, None).unwrap();
    assert_eq!(factory.name_of(&bean), "OtherService_0");
}

#[test]
fn test_register_existing_conflict_drops_instance() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let factory = DefaultBeanFactory::new();
    factory
        .register_existing(
            Tracked {
                label: "kept",
                log: Rc::clone(&log),
            },
            Some("slot"),
        )
        .unwrap();

    let err = factory
        .register_existing(
            Tracked {
                label: "rejected",
                log: Rc::clone(&log),
            },
            Some("slot"),
        )
        .unwrap_err();

    assert!(matches!(err, DependencyError::BeanNameConflict { ref name, .. } if name == "slot"));
    assert_eq!(*log.borrow(), vec!["drop:rejected".to_string()]);
    assert_eq!(factory.bean_count(), 1);
}

#[test]
fn test_name_conflict_never_runs_constructor() {
    let factory = DefaultBeanFactory::new();
    assert!(factory.create_singleton(|| OtherService).is_some());

    let ran = Cell::new(false);
    let second = factory.create_singleton(|| {
        ran.set(true);
        OtherService
    });

    assert!(second.is_none());
    assert!(!ran.get(), "名称冲突时构造函数不应执行");
    assert_eq!(factory.bean_names(), vec!["OtherService"]);
}

#[test]
fn test_destroy_removes_record_before_drop() {
    struct Observer {
        factory: Weak<DefaultBeanFactory>,
        seen_count: Rc<Cell<Option<usize>>>,
    }

    impl Bean for Observer {}

    impl Drop for Observer {
        fn drop(&mut self) {
            if let Some(factory) = self.factory.upgrade() {
                self.seen_count.set(Some(factory.bean_count()));
            }
        }
    }

    let factory = DefaultBeanFactory::new();
    let seen_count = Rc::new(Cell::new(None));
    let bean = factory
        .create_managed(|| Observer {
            factory: Rc::downgrade(&factory),
            seen_count: Rc::clone(&seen_count),
        })
        .unwrap();
    assert!(factory.is_known(&bean));

    factory.destroy(&bean);

    assert_eq!(seen_count.get(), Some(0), "析构时记录应已移除");
    assert!(!factory.is_known(&bean));
    assert!(!bean.is_alive());
    assert_eq!(factory.name_of(&bean), "");

    // 再次销毁是空操作
    factory.destroy(&bean);
}

#[test]
fn test_dropping_factory_destroys_newest_first() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let factory = DefaultBeanFactory::new();
    for label in ["a", "b", "c"] {
        let log = Rc::clone(&log);
        factory.create_named(label, move || Tracked { label, log }).unwrap();
    }

    drop(factory);
    assert_eq!(*log.borrow(), vec!["drop:c", "drop:b", "drop:a"]);
}

#[test]
fn test_panicking_constructor_releases_reservation() {
    let factory = DefaultBeanFactory::new();
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        factory.create_named::<OtherService, _>("fragile", || panic!("构造失败"))
    }));
    assert!(result.is_err());
    assert_eq!(factory.bean_count(), 0);

    assert!(factory.create_named("fragile", || OtherService).is_some());
}

/// 同时声明三种能力的 Bean
struct FullyAware {
    log: Rc<RefCell<Vec<String>>>,
    factory: Option<Weak<dyn BeanFactory>>,
}

impl Bean for FullyAware {
    fn as_context_aware(&mut self) -> Option<&mut dyn ApplicationContextAware> {
        Some(self)
    }

    fn as_factory_aware(&mut self) -> Option<&mut dyn BeanFactoryAware> {
        Some(self)
    }

    fn as_name_aware(&mut self) -> Option<&mut dyn BeanNameAware> {
        Some(self)
    }
}

impl ApplicationContextAware for FullyAware {
    fn set_application_context(&mut self, _context: Weak<dyn ApplicationContext>) {
        self.log.borrow_mut().push("context".to_string());
    }
}

impl BeanFactoryAware for FullyAware {
    fn set_bean_factory(&mut self, factory: Weak<dyn BeanFactory>) {
        self.log.borrow_mut().push("factory".to_string());
        self.factory = Some(factory);
    }
}

impl BeanNameAware for FullyAware {
    fn set_bean_name(&mut self, name: &str) {
        self.log.borrow_mut().push(format!("name:{}", name));
    }
}

#[test]
fn test_aware_wiring_order() {
    let factory = DefaultBeanFactory::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let hook_log = Rc::clone(&log);
    factory.set_context_hook(Rc::new(move |_aware: &mut dyn ApplicationContextAware| {
        hook_log.borrow_mut().push("context".to_string());
    }));

    let bean_log = Rc::clone(&log);
    let bean = factory
        .create_named("aware", move || FullyAware {
            log: bean_log,
            factory: None,
        })
        .unwrap();

    assert_eq!(*log.borrow(), vec!["context", "factory", "name:aware"]);

    let injected = bean.get().unwrap().factory.clone().unwrap();
    assert_eq!(injected.upgrade().unwrap().bean_count(), 1);
}

#[test]
fn test_context_injection_skipped_without_hook() {
    let factory = DefaultBeanFactory::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    factory
        .register_existing(
            FullyAware {
                log: Rc::clone(&log),
                factory: None,
            },
            None,
        )
        .unwrap();

    assert_eq!(*log.borrow(), vec!["factory", "name:FullyAware_0"]);
}
