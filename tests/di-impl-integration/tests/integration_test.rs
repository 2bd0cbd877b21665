//! DI 实现的跨 crate 集成测试
//!
//! 只通过 `di-abstractions` 的公开接口操作工厂，验证重入、延迟析构与 trait 对象用法。

use di_abstractions::{Bean, BeanFactory, BeanFactoryAware, BeanFactoryExt};
use di_impl::DefaultBeanFactory;
use infrastructure_common::DependencyError;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// 初始化测试日志系统（只初始化一次）
fn init_test_logger() {
    INIT_LOGGER.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("trace")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// 被依赖的仓储
struct Repository {
    rows: Vec<&'static str>,
}

impl Bean for Repository {}

/// 在注入工厂时顺带创建自己的依赖
#[derive(Default)]
struct Service {
    repository: Option<Weak<Repository>>,
}

impl Bean for Service {
    fn as_factory_aware(&mut self) -> Option<&mut dyn BeanFactoryAware> {
        Some(self)
    }
}

impl BeanFactoryAware for Service {
    fn set_bean_factory(&mut self, factory: Weak<dyn BeanFactory>) {
        let Some(factory) = factory.upgrade() else {
            return;
        };
        let repository = factory
            .find_first_of_type::<Repository>()
            .or_else(|| factory.create_singleton(|| Repository { rows: vec!["a", "b"] }));
        self.repository = repository.map(|bean| bean.downgrade());
    }
}

/// 析构时计数
struct Counted {
    drops: Rc<Cell<usize>>,
}

impl Bean for Counted {}

impl Drop for Counted {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
    }
}

/// 测试注入过程中可以重入工厂创建依赖
#[test]
fn test_reentrant_creation_during_wiring() {
    init_test_logger();
    let factory = DefaultBeanFactory::new();

    let service = factory.create_default::<Service>().unwrap();
    let repository = service.get().unwrap().repository.clone().unwrap();

    assert_eq!(repository.upgrade().unwrap().rows, vec!["a", "b"]);
    assert_eq!(factory.bean_names(), vec!["Service_0", "Repository"], "外层 Bean 的槽位先于依赖预留");

    let second = factory.create_default::<Service>().unwrap();
    assert!(Weak::ptr_eq(
        second.get().unwrap().repository.as_ref().unwrap(),
        &repository
    ));
    assert_eq!(factory.bean_count(), 3, "第二个服务复用已有的仓储");
}

/// 测试外部仍持有强引用时析构被推迟
#[test]
fn test_destroy_with_outstanding_strong_reference() {
    init_test_logger();
    let factory = DefaultBeanFactory::new();
    let drops = Rc::new(Cell::new(0));

    let bean = factory
        .create_named("counted", || Counted {
            drops: Rc::clone(&drops),
        })
        .unwrap();
    let held = bean.get().unwrap();

    factory.destroy(&bean);
    assert!(!factory.is_known(&bean), "记录应已移除");
    assert_eq!(drops.get(), 0, "外部强引用存在时不会析构");
    assert!(bean.is_alive());

    drop(held);
    assert_eq!(drops.get(), 1);
    assert!(!bean.is_alive());

    // 名称随记录一起释放
    assert!(factory
        .create_named("counted", || Counted {
            drops: Rc::clone(&drops),
        })
        .is_some());
}

/// 测试通过 trait 对象使用类型化操作
#[test]
fn test_typed_operations_through_trait_object() {
    init_test_logger();
    let concrete = DefaultBeanFactory::new();
    let factory: Rc<dyn BeanFactory> = concrete.clone();

    let bean = factory
        .register_existing(Repository { rows: vec!["x"] }, Some("primary"))
        .unwrap();
    assert_eq!(factory.name_of(&bean), "primary");
    assert_eq!(
        factory.require_by_name::<Repository>("primary").unwrap(),
        bean
    );

    let err = factory
        .register_existing(Repository { rows: Vec::new() }, Some("primary"))
        .unwrap_err();
    assert_eq!(
        err,
        DependencyError::BeanNameConflict {
            name: "primary".to_string(),
            type_name: "Repository".to_string(),
        }
    );

    assert!(matches!(
        factory.require_by_name::<Repository>("missing"),
        Err(DependencyError::BeanNotFound { .. })
    ));
    assert_eq!(concrete.bean_count(), 1);
}

/// 测试工厂释放后弱引用句柄全部失效
#[test]
fn test_dropping_factory_releases_every_bean() {
    init_test_logger();
    let factory = DefaultBeanFactory::new();
    let order = Rc::new(RefCell::new(Vec::new()));

    struct Tagged {
        tag: u8,
        order: Rc<RefCell<Vec<u8>>>,
    }
    impl Bean for Tagged {}
    impl Drop for Tagged {
        fn drop(&mut self) {
            self.order.borrow_mut().push(self.tag);
        }
    }

    let handles: Vec<_> = (0..3)
        .map(|tag| {
            let order = Rc::clone(&order);
            factory.create_managed(move || Tagged { tag, order }).unwrap()
        })
        .collect();

    drop(factory);
    assert!(handles.iter().all(|bean| !bean.is_alive()));
    assert_eq!(*order.borrow(), vec![2, 1, 0]);
}
