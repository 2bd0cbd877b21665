use bean_macros::Bean;
use di_abstractions::{Bean, BeanFactory, BeanFactoryAware, BeanNameAware};
use std::rc::Weak;

#[derive(Bean)]
#[bean(factory_aware, name_aware)]
struct Aware<T> {
    value: T,
    factory: Option<Weak<dyn BeanFactory>>,
    name: String,
}

impl<T> BeanFactoryAware for Aware<T> {
    fn set_bean_factory(&mut self, factory: Weak<dyn BeanFactory>) {
        self.factory = Some(factory);
    }
}

impl<T> BeanNameAware for Aware<T> {
    fn set_bean_name(&mut self, name: &str) {
        self.name = name.to_string();
    }
}

fn main() {
    let mut bean = Aware {
        value: 7_u32,
        factory: None,
        name: String::new(),
    };
    assert!(bean.as_context_aware().is_none());
    bean.as_name_aware().unwrap().set_bean_name("aware");
    assert_eq!(bean.name, "aware");
    assert_eq!(bean.value, 7);
    assert!(bean.factory.is_none());
}
