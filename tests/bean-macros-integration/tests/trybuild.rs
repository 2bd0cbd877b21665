//! trybuild 编译期测试

#[test]
fn trybuild_bean_derive() {
    let t = trybuild::TestCases::new();
    t.pass("tests/trybuild/plain_bean.rs");
    t.pass("tests/trybuild/aware_bean.rs");
}
