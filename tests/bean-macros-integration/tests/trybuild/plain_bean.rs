use bean_macros::Bean;
use di_abstractions::Bean;

#[derive(Bean)]
struct Plain;

#[derive(Bean)]
enum Mode {
    Fast,
    Safe,
}

fn main() {
    let mut plain = Plain;
    assert!(plain.as_context_aware().is_none());
    assert!(plain.as_factory_aware().is_none());
    assert!(plain.as_name_aware().is_none());

    let mut mode = Mode::Safe;
    assert!(mode.as_name_aware().is_none());
    let _ = Mode::Fast;
}
