use component_macros::Injectable;
use di_abstractions::{DefinitionKey, Injectable};
use std::sync::Arc;

#[derive(Injectable)]
struct Holder<T: Send + Sync + 'static> {
    inner: Arc<T>,
}

fn main() {
    assert_eq!(
        Holder::<String>::dependencies(),
        vec![DefinitionKey::of::<String>(None)]
    );
}
