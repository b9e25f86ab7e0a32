use component_macros::Injectable;
use di_abstractions::{DefinitionKey, Injectable};
use std::sync::Arc;

struct Repository;

trait Clock: Send + Sync {}

#[derive(Injectable)]
struct Service {
    repository: Arc<Repository>,
    #[inject(name = "utc")]
    clock: Arc<dyn Clock>,
    cache: Option<Arc<String>>,
    #[inject(property = "service.retries")]
    retries: u32,
    #[inject(default)]
    hits: Vec<u64>,
}

#[derive(Injectable)]
struct Marker;

fn main() {
    assert_eq!(
        Service::dependencies(),
        vec![
            DefinitionKey::of::<Repository>(None),
            DefinitionKey::of::<dyn Clock>(Some("utc")),
        ]
    );
    assert!(Marker::dependencies().is_empty());
}
