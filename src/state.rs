use crate::clock::Clock;
use crate::registry::CounterRegistry;
use crate::storage::FileStore;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Everything a request needs, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Mutex<CounterRegistry<FileStore>>>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(store: FileStore, clock: Arc<dyn Clock>) -> Self {
        let registry = CounterRegistry::load(store, clock.clone());
        Self {
            registry: Arc::new(Mutex::new(registry)),
            clock,
        }
    }
}
