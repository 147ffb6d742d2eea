pub mod app;
pub mod clock;
pub mod codec;
pub mod config;
pub mod dates;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod registry;
pub mod state;
pub mod storage;
pub mod time_math;
pub mod ui;
pub mod view;

pub use app::router;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::AppConfig;
pub use errors::{AppError, RegistryError, StoreError};
pub use models::{CounterId, CounterPatch, CounterRecord, CounterView, FieldValues};
pub use registry::CounterRegistry;
pub use state::AppState;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use time_math::{elapsed_since, Elapsed};
pub use view::{Intent, JsonView, View, ViewBinding};
