pub mod domain;
pub mod frameworks;
pub mod interface_adapters;
pub mod use_cases;

pub use domain::{Clock, EntityState, MonotonicClock, PlayerInput, Renderer, ServerSnapshot};
pub use frameworks::client::{SyncHandle, start, start_with_config};
pub use use_cases::sync::{SyncOrchestrator, SyncSettings, sync_task};
pub use use_cases::types::{ConnectionState, SessionStats, SyncEvent};
