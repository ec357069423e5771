// Use cases layer: application workflows for the sync client.

pub mod history;
pub mod input_buffer;
pub mod sync;
pub mod types;

#[cfg(test)]
pub mod test_support;

pub use history::HistoryStore;
pub use input_buffer::InputBuffer;
pub use sync::{SyncOrchestrator, SyncSettings, sync_task};
pub use types::{ConnectionState, SessionStats, SyncEvent};
