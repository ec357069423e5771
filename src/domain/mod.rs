// Domain layer: core simulation types and rules.

pub mod ports;
pub mod state;
pub mod systems;
pub mod tuning;

pub use ports::{Clock, MonotonicClock, Renderer};
pub use state::{EntityState, PlayerInput, ServerSnapshot};
