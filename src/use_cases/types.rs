// Use-case level events and session state for the sync loop.

use crate::domain::{EntityState, ServerSnapshot};

/// Events delivered into the sync loop by the transport adapter.
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// The transport finished its handshake; the session is live.
    Opened,
    /// The transport closed or failed; the session is over.
    Closed,
    /// Authoritative world snapshot (`state_update`).
    Snapshot(ServerSnapshot),
    /// Out-of-band correction hint for the local player (`reconciliation`).
    Correction(EntityState),
    /// The server acknowledged processing an input sequence (`input_ack`).
    InputAck { sequence: u64 },
}

/// Connection lifecycle of one sync session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Diagnostic counters for one session. Logged, never branched on.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionStats {
    pub predictions: u64,
    pub reconciliations: u64,
    pub stale_entity_states: u64,
    pub inputs_acked: u64,
    pub inputs_dropped: u64,
    pub last_server_update_millis: u64,
}
