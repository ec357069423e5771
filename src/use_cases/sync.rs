// The sync session orchestrator: the only stateful, impure component.
// Owns the input buffer, both engines, and the rollback history for one
// local player, and ties them to a connection lifecycle.

use crate::domain::systems::{PredictionEngine, ReconcileOutcome, ReconciliationEngine};
use crate::domain::tuning::{PredictionTuning, ReconciliationTuning, RetentionTuning};
use crate::domain::{Clock, EntityState, PlayerInput, Renderer, ServerSnapshot};
use crate::use_cases::history::HistoryStore;
use crate::use_cases::input_buffer::{DEFAULT_MAX_PENDING, InputBuffer};
use crate::use_cases::types::{ConnectionState, SessionStats, SyncEvent};

use glam::Vec3;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, trace, warn};

/// Knobs for one sync session. Gameplay values live in the tuning structs;
/// the rest is bookkeeping policy.
#[derive(Debug, Clone, Copy)]
pub struct SyncSettings {
    pub prediction: PredictionTuning,
    pub reconciliation: ReconciliationTuning,
    pub retention: RetentionTuning,
    /// Cap on unacknowledged buffered inputs.
    pub max_pending_inputs: usize,
    /// Housekeeping runs every N driver ticks (deterministic, not sampled).
    pub housekeeping_tick_period: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            prediction: PredictionTuning::default(),
            reconciliation: ReconciliationTuning::default(),
            retention: RetentionTuning::default(),
            max_pending_inputs: DEFAULT_MAX_PENDING,
            // ~5 s at the nominal 60 Hz tick rate.
            housekeeping_tick_period: 300,
        }
    }
}

// Last accepted authoritative state for a remote entity.
struct TrackedEntity {
    state: EntityState,
    last_update_millis: u64,
}

pub struct SyncOrchestrator<C: Clock, R: Renderer> {
    clock: C,
    renderer: R,
    local_player_id: String,
    settings: SyncSettings,

    input_buffer: InputBuffer,
    prediction: PredictionEngine,
    reconciliation: ReconciliationEngine,
    history: HistoryStore,

    // Remote entities are rendered at their last authoritative state; any
    // smoothing between snapshots is the renderer's job.
    remotes: BTreeMap<String, TrackedEntity>,
    // Monotonic tick guard per entity; snapshots can arrive out of order.
    last_server_ticks: BTreeMap<String, u64>,

    next_sequence: u64,
    tick_count: u64,
    connection_tx: watch::Sender<ConnectionState>,
    outbound_tx: mpsc::Sender<PlayerInput>,
    stats: SessionStats,
}

impl<C: Clock, R: Renderer> SyncOrchestrator<C, R> {
    pub fn new(
        local_player_id: String,
        clock: C,
        renderer: R,
        settings: SyncSettings,
        connection_tx: watch::Sender<ConnectionState>,
        outbound_tx: mpsc::Sender<PlayerInput>,
    ) -> Self {
        Self {
            clock,
            renderer,
            local_player_id,
            input_buffer: InputBuffer::new(settings.max_pending_inputs),
            prediction: PredictionEngine::new(settings.prediction),
            reconciliation: ReconciliationEngine::new(settings.reconciliation),
            history: HistoryStore::new(settings.retention.rollback_window_millis),
            settings,
            remotes: BTreeMap::new(),
            last_server_ticks: BTreeMap::new(),
            next_sequence: 0,
            tick_count: 0,
            connection_tx,
            outbound_tx,
            stats: SessionStats::default(),
        }
    }

    /// Request a new session. The transport dials while we are Connecting;
    /// its Opened/Closed events finish the transition.
    pub fn begin_connect(&mut self) {
        info!(player_id = %self.local_player_id, "sync session starting");
        self.set_connection(ConnectionState::Connecting);
    }

    pub fn connection_state(&self) -> ConnectionState {
        *self.connection_tx.borrow()
    }

    fn set_connection(&mut self, state: ConnectionState) {
        // Hosts observe transitions through the watch side.
        let _ = self.connection_tx.send(state);
    }

    pub fn handle_event(&mut self, event: SyncEvent) {
        match event {
            SyncEvent::Opened => self.handle_opened(),
            SyncEvent::Closed => self.handle_closed(),
            SyncEvent::Snapshot(snapshot) => self.handle_snapshot(snapshot),
            SyncEvent::Correction(state) => self.handle_correction(state),
            SyncEvent::InputAck { sequence } => self.handle_input_ack(sequence),
        }
    }

    fn handle_opened(&mut self) {
        info!(player_id = %self.local_player_id, "connected to sync server");
        self.set_connection(ConnectionState::Connected);
    }

    fn handle_closed(&mut self) {
        // Clear every per-session store before the state change is
        // observable; stale session data must never leak into a new session.
        self.clear_session();
        self.set_connection(ConnectionState::Disconnected);
        info!(
            player_id = %self.local_player_id,
            predictions = self.stats.predictions,
            reconciliations = self.stats.reconciliations,
            stale_entity_states = self.stats.stale_entity_states,
            inputs_acked = self.stats.inputs_acked,
            inputs_dropped = self.stats.inputs_dropped,
            "disconnected from sync server"
        );
        self.stats = SessionStats::default();
    }

    fn clear_session(&mut self) {
        self.input_buffer.clear();
        self.prediction.clear();
        self.history.clear();
        self.remotes.clear();
        self.last_server_ticks.clear();
        self.next_sequence = 0;
    }

    /// Capture one local movement sample: buffer it, predict the local entity
    /// forward, hand the new state to the renderer immediately, and queue the
    /// input for the server.
    pub fn process_local_input(&mut self, movement: Vec3) {
        if self.connection_state() != ConnectionState::Connected {
            trace!("dropping local input while not connected");
            return;
        }
        let Some(movement) = sanitize_movement(movement) else {
            warn!("invalid movement values (NaN/inf); dropping input");
            return;
        };

        let now = self.clock.now_millis();
        self.next_sequence += 1;
        let input = PlayerInput {
            player_id: self.local_player_id.clone(),
            sequence: self.next_sequence,
            movement,
            timestamp: now,
        };

        if !self.input_buffer.add_input(input.clone()) {
            return;
        }

        let predicted = self.prediction.predict_next(&input, now);
        // The immediate apply is what makes local movement feel instant.
        self.renderer.apply_state(&self.local_player_id, &predicted);
        self.history.record(&self.local_player_id, predicted.position, now);
        self.stats.predictions += 1;

        match self.outbound_tx.try_send(input) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(input)) => {
                self.stats.inputs_dropped += 1;
                warn!(
                    sequence = input.sequence,
                    "outbound channel full; dropping input"
                );
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                // The transport task is gone; treat it as a disconnect.
                warn!("outbound channel closed; ending session");
                self.handle_closed();
            }
        }
    }

    fn handle_snapshot(&mut self, snapshot: ServerSnapshot) {
        if self.connection_state() != ConnectionState::Connected {
            trace!("ignoring snapshot while not connected");
            return;
        }

        let now = self.clock.now_millis();
        self.stats.last_server_update_millis = now;

        for entity in snapshot.entities {
            if self.is_stale(&entity) {
                self.stats.stale_entity_states += 1;
                debug!(
                    entity_id = %entity.entity_id,
                    tick = entity.tick,
                    "ignoring stale entity state"
                );
                continue;
            }

            if entity.entity_id == self.local_player_id {
                self.reconcile_local(entity);
            } else {
                self.accept_remote(entity, now);
            }
        }
    }

    fn is_stale(&self, entity: &EntityState) -> bool {
        self.last_server_ticks
            .get(&entity.entity_id)
            .is_some_and(|&last| entity.tick < last)
    }

    fn reconcile_local(&mut self, authoritative: EntityState) {
        self.last_server_ticks
            .insert(authoritative.entity_id.clone(), authoritative.tick);

        let Some(predicted) = self.prediction.predicted_state_mut(&self.local_player_id) else {
            // Normal in the first ticks after connecting.
            trace!("no local prediction to reconcile against");
            return;
        };

        let outcome = self.reconciliation.reconcile(&authoritative, predicted);
        self.stats.reconciliations += 1;
        if let ReconcileOutcome::Corrected { position_error } = outcome {
            let corrected = predicted.clone();
            debug!(position_error, "applied soft correction to local prediction");
            self.renderer.apply_state(&self.local_player_id, &corrected);
        }
    }

    fn accept_remote(&mut self, entity: EntityState, now: u64) {
        self.last_server_ticks
            .insert(entity.entity_id.clone(), entity.tick);
        self.renderer.apply_state(&entity.entity_id, &entity);
        self.history.record(&entity.entity_id, entity.position, now);
        self.remotes.insert(
            entity.entity_id.clone(),
            TrackedEntity {
                state: entity,
                last_update_millis: now,
            },
        );
    }

    fn handle_correction(&mut self, state: EntityState) {
        if self.connection_state() != ConnectionState::Connected {
            trace!("ignoring correction while not connected");
            return;
        }
        if state.entity_id != self.local_player_id {
            warn!(
                entity_id = %state.entity_id,
                "correction hint for non-local entity ignored"
            );
            return;
        }
        if self.is_stale(&state) {
            self.stats.stale_entity_states += 1;
            return;
        }
        self.reconcile_local(state);
    }

    fn handle_input_ack(&mut self, sequence: u64) {
        self.input_buffer.mark_processed(sequence);
        self.stats.inputs_acked += 1;
    }

    /// One driver tick. Housekeeping runs on a fixed tick modulo so its
    /// timing is deterministic and testable.
    pub fn on_tick(&mut self) {
        self.tick_count += 1;
        if self.tick_count % self.settings.housekeeping_tick_period == 0 {
            self.housekeeping();
        }
    }

    fn housekeeping(&mut self) {
        let now = self.clock.now_millis();
        self.history.cleanup(now);
        self.prediction
            .prune(now, self.settings.retention.prediction_window_millis);

        // Evict remote entities the server stopped mentioning so the maps
        // stay bounded over long sessions.
        let cutoff = now.saturating_sub(self.settings.retention.rollback_window_millis);
        self.remotes
            .retain(|_, tracked| tracked.last_update_millis >= cutoff);
        let remotes = &self.remotes;
        let local_player_id = &self.local_player_id;
        self.last_server_ticks
            .retain(|id, _| id == local_player_id || remotes.contains_key(id));

        debug!(
            pending_inputs = self.input_buffer.len(),
            prediction_records = self.prediction.record_count(),
            history_entities = self.history.tracked_entities(),
            remote_entities = self.remotes.len(),
            predictions = self.stats.predictions,
            reconciliations = self.stats.reconciliations,
            "housekeeping pass"
        );
    }

    /// Latest renderable state for an entity: the local prediction for the
    /// local player, the last accepted snapshot for remotes.
    pub fn latest_state(&self, entity_id: &str) -> Option<&EntityState> {
        if entity_id == self.local_player_id {
            self.prediction.predicted_state(entity_id)
        } else {
            self.remotes.get(entity_id).map(|t| &t.state)
        }
    }

    /// Rollback query: where was `entity_id` at (or just before)
    /// `target_time`? `None` outside the retained window is a normal result.
    pub fn rollback_position(&self, entity_id: &str, target_time: u64) -> Option<Vec3> {
        self.history.query(entity_id, target_time)
    }

    pub fn pending_input_count(&self) -> usize {
        self.input_buffer.len()
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }
}

// Reject NaN/inf and clamp each axis to the valid intent range.
fn sanitize_movement(movement: Vec3) -> Option<Vec3> {
    if !movement.is_finite() {
        return None;
    }
    Some(movement.clamp(Vec3::splat(-1.0), Vec3::splat(1.0)))
}

/// Drive one sync session: local input, transport events, and the fixed tick.
///
/// The task owns the orchestrator; everything else reaches it through
/// channels, so the core needs no locks. Either channel closing ends the
/// session.
pub async fn sync_task<C, R>(
    mut orchestrator: SyncOrchestrator<C, R>,
    mut local_input_rx: mpsc::Receiver<Vec3>,
    mut event_rx: mpsc::Receiver<SyncEvent>,
    tick_interval: Duration,
) where
    C: Clock,
    R: Renderer,
{
    let mut interval = tokio::time::interval(tick_interval);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                orchestrator.on_tick();
            }
            event = event_rx.recv() => {
                match event {
                    Some(event) => orchestrator.handle_event(event),
                    None => {
                        // Transport task gone for good; end the session.
                        orchestrator.handle_event(SyncEvent::Closed);
                        break;
                    }
                }
            }
            movement = local_input_rx.recv() => {
                match movement {
                    Some(movement) => orchestrator.process_local_input(movement),
                    None => {
                        // Host dropped its input handle; shut down cleanly.
                        orchestrator.handle_event(SyncEvent::Closed);
                        break;
                    }
                }
            }
        }
    }
}
