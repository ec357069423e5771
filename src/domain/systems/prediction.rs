use crate::domain::state::{EntityState, PlayerInput};
use crate::domain::tuning::PredictionTuning;
use glam::Vec3;
use std::collections::{HashMap, VecDeque};

/// One prediction step kept for confidence scoring and diagnostics.
#[derive(Debug, Clone)]
pub struct PredictionRecord {
    pub input: PlayerInput,
    pub state: EntityState,
    pub recorded_at: u64,
}

// Number of recent inputs the confidence score looks at.
const CONFIDENCE_WINDOW: usize = 5;
// Hard cap on retained records between time-based prunes.
const MAX_RECORDS: usize = 600;

/// Computes the next local state from an input and the prior state.
///
/// The integration is a game-feel model (velocity blend + drag + gravity +
/// ground clamp), not general rigid-body dynamics. Given the same prior state
/// and input it always produces the same state.
pub struct PredictionEngine {
    tuning: PredictionTuning,
    predicted: HashMap<String, EntityState>,
    records: VecDeque<PredictionRecord>,
}

impl PredictionEngine {
    pub fn new(tuning: PredictionTuning) -> Self {
        Self {
            tuning,
            predicted: HashMap::new(),
            records: VecDeque::new(),
        }
    }

    /// Latest predicted state for a player, if any prediction has run.
    pub fn predicted_state(&self, player_id: &str) -> Option<&EntityState> {
        self.predicted.get(player_id)
    }

    /// Mutable access for in-place corrections after reconciliation.
    pub fn predicted_state_mut(&mut self, player_id: &str) -> Option<&mut EntityState> {
        self.predicted.get_mut(player_id)
    }

    /// Advance a player's state one fixed step from `input`.
    ///
    /// Players without a prior state start from the spawn state. Always
    /// returns a state; there is no failure path.
    pub fn predict_next(&mut self, input: &PlayerInput, now: u64) -> EntityState {
        let prior = self.predicted.get(&input.player_id).cloned().unwrap_or_else(|| {
            EntityState::spawn(input.player_id.clone(), self.tuning.spawn_position)
        });

        let t = self.tuning;

        // Horizontal intent only; vertical motion comes from gravity.
        let input_velocity = Vec3::new(
            input.movement.x * t.move_speed,
            0.0,
            input.movement.z * t.move_speed,
        );

        // Frame-rate dependent by design; see PredictionTuning::blend_factor.
        let blended = prior.velocity.lerp(input_velocity, t.blend_factor);

        // Drag applies to the horizontal plane only.
        let dragged = Vec3::new(blended.x * t.friction, blended.y, blended.z * t.friction);

        let speed = dragged.length();
        let mut velocity = if speed > t.max_velocity {
            dragged * (t.max_velocity / speed)
        } else {
            dragged
        };

        let mut position = prior.position + velocity * t.delta_time;
        position.y += t.gravity * t.delta_time;

        // Ground clamp.
        if position.y < 0.0 {
            position.y = 0.0;
            velocity.y = 0.0;
        }

        let state = EntityState {
            entity_id: prior.entity_id,
            position,
            velocity,
            rotation: prior.rotation,
            tick: prior.tick + 1,
            confidence: self.confidence(),
        };

        self.predicted.insert(input.player_id.clone(), state.clone());
        self.records.push_back(PredictionRecord {
            input: input.clone(),
            state: state.clone(),
            recorded_at: now,
        });
        if self.records.len() > MAX_RECORDS {
            self.records.pop_front();
        }

        state
    }

    // Input-consistency score over the last few predictions: low spread in
    // recent horizontal movement intent means high confidence. Diagnostic
    // only; nothing in the core branches on it.
    fn confidence(&self) -> f32 {
        let recent: Vec<Vec3> = self
            .records
            .iter()
            .rev()
            .take(CONFIDENCE_WINDOW)
            .map(|r| r.input.movement)
            .collect();
        if recent.len() < 2 {
            return 1.0;
        }

        let mean = recent.iter().copied().sum::<Vec3>() / recent.len() as f32;
        let consistency = recent
            .iter()
            .map(|m| {
                let spread = (m.x - mean.x).abs() + (m.z - mean.z).abs();
                1.0 - (spread / 5.0).min(1.0)
            })
            .sum::<f32>()
            / recent.len() as f32;

        consistency.max(0.1)
    }

    /// Drop records older than the prediction retention window.
    pub fn prune(&mut self, now: u64, window_millis: u64) {
        let cutoff = now.saturating_sub(window_millis);
        while self.records.front().is_some_and(|r| r.recorded_at < cutoff) {
            self.records.pop_front();
        }
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Forget all per-session prediction state.
    pub fn clear(&mut self) {
        self.predicted.clear();
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(seq: u64, movement: Vec3) -> PlayerInput {
        PlayerInput {
            player_id: "p1".to_string(),
            sequence: seq,
            movement,
            timestamp: seq * 16,
        }
    }

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-3,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn when_no_prior_state_then_first_step_starts_from_spawn() {
        let mut engine = PredictionEngine::new(PredictionTuning::default());
        let state = engine.predict_next(&input(1, Vec3::ZERO), 0);

        assert_eq!(state.tick, 1);
        assert_eq!(state.velocity, Vec3::ZERO);
        // One step of gravity from the spawn height.
        assert_close(state.position.y, 5.0 - 9.81 / 60.0);
        assert_eq!(state.position.x, 0.0);
        assert_eq!(state.position.z, 0.0);
    }

    #[test]
    fn golden_three_steps_of_constant_forward_movement() {
        let mut engine = PredictionEngine::new(PredictionTuning::default());
        let forward = Vec3::new(0.0, 0.0, 1.0);

        // Per step: vz' = (0.7 * vz + 0.3 * 10) * 0.9, z += vz' / 60,
        // y += -9.81 / 60. Spawn is (0, 5, 0) with zero velocity.
        let s1 = engine.predict_next(&input(1, forward), 0);
        assert_close(s1.velocity.z, 2.7);
        assert_close(s1.position.z, 2.7 / 60.0);

        let s2 = engine.predict_next(&input(2, forward), 16);
        assert_close(s2.velocity.z, 4.401);
        assert_close(s2.position.z, 2.7 / 60.0 + 4.401 / 60.0);

        let s3 = engine.predict_next(&input(3, forward), 33);
        assert_close(s3.velocity.z, 5.47263);
        assert_close(s3.position.z, (2.7 + 4.401 + 5.47263) / 60.0);
        assert_close(s3.position.y, 5.0 - 3.0 * 9.81 / 60.0);
        assert_eq!(s3.tick, 3);
    }

    #[test]
    fn identical_input_streams_produce_bit_identical_states() {
        let movements = [
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.5, 0.0, -1.0),
            Vec3::new(0.0, 0.0, 1.0),
        ];

        let mut a = PredictionEngine::new(PredictionTuning::default());
        let mut b = PredictionEngine::new(PredictionTuning::default());
        for (i, movement) in movements.iter().enumerate() {
            let seq = i as u64 + 1;
            let left = a.predict_next(&input(seq, *movement), seq * 16);
            let right = b.predict_next(&input(seq, *movement), seq * 16);
            assert_eq!(left, right);
        }
    }

    #[test]
    fn tick_increases_by_one_per_step() {
        let mut engine = PredictionEngine::new(PredictionTuning::default());
        for seq in 1..=10 {
            let state = engine.predict_next(&input(seq, Vec3::ZERO), seq * 16);
            assert_eq!(state.tick, seq);
        }
    }

    #[test]
    fn when_speed_exceeds_cap_then_velocity_is_rescaled_to_cap() {
        let mut engine = PredictionEngine::new(PredictionTuning::default());
        engine.predict_next(&input(1, Vec3::ZERO), 0);
        // Force an out-of-range prior velocity, as a large correction could.
        engine.predicted_state_mut("p1").expect("state exists").velocity =
            Vec3::new(30.0, 0.0, 0.0);

        let state = engine.predict_next(&input(2, Vec3::new(1.0, 0.0, 0.0)), 16);
        assert_close(state.velocity.length(), 15.0);
    }

    #[test]
    fn falling_entity_is_clamped_to_the_ground() {
        let mut engine = PredictionEngine::new(PredictionTuning::default());
        let mut last = engine.predict_next(&input(1, Vec3::ZERO), 0);
        for seq in 2..=40 {
            last = engine.predict_next(&input(seq, Vec3::ZERO), seq * 16);
        }

        assert_eq!(last.position.y, 0.0);
        assert_eq!(last.velocity.y, 0.0);
    }

    #[test]
    fn confidence_is_full_for_short_history_and_bounded_below() {
        let mut engine = PredictionEngine::new(PredictionTuning::default());
        let first = engine.predict_next(&input(1, Vec3::new(1.0, 0.0, 0.0)), 0);
        assert_eq!(first.confidence, 1.0);

        // Strongly alternating intent should lower confidence without ever
        // dropping below the floor.
        let mut last = first;
        for seq in 2..=10 {
            let x = if seq % 2 == 0 { -1.0 } else { 1.0 };
            last = engine.predict_next(&input(seq, Vec3::new(x, 0.0, 0.0)), seq * 16);
        }
        assert!(last.confidence < 1.0);
        assert!(last.confidence >= 0.1);
    }

    #[test]
    fn steady_intent_keeps_confidence_at_full() {
        let mut engine = PredictionEngine::new(PredictionTuning::default());
        let forward = Vec3::new(0.0, 0.0, 1.0);
        let mut last = engine.predict_next(&input(1, forward), 0);
        for seq in 2..=8 {
            last = engine.predict_next(&input(seq, forward), seq * 16);
        }
        assert_eq!(last.confidence, 1.0);
    }

    #[test]
    fn prune_drops_records_older_than_the_window() {
        let mut engine = PredictionEngine::new(PredictionTuning::default());
        engine.predict_next(&input(1, Vec3::ZERO), 1_000);
        engine.predict_next(&input(2, Vec3::ZERO), 2_000);
        engine.predict_next(&input(3, Vec3::ZERO), 12_500);
        assert_eq!(engine.record_count(), 3);

        engine.prune(12_500, 10_000);
        assert_eq!(engine.record_count(), 2);
    }

    #[test]
    fn clear_forgets_predicted_state_and_records() {
        let mut engine = PredictionEngine::new(PredictionTuning::default());
        engine.predict_next(&input(1, Vec3::ZERO), 0);
        engine.clear();

        assert!(engine.predicted_state("p1").is_none());
        assert_eq!(engine.record_count(), 0);
    }
}
