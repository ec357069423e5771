use glam::Vec3;

/// Gameplay tuning for the client prediction step.
///
/// Keep this separate from runtime configuration (tick rates, channel sizes, etc.).
#[derive(Debug, Clone, Copy)]
pub struct PredictionTuning {
    /// Fixed conceptual timestep in seconds for one prediction step.
    pub delta_time: f32,

    /// Vertical acceleration in units per second squared (negative = down).
    pub gravity: f32,

    /// Horizontal drag multiplier applied to X/Z velocity each step.
    pub friction: f32,

    /// Hard cap on speed in units per second.
    pub max_velocity: f32,

    /// Scale from movement intent ([-1, 1] per axis) to horizontal velocity.
    pub move_speed: f32,

    /// Velocity lerp weight toward the input velocity each step.
    /// Not timestep-scaled, so the blend is frame-rate dependent; kept that
    /// way on purpose because scaling it changes the movement feel.
    pub blend_factor: f32,

    /// Where a player appears when predicted with no prior state.
    pub spawn_position: Vec3,
}

impl Default for PredictionTuning {
    fn default() -> Self {
        Self {
            delta_time: 1.0 / 60.0,
            gravity: -9.81,
            friction: 0.9,
            max_velocity: 15.0,
            move_speed: 10.0,
            blend_factor: 0.3,
            spawn_position: Vec3::new(0.0, 5.0, 0.0),
        }
    }
}
