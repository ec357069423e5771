// Wire protocol DTOs and conversions for the sync transport.
// Vectors cross the wire as [x, y, z] arrays and quaternions as [x, y, z, w].

use crate::domain::{EntityState, PlayerInput, ServerSnapshot};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Messages the client sends to the server.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    // One captured input sample, sent as soon as it is predicted.
    PlayerInput { input: PlayerInputDto },
}

/// Messages the server sends to the client.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    // Authoritative snapshot of one or more entities at a tick.
    StateUpdate { state: StateUpdateDto },
    // Out-of-band correction hint for a single entity.
    Reconciliation { entity: EntityStateDto },
    // Acknowledges that inputs up to `sequence` were processed.
    InputAck { sequence: u64 },
}

/// Input payload as transmitted to the server.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerInputDto {
    pub player_id: String,
    pub sequence: u64,
    pub movement: [f32; 3],
    pub timestamp: u64,
}

impl From<PlayerInput> for PlayerInputDto {
    fn from(input: PlayerInput) -> Self {
        Self {
            player_id: input.player_id,
            sequence: input.sequence,
            movement: input.movement.to_array(),
            timestamp: input.timestamp,
        }
    }
}

/// Snapshot payload of a `state_update` message.
#[derive(Debug, Clone, Deserialize)]
pub struct StateUpdateDto {
    pub tick: u64,
    #[serde(default)]
    pub entities: Vec<EntityStateDto>,
}

impl From<StateUpdateDto> for ServerSnapshot {
    fn from(state: StateUpdateDto) -> Self {
        Self {
            tick: state.tick,
            entities: state.entities.into_iter().map(EntityState::from).collect(),
        }
    }
}

/// Entity state as it appears inside server messages.
#[derive(Debug, Clone, Deserialize)]
pub struct EntityStateDto {
    pub entity_id: String,
    pub position: [f32; 3],
    #[serde(default)]
    pub velocity: [f32; 3],
    #[serde(default = "identity_rotation")]
    pub rotation: [f32; 4],
    pub tick: u64,
}

fn identity_rotation() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

impl From<EntityStateDto> for EntityState {
    fn from(dto: EntityStateDto) -> Self {
        Self {
            entity_id: dto.entity_id,
            position: Vec3::from_array(dto.position),
            velocity: Vec3::from_array(dto.velocity),
            rotation: Quat::from_array(dto.rotation),
            tick: dto.tick,
            confidence: 1.0,
        }
    }
}
