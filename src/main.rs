// Demo driver: dial the configured endpoint, feed synthetic movement input
// at the tick rate, and log what the session renders.

use sync_client::frameworks::{client, config};
use sync_client::{ConnectionState, EntityState, Renderer};

use glam::Vec3;
use tracing::{debug, info};

struct LogRenderer;

impl Renderer for LogRenderer {
    fn apply_state(&mut self, entity_id: &str, state: &EntityState) {
        debug!(
            entity_id,
            x = state.position.x,
            y = state.position.y,
            z = state.position.z,
            tick = state.tick,
            confidence = state.confidence,
            "state applied"
        );
    }
}

#[tokio::main]
async fn main() {
    let mut handle = client::start_with_config(LogRenderer);

    let mut interval = tokio::time::interval(config::TICK_INTERVAL);
    let mut elapsed: f32 = 0.0;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                // Wandering movement intent, purely to exercise the pipeline.
                elapsed += config::TICK_INTERVAL.as_secs_f32();
                let movement = Vec3::new((elapsed * 0.7).sin(), 0.0, (elapsed * 0.4).cos());
                let _ = handle.local_input_tx.try_send(movement);
            }
            changed = handle.connection_rx.changed() => {
                if changed.is_err() {
                    // Session task ended.
                    break;
                }
                let state = *handle.connection_rx.borrow_and_update();
                info!(?state, "connection state changed");
                if state == ConnectionState::Disconnected {
                    break;
                }
            }
        }
    }

    info!("demo session ended");
}
