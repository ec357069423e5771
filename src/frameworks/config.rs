use std::{env, time::Duration};

// Runtime constants for the sync client (not gameplay tuning).

pub fn server_url() -> String {
    env::var("SYNC_SERVER_URL").unwrap_or_else(|_| "ws://127.0.0.1:3001/ws".to_string())
}

pub fn player_id() -> String {
    env::var("SYNC_PLAYER_ID").unwrap_or_else(|_| "player-1".to_string())
}

pub const LOCAL_INPUT_CHANNEL_CAPACITY: usize = 1024;
pub const EVENT_CHANNEL_CAPACITY: usize = 256;
pub const OUTBOUND_CHANNEL_CAPACITY: usize = 256;

pub const TICK_INTERVAL: Duration = Duration::from_millis(1000 / 60);
