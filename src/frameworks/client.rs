// Framework bootstrap for the sync client runtime.

use crate::domain::{MonotonicClock, Renderer};
use crate::frameworks::config;
use crate::interface_adapters::net;
use crate::use_cases::sync::{SyncOrchestrator, SyncSettings, sync_task};
use crate::use_cases::types::{ConnectionState, SyncEvent};

use glam::Vec3;
use tokio::sync::{mpsc, watch};

fn init_runtime() {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

/// Host-side handle to a running sync session.
pub struct SyncHandle {
    /// Push local movement samples into the session.
    pub local_input_tx: mpsc::Sender<Vec3>,
    /// Observe connection lifecycle transitions.
    pub connection_rx: watch::Receiver<ConnectionState>,
}

/// Wire up and start one sync session against `endpoint`.
///
/// The sync loop owns all mutable session state; the transport reaches it
/// only through channels. Must be called from within a tokio runtime.
pub fn start<R>(endpoint: String, player_id: String, renderer: R) -> SyncHandle
where
    R: Renderer + Send + 'static,
{
    let (local_input_tx, local_input_rx) =
        mpsc::channel::<Vec3>(config::LOCAL_INPUT_CHANNEL_CAPACITY);
    let (event_tx, event_rx) = mpsc::channel::<SyncEvent>(config::EVENT_CHANNEL_CAPACITY);
    let (outbound_tx, outbound_rx) = mpsc::channel(config::OUTBOUND_CHANNEL_CAPACITY);
    let (connection_tx, connection_rx) = watch::channel(ConnectionState::Disconnected);

    let mut orchestrator = SyncOrchestrator::new(
        player_id,
        MonotonicClock::default(),
        renderer,
        SyncSettings::default(),
        connection_tx,
        outbound_tx,
    );
    orchestrator.begin_connect();

    tokio::spawn(sync_task(
        orchestrator,
        local_input_rx,
        event_rx,
        config::TICK_INTERVAL,
    ));
    tokio::spawn(net::run_connection(endpoint, event_tx, outbound_rx));

    SyncHandle {
        local_input_tx,
        connection_rx,
    }
}

/// Initialize logging and start a session from environment configuration.
pub fn start_with_config<R>(renderer: R) -> SyncHandle
where
    R: Renderer + Send + 'static,
{
    init_runtime();
    start(config::server_url(), config::player_id(), renderer)
}
