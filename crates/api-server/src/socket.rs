//! Socket.IO live connections
//!
//! Connections are tracked for logging. Committed changes from the command
//! layer are pushed to every connected client as `planner:change`.

use serde::Serialize;
use socketioxide::extract::{SocketRef, State};
use socketioxide::SocketIo;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use planner_core::notify::{ChangeEvent, ConnectionRegistry};
use planner_core::task::Task;
use planner_core::week::Week;
use planner_core::Planner;

pub const CHANGE_EVENT: &str = "planner:change";
pub const SYNC_EVENT: &str = "planner:sync";
pub const ERROR_EVENT: &str = "planner:error";

/// Shared state for Socket.IO handlers
#[derive(Clone)]
pub struct SocketState {
    pub planner: Planner,
    pub connections: ConnectionRegistry,
}

#[derive(Debug, Serialize)]
struct SyncPayload {
    weeks: Vec<Week>,
    tasks: Vec<Task>,
}

#[derive(Debug, Serialize)]
struct ErrorPayload {
    message: String,
}

/// Handle new socket connection
pub async fn on_connect(socket: SocketRef, State(state): State<SocketState>) {
    state.connections.connect(socket.id.to_string()).await;

    socket.on(
        "planner:request-sync",
        |socket: SocketRef, State(state): State<SocketState>| async move {
            handle_request_sync(socket, state).await;
        },
    );

    let connections = state.connections.clone();
    socket.on_disconnect(move |socket: SocketRef| {
        let connections = connections.clone();
        async move {
            connections.disconnect(&socket.id.to_string()).await;
        }
    });
}

async fn handle_request_sync(socket: SocketRef, state: SocketState) {
    info!("Client {} requested sync", socket.id);
    let snapshot = async {
        Ok::<_, planner_core::Error>(SyncPayload {
            weeks: state.planner.list_weeks().await?,
            tasks: state.planner.list_tasks().await?,
        })
    };

    match snapshot.await {
        Ok(payload) => {
            if let Err(e) = socket.emit(SYNC_EVENT, &payload) {
                warn!("Failed to emit sync: {}", e);
            }
        }
        Err(e) => {
            warn!("Failed to load sync state: {}", e);
            let _ = socket.emit(ERROR_EVENT, &ErrorPayload { message: e.to_string() });
        }
    }
}

/// Drain committed changes into `emit` until every publisher is gone
pub async fn forward_changes(
    mut changes: broadcast::Receiver<ChangeEvent>,
    mut emit: impl FnMut(&ChangeEvent),
) {
    loop {
        match changes.recv().await {
            Ok(event) => emit(&event),
            Err(RecvError::Lagged(skipped)) => {
                warn!("Change forwarder lagged, dropped {} events", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }
}

/// Forward every committed change to all connected clients
pub fn spawn_change_forwarder(
    io: SocketIo,
    changes: broadcast::Receiver<ChangeEvent>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(forward_changes(changes, move |event| {
        debug!("Broadcasting {:?} {:?}", event.entity, event.action);
        if let Err(e) = io.emit(CHANGE_EVENT, event) {
            warn!("Failed to broadcast change: {}", e);
        }
    }))
}

/// Create and configure Socket.IO layer
///
/// Both polling and WebSocket transports are accepted, so stock clients can
/// perform their polling-first handshake on the shared HTTP listener.
pub fn create_socket_layer(state: SocketState) -> (socketioxide::layer::SocketIoLayer, SocketIo) {
    let (layer, io) = SocketIo::builder().with_state(state).build_layer();

    io.ns("/", on_connect);

    (layer, io)
}
