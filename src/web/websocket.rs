//! WebSocket handler for live sensor data streaming.

use crate::error::{MonitorError, Result};
use crate::sampling::reading::Reading;
use axum::extract::ws::{Message, WebSocket};
use axum::{extract::WebSocketUpgrade, response::Response};
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, error, info, warn};

// Global broadcast channel for new readings
lazy_static::lazy_static! {
    static ref BROADCAST_TX: broadcast::Sender<Reading> = {
        let (tx, _rx) = broadcast::channel(100);
        tx
    };

    static ref CONNECTED_CLIENTS: Arc<RwLock<HashMap<String, Client>>> = {
        Arc::new(RwLock::new(HashMap::new()))
    };
}

#[derive(Debug)]
struct Client {
    id: String,
    connected_at: std::time::SystemTime,
}

/// The event envelope delivered to dashboard clients for each new reading.
#[derive(Debug, Serialize)]
struct SensorDataEvent<'a> {
    event: &'static str,
    data: &'a Reading,
}

impl<'a> SensorDataEvent<'a> {
    fn new(reading: &'a Reading) -> Self {
        Self {
            event: "sensor_data",
            data: reading,
        }
    }
}

/// WebSocket upgrade handler.
pub async fn websocket_handler(ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(handle_websocket)
}

/// Handle a WebSocket connection.
async fn handle_websocket(socket: WebSocket) {
    let client_id = uuid::Uuid::new_v4().to_string();
    info!("WebSocket client connected: {}", client_id);

    // Add client to connected clients list
    {
        let mut clients = CONNECTED_CLIENTS.write().await;
        clients.insert(
            client_id.clone(),
            Client {
                id: client_id.clone(),
                connected_at: std::time::SystemTime::now(),
            },
        );
    }

    let (mut sender, mut receiver) = socket.split();

    // Subscribe to broadcast channel
    let mut rx = BROADCAST_TX.subscribe();

    // Spawn a task to handle incoming messages from the client
    let client_id_recv = client_id.clone();
    let recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    debug!("Received message from {}: {}", client_id_recv, text);
                }
                Ok(Message::Binary(_)) => {
                    debug!("Received binary message from {}", client_id_recv);
                }
                Ok(Message::Close(_)) => {
                    info!("WebSocket client {} disconnected", client_id_recv);
                    break;
                }
                Ok(Message::Ping(_)) => {
                    debug!("Received ping from {}", client_id_recv);
                }
                Ok(Message::Pong(_)) => {
                    debug!("Received pong from {}", client_id_recv);
                }
                Err(e) => {
                    warn!("WebSocket error for client {}: {}", client_id_recv, e);
                    break;
                }
            }
        }
    });

    // Spawn a task to push new readings to the client
    let client_id_send = client_id.clone();
    let send_task = tokio::spawn(async move {
        while let Ok(reading) = rx.recv().await {
            match serde_json::to_string(&SensorDataEvent::new(&reading)) {
                Ok(json_string) => {
                    if let Err(e) = sender.send(Message::Text(json_string)).await {
                        warn!("Failed to send message to client {}: {}", client_id_send, e);
                        break;
                    }
                }
                Err(e) => {
                    error!(
                        "Failed to serialize reading for client {}: {}",
                        client_id_send, e
                    );
                }
            }
        }
    });

    // Wait for either task to complete
    tokio::select! {
        _ = recv_task => {
            debug!("Receive task completed for client {}", client_id);
        }
        _ = send_task => {
            debug!("Send task completed for client {}", client_id);
        }
    }

    // Remove client from connected clients list
    {
        let mut clients = CONNECTED_CLIENTS.write().await;
        clients.remove(&client_id);
    }

    info!("WebSocket client disconnected: {}", client_id);
}

/// Broadcast a new reading to all connected WebSocket clients.
pub async fn broadcast_reading(reading: Reading) -> Result<()> {
    let client_count = {
        let clients = CONNECTED_CLIENTS.read().await;
        clients.len()
    };

    if client_count > 0 {
        match BROADCAST_TX.send(reading) {
            Ok(receiver_count) => {
                debug!(
                    "Broadcasted reading to {} receivers ({} connected clients)",
                    receiver_count, client_count
                );
            }
            Err(e) => {
                warn!("Failed to broadcast reading: {}", e);
                return Err(MonitorError::web_server_error(format!(
                    "Failed to broadcast reading: {}",
                    e
                )));
            }
        }
    }

    Ok(())
}

/// Get the number of connected WebSocket clients.
pub async fn get_connected_client_count() -> usize {
    let clients = CONNECTED_CLIENTS.read().await;
    clients.len()
}

/// Get information about connected WebSocket clients.
pub async fn get_connected_clients() -> Vec<serde_json::Value> {
    let clients = CONNECTED_CLIENTS.read().await;
    let mut client_info = Vec::new();

    for client in clients.values() {
        let connected_duration = client.connected_at.elapsed().unwrap_or_default().as_secs();

        client_info.push(serde_json::json!({
            "id": client.id,
            "connected_at": client.connected_at
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
            "connected_duration_seconds": connected_duration
        }));
    }

    client_info
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_broadcast_no_clients() {
        let reading = Reading::new(Utc::now());
        let result = broadcast_reading(reading).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_connected_client_count() {
        let count = get_connected_client_count().await;
        assert!(count == 0); // No clients connected in test
    }

    #[test]
    fn sensor_data_event_envelope() {
        let mut reading = Reading::new(Utc::now());
        reading.pm2_5 = Some(15.2);

        let json = serde_json::to_value(SensorDataEvent::new(&reading)).unwrap();
        assert_eq!(json["event"], "sensor_data");
        assert_eq!(json["data"]["pm2_5"], 15.2);
    }
}
