use std::collections::{HashMap, HashSet};

use futures_util::{stream::SplitSink, SinkExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{tungstenite::Message, WebSocketStream};
use tracing::{debug, warn};

use crate::{AppError, AppResult};

type WsSink = SplitSink<WebSocketStream<TcpStream>, Message>;

#[derive(Debug)]
struct WebSocketConnection {
    sender: WsSink,
}

/// Owns the write half of every live socket plus the lobby subscription
/// sets. This is the transport's room-scoped pub/sub: the registry never
/// sees a socket, it only names lobbies and connection ids.
pub struct ConnectionManager {
    connections: HashMap<String, WebSocketConnection>,
    lobby_subscribers: HashMap<String, HashSet<String>>, // lobby_id -> connection ids
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: HashMap::new(),
            lobby_subscribers: HashMap::new(),
        }
    }

    pub fn add_connection(&mut self, id: String, sender: WsSink) {
        self.connections.insert(id.clone(), WebSocketConnection { sender });
        debug!("added connection {id}");
    }

    /// Drops the socket and clears every subscription it held.
    pub fn remove_connection(&mut self, id: &str) {
        self.connections.remove(id);
        for subscribers in self.lobby_subscribers.values_mut() {
            subscribers.remove(id);
        }
        self.lobby_subscribers
            .retain(|_, subscribers| !subscribers.is_empty());
        debug!("removed connection {id}");
    }

    pub fn subscribe(&mut self, connection_id: &str, lobby_id: &str) {
        self.lobby_subscribers
            .entry(lobby_id.to_string())
            .or_default()
            .insert(connection_id.to_string());
    }

    pub fn unsubscribe(&mut self, connection_id: &str, lobby_id: &str) {
        if let Some(subscribers) = self.lobby_subscribers.get_mut(lobby_id) {
            subscribers.remove(connection_id);
            if subscribers.is_empty() {
                self.lobby_subscribers.remove(lobby_id);
            }
        }
    }

    #[cfg(test)]
    pub fn is_subscribed(&self, connection_id: &str, lobby_id: &str) -> bool {
        self.lobby_subscribers
            .get(lobby_id)
            .is_some_and(|subscribers| subscribers.contains(connection_id))
    }

    pub async fn send_to_connection(
        &mut self,
        connection_id: &str,
        message: &str,
    ) -> AppResult<()> {
        self.connections
            .get_mut(connection_id)
            .ok_or_else(|| AppError::ConnectionNotFound {
                connection_id: connection_id.to_string(),
            })?
            .sender
            .send(Message::Text(message.to_string()))
            .await
            .map_err(|_| AppError::MessageSendFailed {
                connection_id: connection_id.to_string(),
            })?;
        Ok(())
    }

    /// Sends to every subscriber of the lobby, sender included. Connections
    /// that fail to accept the write are evicted.
    pub async fn broadcast_to_lobby(&mut self, lobby_id: &str, message: &str) {
        let Some(subscribers) = self.lobby_subscribers.get(lobby_id) else {
            return;
        };
        let subscribers: Vec<String> = subscribers.iter().cloned().collect();

        let mut failed_connections = Vec::new();
        for connection_id in subscribers {
            let Some(connection) = self.connections.get_mut(&connection_id) else {
                continue;
            };
            if let Err(e) = connection
                .sender
                .send(Message::Text(message.to_string()))
                .await
            {
                warn!("failed to send to connection {connection_id}: {e}");
                failed_connections.push(connection_id);
            }
        }

        for failed_id in failed_connections {
            self.remove_connection(&failed_id);
        }
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}
