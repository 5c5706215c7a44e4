use futures_util::stream::SplitSink;
use tokio::net::TcpStream;
use tokio_tungstenite::{tungstenite::Message, WebSocketStream};
use tracing::warn;

use crate::ConnectionManager;

/// Commands for the task that owns the sockets. Everything the handlers want
/// to say to a client goes through this channel, so writes stay ordered.
#[derive(Debug)]
pub enum ConnectionCommand {
    AddConnection {
        id: String,
        sender: SplitSink<WebSocketStream<TcpStream>, Message>,
    },
    RemoveConnection {
        id: String,
    },
    Subscribe {
        connection_id: String,
        lobby_id: String,
    },
    Unsubscribe {
        connection_id: String,
        lobby_id: String,
    },
    SendToConnection {
        connection_id: String,
        message: String,
    },
    BroadcastToLobby {
        lobby_id: String,
        message: String,
    },
}

pub struct CommandProcessor;

impl CommandProcessor {
    /// Delivery is fire-and-forget: a failed unicast is logged, never retried.
    pub async fn process_command(
        command: ConnectionCommand,
        connection_manager: &mut ConnectionManager,
    ) {
        match command {
            ConnectionCommand::AddConnection { id, sender } => {
                connection_manager.add_connection(id, sender);
            }
            ConnectionCommand::RemoveConnection { id } => {
                connection_manager.remove_connection(&id);
            }
            ConnectionCommand::Subscribe {
                connection_id,
                lobby_id,
            } => {
                connection_manager.subscribe(&connection_id, &lobby_id);
            }
            ConnectionCommand::Unsubscribe {
                connection_id,
                lobby_id,
            } => {
                connection_manager.unsubscribe(&connection_id, &lobby_id);
            }
            ConnectionCommand::SendToConnection {
                connection_id,
                message,
            } => {
                if let Err(e) = connection_manager
                    .send_to_connection(&connection_id, &message)
                    .await
                {
                    warn!("unicast to {connection_id} failed: {e}");
                }
            }
            ConnectionCommand::BroadcastToLobby { lobby_id, message } => {
                connection_manager.broadcast_to_lobby(&lobby_id, &message).await;
            }
        }
    }
}
