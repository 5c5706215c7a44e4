use std::error::Error;
use std::sync::Arc;

use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, info, warn};

use crate::network::message_router;
use crate::{ConnectionCommand, LobbyRegistry};

pub struct ConnectionHandler;

impl ConnectionHandler {
    pub async fn handle_connection(
        stream: TcpStream,
        connection_id: String,
        registry: Arc<Mutex<LobbyRegistry>>,
        cmd_sender: mpsc::UnboundedSender<ConnectionCommand>,
    ) -> Result<(), Box<dyn Error>> {
        let ws_stream = accept_async(stream).await?;
        info!("websocket connection {connection_id} established");

        let (ws_sender, mut ws_receiver) = ws_stream.split();
        cmd_sender.send(ConnectionCommand::AddConnection {
            id: connection_id.clone(),
            sender: ws_sender,
        })?;

        while let Some(msg) = ws_receiver.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    message_router::handle_text_message(
                        text,
                        &connection_id,
                        &registry,
                        &cmd_sender,
                    )
                    .await;
                }
                Ok(Message::Close(_)) => {
                    debug!("websocket close frame from {connection_id}");
                    break;
                }
                Ok(_) => continue, // Ignore pings and binary frames
                Err(e) => {
                    warn!("websocket error on {connection_id}: {e}");
                    break;
                }
            }
        }

        // The socket is gone. Drop it from the transport first so the
        // departure broadcasts only reach the remaining subscribers, then
        // sweep its memberships. Runs once per connection, and the sweep is
        // idempotent besides.
        cmd_sender.send(ConnectionCommand::RemoveConnection {
            id: connection_id.clone(),
        })?;
        message_router::handle_disconnect(&connection_id, &registry, &cmd_sender).await;

        info!("connection {connection_id} closed");
        Ok(())
    }
}
