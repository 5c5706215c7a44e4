use std::{error::Error, sync::Arc};

use tokio::{
    net::TcpListener,
    sync::{mpsc, Mutex},
};
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    CommandProcessor, ConnectionCommand, ConnectionHandler, ConnectionManager, LobbyRegistry,
};

pub struct WebsocketServer {
    address: String,
}

impl WebsocketServer {
    pub fn new(address: &str) -> Self {
        Self {
            address: address.to_string(),
        }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error>> {
        let listener = TcpListener::bind(&self.address).await?;
        info!("lobby server listening on {}", self.address);

        let registry = Arc::new(Mutex::new(LobbyRegistry::new()));
        let mut connection_manager = ConnectionManager::new();

        // Single task owns the sockets and applies commands in order
        let (cmd_sender, mut cmd_receiver) = mpsc::unbounded_channel::<ConnectionCommand>();
        tokio::spawn(async move {
            while let Some(command) = cmd_receiver.recv().await {
                CommandProcessor::process_command(command, &mut connection_manager).await;
            }
        });

        // Accept connections
        while let Ok((stream, addr)) = listener.accept().await {
            let connection_id = Uuid::new_v4().to_string();
            info!("new connection from {addr} as {connection_id}");

            let registry = registry.clone();
            let cmd_sender = cmd_sender.clone();

            tokio::spawn(async move {
                if let Err(e) =
                    ConnectionHandler::handle_connection(stream, connection_id, registry, cmd_sender)
                        .await
                {
                    error!("error handling connection: {e}");
                }
            });
        }

        Ok(())
    }
}
