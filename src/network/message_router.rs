use std::sync::Arc;

use tokio::sync::mpsc::error::SendError;
use tokio::sync::{mpsc, Mutex};
use tracing::{error, info, warn};

use crate::errors::validation;
use crate::network::messages::{
    deserialize_message, serialize_response, ClientMessage, ServerResponse,
};
use crate::{AppError, ConnectionCommand, LobbyRegistry};

#[derive(Debug)]
pub enum MessageRouterError {
    App(AppError),
    Send(SendError<ConnectionCommand>),
}

impl From<AppError> for MessageRouterError {
    fn from(err: AppError) -> Self {
        MessageRouterError::App(err)
    }
}

impl From<SendError<ConnectionCommand>> for MessageRouterError {
    fn from(err: SendError<ConnectionCommand>) -> Self {
        MessageRouterError::Send(err)
    }
}

fn send_join_error(
    cmd_sender: &mpsc::UnboundedSender<ConnectionCommand>,
    connection_id: &str,
    error: &AppError,
) -> Result<(), MessageRouterError> {
    let message = serialize_response(&ServerResponse::JoinError {
        message: error.user_friendly_message(),
    })?;
    cmd_sender.send(ConnectionCommand::SendToConnection {
        connection_id: connection_id.to_string(),
        message,
    })?;
    Ok(())
}

pub async fn handle_text_message(
    text: String,
    connection_id: &str,
    registry: &Arc<Mutex<LobbyRegistry>>,
    cmd_sender: &mpsc::UnboundedSender<ConnectionCommand>,
) {
    let client_message = match deserialize_message(&text) {
        Ok(msg) => msg,
        Err(e) => {
            // No error event exists for malformed frames; drop them.
            warn!("dropping unparseable frame from {connection_id}: {e}");
            return;
        }
    };

    // The lock is held across the outbound sends so broadcast order always
    // matches mutation order.
    let mut registry = registry.lock().await;
    match handle_message(client_message, connection_id, &mut registry, cmd_sender) {
        Ok(()) => {}
        Err(MessageRouterError::App(app_error)) => {
            if app_error.should_log() {
                error!("failed to handle message from {connection_id}: {app_error}");
            }
        }
        Err(MessageRouterError::Send(_)) => {
            // Command channel closed - the server is shutting down
            error!("command channel closed while routing for {connection_id}");
        }
    }
}

pub fn handle_message(
    message: ClientMessage,
    connection_id: &str,
    registry: &mut LobbyRegistry,
    cmd_sender: &mpsc::UnboundedSender<ConnectionCommand>,
) -> Result<(), MessageRouterError> {
    match message {
        ClientMessage::JoinLobby {
            player_name,
            lobby_id,
        } => {
            if let Err(error) = validation::validate_player_name(&player_name)
                .and_then(|_| validation::validate_lobby_id(&lobby_id))
            {
                return send_join_error(cmd_sender, connection_id, &error);
            }

            // Subscribed before the duplicate check, and the subscription is
            // kept even when the join is rejected.
            cmd_sender.send(ConnectionCommand::Subscribe {
                connection_id: connection_id.to_string(),
                lobby_id: lobby_id.clone(),
            })?;

            match registry.join_lobby(connection_id, &player_name, &lobby_id) {
                Ok(roster) => {
                    info!("{player_name} joined lobby {lobby_id}");
                    let message = serialize_response(&ServerResponse::PlayersUpdate(roster))?;
                    cmd_sender.send(ConnectionCommand::BroadcastToLobby { lobby_id, message })?;
                }
                Err(error @ AppError::DuplicateName { .. }) => {
                    send_join_error(cmd_sender, connection_id, &error)?;
                }
                Err(error) => return Err(error.into()),
            }
        }

        ClientMessage::ToggleReady {
            player_name,
            lobby_id,
            is_ready,
        } => {
            // Unknown lobby or name: silently ignored, nothing broadcast.
            let Some(outcome) = registry.toggle_ready(&player_name, &lobby_id, is_ready) else {
                return Ok(());
            };

            info!(
                "{player_name} in lobby {lobby_id} is now {}",
                if is_ready { "ready" } else { "not ready" }
            );
            let message = serialize_response(&ServerResponse::PlayersUpdate(outcome.roster))?;
            cmd_sender.send(ConnectionCommand::BroadcastToLobby {
                lobby_id: lobby_id.clone(),
                message,
            })?;

            if let Some(reset_roster) = outcome.roster_after_reset {
                info!("everyone in lobby {lobby_id} is ready");
                cmd_sender.send(ConnectionCommand::BroadcastToLobby {
                    lobby_id: lobby_id.clone(),
                    message: serialize_response(&ServerResponse::EveryoneReady)?,
                })?;
                cmd_sender.send(ConnectionCommand::BroadcastToLobby {
                    lobby_id,
                    message: serialize_response(&ServerResponse::PlayersUpdate(reset_roster))?,
                })?;
            }
        }

        ClientMessage::LeaveLobby {
            player_name,
            lobby_id,
        } => {
            // Nonexistent lobby: no broadcast and no acknowledgment.
            let Some(roster) = registry.leave_lobby(connection_id, &lobby_id) else {
                return Ok(());
            };

            info!("{player_name} left lobby {lobby_id}");
            let message = serialize_response(&ServerResponse::PlayersUpdate(roster))?;
            cmd_sender.send(ConnectionCommand::BroadcastToLobby {
                lobby_id: lobby_id.clone(),
                message,
            })?;
            cmd_sender.send(ConnectionCommand::Unsubscribe {
                connection_id: connection_id.to_string(),
                lobby_id,
            })?;
            cmd_sender.send(ConnectionCommand::SendToConnection {
                connection_id: connection_id.to_string(),
                message: serialize_response(&ServerResponse::DisconnectConfirmed)?,
            })?;
        }
    }
    Ok(())
}

/// Transport-level disconnect: sweep the registry and notify every lobby the
/// connection belonged to. The caller has already dropped the socket, so no
/// acknowledgment is possible.
pub async fn handle_disconnect(
    connection_id: &str,
    registry: &Arc<Mutex<LobbyRegistry>>,
    cmd_sender: &mpsc::UnboundedSender<ConnectionCommand>,
) {
    // The guard stays alive across the sends, like handle_text_message: a
    // competing handler must not slip its own mutation and broadcast between
    // this sweep and its fan-out.
    let mut registry = registry.lock().await;
    let updates = registry.handle_disconnect(connection_id);
    for update in updates {
        match serialize_response(&ServerResponse::PlayersUpdate(update.roster)) {
            Ok(message) => {
                let _ = cmd_sender.send(ConnectionCommand::BroadcastToLobby {
                    lobby_id: update.lobby_id,
                    message,
                });
            }
            Err(e) => warn!("failed to serialize disconnect update: {e}"),
        }
    }
}
