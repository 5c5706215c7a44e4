use serde::{Deserialize, Serialize};

use crate::lobby::member::PlayerEntry;
use crate::{AppError, AppResult};

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    #[serde(rename_all = "camelCase")]
    JoinLobby {
        player_name: String,
        lobby_id: String,
    },
    #[serde(rename_all = "camelCase")]
    ToggleReady {
        player_name: String,
        lobby_id: String,
        is_ready: bool,
    },
    #[serde(rename_all = "camelCase")]
    LeaveLobby {
        player_name: String,
        lobby_id: String,
    },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerResponse {
    JoinError { message: String },
    PlayersUpdate(Vec<PlayerEntry>),
    EveryoneReady,
    DisconnectConfirmed,
}

pub fn deserialize_message(json: &str) -> Result<ClientMessage, serde_json::Error> {
    serde_json::from_str(json)
}

pub fn serialize_response(response: &ServerResponse) -> AppResult<String> {
    serde_json::to_string(response).map_err(|e| AppError::SerializationError {
        message: e.to_string(),
    })
}
