use serde::{Deserialize, Serialize};

/// A client's participation record within one lobby.
#[derive(Debug, Clone)]
pub struct Member {
    pub name: String,
    pub ready: bool,
    pub connection_id: String,
}

impl Member {
    pub fn new(name: String, connection_id: String) -> Self {
        Self {
            name,
            ready: false,
            connection_id,
        }
    }

    /// Wire projection of this member. The connection id never leaves the server.
    pub fn entry(&self) -> PlayerEntry {
        PlayerEntry {
            name: self.name.clone(),
            is_ready: self.ready,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerEntry {
    pub name: String,
    pub is_ready: bool,
}
