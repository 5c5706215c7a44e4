use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::lobby::member::{Member, PlayerEntry};
use crate::{AppError, AppResult};

/// In-memory store of lobbies. All mutations go through the four operation
/// methods below; callers are expected to serialize access (the server holds
/// it behind a single mutex).
pub struct LobbyRegistry {
    lobbies: HashMap<String, Vec<Member>>, // lobby_id -> members in join order
    connection_lobbies: HashMap<String, HashSet<String>>, // connection_id -> lobby ids
}

/// Result of a successful ready toggle. `roster_after_reset` is present only
/// when the toggle made the whole lobby ready, in which case every flag has
/// already been reset to false.
#[derive(Debug)]
pub struct ToggleOutcome {
    pub roster: Vec<PlayerEntry>,
    pub roster_after_reset: Option<Vec<PlayerEntry>>,
}

/// One lobby's post-removal roster after a disconnect sweep.
#[derive(Debug)]
pub struct LobbyUpdate {
    pub lobby_id: String,
    pub roster: Vec<PlayerEntry>,
}

impl LobbyRegistry {
    pub fn new() -> Self {
        Self {
            lobbies: HashMap::new(),
            connection_lobbies: HashMap::new(),
        }
    }

    /// Add a player to a lobby, creating the lobby on first join. Fails with
    /// `DuplicateName` on an exact name match, leaving the lobby untouched.
    /// Returns the full roster to broadcast.
    pub fn join_lobby(
        &mut self,
        connection_id: &str,
        player_name: &str,
        lobby_id: &str,
    ) -> AppResult<Vec<PlayerEntry>> {
        let members = self.lobbies.entry(lobby_id.to_string()).or_default();
        if members.iter().any(|member| member.name == player_name) {
            // A fresh lobby can't hit this branch, so the entry above never
            // leaves an empty lobby behind.
            return Err(AppError::DuplicateName {
                player_name: player_name.to_string(),
                lobby_id: lobby_id.to_string(),
            });
        }

        members.push(Member::new(
            player_name.to_string(),
            connection_id.to_string(),
        ));
        let roster = Self::roster(members);

        self.connection_lobbies
            .entry(connection_id.to_string())
            .or_default()
            .insert(lobby_id.to_string());

        Ok(roster)
    }

    /// Set a member's ready flag, matched by name within the lobby. A missing
    /// lobby or unknown name is a silent no-op (`None`). When the toggle
    /// leaves every member ready, all flags reset to false in the same call.
    pub fn toggle_ready(
        &mut self,
        player_name: &str,
        lobby_id: &str,
        is_ready: bool,
    ) -> Option<ToggleOutcome> {
        let members = self.lobbies.get_mut(lobby_id)?;
        let member = members
            .iter_mut()
            .find(|member| member.name == player_name)?;
        member.ready = is_ready;

        let roster = Self::roster(members);
        let everyone_ready = members.iter().all(|member| member.ready);
        let roster_after_reset = if everyone_ready {
            for member in members.iter_mut() {
                member.ready = false;
            }
            Some(Self::roster(members))
        } else {
            None
        };

        Some(ToggleOutcome {
            roster,
            roster_after_reset,
        })
    }

    /// Remove the caller's member from a lobby, matched by connection
    /// identity rather than asserted name. Returns the remaining roster, or
    /// `None` when the lobby doesn't exist.
    pub fn leave_lobby(&mut self, connection_id: &str, lobby_id: &str) -> Option<Vec<PlayerEntry>> {
        let members = self.lobbies.get_mut(lobby_id)?;
        members.retain(|member| member.connection_id != connection_id);
        let roster = Self::roster(members);

        if members.is_empty() {
            self.lobbies.remove(lobby_id);
            debug!("lobby {lobby_id} is empty and has been removed");
        }
        self.forget_membership(connection_id, lobby_id);

        Some(roster)
    }

    /// Remove a dead connection's member from every lobby it belonged to.
    /// Idempotent; a second call finds no memberships and returns nothing.
    pub fn handle_disconnect(&mut self, connection_id: &str) -> Vec<LobbyUpdate> {
        let Some(lobby_ids) = self.connection_lobbies.remove(connection_id) else {
            return Vec::new();
        };

        let mut updates = Vec::new();
        for lobby_id in lobby_ids {
            let Some(members) = self.lobbies.get_mut(&lobby_id) else {
                continue;
            };
            members.retain(|member| member.connection_id != connection_id);
            let roster = Self::roster(members);
            if members.is_empty() {
                self.lobbies.remove(&lobby_id);
                debug!("lobby {lobby_id} is empty and has been removed");
            }
            updates.push(LobbyUpdate { lobby_id, roster });
        }
        updates
    }

    #[cfg(test)]
    pub fn contains_lobby(&self, lobby_id: &str) -> bool {
        self.lobbies.contains_key(lobby_id)
    }

    #[cfg(test)]
    pub fn lobby_count(&self) -> usize {
        self.lobbies.len()
    }

    #[cfg(test)]
    pub fn get_roster(&self, lobby_id: &str) -> Option<Vec<PlayerEntry>> {
        self.lobbies.get(lobby_id).map(|members| Self::roster(members))
    }

    fn roster(members: &[Member]) -> Vec<PlayerEntry> {
        members.iter().map(Member::entry).collect()
    }

    fn forget_membership(&mut self, connection_id: &str, lobby_id: &str) {
        if let Some(lobby_ids) = self.connection_lobbies.get_mut(connection_id) {
            lobby_ids.remove(lobby_id);
            if lobby_ids.is_empty() {
                self.connection_lobbies.remove(connection_id);
            }
        }
    }
}

impl Default for LobbyRegistry {
    fn default() -> Self {
        Self::new()
    }
}
