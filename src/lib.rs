pub mod errors;
pub mod lobby;
pub mod network;

// Re-export commonly used items for convenience
pub use errors::{AppError, AppResult};
pub use lobby::registry::LobbyRegistry;
pub use network::connection_commands::{CommandProcessor, ConnectionCommand};
pub use network::connection_handler::ConnectionHandler;
pub use network::connection_manager::ConnectionManager;
pub use network::server::WebsocketServer;
