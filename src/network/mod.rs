pub mod connection_commands;
pub mod connection_handler;
pub mod connection_manager;
pub mod message_router;
pub mod messages;
pub mod server;
