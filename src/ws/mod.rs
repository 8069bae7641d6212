pub mod code_handler;
pub mod connection;
pub mod execution_handler;
pub mod handler;
pub mod registry;
pub mod rooms;
pub mod session_handler;
