//! WebSocket infrastructure for the live event stream.
//!
//! Provides connection management, heartbeat monitoring, the bus-to-socket
//! forwarder and the HTTP upgrade handler.

mod forwarder;
mod handler;
pub mod heartbeat;
pub mod manager;

pub use forwarder::EventForwarder;
pub use handler::ws_handler;
pub use manager::WsManager;
