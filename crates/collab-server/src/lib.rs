//! collab-server
//!
//! Multi-client async WebSocket server for the collaborative editor.

pub mod config;
pub mod types;
pub mod registry;
pub mod dispatcher;
pub mod state_task;
pub mod session;
pub mod server;

// internal: WebSocket plumbing, not re-exported
mod transport;
