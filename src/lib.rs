//! Live view of an inverter's telemetry over the GUI server's WebSocket
//! stream, kept current across network interruptions.

pub mod config;
pub mod display;
pub mod state;
pub mod ws;
