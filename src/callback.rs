//! Loopback listener that captures the provider redirect carrying the code.

mod server;
mod target;

pub use server::CallbackServer;
