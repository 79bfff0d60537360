//! SOS/WCS request transcoder.
//!
//! Reads a request in its KVP or XML encoding, optionally points it at another
//! protocol version, and writes it back out through the codec registry.

pub mod config;
pub mod transcode;

pub use config::{build_registry, load_binding_config, CONFIG_ENV};
pub use transcode::{InputKind, InvalidRequest};
