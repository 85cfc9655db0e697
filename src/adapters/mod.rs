//! Host-facing adapters kept behind traits so tests can substitute stubs.
pub mod service;

pub use service::{ServiceManager, Systemctl};
