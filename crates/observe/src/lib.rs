//! This crate contains the code required to make the deployer observable:
//! initialization of the logging stack and the panic hook that routes panics
//! through it.
pub mod config;
pub mod tracing;

pub use config::Config;
