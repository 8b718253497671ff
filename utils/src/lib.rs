//! Shared utilities for the lattice wallet engine.

pub mod logging;

pub use logging::{init_logging, LogFormat};
