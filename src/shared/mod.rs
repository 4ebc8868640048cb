// Shared kernel - errors and constants used across layers

pub mod constants;
pub mod error;

pub use error::{RelayError, Result};
