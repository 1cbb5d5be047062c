//! Configuration model for lockstep.
//!
//! This module defines the Config struct that represents `.lockstep.yaml` at
//! the main repository root. The file is optional; parsing is
//! forward-compatible (unknown fields are ignored), every field has a
//! default, and values are validated after loading.

mod model;
mod operations;


// Re-export public API
pub use model::{CONFIG_FILE_NAME, Config};
