pub mod error;
pub mod import;
pub mod panel;
pub mod persona;
pub mod presentation;
pub mod render;
pub mod run;
pub mod state;

// Re-export common error type
pub use error::{PulseError, Result};
