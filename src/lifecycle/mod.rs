//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → AppState → background tasks → listener
//!
//! Shutdown (shutdown.rs):
//!     Signal (signals.rs) → broadcast → server drains, loops exit
//! ```

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{build_state, spawn_background_tasks, state_with, StartupError};
