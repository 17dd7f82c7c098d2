//! # picam-darkroom
//!
//! Core of a Raspberry Pi raw camera: exposure control and the on-disk
//! image library, plus the filter and raw development steps the camera
//! UI offers on top of them.
//!
//! ## Architecture
//! The crate holds no UI. A front end owns a [`core::studio::Studio`],
//! calls its operations and observes progress through the event channel:
//! - `core` - exposure, library, filters, enhancement and the studio
//! - `config` - JSON configuration with defaults
//! - `events` - Event reporting (GUI-ready)
//! - `error` - Error types per concern

pub mod config;
pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{DarkroomError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point (CLI or GUI).
/// Filtering follows `RUST_LOG`. A second call is a no-op.
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
