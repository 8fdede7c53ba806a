// Module declarations for the application's core components
pub mod aps;     // APsystems ECU-R protocol implementation
pub mod error;   // Error handling and types
pub mod options; // Command line options parsing
pub mod prelude; // Common imports and types
pub mod utils;   // Shared byte-level helpers

// Get the package version from Cargo.toml
pub const CARGO_PKG_VERSION: &str = env!("CARGO_PKG_VERSION");
