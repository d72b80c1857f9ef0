// All splitting functionality is in rostersplit-core
// This CLI acts as a thin wrapper around the core library

// CLI-specific modules
pub mod console;

// Re-export core types for convenience
pub use rostersplit_core::*;
