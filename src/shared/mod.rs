// Shared kernel: cross-cutting concerns used by every module

pub mod config; // Environment-driven configuration
pub mod errors; // Shared error types
pub mod utils; // Logging, clock

// Re-exports for convenience
pub use config::AppConfig;
pub use errors::{AppError, AppResult};
