// Public modules
pub mod backup;
pub mod db;
pub mod dispatch;
pub mod error;
pub mod host;
pub mod mail;
pub mod media;
pub mod settings;
pub mod ssh;
pub mod upgrade;

// Internal modules - not part of public API
pub(crate) mod paths;

// Re-export common types for convenience
pub use error::{Error, Result};
