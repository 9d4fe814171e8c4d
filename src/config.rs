pub mod operations;
pub mod types;

// Re-export types
pub use types::{LogFormat, Settings};

// Re-export operations
pub use operations::{init_logging, load_cfg, save_cfg};
