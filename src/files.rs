mod operations;
mod types;

pub use operations::{check_hash, download};
pub use types::{FileProvider, InstallerFile};
