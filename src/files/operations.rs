mod checksum;
mod download;

pub use checksum::check_hash;
pub use download::download;
