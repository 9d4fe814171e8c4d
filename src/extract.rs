pub(crate) mod operations;
mod pipelines;
pub mod pure;

pub use pipelines::extract_archive;
pub use pure::{Extractor, guess_extractor, is_7zip_supported, resolve_extractor};
