//! Installed-games registry
//!
//! A JSON file in the data directory records every installed game; the
//! configuration of each game lives in its own YAML file.

mod io;
#[cfg(test)]
mod tests;
mod types;

pub use types::{GameLibrary, GameRecord};
