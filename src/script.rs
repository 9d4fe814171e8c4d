mod io;
pub mod pure;
#[cfg(test)]
mod tests;
mod types;

pub use io::{fetch_script, fetch_script_revision, parse_scripts, read_script};
pub use pure::dependencies::{Dependency, unpack_dependencies};
pub use pure::launcher::get_game_launcher;
pub use pure::url::parse_installer_url;
pub use pure::validation::validate;
pub use pure::value::{value_as_i64, value_to_string};
pub use types::{Installer, Script};
