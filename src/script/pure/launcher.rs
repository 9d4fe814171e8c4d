// Launcher resolution for the `game` section (no I/O)

use serde_yaml::{Mapping, Value};

use super::value::is_truthy;

/// The key that tells a runner what to start, and its raw value
#[derive(Debug, Clone, PartialEq)]
pub struct GameLauncher {
    pub key: String,
    pub value: Value,
}

/// Find the launcher among `exe`, `iso`, `rom`, `disk`, `main_file`.
/// `exe64` wins over `exe` on 64-bit hosts and is reported as `exe`.
pub fn get_game_launcher(section: &Mapping) -> Option<GameLauncher> {
    let exe = if cfg!(target_pointer_width = "64") && section.contains_key("exe64") {
        "exe64"
    } else {
        "exe"
    };

    let (key, value) = [exe, "iso", "rom", "disk", "main_file"]
        .into_iter()
        .find_map(|key| section.get(key).map(|value| (key, value)))?;

    if !is_truthy(value) {
        return None;
    }
    let key = if key == "exe64" { "exe" } else { key };
    Some(GameLauncher {
        key: key.to_string(),
        value: value.clone(),
    })
}
