// Installer validation (no I/O)

use crate::error::ScriptingError;
use crate::script::types::{Installer, Script};

/// Check every rule and report all failures in one error. On success the
/// script section is returned as a [`Script`].
pub fn validate(installer: &Installer) -> Result<Script, ScriptingError> {
    let Some(script) = Script::from_value(&installer.script) else {
        return Err(invalid(vec!["Script must be a dictionary".to_string()], installer));
    };

    let mut errors = Vec::new();

    let game_name = installer.game_name();
    for (field, value) in [
        ("runner", &installer.runner),
        ("game_name", &game_name),
        ("game_slug", &installer.game_slug),
    ] {
        if value.trim().is_empty() {
            errors.push(format!("Missing field '{}'", field));
        }
    }

    if installer.runner == "libretro" && script.game_str("core").is_none() {
        errors.push("Missing libretro core in game section".to_string());
    }

    if is_steam_runner(&installer.runner) && script.game_str("appid").is_none() {
        errors.push("Missing appid for Steam game".to_string());
    }

    if script.requires().is_some() && script.extends().is_some() {
        errors.push("Scripts can't have both extends and requires".to_string());
    }

    if errors.is_empty() {
        Ok(script)
    } else {
        Err(invalid(errors, installer))
    }
}

pub fn is_steam_runner(runner: &str) -> bool {
    matches!(runner, "steam" | "winesteam")
}

fn invalid(errors: Vec<String>, installer: &Installer) -> ScriptingError {
    ScriptingError::with_data(
        format!("Invalid script: \n{}", errors.join("\n")),
        &installer.script,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn installer(yaml: &str) -> Installer {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn complete_installer_is_valid() {
        let i = installer(
            "name: Quake\ngame_slug: quake\nslug: quake-gog\nrunner: wine\nscript:\n  game:\n    exe: quake.exe\n",
        );
        let script = validate(&i).unwrap();
        assert_eq!(script.game_str("exe").as_deref(), Some("quake.exe"));
    }

    #[test]
    fn non_mapping_script_is_rejected_early() {
        let i = installer("name: Quake\ngame_slug: quake\nrunner: wine\nscript: [1, 2]\n");
        let err = validate(&i).unwrap_err();
        assert!(err.message.contains("Script must be a dictionary"));
    }

    #[test]
    fn all_errors_are_collected() {
        let i = installer("name: ''\nrunner: steam\nscript:\n  requires: a\n  extends: b\n");
        let err = validate(&i).unwrap_err();
        assert!(err.message.starts_with("Invalid script: \n"));
        assert!(err.message.contains("Missing field 'game_name'"));
        assert!(err.message.contains("Missing field 'game_slug'"));
        assert!(err.message.contains("Missing appid for Steam game"));
        assert!(err.message.contains("Scripts can't have both extends and requires"));
        assert!(!err.message.contains("Missing field 'runner'"));
    }

    #[test]
    fn libretro_needs_a_core() {
        let i = installer("name: Sonic\ngame_slug: sonic\nrunner: libretro\nscript:\n  game:\n    main_file: sonic.md\n");
        let err = validate(&i).unwrap_err();
        assert!(err.message.contains("Missing libretro core in game section"));
    }

    #[test]
    fn custom_name_counts_as_game_name() {
        let i = installer("game_slug: x\nrunner: linux\nscript:\n  custom-name: Renamed\n");
        assert!(validate(&i).is_ok());
    }
}
