//! Directives waiting on the user: input_menu and insert_disc

use crate::error::{Result, ScriptingError};
use crate::interpreter::pure::command::{check_required_params, menu_options, param_bool, param_str};
use crate::interpreter::types::{Interpreter, UserInput};
use crate::prompt::Menu;
use crate::util::{fix_path_case, mounted_discs};

use serde_yaml::Value;
use std::path::PathBuf;

const DISC_MESSAGE: &str = "Insert or mount game disc and press enter, \
    or type the mount point if the disc is mounted on a non standard location.";

/// `requires` on one of `drives`, whatever the case of its path
fn find_matching_disc(drives: &[PathBuf], requires: &str) -> Option<PathBuf> {
    drives.iter().find_map(|drive| {
        let wanted = drive.join(requires);
        fix_path_case(&wanted)
            .filter(|path| path.exists())
            .map(|_| drive.clone())
    })
}

impl Interpreter {
    pub(super) fn input_menu(&mut self, params: &Value) -> Result<()> {
        check_required_params(&[&["options"]], params, "input_menu")?;
        let options = menu_options(params.get("options").unwrap_or(&Value::Null))?;
        let id = param_str(params, "id");
        let preselect = param_str(params, "preselect").map(|p| self.substitute(&p));

        let menu = Menu {
            id: id.as_deref(),
            description: &self.status,
            options: &options,
            preselect: preselect.as_deref(),
            entry: param_bool(params, "entry", false),
        };
        let value = self.prompter.select_option(&menu)?;
        if value.is_empty() {
            return Err(ScriptingError::with_data("No option selected", params).into());
        }

        tracing::info!("Selected {} for {}", value, menu.preset_key());
        self.user_inputs.push(UserInput {
            alias: id.map(|id| format!("INPUT_{}", id)),
            value,
        });
        Ok(())
    }

    /// Find the mounted disc holding `requires`, asking the user for a mount
    /// point when none of the detected discs has it
    pub(super) fn insert_disc(&mut self, params: &Value) -> Result<()> {
        check_required_params(&[&["requires"]], params, "insert_disc")?;
        let requires = param_str(params, "requires").unwrap_or_default();
        let message = format!(
            "{}\n\nLooking for a mounted disk drive or image containing the following file or folder:\n{}",
            param_str(params, "message").unwrap_or_else(|| DISC_MESSAGE.to_string()),
            requires
        );

        if let Some(drive) = find_matching_disc(&mounted_discs(), &requires) {
            return self.use_disc(drive, &requires);
        }

        let mut last_answer: Option<PathBuf> = None;
        loop {
            let Some(drive) = self.prompter.locate_disc(&requires, &message)? else {
                return Err(ScriptingError::with_data("No disc provided", &requires).into());
            };
            if let Some(found) = find_matching_disc(std::slice::from_ref(&drive), &requires) {
                return self.use_disc(found, &requires);
            }
            tracing::warn!("{} not found in {}", requires, drive.display());
            if last_answer.as_deref() == Some(drive.as_path()) {
                return Err(ScriptingError::new(format!(
                    "Unable to find {} on {}",
                    requires,
                    drive.display()
                ))
                .into());
            }
            last_answer = Some(drive);
        }
    }

    fn use_disc(&mut self, drive: PathBuf, requires: &str) -> Result<()> {
        tracing::debug!("Found {} on cdrom {}", requires, drive.display());
        self.game_disc = Some(drive);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_disc_ignores_case() {
        let dir = tempfile::tempdir().unwrap();
        let disc = dir.path().join("disc");
        std::fs::create_dir_all(disc.join("SETUP")).unwrap();
        std::fs::write(disc.join("SETUP/GAME.EXE"), "").unwrap();
        let other = dir.path().join("other");
        std::fs::create_dir_all(&other).unwrap();

        let drives = vec![other, disc.clone()];
        assert_eq!(find_matching_disc(&drives, "setup/game.exe"), Some(disc));
        assert_eq!(find_matching_disc(&drives, "missing.exe"), None);
        assert_eq!(find_matching_disc(&[], "setup/game.exe"), None);
    }
}
