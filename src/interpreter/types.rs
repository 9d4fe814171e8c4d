use crate::config::Settings;
use crate::files::InstallerFile;
use crate::library::GameLibrary;
use crate::paths::{PATH_DATA, PATH_INSTALLER_CACHE};
use crate::prompt::Prompter;
use crate::script::{Installer, Script};

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// Where an install is at. A failed install ends in `Reverted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStage {
    Validating,
    GatheringFiles,
    RunningCommands,
    Finishing,
    Done,
    Reverted,
}

impl fmt::Display for InstallStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstallStage::Validating => "validating",
            InstallStage::GatheringFiles => "gathering files",
            InstallStage::RunningCommands => "running commands",
            InstallStage::Finishing => "finishing",
            InstallStage::Done => "done",
            InstallStage::Reverted => "reverted",
        };
        f.write_str(name)
    }
}

/// An answer to an `input_menu`. `alias` is `INPUT_<id>` for menus with an id.
#[derive(Debug, Clone, PartialEq)]
pub struct UserInput {
    pub alias: Option<String>,
    pub value: String,
}

/// Knobs of a single install
#[derive(Debug, Clone)]
pub struct InstallOptions {
    /// Install directory instead of `<game_path>/<game_slug>`
    pub target: Option<PathBuf>,
    /// Reuse the directory of the already installed game
    pub reinstall: bool,
    /// Keep the per-install cache once done
    pub keep_cache: bool,
    /// Parent of the per-install cache directories
    pub scratch_root: PathBuf,
    /// Persistent installer cache; downloads survive the install when set
    pub persistent_cache: Option<PathBuf>,
    /// Wine builds installed by the user, one directory per version
    pub wine_runners_dir: PathBuf,
}

impl Default for InstallOptions {
    fn default() -> Self {
        InstallOptions {
            target: None,
            reinstall: false,
            keep_cache: false,
            scratch_root: PATH_INSTALLER_CACHE.clone(),
            persistent_cache: None,
            wine_runners_dir: PATH_DATA.join("runners/wine"),
        }
    }
}

impl InstallOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        InstallOptions {
            persistent_cache: settings.has_custom_cache_path().then(|| settings.installer_cache_root()),
            ..Default::default()
        }
    }

    /// Root the installer files are downloaded under
    pub fn file_cache_root(&self) -> PathBuf {
        self.persistent_cache.clone().unwrap_or_else(|| self.scratch_root.clone())
    }
}

/// Runs one installer script from validation to the game being recorded
pub struct Interpreter {
    pub(super) installer: Installer,
    pub(super) script: Script,
    pub(super) game_name: String,
    pub(super) stage: InstallStage,

    /// `$GAMEDIR`
    pub(super) target_path: Option<PathBuf>,
    /// Whether this install created the game folder, so a revert may delete it
    pub(super) game_dir_created: bool,
    /// Installer slug of the game this one is installed on top of
    pub(super) requires: Option<String>,
    pub(super) extends: Option<String>,
    /// Registry id of an uninstalled entry for the same game, reused on save
    pub(super) game_id: Option<u64>,

    pub(super) files: Vec<InstallerFile>,
    /// Resolved file IDs, usable as variables
    pub(super) game_files: HashMap<String, String>,
    pub(super) game_disc: Option<PathBuf>,
    pub(super) user_inputs: Vec<UserInput>,
    /// Last `description` shown for a directive
    pub(super) status: String,
    pub(super) resolution: (u32, u32),
    pub(super) steam_data_dir: PathBuf,

    pub(super) settings: Settings,
    pub(super) options: InstallOptions,
    pub(super) library: GameLibrary,
    pub(super) prompter: Box<dyn Prompter>,
}

impl Interpreter {
    pub fn stage(&self) -> InstallStage {
        self.stage
    }

    pub fn game_name(&self) -> &str {
        &self.game_name
    }

    pub fn target_path(&self) -> Option<&PathBuf> {
        self.target_path.as_ref()
    }

    pub fn library(&self) -> &GameLibrary {
        &self.library
    }

    pub fn user_inputs(&self) -> &[UserInput] {
        &self.user_inputs
    }

    /// `$CACHE`: scratch space for this install only
    pub fn cache_path(&self) -> PathBuf {
        self.options.scratch_root.join(&self.installer.game_slug)
    }
}
