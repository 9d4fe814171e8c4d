//! Validation and dependency checks, before anything touches the disk

use crate::config::Settings;
use crate::display::current_resolution;
use crate::error::{Result, ScriptingError};
use crate::files::InstallerFile;
use crate::interpreter::types::{InstallOptions, InstallStage, Interpreter};
use crate::library::GameLibrary;
use crate::prompt::Prompter;
use crate::script::pure::validation::is_steam_runner;
use crate::script::{Dependency, Installer, Script, unpack_dependencies, validate};
use crate::steam::steam_data_dir;
use crate::util::find_executable;

use std::collections::HashMap;
use std::path::PathBuf;

impl Interpreter {
    pub fn new(
        installer: Installer,
        settings: Settings,
        library: GameLibrary,
        prompter: Box<dyn Prompter>,
        options: InstallOptions,
    ) -> Result<Self> {
        let script = validate(&installer)?;
        let resolution = current_resolution(&settings);
        let persistent = options.persistent_cache.is_some();
        let cache_root = options.file_cache_root();

        let files = script
            .files()?
            .iter()
            .map(|(id, meta)| InstallerFile::new(&installer.game_slug, id, meta, &cache_root, persistent))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut interpreter = Interpreter {
            game_name: installer.game_name(),
            stage: InstallStage::Validating,
            target_path: None,
            game_dir_created: false,
            requires: script.requires(),
            extends: script.extends(),
            game_id: None,
            files,
            game_files: HashMap::new(),
            game_disc: None,
            user_inputs: Vec::new(),
            status: String::new(),
            resolution,
            steam_data_dir: steam_data_dir(),
            installer,
            script,
            settings,
            options,
            library,
            prompter,
        };

        interpreter.check_binary_dependencies()?;
        interpreter.check_dependency()?;
        if interpreter.creates_game_folder() {
            interpreter.target_path = Some(interpreter.default_target());
        }

        // A known but uninstalled game is updated in place
        interpreter.game_id = interpreter
            .library
            .get_by_slug(&interpreter.installer.game_slug)
            .filter(|g| !g.installed)
            .map(|g| g.id);

        tracing::info!("Prepared install of {}", interpreter.installer.display());
        Ok(interpreter)
    }

    /// Whether the install gets a folder of its own
    pub fn creates_game_folder(&self) -> bool {
        if self.requires.is_some() || is_steam_runner(&self.installer.runner) {
            return false;
        }
        if !self.files.is_empty() || self.script.game_str("gog").is_some() || self.script.game_str("prefix").is_some() {
            return true;
        }
        self.script
            .command_names()
            .iter()
            .any(|name| name == "insert-disc" || name == "insert_disc")
    }

    fn default_target(&self) -> PathBuf {
        if let Some(target) = &self.options.target {
            return target.clone();
        }
        if self.options.reinstall
            && let Some(game) = self.library.get_by_installer_slug(&self.installer.slug)
            && let Some(directory) = game.directory.clone().filter(|d| !d.as_os_str().is_empty())
        {
            tracing::info!("Reinstalling into {}", directory.display());
            return directory;
        }
        self.settings.game_path.join(&self.installer.game_slug)
    }

    /// Every `require-binaries` entry must be in PATH
    fn check_binary_dependencies(&self) -> Result<()> {
        let Some(expr) = self.script.require_binaries() else {
            return Ok(());
        };
        for dependency in unpack_dependencies(&expr) {
            if !dependency.options().iter().any(|binary| find_executable(binary).is_some()) {
                return Err(ScriptingError::new(format!(
                    "This installer requires {} on your system",
                    dependency.display()
                ))
                .into());
            }
        }
        Ok(())
    }

    /// Mods and extensions need their base game. The first dependency
    /// decides where the install goes.
    fn check_dependency(&mut self) -> Result<()> {
        let dependencies = match (&self.extends, &self.requires) {
            (Some(extends), _) => vec![Dependency::Single(extends.clone())],
            (None, Some(requires)) => unpack_dependencies(requires),
            (None, None) => return Ok(()),
        };

        for (index, dependency) in dependencies.iter().enumerate() {
            let installed = dependency
                .options()
                .into_iter()
                .find_map(|slug| self.library.find_installed(slug).cloned());

            let Some(game) = installed else {
                return Err(match dependency {
                    Dependency::AnyOf(options) if options.len() > 1 => ScriptingError::new(format!(
                        "You need to install {} before",
                        dependency.display()
                    )),
                    _ => ScriptingError::new(format!("This game requires {}.", dependency.display())),
                }
                .into());
            };

            if index == 0 {
                self.target_path = game.directory.clone();
                self.requires = Some(game.installer_slug.clone());
            }
        }
        Ok(())
    }

    pub fn script(&self) -> &Script {
        &self.script
    }
}
