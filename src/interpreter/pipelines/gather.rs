//! Gathering the files a script declares

use crate::error::{Result, ScriptingError};
use crate::files::{FileProvider, InstallerFile, check_hash, download};
use crate::interpreter::types::{InstallStage, Interpreter};
use crate::steam::resolve_game_file;

use std::fs;

impl Interpreter {
    /// Resolve every file in declaration order. The game folder is created
    /// first when the install owns one.
    pub(super) fn gather_files(&mut self) -> Result<()> {
        self.stage = InstallStage::GatheringFiles;

        if !self.files.is_empty()
            && self.creates_game_folder()
            && let Some(target) = &self.target_path
            && !target.exists()
        {
            fs::create_dir_all(target).map_err(|e| {
                ScriptingError::with_data(
                    format!("Lutris does not have the necessary permissions to install to path: {}", e),
                    target,
                )
            })?;
            self.game_dir_created = true;
        }

        let files = self.files.clone();
        for (index, file) in files.iter().enumerate() {
            tracing::info!("Fetching file {} of {}: {}", index + 1, files.len(), file.id);
            let path = self.gather_file(file)?;
            self.game_files.insert(file.id.clone(), path);
        }
        Ok(())
    }

    fn gather_file(&mut self, file: &InstallerFile) -> Result<String> {
        let path = match file.default_provider()? {
            FileProvider::Steam => {
                let location = file.steam_location()?;
                if location.windows {
                    tracing::warn!("Windows Steam data requested for {}, using the installed copy", file.id);
                }
                resolve_game_file(location.appid, &location.relative_path)
                    .ok_or_else(|| ScriptingError::with_data("Unable to get Steam data for game", location.appid))?
            }
            FileProvider::Cache => {
                let cached = file.dest_file()?;
                tracing::info!("Using cached file {}", cached.display());
                cached
            }
            FileProvider::User => {
                let selected = self.prompter.pick_file(&file.id, &file.user_message())?;
                if !selected.exists() {
                    return Err(ScriptingError::with_data("Can't continue installation without file", &file.id).into());
                }
                selected
            }
            FileProvider::Download => {
                let downloaded = download(file)?;
                if file.checksum().is_some() {
                    check_hash(file)?;
                }
                downloaded
            }
        };
        Ok(path.to_string_lossy().to_string())
    }
}
