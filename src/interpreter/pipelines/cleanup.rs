use crate::interpreter::types::{InstallStage, Interpreter};
use crate::tasks::{WINE_DEFAULT_ARCH, wine_binary, winekill};
use crate::util::remove_folder;

use std::path::PathBuf;

impl Interpreter {
    /// Drop the per-install cache unless asked to keep it
    pub fn cleanup(&mut self) {
        if self.options.keep_cache {
            tracing::info!("Keeping installer cache at {}", self.cache_path().display());
            return;
        }
        if let Err(e) = remove_folder(&self.cache_path()) {
            tracing::warn!("Failed to remove installer cache {}: {}", self.cache_path().display(), e);
        }
    }

    /// Undo what a failed install left behind. Errors are logged, the
    /// original failure is what the caller reports.
    pub fn revert(&mut self) {
        tracing::info!("Cancelling installation of {}", self.game_name);

        if self.installer.runner.starts_with("wine") {
            self.kill_wine();
        }

        if self.game_dir_created
            && let Some(target) = &self.target_path
            && let Err(e) = remove_folder(target)
        {
            tracing::warn!("Failed to remove {}: {}", target.display(), e);
        }
        self.stage = InstallStage::Reverted;
    }

    fn kill_wine(&self) {
        let wine = match self.get_wine_path() {
            Some(path) => Ok(path),
            None => wine_binary(None),
        };
        let Ok(wine) = wine else {
            return;
        };
        let prefix = self
            .script
            .game_str("prefix")
            .map(|p| PathBuf::from(self.substitute(&p)))
            .or_else(|| self.target_path.clone());
        let Some(prefix) = prefix else {
            return;
        };
        let arch = self
            .script
            .game_str("arch")
            .unwrap_or_else(|| WINE_DEFAULT_ARCH.to_string());

        if let Err(e) = winekill(&wine, &prefix, &arch) {
            tracing::debug!("winekill failed: {}", e);
        }
    }
}
