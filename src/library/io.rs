use crate::error::{ConfigError, Result};
use crate::paths::{PATH_DATA, PATH_GAME_CONFIGS};

use std::fs::{self, File};
use std::io::{BufReader, ErrorKind};
use std::path::Path;

use super::types::{GameLibrary, RegistryFile};

impl GameLibrary {
    pub fn open_default() -> Result<Self> {
        Self::open(&PATH_DATA.join("games.json"), &PATH_GAME_CONFIGS)
    }

    /// Load the registry at `path`. A missing file is an empty library; an
    /// unreadable or unparsable one is an error so that saving can't wipe it.
    pub fn open(path: &Path, config_dir: &Path) -> Result<Self> {
        let games = match File::open(path) {
            Ok(file) => serde_json::from_reader::<_, RegistryFile>(BufReader::new(file))
                .map_err(|source| ConfigError::CorruptRegistry {
                    path: path.display().to_string(),
                    source,
                })?
                .games,
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.display().to_string(),
                    source,
                }
                .into());
            }
        };

        Ok(GameLibrary {
            path: path.to_path_buf(),
            config_dir: config_dir.to_path_buf(),
            games,
        })
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let registry = RegistryFile {
            games: self.games.clone(),
        };
        let file = File::create(&self.path)?;
        serde_json::to_writer_pretty(file, &registry)?;
        Ok(())
    }

    /// Write a game configuration as `<configpath>.yml`
    pub fn write_game_config(&self, configpath: &str, config: &serde_yaml::Value) -> Result<std::path::PathBuf> {
        fs::create_dir_all(&self.config_dir)?;
        let path = self.config_file(configpath);
        fs::write(&path, serde_yaml::to_string(config)?)?;
        tracing::debug!("Wrote game config {}", path.display());
        Ok(path)
    }
}
