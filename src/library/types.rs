use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One installed game
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct GameRecord {
    pub id: u64,
    pub name: String,
    pub slug: String,
    pub installer_slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_slug: Option<String>,
    pub runner: String,
    pub directory: Option<PathBuf>,
    pub installed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steamid: Option<i64>,
    /// Name of the game config file, without the `.yml` extension
    pub configpath: String,
    /// Unix timestamp
    pub installed_at: u64,
}

impl GameRecord {
    /// Usable as a dependency: installed with a known directory
    pub fn is_usable(&self) -> bool {
        self.installed && self.directory.as_ref().is_some_and(|d| !d.as_os_str().is_empty())
    }
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub(super) struct RegistryFile {
    #[serde(default)]
    pub games: Vec<GameRecord>,
}

/// The registry file plus the directory game configs are written to
#[derive(Debug)]
pub struct GameLibrary {
    pub(super) path: PathBuf,
    pub(super) config_dir: PathBuf,
    pub(super) games: Vec<GameRecord>,
}

impl GameLibrary {
    pub fn games(&self) -> &[GameRecord] {
        &self.games
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn list(&self, installed_only: bool) -> Vec<&GameRecord> {
        let mut games: Vec<&GameRecord> = self
            .games
            .iter()
            .filter(|g| !installed_only || g.installed)
            .collect();
        games.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        games
    }

    pub fn get_by_installer_slug(&self, installer_slug: &str) -> Option<&GameRecord> {
        self.games.iter().find(|g| g.installer_slug == installer_slug)
    }

    pub fn get_by_slug(&self, slug: &str) -> Option<&GameRecord> {
        self.games.iter().find(|g| g.slug == slug)
    }

    /// An installed game satisfying a dependency on `slug`, looked up by
    /// installer slug first, then by game slug
    pub fn find_installed(&self, slug: &str) -> Option<&GameRecord> {
        self.get_by_installer_slug(slug)
            .filter(|g| g.is_usable())
            .or_else(|| self.get_by_slug(slug).filter(|g| g.is_usable()))
    }

    /// Insert `record` or replace the entry it refers to. A record with an
    /// id replaces that id; otherwise an entry with the same slug and
    /// installer slug is replaced. Returns the id.
    pub fn add_or_update(&mut self, mut record: GameRecord) -> u64 {
        let existing = if record.id != 0 {
            self.games.iter().position(|g| g.id == record.id)
        } else {
            self.games
                .iter()
                .position(|g| g.slug == record.slug && g.installer_slug == record.installer_slug)
        };

        match existing {
            Some(index) => {
                record.id = self.games[index].id;
                self.games[index] = record;
                self.games[index].id
            }
            None => {
                record.id = self.games.iter().map(|g| g.id).max().unwrap_or(0) + 1;
                let id = record.id;
                self.games.push(record);
                id
            }
        }
    }

    pub fn config_file(&self, configpath: &str) -> PathBuf {
        self.config_dir.join(format!("{}.yml", configpath))
    }
}
