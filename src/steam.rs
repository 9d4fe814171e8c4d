//! Locating Steam and the games it has installed
//!
//! Installing through the Steam client is not automated; these helpers only
//! find games that are already there.

use crate::paths::PATH_STEAM;

use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize)]
pub struct SteamGame {
    pub appid: u32,
    pub name: String,
    pub install_dir: PathBuf,
}

/// Root of the Steam installation, `$STEAM_DATA_DIR` in scripts
pub fn steam_data_dir() -> PathBuf {
    steamlocate::SteamDir::locate()
        .map(|dir| dir.path().to_path_buf())
        .unwrap_or_else(|_| PATH_STEAM.clone())
}

/// Find the installation path for a Steam game by app ID.
/// Searches every Steam library folder.
pub fn find_game_path(appid: u32) -> Option<PathBuf> {
    let steam_dir = steamlocate::SteamDir::locate().ok()?;
    let (app, library) = steam_dir.find_app(appid).ok().flatten()?;
    let path = library.resolve_app_dir(&app);
    path.exists().then_some(path)
}

/// Every game in every Steam library, sorted by name
pub fn installed_games() -> Vec<SteamGame> {
    let mut games = Vec::new();

    if let Ok(steam_dir) = steamlocate::SteamDir::locate()
        && let Ok(libraries) = steam_dir.libraries()
    {
        for library in libraries.flatten() {
            for app in library.apps().flatten() {
                games.push(SteamGame {
                    appid: app.app_id,
                    name: app.name.clone().unwrap_or_else(|| app.install_dir.clone()),
                    install_dir: library.resolve_app_dir(&app),
                });
            }
        }
    }

    games.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    games
}

/// Steam library folders. Falls back to reading libraryfolders.vdf when
/// steamlocate cannot parse the installation.
pub fn library_folders() -> Vec<PathBuf> {
    if let Ok(steam_dir) = steamlocate::SteamDir::locate()
        && let Ok(libraries) = steam_dir.libraries()
    {
        let folders: Vec<PathBuf> = libraries.flatten().map(|lib| lib.path().to_path_buf()).collect();
        if !folders.is_empty() {
            return folders;
        }
    }

    let mut folders = vec![PATH_STEAM.clone()];
    let vdf_path = PATH_STEAM.join("steamapps/libraryfolders.vdf");
    if let Ok(content) = std::fs::read_to_string(&vdf_path) {
        for path in parse_library_paths(&content) {
            if path.exists() && !folders.contains(&path) {
                folders.push(path);
            }
        }
    }
    folders
}

/// `"path"  "/some/path"` entries of a libraryfolders.vdf
fn parse_library_paths(content: &str) -> Vec<PathBuf> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("\"path\""))
        .filter_map(|line| {
            let end = line.rfind('"')?;
            let start = line[..end].rfind('"')?;
            Some(PathBuf::from(&line[start + 1..end]))
        })
        .collect()
}

/// Resolve a `$STEAM:<appid>:<path>` file inside an installed game
pub fn resolve_game_file(appid: u32, relative_path: &str) -> Option<PathBuf> {
    let root = find_game_path(appid)?;
    let path = if relative_path == "." {
        root
    } else {
        root.join(relative_path.trim_start_matches('/'))
    };
    Path::new(&path).exists().then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn library_paths_are_read_from_vdf() {
        let vdf = r#"
"libraryfolders"
{
	"0"
	{
		"path"		"/home/user/.local/share/Steam"
		"label"		""
	}
	"1"
	{
		"path"		"/mnt/games/SteamLibrary"
	}
}
"#;
        assert_eq!(
            parse_library_paths(vdf),
            vec![
                PathBuf::from("/home/user/.local/share/Steam"),
                PathBuf::from("/mnt/games/SteamLibrary"),
            ]
        );
    }
}
