use crate::error::ScriptingError;
use crate::script::{value_as_i64, value_to_string};

use serde::Deserialize;
use serde_yaml::Value;
use std::path::{Path, PathBuf};

/// Where the content of an installer file comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileProvider {
    /// `$STEAM:<appid>:<path>`, data of an installed Steam game
    Steam,
    /// Already present in the persistent installer cache
    Cache,
    /// `N/A:<message>`, the user has to point at the file
    User,
    /// http(s) or file URL
    Download,
}

/// Parsed `$STEAM:<appid>:<relative path>` reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SteamLocation {
    /// `$WINESTEAM` references target the Windows build
    pub windows: bool,
    pub appid: u32,
    pub relative_path: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct FileDetails {
    url: Option<Value>,
    filename: Option<Value>,
    checksum: Option<String>,
    referer: Option<String>,
    size: Option<Value>,
    total_size: Option<Value>,
    alternate_filenames: Vec<String>,
}

#[derive(Debug, Clone)]
enum FileMeta {
    Url(String),
    Detailed(FileDetails),
}

/// An entry of the `files:` section
#[derive(Debug, Clone)]
pub struct InstallerFile {
    pub game_slug: String,
    /// File ID with dashes turned into underscores
    pub id: String,
    meta: FileMeta,
    cache_root: PathBuf,
    persistent_cache: bool,
    dest_override: Option<PathBuf>,
}

impl InstallerFile {
    /// `cache_root` holds one directory per game slug. A persistent cache
    /// survives the install and lets later installs skip the download.
    pub fn new(
        game_slug: &str,
        file_id: &str,
        meta: &Value,
        cache_root: &Path,
        persistent_cache: bool,
    ) -> Result<Self, ScriptingError> {
        let meta = match meta {
            Value::Mapping(_) => FileMeta::Detailed(
                serde_yaml::from_value(meta.clone())
                    .map_err(|e| ScriptingError::with_data(format!("Invalid file `{}`: {}", file_id, e), meta))?,
            ),
            other => match value_to_string(other) {
                Some(url) => FileMeta::Url(url),
                None => return Err(ScriptingError::with_data(format!("Invalid file `{}`", file_id), other)),
            },
        };

        Ok(Self {
            game_slug: game_slug.to_string(),
            id: file_id.replace('-', "_"),
            meta,
            cache_root: cache_root.to_path_buf(),
            persistent_cache,
            dest_override: None,
        })
    }

    pub fn url(&self) -> Result<String, ScriptingError> {
        let url = match &self.meta {
            FileMeta::Url(url) => url.clone(),
            FileMeta::Detailed(details) => details
                .url
                .as_ref()
                .and_then(value_to_string)
                .ok_or_else(|| ScriptingError::new(format!("missing field `url` for file `{}`", self.id)))?,
        };
        if url.starts_with('/') {
            return Ok(format!("file://{}", url));
        }
        Ok(url)
    }

    pub fn filename(&self) -> Result<String, ScriptingError> {
        match &self.meta {
            FileMeta::Detailed(details) => details
                .filename
                .as_ref()
                .and_then(value_to_string)
                .ok_or_else(|| ScriptingError::new(format!("missing field `filename` in file `{}`", self.id))),
            FileMeta::Url(url) if url.starts_with("N/A") => Ok(String::new()),
            FileMeta::Url(url) if url.starts_with("$STEAM") || url.starts_with("$WINESTEAM") => Ok(url.clone()),
            FileMeta::Url(url) => Ok(url.rsplit('/').next().unwrap_or_default().to_string()),
        }
    }

    pub fn checksum(&self) -> Option<&str> {
        match &self.meta {
            FileMeta::Detailed(details) => details.checksum.as_deref().filter(|c| !c.is_empty()),
            FileMeta::Url(_) => None,
        }
    }

    pub fn referer(&self) -> Option<&str> {
        match &self.meta {
            FileMeta::Detailed(details) => details.referer.as_deref(),
            FileMeta::Url(_) => None,
        }
    }

    /// Declared size in bytes, used when the server doesn't send one
    pub fn size(&self) -> Option<u64> {
        let FileMeta::Detailed(details) = &self.meta else {
            return None;
        };
        details
            .size
            .as_ref()
            .or(details.total_size.as_ref())
            .and_then(value_as_i64)
            .and_then(|s| u64::try_from(s).ok())
    }

    fn alternate_filenames(&self) -> &[String] {
        match &self.meta {
            FileMeta::Detailed(details) => &details.alternate_filenames,
            FileMeta::Url(_) => &[],
        }
    }

    fn raw_url(&self) -> String {
        self.url().unwrap_or_default()
    }

    pub fn is_user_provided(&self) -> bool {
        self.raw_url().starts_with("N/A")
    }

    pub fn is_steam(&self) -> bool {
        let url = self.raw_url();
        url.starts_with("$STEAM") || url.starts_with("$WINESTEAM")
    }

    /// True for anything that can be fetched, local `file://` URLs included
    pub fn is_downloadable(&self) -> bool {
        let url = self.raw_url();
        url.starts_with("http") || url.starts_with("file")
    }

    /// Message shown when asking the user for the file
    pub fn user_message(&self) -> String {
        match self.raw_url().split_once(':') {
            Some((_, message)) if self.is_user_provided() && !message.is_empty() => message.to_string(),
            _ => format!("Please select file '{}'", self.id),
        }
    }

    /// Files the user provides are never stored in the persistent cache
    pub fn uses_persistent_cache(&self) -> bool {
        !self.is_user_provided() && self.persistent_cache
    }

    /// `<cache root>/<game slug>/<file id>`, GOG downloads share a `gog` folder
    pub fn cache_path(&self) -> PathBuf {
        let from_gog = url::Url::parse(&self.raw_url())
            .ok()
            .and_then(|u| u.host_str().map(|h| h.ends_with("gog.com")))
            .unwrap_or(false);
        let folder = if from_gog { "gog" } else { self.id.as_str() };
        self.cache_root.join(&self.game_slug).join(folder)
    }

    pub fn dest_file(&self) -> Result<PathBuf, ScriptingError> {
        if let Some(dest) = &self.dest_override {
            return Ok(dest.clone());
        }
        let cache_path = self.cache_path();
        if let Some(alt) = self
            .alternate_filenames()
            .iter()
            .map(|name| cache_path.join(name))
            .find(|path| path.is_file())
        {
            return Ok(alt);
        }
        Ok(cache_path.join(self.filename()?))
    }

    pub fn set_dest_file(&mut self, dest: PathBuf) {
        self.dest_override = Some(dest);
    }

    /// Partial downloads land here and are renamed once complete
    pub fn download_file(&self) -> Result<PathBuf, ScriptingError> {
        let mut dest = self.dest_file()?.into_os_string();
        dest.push(".tmp");
        Ok(PathBuf::from(dest))
    }

    pub fn is_cached(&self) -> bool {
        self.uses_persistent_cache() && self.dest_file().map(|d| d.exists()).unwrap_or(false)
    }

    pub fn providers(&self) -> Vec<FileProvider> {
        let mut providers = Vec::new();
        if self.is_steam() {
            providers.push(FileProvider::Steam);
        }
        if self.is_cached() {
            providers.push(FileProvider::Cache);
        }
        if self.is_user_provided() {
            providers.push(FileProvider::User);
        }
        if self.is_downloadable() {
            providers.push(FileProvider::Download);
        }
        providers
    }

    pub fn default_provider(&self) -> Result<FileProvider, ScriptingError> {
        self.providers()
            .into_iter()
            .next()
            .ok_or_else(|| ScriptingError::new(format!("Unsupported provider for {}", self.raw_url())))
    }

    pub fn steam_location(&self) -> Result<SteamLocation, ScriptingError> {
        let url = self.url()?;
        let malformed = || ScriptingError::new(format!("Malformed steam path: {}", url));

        let mut parts = url.splitn(3, ':');
        let prefix = parts.next().unwrap_or_default();
        let appid = parts.next().and_then(|a| a.trim().parse().ok()).ok_or_else(malformed)?;
        let relative_path = parts.next().map(str::trim).ok_or_else(malformed)?;
        let relative_path = if relative_path == "/" { "." } else { relative_path };

        Ok(SteamLocation {
            windows: prefix == "$WINESTEAM",
            appid,
            relative_path: relative_path.to_string(),
        })
    }
}

impl std::fmt::Display for InstallerFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.game_slug, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(id: &str, meta: &str, persistent: bool) -> InstallerFile {
        let meta: Value = serde_yaml::from_str(meta).unwrap();
        InstallerFile::new("quake", id, &meta, Path::new("/cache"), persistent).unwrap()
    }

    #[test]
    fn dashes_in_ids_become_underscores() {
        assert_eq!(file("setup-file", "https://x.org/a.zip", false).id, "setup_file");
    }

    #[test]
    fn absolute_paths_become_file_urls() {
        let f = file("data", "/home/me/quake.zip", false);
        assert_eq!(f.url().unwrap(), "file:///home/me/quake.zip");
        assert_eq!(f.filename().unwrap(), "quake.zip");
        assert_eq!(f.providers(), vec![FileProvider::Download]);
    }

    #[test]
    fn detailed_meta_requires_url_and_filename() {
        let f = file("data", "{filename: x.zip}", false);
        assert_eq!(f.url().unwrap_err().message, "missing field `url` for file `data`");
        let f = file("data", "{url: 'https://x.org/dl?id=1'}", false);
        assert_eq!(f.filename().unwrap_err().message, "missing field `filename` in file `data`");
    }

    #[test]
    fn user_provided_files() {
        let f = file("installer", "'N/A:Select the GOG setup file'", true);
        assert_eq!(f.providers(), vec![FileProvider::User]);
        assert_eq!(f.user_message(), "Select the GOG setup file");
        assert_eq!(f.filename().unwrap(), "");
        assert!(!f.uses_persistent_cache());

        let bare = file("installer", "N/A", false);
        assert_eq!(bare.user_message(), "Please select file 'installer'");
    }

    #[test]
    fn cache_path_groups_gog_downloads() {
        let f = file("setup", "{url: 'https://cdn.gog.com/setup.exe', filename: setup.exe}", false);
        assert_eq!(f.cache_path(), PathBuf::from("/cache/quake/gog"));
        assert_eq!(f.dest_file().unwrap(), PathBuf::from("/cache/quake/gog/setup.exe"));
        assert_eq!(f.download_file().unwrap(), PathBuf::from("/cache/quake/gog/setup.exe.tmp"));

        let other = file("data", "https://example.com/data.zip", false);
        assert_eq!(other.cache_path(), PathBuf::from("/cache/quake/data"));
    }

    #[test]
    fn steam_references() {
        let f = file("steam_data", "$WINESTEAM:2310:id1/", false);
        assert_eq!(f.providers(), vec![FileProvider::Steam]);
        let loc = f.steam_location().unwrap();
        assert!(loc.windows);
        assert_eq!(loc.appid, 2310);
        assert_eq!(loc.relative_path, "id1/");

        let root = file("steam_data", "$STEAM:2310:/", false);
        assert_eq!(root.steam_location().unwrap().relative_path, ".");

        let broken = file("steam_data", "$STEAM:abc", false);
        assert!(broken.steam_location().is_err());
    }

    #[test]
    fn unknown_scheme_has_no_provider() {
        let f = file("odd", "ftp://example.com/file", false);
        assert!(f.default_provider().is_err());
    }

    #[test]
    fn size_reads_numbers_and_strings() {
        let f = file("data", "{url: 'https://x.org/a', filename: a, size: '1024'}", false);
        assert_eq!(f.size(), Some(1024));
        assert_eq!(file("data", "https://x.org/a", false).size(), None);
    }

    #[test]
    fn cached_file_is_detected_in_persistent_cache() {
        let dir = tempfile::tempdir().unwrap();
        let meta: Value = serde_yaml::from_str("https://example.com/data.zip").unwrap();
        let f = InstallerFile::new("quake", "data", &meta, dir.path(), true).unwrap();
        assert!(!f.is_cached());
        std::fs::create_dir_all(f.cache_path()).unwrap();
        std::fs::write(f.cache_path().join("data.zip"), "zip").unwrap();
        assert!(f.is_cached());
        assert_eq!(f.default_provider().unwrap(), FileProvider::Cache);
    }
}
