use std::env;
use std::path::PathBuf;
use std::sync::LazyLock;

pub const APP_DIR_NAME: &str = "lutris";

pub static PATH_HOME: LazyLock<PathBuf> = LazyLock::new(|| {
    env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
});

pub static PATH_LOCAL_SHARE: LazyLock<PathBuf> = LazyLock::new(|| PATH_HOME.join(".local/share"));

/// Installed-games registry and other persistent data
pub static PATH_DATA: LazyLock<PathBuf> = LazyLock::new(|| {
    if let Ok(xdg_data_home) = env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg_data_home).join(APP_DIR_NAME);
    }
    PATH_LOCAL_SHARE.join(APP_DIR_NAME)
});

/// settings.json and the per-game YAML configs
pub static PATH_CONFIG: LazyLock<PathBuf> = LazyLock::new(|| {
    if let Ok(xdg_config_home) = env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg_config_home).join(APP_DIR_NAME);
    }
    PATH_HOME.join(".config").join(APP_DIR_NAME)
});

pub static PATH_CACHE: LazyLock<PathBuf> = LazyLock::new(|| {
    if let Ok(xdg_cache_home) = env::var("XDG_CACHE_HOME") {
        return PathBuf::from(xdg_cache_home).join(APP_DIR_NAME);
    }
    PATH_HOME.join(".cache").join(APP_DIR_NAME)
});

pub static PATH_GAME_CONFIGS: LazyLock<PathBuf> = LazyLock::new(|| PATH_CONFIG.join("games"));

/// Scratch space for installs in progress, one subdirectory per game slug
pub static PATH_INSTALLER_CACHE: LazyLock<PathBuf> =
    LazyLock::new(|| PATH_CACHE.join("installer"));

/// Bundled tools (7z, innoextract, ...) take precedence over the system ones
pub static PATH_RUNTIME: LazyLock<PathBuf> = LazyLock::new(|| PATH_DATA.join("runtime"));

pub static PATH_STEAM: LazyLock<PathBuf> = LazyLock::new(|| {
    // Check for native Steam installation first
    if PATH_LOCAL_SHARE.join("Steam").exists() {
        PATH_LOCAL_SHARE.join("Steam")
    } else if PATH_HOME.join(".steam/steam").exists() {
        // Follow the symlink at ~/.steam/steam
        PATH_HOME.join(".steam/steam")
    } else if PATH_HOME
        .join(".var/app/com.valvesoftware.Steam/.local/share/Steam")
        .exists()
    {
        // Flatpak Steam
        PATH_HOME.join(".var/app/com.valvesoftware.Steam/.local/share/Steam")
    } else {
        PATH_LOCAL_SHARE.join("Steam")
    }
});
