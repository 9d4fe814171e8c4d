use super::*;

use std::path::PathBuf;

fn record(slug: &str, installer_slug: &str, directory: Option<&str>) -> GameRecord {
    GameRecord {
        name: slug.to_uppercase(),
        slug: slug.to_string(),
        installer_slug: installer_slug.to_string(),
        runner: "linux".to_string(),
        directory: directory.map(PathBuf::from),
        installed: true,
        ..Default::default()
    }
}

#[test]
fn registry_survives_save_and_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data/games.json");
    let mut library = GameLibrary::open(&path, &dir.path().join("games")).unwrap();
    assert!(library.games().is_empty());

    let id = library.add_or_update(record("quake", "quake-gog", Some("/games/quake")));
    assert_eq!(id, 1);
    library.save().unwrap();

    let reopened = GameLibrary::open(&path, &dir.path().join("games")).unwrap();
    assert_eq!(reopened.games().len(), 1);
    assert_eq!(reopened.games()[0].directory, Some(PathBuf::from("/games/quake")));
}

#[test]
fn add_or_update_replaces_same_installer() {
    let dir = tempfile::tempdir().unwrap();
    let mut library = GameLibrary::open(&dir.path().join("games.json"), dir.path()).unwrap();

    let first = library.add_or_update(record("quake", "quake-gog", Some("/a")));
    let other = library.add_or_update(record("doom", "doom-gog", Some("/b")));
    let again = library.add_or_update(record("quake", "quake-gog", Some("/c")));

    assert_eq!(first, again);
    assert_ne!(first, other);
    assert_eq!(library.games().len(), 2);
    assert_eq!(library.get_by_slug("quake").unwrap().directory, Some(PathBuf::from("/c")));
}

#[test]
fn dependencies_need_an_installed_directory() {
    let dir = tempfile::tempdir().unwrap();
    let mut library = GameLibrary::open(&dir.path().join("games.json"), dir.path()).unwrap();
    library.add_or_update(record("quake", "quake-steam", Some("/games/quake")));
    library.add_or_update(record("hexen", "hexen-gog", None));

    assert_eq!(library.find_installed("quake-steam").unwrap().slug, "quake");
    assert_eq!(library.find_installed("quake").unwrap().slug, "quake");
    assert!(library.find_installed("hexen").is_none());
    assert!(library.find_installed("heretic").is_none());
}

#[test]
fn corrupt_registry_is_an_error_and_left_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("games.json");
    let content = r#"{"games": [{"slug": "doom", "installer_slug": "doom-gog", "installed": true},]}"#;
    std::fs::write(&path, content).unwrap();

    let err = GameLibrary::open(&path, dir.path()).unwrap_err();
    assert!(err.to_string().starts_with("game registry"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), content);
}

#[test]
fn missing_registry_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let library = GameLibrary::open(&dir.path().join("nested/games.json"), dir.path()).unwrap();
    assert!(library.games().is_empty());
}

#[test]
fn game_config_is_written_as_yaml() {
    let dir = tempfile::tempdir().unwrap();
    let library = GameLibrary::open(&dir.path().join("games.json"), &dir.path().join("games")).unwrap();
    let config: serde_yaml::Value = serde_yaml::from_str("game: {exe: /games/quake/quake}").unwrap();

    let path = library.write_game_config("quake-1700000000", &config).unwrap();
    assert_eq!(path, dir.path().join("games/quake-1700000000.yml"));
    let written: serde_yaml::Value = serde_yaml::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(written, config);
}

#[test]
fn listing_filters_uninstalled_and_sorts_by_name() {
    let dir = tempfile::tempdir().unwrap();
    let mut library = GameLibrary::open(&dir.path().join("games.json"), dir.path()).unwrap();
    library.add_or_update(record("quake", "q", Some("/q")));
    let mut doom = record("doom", "d", Some("/d"));
    doom.installed = false;
    library.add_or_update(doom);

    let all: Vec<_> = library.list(false).iter().map(|g| g.slug.clone()).collect();
    assert_eq!(all, vec!["doom", "quake"]);
    assert_eq!(library.list(true).len(), 1);
}
