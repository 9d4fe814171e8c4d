// Script loading tests

use crate::script::{parse_scripts, read_script, validate};

const SINGLE: &str = r#"
name: Quake
game_slug: quake
slug: quake-shareware
version: Shareware
runner: linux
year: 1996
script:
  files:
    - quakesw: https://example.com/quakesw.tar.gz
    - setup-data:
        url: https://example.com/data.zip
        filename: data.zip
  game:
    exe: quake
  installer:
    - extract:
        file: quakesw
    - chmodx: $GAMEDIR/quake
"#;

#[test]
fn single_installer_document() {
    let installers = parse_scripts(SINGLE).unwrap();
    assert_eq!(installers.len(), 1);
    let installer = &installers[0];
    assert_eq!(installer.slug, "quake-shareware");
    assert_eq!(installer.game_name(), "Quake");

    let script = validate(installer).unwrap();
    let files = script.files().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0].0, "quakesw");
    assert_eq!(files[1].0, "setup-data");
    assert_eq!(script.command_names(), vec!["extract", "chmodx"]);
}

#[test]
fn api_envelope_with_results() {
    let json = r#"{"count": 2, "results": [
        {"name": "A", "game_slug": "a", "slug": "a-1", "runner": "linux", "version": "v1", "script": {"game": {"exe": "a"}}},
        {"name": "A", "game_slug": "a", "slug": "a-2", "runner": "wine", "version": "v2", "script": {"game": {"exe": "a.exe"}}}
    ]}"#;
    let installers = parse_scripts(json).unwrap();
    let slugs: Vec<&str> = installers.iter().map(|i| i.slug.as_str()).collect();
    assert_eq!(slugs, vec!["a-1", "a-2"]);
}

#[test]
fn list_of_installers() {
    let yaml = "- name: A\n  game_slug: a\n  slug: a\n  runner: linux\n  script: {}\n- name: B\n  game_slug: b\n  slug: b\n  runner: linux\n  script: {}\n";
    assert_eq!(parse_scripts(yaml).unwrap().len(), 2);
}

#[test]
fn inlined_script_keys_are_accepted() {
    let yaml = "name: Inline\ngame_slug: inline\nslug: inline\nrunner: linux\ngame:\n  exe: run.sh\ninstaller:\n  - mkdir: $GAMEDIR/saves\n";
    let installers = parse_scripts(yaml).unwrap();
    let script = validate(&installers[0]).unwrap();
    assert_eq!(script.game_str("exe").as_deref(), Some("run.sh"));
    assert_eq!(script.commands().len(), 1);
}

#[test]
fn system_env_is_read_raw() {
    let yaml = "name: E\ngame_slug: e\nslug: e\nrunner: wine\nscript:\n  system:\n    env:\n      DXVK_HUD: 1\n      GAME_ROOT: $GAMEDIR\n";
    let installers = parse_scripts(yaml).unwrap();
    let script = validate(&installers[0]).unwrap();
    let env = script.system_env();
    assert!(env.contains(&("DXVK_HUD".to_string(), "1".to_string())));
    assert!(env.contains(&("GAME_ROOT".to_string(), "$GAMEDIR".to_string())));
}

#[test]
fn read_script_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quake.yml");
    std::fs::write(&path, SINGLE).unwrap();
    let installers = read_script(&path).unwrap();
    assert_eq!(installers[0].runner, "linux");
}

#[test]
fn scalar_document_is_rejected() {
    assert!(parse_scripts("just a string").is_err());
}

#[test]
fn bad_files_entry_is_reported() {
    let yaml = "name: F\ngame_slug: f\nslug: f\nrunner: linux\nscript:\n  files:\n    - just-a-string\n";
    let installers = parse_scripts(yaml).unwrap();
    let script = validate(&installers[0]).unwrap();
    let err = script.files().unwrap_err();
    assert_eq!(err.message, "Invalid file entry");
}
