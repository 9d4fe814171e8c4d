//! Installer script loading
//!
//! Scripts come from local YAML/JSON files or from the installer API.

use crate::config::Settings;
use crate::error::{DownloadError, Result, scripting};

use serde_yaml::Value;
use std::path::Path;

use super::Installer;

/// Read one or more installers from a local YAML or JSON file
pub fn read_script(path: &Path) -> Result<Vec<Installer>> {
    tracing::debug!("Loading script(s) from {}", path.display());
    let content = std::fs::read_to_string(path)?;
    parse_scripts(&content)
}

/// Parse a document holding a single installer, a list of installers, or
/// an API envelope `{results: [...]}`.
pub fn parse_scripts(content: &str) -> Result<Vec<Installer>> {
    let raw: Value = serde_yaml::from_str(content)?;

    let documents = match raw {
        Value::Sequence(items) => items,
        Value::Mapping(ref map) if map.contains_key("results") => match map.get("results") {
            Some(Value::Sequence(items)) => items.clone(),
            _ => return scripting("The 'results' entry must be a list of installers"),
        },
        Value::Mapping(_) => vec![raw],
        _ => return scripting("No installer found in script file"),
    };

    documents.into_iter().map(installer_from_value).collect()
}

/// Hand-written scripts may carry `files`, `installer` and `game` next to
/// the metadata instead of under `script`.
fn installer_from_value(mut document: Value) -> Result<Installer> {
    if let Value::Mapping(map) = &mut document
        && !map.contains_key("script")
    {
        let inlined = Value::Mapping(map.clone());
        map.insert(Value::from("script"), inlined);
    }
    Ok(serde_yaml::from_value(document)?)
}

/// Download the installers published for `game_slug`
pub fn fetch_script(settings: &Settings, game_slug: &str) -> Result<Vec<Installer>> {
    let url = settings.installer_url_for(game_slug);
    let response = get_json(&url)?;
    match response.get("results") {
        Some(results @ serde_json::Value::Array(_)) => {
            let installers: Vec<Value> = serde_json::from_value(results.clone())?;
            installers.into_iter().map(installer_from_value).collect()
        }
        _ => scripting(format!("Couldn't get installer at {}", url)),
    }
}

/// Download one specific revision of an installer
pub fn fetch_script_revision(settings: &Settings, game_slug: &str, revision: &str) -> Result<Installer> {
    let url = settings.installer_revision_url_for(game_slug, revision);
    let response = get_json(&url)?;
    let document: Value = serde_json::from_value(response)?;
    installer_from_value(document)
}

fn get_json(url: &str) -> Result<serde_json::Value> {
    tracing::debug!("Fetching installer {}", url);

    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .user_agent(concat!("lutris-installer/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let response = client.get(url).send()?;
    if !response.status().is_success() {
        return Err(DownloadError::Status {
            url: url.to_string(),
            status: response.status().as_u16(),
        }
        .into());
    }

    Ok(response.json()?)
}
