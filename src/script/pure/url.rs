// `lutris:` URL parsing (no I/O)

use crate::error::{Result, scripting};

use percent_encoding::percent_decode_str;

/// What a `lutris:` URL asks for
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallerUrl {
    pub game_slug: String,
    pub action: Option<String>,
    pub revision: Option<String>,
    /// `<service>:<appid>` slugs link to store games
    pub service: Option<String>,
    pub appid: Option<String>,
    pub launch_config_name: Option<String>,
}

/// Parse `lutris:<slug>`, `lutris:<action>/<slug>` or
/// `lutris:<action>/<slug>/<launch config>`, with an optional
/// `?revision=<id>` query.
pub fn parse_installer_url(raw: &str) -> Result<InstallerUrl> {
    let invalid = || scripting(format!("Invalid lutris url {}", raw));

    let Ok(parsed) = url::Url::parse(raw) else {
        return invalid();
    };
    if parsed.scheme() != "lutris" {
        return invalid();
    }

    let mut path = parsed.path().to_string();
    if let Some(host) = parsed.host_str() {
        // `lutris://install/quake` puts the first part in the host
        path = format!("{}{}", host, path);
    }
    let path = path.trim_matches('/');
    if path.is_empty() {
        return invalid();
    }

    let parts: Vec<String> = path.split('/').map(percent_decode).collect();
    let mut url = InstallerUrl::default();
    match parts.as_slice() {
        [slug] => url.game_slug = slug.clone(),
        [action, slug] => {
            url.action = Some(action.clone());
            url.game_slug = slug.clone();
        }
        [action, slug, config] => {
            url.action = Some(action.clone());
            url.game_slug = slug.clone();
            url.launch_config_name = Some(config.clone());
        }
        _ => return invalid(),
    }

    if let Some((service, appid)) = url.game_slug.split_once(':') {
        url.service = Some(service.to_string());
        url.appid = Some(appid.to_string());
    }

    url.revision = parsed
        .query_pairs()
        .find(|(key, _)| key == "revision")
        .map(|(_, value)| value.into_owned());

    Ok(url)
}

fn percent_decode(part: &str) -> String {
    percent_decode_str(part).decode_utf8_lossy().into_owned()
}
