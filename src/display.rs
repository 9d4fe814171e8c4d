//! Current desktop resolution for `$RESOLUTION`

use crate::config::Settings;

use regex::Regex;
use std::process::Command;
use std::sync::LazyLock;

pub const DEFAULT_RESOLUTION: (u32, u32) = (1280, 720);

static XRANDR_MODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)x(\d+)").unwrap());

/// Resolution of the primary display. The `resolution` setting wins, then
/// niri, then xrandr, then a 1280x720 default.
pub fn current_resolution(settings: &Settings) -> (u32, u32) {
    if let Some(resolution) = settings.resolution_override() {
        return resolution;
    }
    if let Some(resolution) = resolution_niri() {
        return resolution;
    }
    if let Some(resolution) = resolution_xrandr() {
        return resolution;
    }
    tracing::error!("Failed to get the current resolution, using the default");
    DEFAULT_RESOLUTION
}

/// First enabled output reported by niri IPC. Only runs on niri.
fn resolution_niri() -> Option<(u32, u32)> {
    if std::env::var("NIRI_SOCKET").is_err() {
        return None;
    }

    let output = Command::new("niri").args(["msg", "--json", "outputs"]).output().ok()?;
    if !output.status.success() {
        return None;
    }
    parse_niri_outputs(&output.stdout)
}

fn parse_niri_outputs(json: &[u8]) -> Option<(u32, u32)> {
    let json: serde_json::Value = serde_json::from_slice(json).ok()?;
    let outputs = json.as_object()?;

    // Leftmost enabled output
    outputs
        .values()
        .filter_map(|info| {
            let logical = info.get("logical").filter(|l| !l.is_null())?;
            let x = logical.get("x").and_then(|x| x.as_i64()).unwrap_or(0);
            let width = u32::try_from(logical.get("width")?.as_u64()?).ok()?;
            let height = u32::try_from(logical.get("height")?.as_u64()?).ok()?;
            Some((x, (width, height)))
        })
        .min_by_key(|(x, _)| *x)
        .map(|(_, resolution)| resolution)
}

fn resolution_xrandr() -> Option<(u32, u32)> {
    let output = Command::new("xrandr").output().ok()?;
    if !output.status.success() {
        tracing::error!("Unable to read xrandr");
        return None;
    }
    parse_xrandr(&String::from_utf8_lossy(&output.stdout))
}

/// The active mode is the indented line marked with `*`
fn parse_xrandr(output: &str) -> Option<(u32, u32)> {
    let line = output
        .lines()
        .find(|line| line.starts_with("  ") && line.contains('*'))?;
    let caps = XRANDR_MODE.captures(line)?;
    Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
}
