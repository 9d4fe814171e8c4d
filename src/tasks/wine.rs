//! Wine prefix and registry tasks

use crate::error::{Result, ScriptingError};
use crate::interpreter::pure::shell::split_args;
use crate::paths::PATH_HOME;
use crate::process::run_and_wait;
use crate::util::{find_executable, find_runtime_tool, path_is_empty};

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread::sleep;
use std::time::Duration;

use super::TaskParams;
use super::pure::{format_reg_value, overrides_env, real_executable, reg_file_content};

pub const WINE_DEFAULT_ARCH: &str = "win64";

const PREFIX_POLL_INTERVAL: Duration = Duration::from_millis(500);
const PREFIX_POLL_CYCLES: u32 = 1000;
const PREFIX_SLOW_WARNING: u32 = 60;

/// The wine executable for a task: `wine_path` when given, else the
/// system wine
pub fn wine_binary(wine_path: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = wine_path.filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    find_executable("wine").ok_or_else(|| ScriptingError::new("Unable to find executable wine").into())
}

/// A sibling of the wine binary (wineboot, wineserver), falling back to PATH
fn wine_tool(wine: &Path, name: &str) -> Option<PathBuf> {
    let sibling = wine.parent().map(|dir| dir.join(name));
    match sibling {
        Some(path) if path.exists() => Some(path),
        _ => find_executable(name),
    }
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => PATH_HOME.join(rest),
        None if path == "~" => PATH_HOME.clone(),
        None => PathBuf::from(path),
    }
}

fn is_prefix_directory(prefix: &Path) -> bool {
    prefix.is_dir() && prefix.join("system.reg").is_file()
}

struct WineContext {
    wine: PathBuf,
    prefix: Option<PathBuf>,
    arch: String,
    env: Vec<(String, String)>,
}

impl WineContext {
    fn from_params(params: &TaskParams) -> Result<Self> {
        Ok(Self {
            wine: wine_binary(params.str("wine_path").as_deref())?,
            prefix: params.str("prefix").map(|p| expand_home(&p)),
            arch: params.str("arch").unwrap_or_else(|| WINE_DEFAULT_ARCH.to_string()),
            env: params.pairs("env"),
        })
    }

    /// `program` run with the prefix environment applied
    fn command(&self, program: &Path) -> Command {
        let mut cmd = Command::new(program);
        cmd.envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        cmd.env("WINEARCH", &self.arch);
        cmd.env("WINE", &self.wine);
        if let Some(prefix) = &self.prefix {
            cmd.env("WINEPREFIX", prefix);
        }
        cmd
    }

    fn ensure_prefix(&self) -> Result<()> {
        match &self.prefix {
            Some(prefix) if !is_prefix_directory(prefix) => {
                create_prefix_at(&self.wine, prefix, &self.arch, &[], true, true)
            }
            _ => Ok(()),
        }
    }

    /// Run a wine program such as `regedit` or `winecfg.exe` in the prefix
    fn run_wine(&self, program: &str, args: &[String], working_dir: Option<&str>, return_code: i32) -> Result<()> {
        self.ensure_prefix()?;
        let mut cmd = self.command(&self.wine);
        cmd.arg(program).args(args);
        if let Some(dir) = working_dir.filter(|d| Path::new(d).is_dir()) {
            cmd.current_dir(dir);
        }
        run_and_wait(&mut cmd, return_code)
    }
}

pub fn create_prefix(params: &TaskParams) -> Result<()> {
    let prefix = params.require("prefix", "create_prefix")?;
    let wine = wine_binary(params.str("wine_path").as_deref())?;
    let arch = params.str("arch").unwrap_or_else(|| WINE_DEFAULT_ARCH.to_string());
    create_prefix_at(
        &wine,
        &expand_home(&prefix),
        &arch,
        &params.pairs("overrides"),
        params.flag("install_gecko", true),
        params.flag("install_mono", true),
    )
}

fn create_prefix_at(
    wine: &Path,
    prefix: &Path,
    arch: &str,
    overrides: &[(String, String)],
    install_gecko: bool,
    install_mono: bool,
) -> Result<()> {
    tracing::info!("Creating a {} prefix in {}", arch, prefix.display());

    let mut prefix = prefix.to_path_buf();
    if prefix.is_symlink() {
        prefix = fs::read_link(&prefix)?;
    }

    // 64bit wine refuses to create a win32 prefix over an existing folder
    if prefix.is_dir()
        && path_is_empty(&prefix)
        && let Err(e) = fs::remove_dir(&prefix)
    {
        tracing::error!("Failed to delete {}, you may lack permissions on this folder: {}", prefix.display(), e);
    }

    let Some(wineboot) = wine_tool(wine, "wineboot") else {
        tracing::error!("No wineboot executable found next to {}, your wine installation is most likely broken", wine.display());
        return Ok(());
    };

    let mut overrides = overrides.to_vec();
    let mut cmd = Command::new(wineboot);
    cmd.env("WINEARCH", arch).env("WINEPREFIX", &prefix);
    if !install_gecko {
        cmd.env("WINE_SKIP_GECKO_INSTALLATION", "1");
        overrides.push(("mshtml".to_string(), "disabled".to_string()));
    }
    if !install_mono {
        cmd.env("WINE_SKIP_MONO_INSTALLATION", "1");
        overrides.push(("mscoree".to_string(), "disabled".to_string()));
    }
    cmd.env("WINEDLLOVERRIDES", overrides_env(&overrides));

    run_and_wait(&mut cmd, 0)?;

    let registry = ["user.reg", "userdef.reg", "system.reg"];
    for cycle in 0..PREFIX_POLL_CYCLES {
        if registry.iter().all(|name| prefix.join(name).exists()) {
            break;
        }
        if cycle == PREFIX_SLOW_WARNING {
            tracing::warn!("Wine prefix creation is taking longer than expected...");
        }
        sleep(PREFIX_POLL_INTERVAL);
    }

    if !prefix.join("user.reg").exists() {
        tracing::error!("No user.reg found after prefix creation. Prefix might not be valid");
        return Ok(());
    }
    tracing::info!("{} prefix created in {}", arch, prefix.display());
    Ok(())
}

pub fn wineexec(params: &TaskParams) -> Result<()> {
    let executable = params.require("executable", "wineexec")?;
    let ctx = WineContext::from_params(params)?;

    let mut args = match params.str("args") {
        Some(raw) => split_args(&raw)?,
        None => Vec::new(),
    };

    let mut working_dir = params.str("working_dir");
    if working_dir.is_none() && Path::new(&executable).is_file() {
        working_dir = Path::new(&executable)
            .parent()
            .map(|p| p.to_string_lossy().to_string());
    }

    let (program, mut leading, working_dir) = real_executable(&executable, working_dir);
    leading.append(&mut args);
    ctx.run_wine(&program, &leading, working_dir.as_deref(), params.return_code())
}

pub fn winetricks(params: &TaskParams) -> Result<()> {
    let app = params.require("app", "winetricks")?;
    let ctx = WineContext::from_params(params)?;
    let winetricks = find_runtime_tool("winetricks/winetricks", "winetricks")
        .ok_or_else(|| ScriptingError::new("Unable to find executable winetricks"))?;

    let mut cmd = ctx.command(&winetricks);
    if params.flag("silent", true) {
        cmd.arg("-q");
    }
    cmd.args(split_args(&app)?);
    run_and_wait(&mut cmd, params.return_code())
}

/// Stop every wine process running in `prefix`
pub fn winekill(wine: &Path, prefix: &Path, arch: &str) -> Result<()> {
    let wineserver =
        wine_tool(wine, "wineserver").ok_or_else(|| ScriptingError::new("Unable to find executable wineserver"))?;
    tracing::debug!("Killing all wine processes in prefix {}", prefix.display());

    let status = Command::new(wineserver)
        .arg("-k")
        .env("WINEARCH", arch)
        .env("WINEPREFIX", prefix)
        .status()?;
    if !status.success() {
        tracing::debug!("wineserver -k exited with {:?}", status.code());
    }
    Ok(())
}

pub fn winekill_task(params: &TaskParams) -> Result<()> {
    let ctx = WineContext::from_params(params)?;
    let prefix = ctx
        .prefix
        .clone()
        .ok_or_else(|| ScriptingError::new("The prefix parameter is mandatory for the winekill task"))?;
    winekill(&ctx.wine, &prefix, &ctx.arch)
}

pub fn set_regedit(params: &TaskParams) -> Result<()> {
    let path = params.require("path", "set_regedit")?;
    let key = params.require("key", "set_regedit")?;
    let value = params.str("value").unwrap_or_default();
    let reg_type = params.str("type").unwrap_or_else(|| "REG_SZ".to_string());

    let formatted = format_reg_value(&reg_type, &value)?;
    tracing::debug!("Setting [{}]:{}={}", path, key, formatted);

    fs::create_dir_all(&params.work_dir)?;
    let reg_path = params.work_dir.join("winekeys.reg");
    fs::write(&reg_path, reg_file_content(&path, &key, &formatted))?;

    let result = apply_reg_file(params, &reg_path.to_string_lossy());
    fs::remove_file(&reg_path).ok();
    result
}

pub fn set_regedit_file(params: &TaskParams) -> Result<()> {
    let filename = params.require("filename", "set_regedit_file")?;
    apply_reg_file(params, &filename)
}

fn apply_reg_file(params: &TaskParams, filename: &str) -> Result<()> {
    let mut ctx = WineContext::from_params(params)?;

    // Some keys are only created by wine64 in a 64bit prefix
    if ctx.arch == "win64" {
        let mut wine64 = ctx.wine.clone().into_os_string();
        wine64.push("64");
        let wine64 = PathBuf::from(wine64);
        if wine64.exists() {
            ctx.wine = wine64;
        }
    }

    ctx.run_wine("regedit", &["/S".to_string(), filename.to_string()], None, 0)
}

pub fn delete_registry_key(params: &TaskParams) -> Result<()> {
    let key = params.require("key", "delete_registry_key")?;
    let ctx = WineContext::from_params(params)?;
    ctx.run_wine("regedit", &["/S".to_string(), "/D".to_string(), key], None, 0)
}

pub fn winecfg(params: &TaskParams) -> Result<()> {
    let ctx = WineContext::from_params(params)?;
    ctx.run_wine("winecfg.exe", &[], None, params.return_code())
}

pub fn eject_disc(params: &TaskParams) -> Result<()> {
    let ctx = WineContext::from_params(params)?;
    ctx.run_wine("eject", &["-a".to_string()], None, 0)
}
