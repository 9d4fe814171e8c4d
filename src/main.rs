mod config;
mod display;
mod error;
mod extract;
mod fileio;
mod files;
mod interpreter;
mod library;
mod paths;
mod process;
mod prompt;
mod script;
mod steam;
mod tasks;
mod util;

use crate::config::{Settings, init_logging, load_cfg, save_cfg};
use crate::error::{Result, scripting};
use crate::interpreter::{InstallOptions, Interpreter};
use crate::library::GameLibrary;
use crate::prompt::{Presets, Prompter, ScriptedPrompter, TerminalPrompter};
use crate::script::{Installer, fetch_script, fetch_script_revision, parse_installer_url, read_script, validate};
use crate::util::is_root;

use clap::Parser;
use dialoguer::{Select, theme::ColorfulTheme};
use std::path::PathBuf;
use std::process::ExitCode;

/// Install games from Lutris installer scripts
#[derive(Parser, Debug)]
#[command(name = "lutris-installer")]
#[command(version, about, long_about = None)]
struct Cli {
    /// `lutris:<game-slug>` URL of an installer on the website
    uri: Option<String>,

    /// Install a game from a local YAML or JSON script
    #[arg(short, long, value_name = "FILE")]
    install: Option<PathBuf>,

    /// Installer to use when the script holds several, by index or slug
    #[arg(long, value_name = "INDEX|SLUG")]
    installer: Option<String>,

    /// Install into this directory instead of the default games folder
    #[arg(short, long, value_name = "DIR")]
    target: Option<PathBuf>,

    /// Provide a user file up front
    #[arg(long = "file", value_name = "ID=PATH")]
    files: Vec<String>,

    /// Answer an input menu up front, `INPUT=value` for menus without id
    #[arg(long = "input", value_name = "ID=VALUE")]
    inputs: Vec<String>,

    /// Mount point of the game disc
    #[arg(long, value_name = "DIR")]
    disc: Option<PathBuf>,

    /// Never prompt; use presets and menu defaults
    #[arg(short = 'y', long)]
    non_interactive: bool,

    /// Keep the downloaded files once the install is done
    #[arg(long)]
    keep_cache: bool,

    /// Reinstall a game that is already installed, in its current directory
    #[arg(long)]
    reinstall: bool,

    /// List the games in the library
    #[arg(short, long)]
    list_games: bool,

    /// Only list installed games
    #[arg(short = 'o', long)]
    installed: bool,

    /// Print listings as JSON
    #[arg(short, long)]
    json: bool,

    /// List the games installed through Steam
    #[arg(short = 's', long)]
    list_steam_games: bool,

    /// List the Steam library folders
    #[arg(long)]
    list_steam_folders: bool,

    /// Check the scripts and exit without installing
    #[arg(long)]
    validate: bool,

    /// Keep downloaded installer files in DIR for later installs
    #[arg(long, value_name = "DIR")]
    set_cache_path: Option<PathBuf>,

    /// Show debug output
    #[arg(short, long)]
    debug: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let settings = load_cfg();
    init_logging(&settings, cli.debug);

    if is_root() {
        tracing::warn!("Running as root, every file the installer creates will be owned by root");
    }

    match run(cli, settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("[lutris] {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, mut settings: Settings) -> Result<()> {
    if let Some(path) = &cli.set_cache_path {
        return set_cache_path(&mut settings, path);
    }
    if cli.list_games {
        return list_games(cli.installed, cli.json);
    }
    if cli.list_steam_games {
        return list_steam_games(cli.json);
    }
    if cli.list_steam_folders {
        return list_steam_folders(cli.json);
    }

    let installers = load_installers(&cli, &settings)?;
    if installers.is_empty() {
        return scripting("No installer found");
    }

    if cli.validate {
        return validate_all(&installers);
    }

    let installer = choose_installer(installers, cli.installer.as_deref(), cli.non_interactive)?;
    let library = GameLibrary::open_default()?;
    if !cli.reinstall
        && let Some(game) = library.get_by_installer_slug(&installer.slug).filter(|g| g.installed)
    {
        return scripting(format!(
            "{} is already installed in {}, use --reinstall to install it again",
            game.name,
            game.directory.as_ref().map(|d| d.display().to_string()).unwrap_or_default()
        ));
    }

    let presets = Presets::from_args(&cli.files, &cli.inputs, cli.disc.clone())?;
    let prompter: Box<dyn Prompter> = if cli.non_interactive {
        Box::new(ScriptedPrompter::new(presets))
    } else {
        Box::new(TerminalPrompter::new(presets))
    };

    let options = InstallOptions {
        target: cli.target.clone(),
        reinstall: cli.reinstall,
        keep_cache: cli.keep_cache,
        ..InstallOptions::from_settings(&settings)
    };

    println!("[lutris] Installing {}", installer.display());
    let mut interpreter = Interpreter::new(installer, settings, library, prompter, options)?;
    interpreter.install()?;

    let location = interpreter
        .target_path()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    println!("[lutris] {} installed in {}", interpreter.game_name(), location);
    Ok(())
}

fn load_installers(cli: &Cli, settings: &Settings) -> Result<Vec<Installer>> {
    if let Some(path) = &cli.install {
        return read_script(path);
    }
    let Some(uri) = &cli.uri else {
        return scripting("Nothing to do, pass a script with --install or a lutris: URL");
    };

    let url = parse_installer_url(uri)?;
    if let (Some(service), Some(appid)) = (&url.service, &url.appid) {
        return scripting(format!(
            "{} links to {} game {}, installing from store services is not supported",
            uri, service, appid
        ));
    }
    if url.action.as_deref().is_some_and(|a| a != "install") {
        match &url.launch_config_name {
            Some(config) => tracing::warn!("Ignoring action {:?} (launch config {}) of {}", url.action, config, uri),
            None => tracing::warn!("Ignoring action {:?} of {}", url.action, uri),
        }
    }
    match &url.revision {
        Some(revision) => Ok(vec![fetch_script_revision(settings, &url.game_slug, revision)?]),
        None => fetch_script(settings, &url.game_slug),
    }
}

/// Store `path` as the persistent installer cache, creating it when its
/// parent exists
fn set_cache_path(settings: &mut Settings, path: &std::path::Path) -> Result<()> {
    if !path.is_dir() {
        match path.parent() {
            Some(parent) if parent.is_dir() => std::fs::create_dir(path)?,
            _ => {
                return scripting(format!(
                    "The cache path {} does not exist, nor does its parent, so it won't be created.",
                    path.display()
                ));
            }
        }
    }
    settings.cache_path = Some(path.to_path_buf());
    save_cfg(settings)?;
    println!("[lutris] Installer files will be cached in {}", path.display());
    Ok(())
}

fn validate_all(installers: &[Installer]) -> Result<()> {
    let mut failed = 0;
    for installer in installers {
        match validate(installer) {
            Ok(_) => println!("[lutris] {}: OK", installer.display()),
            Err(e) => {
                failed += 1;
                println!("[lutris] {}: {}", installer.display(), e);
            }
        }
    }
    if failed > 0 {
        return scripting(format!("{} of {} installers are invalid", failed, installers.len()));
    }
    Ok(())
}

fn choose_installer(mut installers: Vec<Installer>, wanted: Option<&str>, non_interactive: bool) -> Result<Installer> {
    if let Some(wanted) = wanted {
        let index = match wanted.parse::<usize>() {
            Ok(index) if index < installers.len() => Some(index),
            _ => installers.iter().position(|i| i.slug == wanted),
        };
        return match index {
            Some(index) => Ok(installers.swap_remove(index)),
            None => scripting(format!("No installer {} in the script", wanted)),
        };
    }

    if installers.len() == 1 || non_interactive {
        return Ok(installers.swap_remove(0));
    }

    let labels: Vec<String> = installers.iter().map(Installer::display).collect();
    let index = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Choose an installer")
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(installers.swap_remove(index))
}

fn list_games(installed_only: bool, json: bool) -> Result<()> {
    let library = GameLibrary::open_default()?;
    let games = library.list(installed_only);

    if json {
        println!("{}", serde_json::to_string_pretty(&games)?);
        return Ok(());
    }
    for game in games {
        let directory = game.directory.as_ref().map(|d| d.display().to_string()).unwrap_or_default();
        println!("{:<40} | {:<40} | {:<15} | {}", game.name, game.slug, game.runner, directory);
    }
    Ok(())
}

fn list_steam_games(json: bool) -> Result<()> {
    let games = steam::installed_games();
    if json {
        println!("{}", serde_json::to_string_pretty(&games)?);
        return Ok(());
    }
    for game in games {
        println!("{:<10} | {:<40} | {}", game.appid, game.name, game.install_dir.display());
    }
    Ok(())
}

fn list_steam_folders(json: bool) -> Result<()> {
    let folders = steam::library_folders();
    if json {
        println!("{}", serde_json::to_string_pretty(&folders)?);
        return Ok(());
    }
    for folder in folders {
        println!("{}", folder.display());
    }
    Ok(())
}
