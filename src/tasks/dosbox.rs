use crate::error::{Result, ScriptingError};
use crate::process::run_and_wait;
use crate::util::find_executable;

use std::fs;
use std::path::Path;
use std::process::Command;

use super::TaskParams;

/// Run DOSBox on a config file or an executable, closing it when the
/// program exits unless `close_on_exit` is false
pub fn dosexec(params: &TaskParams) -> Result<()> {
    let config_file = params.str("config_file");
    let executable = params.str("executable");

    let target = match (&config_file, &executable) {
        (Some(config), _) => config.clone(),
        (None, Some(exe)) => exe.clone(),
        (None, None) => {
            return Err(ScriptingError::new("Neither a config file or an executable were provided").into());
        }
    };
    tracing::debug!("Running dosbox with {}", target);

    let working_dir = match params.str("working_dir") {
        Some(dir) => dir,
        None => Path::new(&target)
            .parent()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default(),
    };
    if !working_dir.is_empty() {
        fs::create_dir_all(&working_dir)?;
    }

    let dosbox = find_executable("dosbox").ok_or_else(|| ScriptingError::new("Unable to find executable dosbox"))?;
    let mut cmd = Command::new(dosbox);
    if let Some(config) = &config_file {
        cmd.arg("-conf").arg(config);
    }
    if let Some(exe) = &executable {
        if !Path::new(exe).exists() {
            return Err(ScriptingError::new(format!("Can't find file {}", exe)).into());
        }
        cmd.arg(exe);
    }
    if let Some(args) = params.str("args") {
        cmd.args(args.split_whitespace());
    }
    if params.flag("close_on_exit", true) {
        cmd.arg("-exit");
    }
    if !working_dir.is_empty() {
        cmd.current_dir(&working_dir);
    }

    run_and_wait(&mut cmd, params.return_code())
}
