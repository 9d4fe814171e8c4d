use crate::error::{Result, ScriptingError};
use crate::interpreter::pure::command::{check_required_params, has_param, param_bool, param_str};
use crate::interpreter::pure::shell::split_args;
use crate::interpreter::types::Interpreter;
use crate::process::run_and_wait;
use crate::script::{value_as_i64, value_to_string};
use crate::util::{find_executable, is_executable, make_executable};

use serde_yaml::Value;
use std::path::Path;
use std::process::Command;

impl Interpreter {
    /// Run a program or a `bash -c` command line and wait for it
    pub(super) fn execute(&mut self, params: &Value) -> Result<()> {
        let mut args: Vec<String> = Vec::new();
        let mut env: Vec<(String, String)> = Vec::new();
        let mut working_dir: Option<String> = None;
        let mut return_code = 0;

        let (file, command) = match params {
            Value::Mapping(map) => {
                check_required_params(&[&["file", "command"]], params, "execute")?;
                if has_param(params, "file") && has_param(params, "command") {
                    return Err(ScriptingError::with_data(
                        "Parameters file and command can't be used at the same time for the execute command",
                        params,
                    )
                    .into());
                }

                for arg in split_args(&param_str(params, "args").unwrap_or_default())? {
                    args.push(self.substitute(&arg));
                }
                if param_bool(params, "terminal", false) {
                    tracing::info!("Running in a terminal is not supported, running inline");
                }
                if has_param(params, "include_processes") || has_param(params, "exclude_processes") {
                    tracing::debug!("Process monitoring lists are ignored, waiting on the command itself");
                }
                working_dir = param_str(params, "working_dir").map(|d| self.substitute(&d));
                return_code = map
                    .get("return_code")
                    .and_then(value_as_i64)
                    .and_then(|c| i32::try_from(c).ok())
                    .unwrap_or(0);

                env.extend(self.script_env());
                if let Some(Value::Mapping(local_env)) = map.get("env") {
                    for (key, value) in local_env {
                        if let Some(key) = value_to_string(key) {
                            let value = value_to_string(value).unwrap_or_default();
                            env.push((key, self.substitute(&value)));
                        }
                    }
                }

                (param_str(params, "file"), param_str(params, "command"))
            }
            Value::String(command) => (None, Some(command.clone())),
            _ => return Err(ScriptingError::with_data("No parameters supplied to execute command.", params).into()),
        };

        let exec_path = match command {
            Some(command) => {
                args = vec!["-c".to_string(), self.get_file_path(command.trim())];
                "bash".to_string()
            }
            None => self.get_file_path(&file.unwrap_or_default()),
        };

        if Path::new(&exec_path).exists() && !is_executable(Path::new(&exec_path)) {
            tracing::warn!("Making {} executable", exec_path);
            make_executable(Path::new(&exec_path))?;
        }
        let Some(executable) = find_executable(&exec_path) else {
            return Err(ScriptingError::new(format!("Unable to find executable {}", exec_path)).into());
        };

        let working_dir = working_dir
            .map(std::path::PathBuf::from)
            .filter(|d| d.exists())
            .or_else(|| self.target_path.clone());

        let mut cmd = Command::new(&executable);
        cmd.args(&args).envs(env);
        if let Some(dir) = working_dir.filter(|d| d.is_dir()) {
            cmd.current_dir(dir);
        }
        run_and_wait(&mut cmd, return_code)
    }
}
