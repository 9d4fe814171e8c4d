//! Child process helpers shared by `execute` and runner tasks

use crate::error::{Result, ScriptingError};

use std::process::Command;

/// Render a command the way it would be typed in a shell, with the
/// environment overrides and working directory in front.
pub fn format_command(cmd: &Command) -> String {
    let mut parts = Vec::new();
    if let Some(cwd) = cmd.get_current_dir() {
        parts.push(format!("cd {} &&", quote(&cwd.to_string_lossy())));
    }
    for (key, value) in cmd.get_envs() {
        if let Some(value) = value {
            parts.push(format!("{}={}", key.to_string_lossy(), quote(&value.to_string_lossy())));
        }
    }
    parts.push(quote(&cmd.get_program().to_string_lossy()));
    for arg in cmd.get_args() {
        parts.push(quote(&arg.to_string_lossy()));
    }
    parts.join(" ")
}

fn quote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@%".contains(c));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', "'\"'\"'"))
    }
}

/// Run `cmd` to completion. Any exit code other than `expected_code` is a
/// scripting error; a process killed by a signal counts as failed.
pub fn run_and_wait(cmd: &mut Command, expected_code: i32) -> Result<()> {
    tracing::info!("Running {}", format_command(cmd));

    let mut child = cmd.spawn().map_err(|e| {
        ScriptingError::with_data(
            format!("Failed to run {}: {}", cmd.get_program().to_string_lossy(), e),
            format_command(cmd),
        )
    })?;
    let status = child.wait()?;

    match status.code() {
        Some(code) if code == expected_code => Ok(()),
        Some(code) => {
            tracing::error!("Command exited with code {} (expected {})", code, expected_code);
            Err(ScriptingError::new(format!("Command exited with code {}", code)).into())
        }
        None => Err(ScriptingError::new("Command was terminated by a signal").into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_command_quotes_unsafe_arguments() {
        let mut cmd = Command::new("wine");
        cmd.arg("setup.exe").arg("/DIR=C:\\Program Files").env("WINEPREFIX", "/tmp/p");
        let rendered = format_command(&cmd);
        assert_eq!(rendered, "WINEPREFIX=/tmp/p wine setup.exe '/DIR=C:\\Program Files'");
    }

    #[test]
    fn format_command_shows_working_dir() {
        let mut cmd = Command::new("ls");
        cmd.current_dir("/tmp");
        assert_eq!(format_command(&cmd), "cd /tmp && ls");
    }

    #[test]
    fn run_and_wait_checks_the_expected_code() {
        run_and_wait(Command::new("sh").args(["-c", "exit 0"]), 0).unwrap();
        run_and_wait(Command::new("sh").args(["-c", "exit 3"]), 3).unwrap();

        let err = run_and_wait(Command::new("sh").args(["-c", "exit 2"]), 0).unwrap_err();
        assert_eq!(err.to_string(), "Command exited with code 2");
    }

    #[test]
    fn missing_program_is_a_scripting_error() {
        let err = run_and_wait(&mut Command::new("/nonexistent/binary"), 0).unwrap_err();
        assert!(err.to_string().starts_with("Failed to run /nonexistent/binary"));
    }
}
