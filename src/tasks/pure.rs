// Wine task helpers without side effects

use crate::error::ScriptingError;

use std::path::Path;

/// Build a WINEDLLOVERRIDES value. DLLs sharing a mode are grouped and
/// groups come in the order wine documents them.
pub fn overrides_env(overrides: &[(String, String)]) -> String {
    const BUCKETS: [&str; 6] = ["n,b", "b,n", "b", "n", "d", ""];
    let mut buckets: Vec<Vec<&str>> = vec![Vec::new(); BUCKETS.len()];

    for (dll, value) in overrides {
        let mode = value
            .replace(' ', "")
            .replace("builtin", "b")
            .replace("native", "n")
            .replace("disabled", "");
        match BUCKETS.iter().position(|b| *b == mode) {
            Some(index) => buckets[index].push(dll),
            None => tracing::error!("Invalid override value {}", value),
        }
    }

    BUCKETS
        .iter()
        .zip(buckets.iter_mut())
        .filter(|(_, dlls)| !dlls.is_empty())
        .map(|(mode, dlls)| {
            dlls.sort_unstable();
            format!("{}={}", dlls.join(","), mode)
        })
        .collect::<Vec<_>>()
        .join(";")
}

/// Render a registry value in `.reg` syntax
pub fn format_reg_value(reg_type: &str, value: &str) -> Result<String, ScriptingError> {
    let formatted = match reg_type {
        "REG_SZ" => format!("\"{}\"", value),
        "REG_DWORD" => format!("dword:{}", value),
        "REG_BINARY" => format!("hex:{}", value.replace(' ', ",")),
        "REG_MULTI_SZ" => format!("hex(2):{}", value),
        "REG_EXPAND_SZ" => format!("hex(7):{}", value),
        other => {
            return Err(ScriptingError::with_data("Unsupported registry value type", other));
        }
    };
    Ok(formatted)
}

pub fn reg_file_content(path: &str, key: &str, formatted_value: &str) -> String {
    format!("REGEDIT4\n\n[{}]\n\"{}\"={}\n", path, key, formatted_value)
}

/// What actually starts a Windows file under wine: installers go through
/// msiexec, batch files through cmd, shortcuts through start.
/// Returns (program, leading args, working dir).
pub fn real_executable(executable: &str, working_dir: Option<String>) -> (String, Vec<String>, Option<String>) {
    let lower = executable.to_lowercase();

    if lower.ends_with(".msi") {
        return ("msiexec".to_string(), vec!["/i".to_string(), executable.to_string()], working_dir);
    }

    if lower.ends_with(".bat") {
        let path = Path::new(executable);
        let parent = path.parent().map(|p| p.to_string_lossy().to_string()).unwrap_or_default();
        if working_dir.is_none() || working_dir.as_deref() == Some(parent.as_str()) {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| executable.to_string());
            return ("cmd".to_string(), vec!["/C".to_string(), name], Some(parent));
        }
        return ("cmd".to_string(), vec!["/C".to_string(), executable.to_string()], working_dir);
    }

    if lower.ends_with(".lnk") {
        return ("start".to_string(), vec!["/unix".to_string(), executable.to_string()], working_dir);
    }

    (executable.to_string(), Vec::new(), working_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(a: &str, b: &str) -> (String, String) {
        (a.to_string(), b.to_string())
    }

    #[test]
    fn overrides_are_grouped_by_mode() {
        let env = overrides_env(&[
            pair("d3d9", "native"),
            pair("dinput8", "native,builtin"),
            pair("ddraw", "n"),
            pair("mshtml", "disabled"),
        ]);
        assert_eq!(env, "dinput8=n,b;d3d9,ddraw=n;mshtml=");
    }

    #[test]
    fn invalid_override_is_skipped() {
        assert_eq!(overrides_env(&[pair("x", "weird")]), "");
    }

    #[test]
    fn registry_values_are_formatted_by_type() {
        assert_eq!(format_reg_value("REG_SZ", "disabled").unwrap(), "\"disabled\"");
        assert_eq!(format_reg_value("REG_DWORD", "00000001").unwrap(), "dword:00000001");
        assert_eq!(format_reg_value("REG_BINARY", "01 02 ff").unwrap(), "hex:01,02,ff");
        assert!(format_reg_value("REG_QWORD", "1").is_err());
    }

    #[test]
    fn reg_file_has_header_and_single_key() {
        let content = reg_file_content("HKEY_CURRENT_USER\\Software\\Wine\\Direct3D", "UseGLSL", "\"disabled\"");
        assert_eq!(
            content,
            "REGEDIT4\n\n[HKEY_CURRENT_USER\\Software\\Wine\\Direct3D]\n\"UseGLSL\"=\"disabled\"\n"
        );
    }

    #[test]
    fn windows_files_map_to_their_launcher() {
        let (program, args, _) = real_executable("/g/setup.MSI", None);
        assert_eq!(program, "msiexec");
        assert_eq!(args, vec!["/i", "/g/setup.MSI"]);

        let (program, args, cwd) = real_executable("/g/run.bat", None);
        assert_eq!(program, "cmd");
        assert_eq!(args, vec!["/C", "run.bat"]);
        assert_eq!(cwd.as_deref(), Some("/g"));

        let (program, args, _) = real_executable("/g/game.exe", None);
        assert_eq!(program, "/g/game.exe");
        assert!(args.is_empty());
    }
}
