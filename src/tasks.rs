//! Runner tasks callable from the `task` directive
//!
//! Tasks receive their parameters already substituted. Only the install-time
//! helpers of the wine and dosbox runners exist.

mod dosbox;
pub mod pure;
mod wine;

use crate::error::{Result, ScriptingError};
use crate::script::pure::value::{is_truthy, value_as_i64, value_to_string};

use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};

pub use wine::{WINE_DEFAULT_ARCH, wine_binary, winekill};

/// Parameters of a `task` directive, with the `name` removed
#[derive(Debug, Clone, Default)]
pub struct TaskParams {
    params: Mapping,
    /// Scratch directory for generated files such as registry imports
    pub work_dir: PathBuf,
}

impl TaskParams {
    pub fn new(params: Mapping, work_dir: &Path) -> Self {
        Self {
            params,
            work_dir: work_dir.to_path_buf(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    pub fn str(&self, key: &str) -> Option<String> {
        self.get(key).and_then(value_to_string).filter(|s| !s.is_empty())
    }

    pub fn require(&self, key: &str, task: &str) -> Result<String> {
        self.str(key).ok_or_else(|| {
            ScriptingError::new(format!("The {} parameter is mandatory for the {} task", key, task)).into()
        })
    }

    pub fn flag(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            None => default,
            Some(Value::String(s)) => matches!(s.to_lowercase().as_str(), "yes" | "on" | "true" | "1"),
            Some(value) => is_truthy(value),
        }
    }

    pub fn return_code(&self) -> i32 {
        self.get("return_code")
            .and_then(value_as_i64)
            .and_then(|c| i32::try_from(c).ok())
            .unwrap_or(0)
    }

    /// A mapping parameter as ordered string pairs
    pub fn pairs(&self, key: &str) -> Vec<(String, String)> {
        let Some(Value::Mapping(map)) = self.get(key) else {
            return Vec::new();
        };
        map.iter()
            .filter_map(|(k, v)| Some((value_to_string(k)?, value_to_string(v).unwrap_or_default())))
            .collect()
    }
}

/// Run `runner.task` with `params`
pub fn run_task(runner: &str, task: &str, params: &TaskParams) -> Result<()> {
    tracing::info!("Running task {}.{}", runner, task);
    match (runner, task) {
        (r, "create_prefix") if r.starts_with("wine") => wine::create_prefix(params),
        (r, "wineexec") if r.starts_with("wine") => wine::wineexec(params),
        (r, "winetricks") if r.starts_with("wine") => wine::winetricks(params),
        (r, "winekill") if r.starts_with("wine") => wine::winekill_task(params),
        (r, "set_regedit") if r.starts_with("wine") => wine::set_regedit(params),
        (r, "set_regedit_file") if r.starts_with("wine") => wine::set_regedit_file(params),
        (r, "delete_registry_key") if r.starts_with("wine") => wine::delete_registry_key(params),
        (r, "winecfg") if r.starts_with("wine") => wine::winecfg(params),
        (r, "eject_disc") if r.starts_with("wine") => wine::eject_disc(params),
        ("dosbox", "dosexec") => dosbox::dosexec(params),
        _ => Err(ScriptingError::new(format!("Invalid task {}.{}", runner, task)).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(yaml: &str) -> TaskParams {
        let mapping: Mapping = serde_yaml::from_str(yaml).unwrap();
        TaskParams::new(mapping, Path::new("/tmp"))
    }

    #[test]
    fn unknown_tasks_are_rejected() {
        let err = run_task("wine", "make_coffee", &params("{}")).unwrap_err();
        assert_eq!(err.to_string(), "Invalid task wine.make_coffee");

        let err = run_task("linux", "wineexec", &params("{}")).unwrap_err();
        assert_eq!(err.to_string(), "Invalid task linux.wineexec");
    }

    #[test]
    fn params_read_loose_scalars() {
        let p = params("{return_code: '256', silent: 'false', app: 'vcrun2008 d3dx9', overrides: {d3d9: native}}");
        assert_eq!(p.return_code(), 256);
        assert!(!p.flag("silent", true));
        assert!(p.flag("missing", true));
        assert_eq!(p.str("app").as_deref(), Some("vcrun2008 d3dx9"));
        assert_eq!(p.pairs("overrides"), vec![("d3d9".to_string(), "native".to_string())]);
    }

    #[test]
    fn missing_mandatory_parameter_names_the_task() {
        let err = run_task("wine", "winetricks", &params("{prefix: /tmp/p}")).unwrap_err();
        assert_eq!(err.to_string(), "The app parameter is mandatory for the winetricks task");
    }

    #[test]
    fn dosexec_needs_a_config_or_executable() {
        let err = run_task("dosbox", "dosexec", &params("{}")).unwrap_err();
        assert!(err.to_string().contains("Neither a config file or an executable"));
    }
}
