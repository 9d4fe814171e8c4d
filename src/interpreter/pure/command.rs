// Directive parsing and parameter checks (no I/O)

use crate::error::ScriptingError;
use crate::script::value_to_string;

use serde_yaml::{Mapping, Value};

/// Split a directive into its normalized name and its parameters.
/// `- chmodx: $GAMEDIR/x` and `- insert-disc` are both accepted.
pub fn command_name_and_params(command: &Value) -> Result<(String, Value), ScriptingError> {
    let (name, params) = match command {
        Value::Mapping(map) => {
            let Some((name, params)) = map.iter().next() else {
                return Err(ScriptingError::with_data("Installer commands are not formatted correctly", command));
            };
            let name = value_to_string(name)
                .ok_or_else(|| ScriptingError::with_data("Installer commands are not formatted correctly", command))?;
            (name, params.clone())
        }
        other => {
            let name = value_to_string(other)
                .ok_or_else(|| ScriptingError::with_data("Installer commands are not formatted correctly", command))?;
            (name, Value::Mapping(Mapping::new()))
        }
    };
    Ok((normalize_command_name(&name), params))
}

pub fn normalize_command_name(name: &str) -> String {
    name.replace('-', "_").trim_matches('_').to_string()
}

/// Each entry of `required` lists acceptable parameter names; an entry with
/// several names is satisfied by any one of them.
pub fn check_required_params(required: &[&[&str]], data: &Value, command: &str) -> Result<(), ScriptingError> {
    let present = |key: &str| data.as_mapping().is_some_and(|m| m.contains_key(key));

    for alternatives in required {
        if alternatives.iter().any(|key| present(key)) {
            continue;
        }
        let message = match alternatives {
            [single] => format!("The {} parameter is mandatory for the {} command", single, command),
            many => format!(
                "One of {} parameter is mandatory for the {} command",
                many.join(" or "),
                command
            ),
        };
        return Err(ScriptingError::with_data(message, data));
    }
    Ok(())
}

/// String parameter, empty strings count as missing
pub fn param_str(data: &Value, key: &str) -> Option<String> {
    data.get(key).and_then(value_to_string).filter(|s| !s.is_empty())
}

/// Presence of a key, whatever its value. `nomerge` and friends are flags.
pub fn has_param(data: &Value, key: &str) -> bool {
    data.as_mapping().is_some_and(|m| m.contains_key(key))
}

/// Boolean parameter with YAML truthiness and a default
pub fn param_bool(data: &Value, key: &str, default: bool) -> bool {
    match data.get(key) {
        None => default,
        Some(Value::String(s)) => !matches!(s.to_lowercase().as_str(), "" | "false" | "no" | "off" | "0"),
        Some(value) => crate::script::pure::value::is_truthy(value),
    }
}

/// Options of an `input_menu`: `{value: label}` maps or bare strings
pub fn menu_options(options: &Value) -> Result<Vec<(String, String)>, ScriptingError> {
    let Some(entries) = options.as_sequence() else {
        return Err(ScriptingError::with_data("The options of input_menu must be a list", options));
    };

    let mut out = Vec::new();
    for entry in entries {
        match entry {
            Value::Mapping(map) => {
                for (value, label) in map {
                    let value = value_to_string(value)
                        .ok_or_else(|| ScriptingError::with_data("Invalid input_menu option", entry))?;
                    let label = value_to_string(label).unwrap_or_else(|| value.clone());
                    out.push((value, label));
                }
            }
            other => {
                let value = value_to_string(other)
                    .ok_or_else(|| ScriptingError::with_data("Invalid input_menu option", entry))?;
                out.push((value.clone(), value));
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn names_are_normalized() {
        let (name, params) = command_name_and_params(&yaml("insert-disc: {requires: setup.exe}")).unwrap();
        assert_eq!(name, "insert_disc");
        assert_eq!(param_str(&params, "requires").as_deref(), Some("setup.exe"));

        let (name, params) = command_name_and_params(&yaml("_winekill_")).unwrap();
        assert_eq!(name, "winekill");
        assert!(params.as_mapping().unwrap().is_empty());
    }

    #[test]
    fn missing_param_message() {
        let err = check_required_params(&[&["src"], &["dst"]], &yaml("{src: a}"), "merge").unwrap_err();
        assert_eq!(err.message, "The dst parameter is mandatory for the merge command");
        assert!(err.faulty_data.is_some());
    }

    #[test]
    fn alternative_params_message() {
        let err = check_required_params(&[&["file", "command"]], &yaml("{args: -x}"), "execute").unwrap_err();
        assert_eq!(err.message, "One of file or command parameter is mandatory for the execute command");
        check_required_params(&[&["file", "command"]], &yaml("{command: ls}"), "execute").unwrap();
    }

    #[test]
    fn menu_options_accept_maps_and_strings() {
        let options = menu_options(&yaml("[{en: English}, {fr: Français}, de]")).unwrap();
        assert_eq!(
            options,
            vec![
                ("en".to_string(), "English".to_string()),
                ("fr".to_string(), "Français".to_string()),
                ("de".to_string(), "de".to_string()),
            ]
        );
        assert!(menu_options(&yaml("en")).is_err());
    }

    #[test]
    fn flags_follow_yaml_strings() {
        let data = yaml("{merge: 'false', optional: true, nomerge: ~}");
        assert!(!param_bool(&data, "merge", true));
        assert!(param_bool(&data, "optional", false));
        assert!(param_bool(&data, "missing", true));
        assert!(has_param(&data, "nomerge"));
    }
}
