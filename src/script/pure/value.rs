// Helpers for loosely typed YAML values (no I/O)

use serde_yaml::Value;

/// Render a scalar as a string. Scripts freely mix `appid: 220` and
/// `appid: "220"`, both are the same thing to the installer.
pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => value_to_string(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

pub fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// YAML truthiness: empty strings, zero, null and empty collections are false
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Sequence(seq) => !seq.is_empty(),
        Value::Mapping(map) => !map.is_empty(),
        Value::Tagged(tagged) => is_truthy(&tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_render_as_strings() {
        assert_eq!(value_to_string(&Value::from("abc")), Some("abc".to_string()));
        assert_eq!(value_to_string(&Value::from(220)), Some("220".to_string()));
        assert_eq!(value_to_string(&Value::from(true)), Some("true".to_string()));
        assert_eq!(value_to_string(&Value::Null), None);
    }

    #[test]
    fn integers_parse_from_strings() {
        assert_eq!(value_as_i64(&Value::from("1996")), Some(1996));
        assert_eq!(value_as_i64(&Value::from(7)), Some(7));
        assert_eq!(value_as_i64(&Value::from("n/a")), None);
    }

    #[test]
    fn truthiness_follows_yaml_values() {
        assert!(!is_truthy(&Value::from("")));
        assert!(!is_truthy(&Value::from(0)));
        assert!(is_truthy(&Value::from("yes")));
        assert!(!is_truthy(&Value::Null));
    }
}
