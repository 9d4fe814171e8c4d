// Variable expansion for installer scripts (no I/O)

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

static BRACED_IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{[\w-]*\}").unwrap());

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(?:(\$)|([_A-Za-z][_A-Za-z0-9]*)|\{([_A-Za-z][_A-Za-z0-9]*)\})").unwrap()
});

/// Expand `$NAME` and `${NAME}` references in `template`.
///
/// Identifiers may contain dashes (`$my-file`), they are matched as if the
/// dashes were underscores. A template that is exactly a variable name
/// (with underscores) resolves to that variable's value. Unknown references are kept verbatim and `$$` is a literal `$`.
pub fn substitute(template: &str, variables: &HashMap<String, String>) -> String {
    let mut template = BRACED_IDENTIFIER
        .replace_all(template, |caps: &Captures| caps[0].replace('-', "_"))
        .into_owned();

    for key in variables.keys().filter(|k| k.contains('-')) {
        template = template.replace(&format!("${}", key), &format!("${}", key.replace('-', "_")));
    }

    let normalized: HashMap<String, &str> = variables
        .iter()
        .map(|(k, v)| (k.replace('-', "_"), v.as_str()))
        .collect();

    if let Some(value) = normalized.get(&template) {
        return value.to_string();
    }

    PLACEHOLDER
        .replace_all(&template, |caps: &Captures| {
            if caps.get(1).is_some() {
                return "$".to_string();
            }
            let name = caps.get(2).or_else(|| caps.get(3)).map(|m| m.as_str()).unwrap_or_default();
            match normalized.get(name) {
                Some(value) => value.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn replaces_plain_and_braced_references() {
        let v = vars(&[("GAMEDIR", "/games/quake"), ("VERSION", "1.0")]);
        assert_eq!(substitute("$GAMEDIR/id1", &v), "/games/quake/id1");
        assert_eq!(substitute("${GAMEDIR}data v${VERSION}", &v), "/games/quakedata v1.0");
    }

    #[test]
    fn unknown_references_are_left_alone() {
        let v = vars(&[("GAMEDIR", "/g")]);
        assert_eq!(substitute("$GAMEDIR/$NOPE/${ALSO_NOPE}", &v), "/g/$NOPE/${ALSO_NOPE}");
    }

    #[test]
    fn double_dollar_is_an_escape() {
        let v = vars(&[("HOME", "/home/me")]);
        assert_eq!(substitute("cost: $$5 in $HOME", &v), "cost: $5 in /home/me");
    }

    #[test]
    fn bare_identifier_resolves_to_value() {
        let v = vars(&[("setup-file", "/cache/setup.exe")]);
        assert_eq!(substitute("setup_file", &v), "/cache/setup.exe");
        // Dashes are only normalized after a `$`, a bare dashed name is text
        assert_eq!(substitute("setup-file", &v), "setup-file");
    }

    #[test]
    fn dashed_identifiers_match_in_templates() {
        let v = vars(&[("game-data", "/cache/data.zip")]);
        assert_eq!(substitute("unzip $game-data", &v), "unzip /cache/data.zip");
        assert_eq!(substitute("unzip ${game-data}", &v), "unzip /cache/data.zip");
    }

    #[test]
    fn lone_dollar_is_kept() {
        let v = vars(&[]);
        assert_eq!(substitute("price $ 5", &v), "price $ 5");
        assert_eq!(substitute("", &v), "");
    }
}
