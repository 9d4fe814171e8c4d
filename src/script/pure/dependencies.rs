// Parsing of `requires` / `require-binaries` expressions (no I/O)

/// One entry of a dependency list: either a single name or a set of
/// alternatives where any one satisfies the requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dependency {
    Single(String),
    AnyOf(Vec<String>),
}

impl Dependency {
    pub fn options(&self) -> Vec<&str> {
        match self {
            Dependency::Single(name) => vec![name.as_str()],
            Dependency::AnyOf(names) => names.iter().map(String::as_str).collect(),
        }
    }

    pub fn display(&self) -> String {
        self.options().join(" or ")
    }
}

/// Parse `quake-steam | quake-gog, some-quake-mod` into
/// `[AnyOf([quake-steam, quake-gog]), Single(some-quake-mod)]`.
/// Commas separate requirements, pipes separate alternatives.
pub fn unpack_dependencies(expr: &str) -> Vec<Dependency> {
    expr.split(',')
        .filter_map(|dep| {
            if dep.contains('|') {
                let options: Vec<String> = dep
                    .split('|')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(String::from)
                    .collect();
                (!options.is_empty()).then_some(Dependency::AnyOf(options))
            } else {
                let dep = dep.trim();
                (!dep.is_empty()).then(|| Dependency::Single(dep.to_string()))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpacks_alternatives_and_singles() {
        assert_eq!(
            unpack_dependencies("quake-steam | quake-gog, some-quake-mod"),
            vec![
                Dependency::AnyOf(vec!["quake-steam".into(), "quake-gog".into()]),
                Dependency::Single("some-quake-mod".into()),
            ]
        );
    }

    #[test]
    fn empty_entries_are_dropped() {
        assert!(unpack_dependencies("").is_empty());
        assert_eq!(unpack_dependencies(" a ,, "), vec![Dependency::Single("a".into())]);
    }

    #[test]
    fn display_joins_alternatives() {
        let dep = Dependency::AnyOf(vec!["7z".into(), "unrar".into()]);
        assert_eq!(dep.display(), "7z or unrar");
    }
}
