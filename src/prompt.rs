//! User interaction during an install
//!
//! Directives that need an answer from the user (`input_menu`,
//! `insert_disc`, files marked `N/A`) go through a [`Prompter`]. Answers
//! given on the command line are always consulted first.

use crate::error::{Error, Result, ScriptingError};

use dialoguer::{Input, Select, theme::ColorfulTheme};
use std::collections::HashMap;
use std::path::PathBuf;

/// A dropdown built from an `input_menu` directive
#[derive(Debug, Clone)]
pub struct Menu<'a> {
    /// The menu `id`, answers are stored as `INPUT_<id>` when set
    pub id: Option<&'a str>,
    pub description: &'a str,
    /// (value, label) pairs in script order
    pub options: &'a [(String, String)],
    pub preselect: Option<&'a str>,
    /// Allow a free-form value besides the options
    pub entry: bool,
}

impl Menu<'_> {
    /// Key under which a preset answer for this menu is looked up
    pub fn preset_key(&self) -> &str {
        self.id.unwrap_or("INPUT")
    }

    /// The preselected option if it is one of the choices
    fn preselected(&self) -> Option<usize> {
        let preselect = self.preselect?;
        self.options.iter().position(|(value, _)| value == preselect)
    }
}

pub trait Prompter {
    /// Pick a value for an `input_menu`
    fn select_option(&mut self, menu: &Menu) -> Result<String>;

    /// Ask for a local copy of a user-provided installer file
    fn pick_file(&mut self, file_id: &str, message: &str) -> Result<PathBuf>;

    /// Ask where a disc containing `requires` is mounted. `None` aborts.
    fn locate_disc(&mut self, requires: &str, message: &str) -> Result<Option<PathBuf>>;
}

/// Answers supplied ahead of time with `--file`, `--input` and `--disc`
#[derive(Debug, Clone, Default)]
pub struct Presets {
    pub files: HashMap<String, PathBuf>,
    pub inputs: HashMap<String, String>,
    pub disc: Option<PathBuf>,
}

impl Presets {
    /// Parse `ID=VALUE` pairs from the command line
    pub fn from_args(files: &[String], inputs: &[String], disc: Option<PathBuf>) -> Result<Self> {
        let mut presets = Presets {
            disc,
            ..Default::default()
        };
        for raw in files {
            let (id, path) = split_pair(raw, "--file")?;
            presets.files.insert(id.replace('-', "_"), PathBuf::from(path));
        }
        for raw in inputs {
            let (id, value) = split_pair(raw, "--input")?;
            presets.inputs.insert(id.to_string(), value.to_string());
        }
        Ok(presets)
    }

    fn menu_answer(&self, menu: &Menu) -> Option<String> {
        self.inputs.get(menu.preset_key()).cloned()
    }
}

fn split_pair<'a>(raw: &'a str, flag: &str) -> Result<(&'a str, &'a str)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key, value)),
        _ => Err(ScriptingError::with_data(format!("{} expects ID=VALUE", flag), raw).into()),
    }
}

/// Prompts on the terminal with dialoguer
pub struct TerminalPrompter {
    presets: Presets,
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new(presets: Presets) -> Self {
        Self {
            presets,
            theme: ColorfulTheme::default(),
        }
    }
}

impl Prompter for TerminalPrompter {
    fn select_option(&mut self, menu: &Menu) -> Result<String> {
        if let Some(answer) = self.presets.menu_answer(menu) {
            return Ok(answer);
        }

        let mut labels: Vec<&str> = menu.options.iter().map(|(_, label)| label.as_str()).collect();
        if menu.entry {
            labels.push("Other...");
        }

        let prompt = if menu.description.is_empty() {
            "Please choose an option"
        } else {
            menu.description
        };
        let selected = Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(&labels)
            .default(menu.preselected().unwrap_or(0))
            .interact_opt()?
            .ok_or(Error::Cancelled)?;

        match menu.options.get(selected) {
            Some((value, _)) => Ok(value.clone()),
            None => Ok(Input::<String>::with_theme(&self.theme)
                .with_prompt("Value")
                .interact_text()?),
        }
    }

    fn pick_file(&mut self, file_id: &str, message: &str) -> Result<PathBuf> {
        if let Some(path) = self.presets.files.get(file_id) {
            return Ok(path.clone());
        }

        loop {
            let answer: String = Input::with_theme(&self.theme)
                .with_prompt(format!("{} [{}]", message, file_id))
                .interact_text()?;
            let path = PathBuf::from(answer.trim());
            if path.is_file() {
                return Ok(path);
            }
            tracing::warn!("{} is not a file", path.display());
        }
    }

    fn locate_disc(&mut self, requires: &str, message: &str) -> Result<Option<PathBuf>> {
        if let Some(disc) = &self.presets.disc {
            return Ok(Some(disc.clone()));
        }

        println!("{}", message);
        let answer: String = Input::with_theme(&self.theme)
            .with_prompt(format!("Mount point containing {} (empty to abort)", requires))
            .allow_empty(true)
            .interact_text()?;
        let answer = answer.trim();
        if answer.is_empty() {
            return Ok(None);
        }
        Ok(Some(PathBuf::from(answer)))
    }
}

/// Never blocks: answers come from the presets, then the menu defaults.
/// Used with `--non-interactive` and by tests.
pub struct ScriptedPrompter {
    presets: Presets,
}

impl ScriptedPrompter {
    pub fn new(presets: Presets) -> Self {
        Self { presets }
    }
}

impl Prompter for ScriptedPrompter {
    fn select_option(&mut self, menu: &Menu) -> Result<String> {
        if let Some(answer) = self.presets.menu_answer(menu) {
            return Ok(answer);
        }
        if let Some(index) = menu.preselected() {
            return Ok(menu.options[index].0.clone());
        }
        if let Some(preselect) = menu.preselect.filter(|p| !p.is_empty() && menu.entry) {
            return Ok(preselect.to_string());
        }
        menu.options
            .first()
            .map(|(value, _)| value.clone())
            .ok_or_else(|| ScriptingError::new("Menu has no options to choose from").into())
    }

    fn pick_file(&mut self, file_id: &str, message: &str) -> Result<PathBuf> {
        self.presets.files.get(file_id).cloned().ok_or_else(|| {
            ScriptingError::with_data(
                format!("No file provided for {} (use --file {}=PATH)", file_id, file_id),
                message,
            )
            .into()
        })
    }

    fn locate_disc(&mut self, _requires: &str, _message: &str) -> Result<Option<PathBuf>> {
        Ok(self.presets.disc.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Vec<(String, String)> {
        vec![
            ("en".to_string(), "English".to_string()),
            ("fr".to_string(), "French".to_string()),
        ]
    }

    fn menu<'a>(options: &'a [(String, String)], id: Option<&'a str>, preselect: Option<&'a str>) -> Menu<'a> {
        Menu {
            id,
            description: "Language",
            options,
            preselect,
            entry: false,
        }
    }

    #[test]
    fn presets_parse_id_value_pairs() {
        let presets = Presets::from_args(
            &["game-data=/tmp/setup.exe".to_string()],
            &["LANG=fr".to_string()],
            None,
        )
        .unwrap();
        assert_eq!(presets.files["game_data"], PathBuf::from("/tmp/setup.exe"));
        assert_eq!(presets.inputs["LANG"], "fr");

        assert!(Presets::from_args(&["broken".to_string()], &[], None).is_err());
    }

    #[test]
    fn scripted_prompter_prefers_preset_then_preselect_then_first() {
        let options = options();

        let mut presets = Presets::default();
        presets.inputs.insert("LANG".to_string(), "de".to_string());
        let mut prompter = ScriptedPrompter::new(presets);
        assert_eq!(prompter.select_option(&menu(&options, Some("LANG"), None)).unwrap(), "de");

        let mut prompter = ScriptedPrompter::new(Presets::default());
        assert_eq!(prompter.select_option(&menu(&options, None, Some("fr"))).unwrap(), "fr");
        assert_eq!(prompter.select_option(&menu(&options, None, None)).unwrap(), "en");
    }

    #[test]
    fn scripted_prompter_answers_anonymous_menus_from_input_key() {
        let options = options();
        let mut presets = Presets::default();
        presets.inputs.insert("INPUT".to_string(), "fr".to_string());
        let mut prompter = ScriptedPrompter::new(presets);
        assert_eq!(prompter.select_option(&menu(&options, None, None)).unwrap(), "fr");
    }

    #[test]
    fn scripted_prompter_requires_preset_files() {
        let mut prompter = ScriptedPrompter::new(Presets::default());
        let err = prompter.pick_file("setup", "Select the setup file").unwrap_err();
        assert!(err.to_string().contains("--file setup=PATH"));
        assert_eq!(prompter.locate_disc("setup.exe", "Insert disc").unwrap(), None);
    }
}
