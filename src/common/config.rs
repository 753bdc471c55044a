use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::attachment::{AttachmentOption, AttachmentParameters};
use crate::common::collections::BTreeMap;
use crate::common::log;

pub const FALLBACK_REPEAT_DELAY: u32 = 400;
pub const FALLBACK_REPEAT_INTERVAL: u32 = 80;

pub fn config_file() -> PathBuf {
    dirs::config_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("winseat.toml")
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    /// Named placements, selectable with `winseat place --preset`.
    #[serde(default)]
    pub presets: BTreeMap<String, AttachmentParameters>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Whether the compositor offers touchpad swipe and pinch gestures.
    #[serde(default = "yes")]
    pub pointer_gestures: bool,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Desktop keyboard settings. Repeat info sent by the compositor takes
    /// precedence; without either the fallback timings apply.
    #[serde(default)]
    pub keyboard: Option<KeyboardSettings>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            pointer_gestures: true,
            log_filter: default_log_filter(),
            keyboard: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
#[serde(deny_unknown_fields)]
pub struct KeyboardSettings {
    #[serde(default = "yes")]
    pub repeat: bool,
    /// Milliseconds before the first repeat.
    #[serde(default = "default_repeat_delay")]
    pub delay: u32,
    /// Milliseconds between repeats.
    #[serde(default = "default_repeat_interval")]
    pub repeat_interval: u32,
}

impl Default for KeyboardSettings {
    fn default() -> Self {
        KeyboardSettings {
            repeat: true,
            delay: FALLBACK_REPEAT_DELAY,
            repeat_interval: FALLBACK_REPEAT_INTERVAL,
        }
    }
}

impl KeyboardSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.repeat && self.delay == 0 {
            issues.push("keyboard.delay must be greater than 0 when repeat is enabled".to_string());
        }
        if self.repeat && self.repeat_interval == 0 {
            issues.push(
                "keyboard.repeat_interval must be greater than 0 when repeat is enabled".to_string(),
            );
        }
        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;
        if self.repeat && self.delay == 0 {
            self.delay = FALLBACK_REPEAT_DELAY;
            fixes += 1;
        }
        if self.repeat && self.repeat_interval == 0 {
            self.repeat_interval = FALLBACK_REPEAT_INTERVAL;
            fixes += 1;
        }
        fixes
    }
}

impl Settings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if !log::is_valid_filter(&self.log_filter) {
            issues.push(format!("log_filter {:?} is not a valid filter directive", self.log_filter));
        }
        if let Some(keyboard) = &self.keyboard {
            issues.extend(keyboard.validate());
        }
        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;
        if !log::is_valid_filter(&self.log_filter) {
            self.log_filter = default_log_filter();
            fixes += 1;
        }
        if let Some(keyboard) = &mut self.keyboard {
            fixes += keyboard.auto_fix_values();
        }
        fixes
    }
}

fn validate_preset(name: &str, params: &AttachmentParameters) -> Vec<String> {
    let mut issues = Vec::new();
    if params.rectangle().is_some() {
        issues.push(format!("preset {name}: rectangle is supplied per placement and is ignored here"));
    }
    for (list, options) in [("primary", params.primary_options()), ("secondary", params.secondary_options())] {
        if options.is_empty() {
            issues.push(format!("preset {name}: {list} options are empty"));
        }
        if let Some(first) = options.first().filter(|o| o.is_force_last()) {
            issues.push(format!("preset {name}: {list} options start with {first}"));
        }
        if options.contains(&AttachmentOption::EndOptions) {
            issues.push(format!("preset {name}: {list} options contain end_options"));
        }
    }
    if let Some(option) = params.primary_options().iter().find(|o| o.is_if_primary_forced()) {
        issues.push(format!("preset {name}: {option} is only meaningful in secondary options"));
    }
    issues
}

fn yes() -> bool { true }

fn default_log_filter() -> String { "warn".to_string() }

fn default_repeat_delay() -> u32 { FALLBACK_REPEAT_DELAY }

fn default_repeat_interval() -> u32 { FALLBACK_REPEAT_INTERVAL }

impl Config {
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let buf = std::fs::read_to_string(path)?;
        Self::parse(&buf)
    }

    pub fn default() -> Config {
        Self::parse(include_str!("../../winseat.default.toml")).expect("default config is valid")
    }

    /// Save the current config to a file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, toml_string.as_bytes())?;

        Ok(())
    }

    /// Validates the entire configuration and returns a list of issues found.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = self.settings.validate();
        for (name, params) in &self.presets {
            issues.extend(validate_preset(name, params));
        }
        issues
    }

    /// Attempts to fix configuration values automatically.
    /// Returns the number of fixes applied.
    pub fn auto_fix_values(&mut self) -> usize { self.settings.auto_fix_values() }

    pub fn preset(&self, name: &str) -> anyhow::Result<&AttachmentParameters> {
        match self.presets.get(name) {
            Some(params) => Ok(params),
            None => anyhow::bail!("Unknown preset: {name}"),
        }
    }

    pub fn parse(buf: &str) -> anyhow::Result<Config> {
        let config: Config = toml::from_str(buf)?;
        Ok(config)
    }
}
