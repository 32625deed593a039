use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::config::ConfigError;

/// Project category; each tab has its own preset tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tab {
    #[default]
    Exterior,
    Interior,
    Plan,
}

impl Tab {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Exterior => "exterior",
            Tab::Interior => "interior",
            Tab::Plan => "plan",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Tab::Exterior, Tab::Interior, Tab::Plan]
            .into_iter()
            .find(|tab| tab.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown tab '{}' (expected exterior, interior or plan)", s))
    }
}

/// A canned prompt, or a group of them when `children` is non-empty
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Preset {
    pub id: String,
    pub label: String,
    pub subtitle: String,
    pub prompt: String,
    pub children: Vec<Preset>,
}

impl Preset {
    pub fn is_group(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Depth-first search of a preset forest for the prompt of `id`.
///
/// Visits nodes in display order (a group before its children, children
/// before the next sibling). Empty prompts count as not found.
pub fn find_prompt<'a>(presets: &'a [Preset], id: &str) -> Option<&'a str> {
    let mut stack: Vec<&Preset> = presets.iter().rev().collect();
    while let Some(preset) = stack.pop() {
        if preset.id == id {
            return Some(preset.prompt.as_str()).filter(|prompt| !prompt.trim().is_empty());
        }
        stack.extend(preset.children.iter().rev());
    }
    None
}

/// Preset trees for every tab
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PresetLibrary {
    pub exterior: Vec<Preset>,
    pub interior: Vec<Preset>,
    pub plan: Vec<Preset>,
}

impl PresetLibrary {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let library: Self = serde_json::from_str(&json)?;
        log::info!(
            "Loaded presets from {}: {} exterior, {} interior, {} plan groups",
            path.display(),
            library.exterior.len(),
            library.interior.len(),
            library.plan.len()
        );
        Ok(library)
    }

    pub fn for_tab(&self, tab: Tab) -> &[Preset] {
        match tab {
            Tab::Exterior => &self.exterior,
            Tab::Interior => &self.interior,
            Tab::Plan => &self.plan,
        }
    }

    pub fn find_prompt(&self, tab: Tab, id: &str) -> Option<&str> {
        find_prompt(self.for_tab(tab), id)
    }
}
