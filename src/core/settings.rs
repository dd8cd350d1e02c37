use serde::{Deserialize, Serialize};

use crate::core::{Result, ViewMode};

/* ============================== View settings =============================== */

/// Externally owned configuration, read on every projection rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    pub view_mode: ViewMode,
    pub single_select: bool,
    pub expand_all_by_default: bool,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            view_mode: ViewMode::Tree,
            single_select: true,
            expand_all_by_default: true,
        }
    }
}

impl ViewSettings {
    #[must_use]
    pub fn new(view_mode: ViewMode, single_select: bool) -> Self {
        Self {
            view_mode,
            single_select,
            ..Self::default()
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
