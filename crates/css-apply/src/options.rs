//! Processing options.
//!
//! Options can be built in code or read from a TOML file:
//!
//! ```toml
//! preserve = true
//!
//! [sets]
//! "--brand" = "color: tomato; font-weight: 600;"
//! card = "padding: 8px;"
//! ```
//!
//! Names under `[sets]` may be written with or without the leading `--`.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Options controlling property-set processing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplyOptions {
    /// Keep rule-form set definitions (`--name { ... }`) in the output
    /// after registering them.
    pub preserve: bool,
    /// Property sets registered before the stylesheet is read. A set with
    /// the same name defined in the stylesheet replaces these.
    pub sets: IndexMap<String, String>,
}

impl ApplyOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether rule-form definitions are kept in the output.
    pub fn preserve(mut self, preserve: bool) -> Self {
        self.preserve = preserve;
        self
    }

    /// Add a predefined set. `body` is the CSS that goes between the braces.
    pub fn with_set(mut self, name: impl Into<String>, body: impl Into<String>) -> Self {
        self.sets.insert(name.into(), body.into());
        self
    }

    /// Parse options from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load options from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_toml_str(&content)
    }
}
