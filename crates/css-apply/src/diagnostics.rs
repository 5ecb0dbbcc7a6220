//! Non-fatal diagnostics.
//!
//! Problems found while extracting or resolving property sets never stop
//! processing. They are collected as [`Warning`]s and logged at `warn` level
//! under the subsystem's target.

use std::fmt;

use css_apply_syntax::SourceLocation;

use crate::logging::targets;

/// What a warning is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningKind {
    /// A set was defined somewhere other than directly inside `:root`.
    MisplacedSet,
    /// An `@apply` names a set that was never defined.
    UnknownSet,
    /// An `@apply` has no enclosing rule.
    OrphanedApply,
    /// A set applies itself, directly or through other sets.
    CircularApply,
    /// A declaration-form set body could not be parsed.
    MalformedSet,
}

impl WarningKind {
    /// Stable identifier for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MisplacedSet => "misplaced-set",
            Self::UnknownSet => "unknown-set",
            Self::OrphanedApply => "orphaned-apply",
            Self::CircularApply => "circular-apply",
            Self::MalformedSet => "malformed-set",
        }
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// What the warning is about.
    pub kind: WarningKind,
    /// Human-readable message.
    pub text: String,
    /// Where the offending node started, if known.
    pub source: Option<SourceLocation>,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.source {
            Some(source) => write!(f, "css-apply: {}: {}", source, self.text),
            None => write!(f, "css-apply: {}", self.text),
        }
    }
}

/// Collects warnings for one processing pass.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record and log a warning.
    pub(crate) fn warn(
        &mut self,
        kind: WarningKind,
        text: impl Into<String>,
        source: Option<SourceLocation>,
    ) {
        let text = text.into();
        let location = source.map(|s| s.to_string()).unwrap_or_default();
        match kind {
            WarningKind::MisplacedSet | WarningKind::MalformedSet => {
                tracing::warn!(target: targets::EXTRACT, %kind, %location, "{}", text)
            }
            _ => tracing::warn!(target: targets::RESOLVE, %kind, %location, "{}", text),
        }
        self.warnings.push(Warning { kind, text, source });
    }

    /// All warnings, in the order they were raised.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Take ownership of the warnings.
    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }

    /// Number of warnings of the given kind.
    pub fn count(&self, kind: WarningKind) -> usize {
        self.warnings.iter().filter(|w| w.kind == kind).count()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }
}
