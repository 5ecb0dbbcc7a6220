//! Processing whole stylesheets.

use std::path::Path;

use css_apply_syntax::Document;

use crate::diagnostics::Warning;
use crate::error::{Error, Result};
use crate::logging::targets;
use crate::options::ApplyOptions;
use crate::pass::PropertySets;

/// The result of processing a stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Processed {
    /// The transformed stylesheet.
    pub css: String,
    /// Everything that was reported along the way.
    pub warnings: Vec<Warning>,
}

/// Extract property sets from `css` and resolve every `@apply` in it.
///
/// Fails only if `css` cannot be parsed or a predefined set in `options` is
/// invalid. Problems with the sets themselves end up in
/// [`Processed::warnings`].
///
/// # Example
///
/// ```
/// use css_apply::{process, ApplyOptions};
///
/// let css = ":root {\n  --theme: {\n    color: green;\n  }\n}\n.a {\n  @apply --theme;\n}\n";
/// let processed = process(css, &ApplyOptions::default()).unwrap();
///
/// assert_eq!(processed.css, ".a {\n  color: green;\n}\n");
/// assert!(processed.warnings.is_empty());
/// ```
#[tracing::instrument(skip_all, target = "css_apply::process", fields(bytes = css.len()))]
pub fn process(css: &str, options: &ApplyOptions) -> Result<Processed> {
    let mut document = Document::parse(css)?;
    let mut sets = PropertySets::new(options.clone());
    sets.run(&mut document)?;

    let warnings = sets.into_diagnostics().into_warnings();
    tracing::debug!(target: targets::PROCESS, warnings = warnings.len(), "processed stylesheet");
    Ok(Processed {
        css: document.to_css(),
        warnings,
    })
}

/// Read a stylesheet from disk and [`process`] it.
pub fn process_file(path: impl AsRef<Path>, options: &ApplyOptions) -> Result<Processed> {
    let path = path.as_ref();
    let css = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    tracing::debug!(target: targets::PROCESS, path = %path.display(), "read stylesheet");
    process(&css, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untouched_without_sets() {
        let css = "a {\n  color: red;\n}\n\n/* x */\n@media print { b { margin: 0 } }\n";
        let processed = process(css, &ApplyOptions::default()).unwrap();
        assert_eq!(processed.css, css);
        assert!(processed.warnings.is_empty());
    }

    #[test]
    fn parse_errors_are_fatal() {
        let err = process("a { color: red; } }", &ApplyOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Syntax(_)));
    }

    #[test]
    fn missing_file() {
        let err = process_file("/no/such/file.css", &ApplyOptions::default()).unwrap_err();
        match err {
            Error::Io { path, .. } => assert_eq!(path, Path::new("/no/such/file.css")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
