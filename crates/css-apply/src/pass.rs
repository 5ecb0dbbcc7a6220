//! The property-set pass.

use css_apply_syntax::{Document, NodeId};

use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::logging::targets;
use crate::options::ApplyOptions;
use crate::registry::SetRegistry;
use crate::resolve::APPLY;

/// One run of property-set processing over a document.
///
/// A pass owns the registry and the diagnostics for a single document. The
/// registry entries live in that document's arena, so a pass must not be
/// reused with another document; create a new one instead.
///
/// Processing happens in two steps. [`prepare`](Self::prepare) reads every
/// definition out of the document and flattens `@apply` inside the sets.
/// [`resolve`](Self::resolve) then replaces one `@apply` at its use site and
/// can be called for each reference in any order.
///
/// # Example
///
/// ```
/// use css_apply::{ApplyOptions, PropertySets};
/// use css_apply_syntax::Document;
///
/// let mut doc = Document::parse(
///     ":root {\n  --a: {\n    color: red;\n  }\n}\n.x {\n  @apply --a;\n}\n",
/// )
/// .unwrap();
/// let mut sets = PropertySets::new(ApplyOptions::default());
/// sets.run(&mut doc).unwrap();
///
/// assert_eq!(doc.to_css(), ".x {\n  color: red;\n}\n");
/// ```
#[derive(Debug)]
pub struct PropertySets {
    pub(crate) options: ApplyOptions,
    pub(crate) registry: SetRegistry,
    pub(crate) diagnostics: Diagnostics,
}

impl PropertySets {
    /// Create a pass with the given options.
    pub fn new(options: ApplyOptions) -> Self {
        Self {
            options,
            registry: SetRegistry::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn options(&self) -> &ApplyOptions {
        &self.options
    }

    /// Sets registered so far.
    pub fn registry(&self) -> &SetRegistry {
        &self.registry
    }

    /// Warnings raised so far.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }

    /// Register predefined sets, extract the document's definitions and
    /// flatten references between sets.
    #[tracing::instrument(skip_all, target = "css_apply::process", level = "debug")]
    pub fn prepare(&mut self, doc: &mut Document) -> Result<()> {
        self.register_predefined(doc)?;
        self.extract_declarations(doc)?;
        self.extract_rules(doc)?;
        self.resolve_nested(doc)
    }

    /// Prepare the document, then resolve every `@apply` in it.
    pub fn run(&mut self, doc: &mut Document) -> Result<()> {
        self.prepare(doc)?;
        let references = doc.at_rules(doc.root(), APPLY)?;
        tracing::debug!(
            target: targets::PROCESS,
            sets = self.registry.len(),
            references = references.len(),
            "resolving references"
        );
        for apply in references {
            if doc.is_attached(apply) {
                self.resolve(doc, apply)?;
            }
        }
        Ok(())
    }

    /// Print a registered set's body, or `None` if no such set exists.
    pub fn set_css(&self, doc: &Document, name: &str) -> Result<Option<String>> {
        let Some(set) = self.registry.get(name) else {
            return Ok(None);
        };
        let mut out = String::new();
        for &child in doc.children(set)? {
            out.push_str(&doc.raws(child)?.before);
            out.push_str(&doc.stringify(child)?);
            out.push(';');
        }
        Ok(Some(out))
    }

    /// Register `set` under `name`, dropping the entry it replaces.
    pub(crate) fn store(&mut self, doc: &mut Document, name: &str, set: NodeId) -> Result<()> {
        if let Some(previous) = self.registry.insert(name, set) {
            doc.destroy(previous)?;
        }
        Ok(())
    }
}
