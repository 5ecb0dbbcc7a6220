//! Finding property-set definitions and moving them into the registry.
//!
//! Sets are defined directly inside a top-level `:root` rule, either as a
//! custom property whose value is a block,
//!
//! ```css
//! :root {
//!   --toolbar-theme: {
//!     color: green;
//!   }
//! }
//! ```
//!
//! or as a rule whose selector is the set name (`--toolbar-theme { ... }`).
//! Definitions anywhere else are reported and skipped.

use std::collections::VecDeque;

use css_apply_syntax::{
    balanced, Delimiter, Document, NodeId, NodeKind, ParseError, Raws, SourceLocation,
};

use crate::diagnostics::WarningKind;
use crate::error::{Error, Result};
use crate::logging::targets;
use crate::name::{is_set_body, set_name};
use crate::pass::PropertySets;

/// Selector of the rule that property sets are defined in.
pub const ROOT_SELECTOR: &str = ":root";

impl PropertySets {
    /// Register the sets supplied through [`ApplyOptions::sets`].
    ///
    /// Names that are already registered are left alone, so running this
    /// again never undoes a definition taken from the document.
    ///
    /// [`ApplyOptions::sets`]: crate::ApplyOptions::sets
    pub fn register_predefined(&mut self, doc: &mut Document) -> Result<()> {
        let predefined: Vec<(String, String)> = self
            .options
            .sets
            .iter()
            .map(|(name, body)| (name.clone(), body.clone()))
            .collect();

        for (name, body) in predefined {
            let key = name.strip_prefix("--").unwrap_or(&name);
            // Already registered by an earlier run, or replaced by the document.
            if self.registry.contains(key) {
                continue;
            }
            if set_name(&format!("--{key}")).is_none() {
                return Err(Error::InvalidSetName(name));
            }
            let fragment = doc.parse_fragment(&body).map_err(|source| Error::PredefinedSet {
                name: key.to_owned(),
                source,
            })?;
            let set = build_set(doc, key, fragment, None)?;
            self.store(doc, key, set)?;
        }
        Ok(())
    }

    /// Extract every declaration-form set (`--name: { ... }`) in the document.
    pub fn extract_declarations(&mut self, doc: &mut Document) -> Result<()> {
        for decl in doc.declarations(doc.root())? {
            if doc.is_attached(decl) {
                self.collect_declaration(doc, decl)?;
            }
        }
        Ok(())
    }

    /// Extract every rule-form set (`--name { ... }`) in the document.
    pub fn extract_rules(&mut self, doc: &mut Document) -> Result<()> {
        for rule in doc.rules(doc.root())? {
            if doc.is_attached(rule) {
                self.collect_rule(doc, rule)?;
            }
        }
        Ok(())
    }

    fn collect_declaration(&mut self, doc: &mut Document, decl: NodeId) -> Result<()> {
        let Some((name, value)) = set_definition(doc, decl) else {
            return Ok(());
        };
        let Some(scope) = doc.parent(decl)? else {
            return Ok(());
        };
        if !self.accept_scope(doc, decl, &name, scope)? {
            return Ok(());
        }

        let source = doc.source(decl)?;
        let expansion = match expand(doc, &name, &value, source) {
            Ok(expansion) => expansion,
            Err(Error::Syntax(err)) => {
                self.diagnostics.warn(
                    WarningKind::MalformedSet,
                    format!("Custom property set ignored: --{name} could not be parsed ({err})"),
                    source,
                );
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        remove_comment_before(doc, decl)?;
        for (name, set) in expansion.sets {
            self.store(doc, &name, set)?;
        }

        // Whatever followed the set body inside the same value becomes a
        // sibling, unless the scope already has an equivalent node.
        let mut anchor = decl;
        for node in expansion.trailing {
            if has_matching_child(doc, scope, node)? {
                doc.destroy(node)?;
            } else {
                doc.insert_after(anchor, node)?;
                anchor = node;
            }
        }

        doc.remove(decl)?;
        settle_scope(doc, scope)
    }

    fn collect_rule(&mut self, doc: &mut Document, rule: NodeId) -> Result<()> {
        let Some(name) = doc
            .as_rule(rule)
            .and_then(|r| set_name(&r.selector))
            .map(str::to_owned)
        else {
            return Ok(());
        };
        let Some(scope) = doc.parent(rule)? else {
            return Ok(());
        };
        if !self.accept_scope(doc, rule, &name, scope)? {
            return Ok(());
        }

        let set = doc.deep_clone(rule)?;
        self.store(doc, &name, set)?;
        if self.options.preserve {
            return Ok(());
        }

        remove_comment_before(doc, rule)?;
        doc.remove(rule)?;
        settle_scope(doc, scope)
    }

    /// Check that a definition sits directly inside `:root`.
    ///
    /// A misplaced definition is reported. At the top level of the document
    /// it is also removed, since nothing could ever apply it.
    fn accept_scope(
        &mut self,
        doc: &mut Document,
        node: NodeId,
        name: &str,
        scope: NodeId,
    ) -> Result<bool> {
        if doc
            .as_rule(scope)
            .is_some_and(|rule| rule.selector == ROOT_SELECTOR)
        {
            return Ok(true);
        }

        let declared_in = doc
            .as_rule(scope)
            .map(|rule| format!(" declared in {}", rule.selector))
            .unwrap_or_default();
        self.diagnostics.warn(
            WarningKind::MisplacedSet,
            format!(
                "Custom property set ignored: not scoped to top-level `:root` (--{name}{declared_in})"
            ),
            doc.source(node)?,
        );

        if doc.is_root_kind(scope) {
            doc.remove(node)?;
        }
        Ok(false)
    }
}

/// Sets and sibling nodes parsed out of one declaration-form definition.
#[derive(Debug, Default)]
struct Expansion {
    sets: Vec<(String, NodeId)>,
    trailing: Vec<NodeId>,
}

impl Expansion {
    fn discard(self, doc: &mut Document) -> Result<()> {
        for (_, set) in self.sets {
            doc.destroy(set)?;
        }
        for node in self.trailing {
            doc.destroy(node)?;
        }
        Ok(())
    }
}

/// Parse a declaration-form definition without touching the tree it came from.
///
/// The parser keeps everything up to the next `;` in a custom property's
/// value, so a value may hold more than the set body. Text after the body is
/// parsed as well: further set definitions are expanded in turn and any
/// other nodes are returned as trailing siblings.
fn expand(
    doc: &mut Document,
    name: &str,
    value: &str,
    source: Option<SourceLocation>,
) -> Result<Expansion> {
    let mut expansion = Expansion::default();
    match expand_into(doc, &mut expansion, name, value, source) {
        Ok(()) => Ok(expansion),
        Err(err) => {
            expansion.discard(doc)?;
            Err(err)
        }
    }
}

fn expand_into(
    doc: &mut Document,
    expansion: &mut Expansion,
    name: &str,
    value: &str,
    source: Option<SourceLocation>,
) -> Result<()> {
    let mut pending = VecDeque::from([(name.to_owned(), value.to_owned())]);

    while let Some((name, value)) = pending.pop_front() {
        let Some(split) = balanced(&value, Delimiter::Brace) else {
            let location = source.unwrap_or_default();
            return Err(ParseError::at("Unclosed property set body", location).into());
        };

        let body = doc.parse_fragment(split.body)?;
        let set = build_set(doc, &name, body, source)?;
        doc.restamp(set, source)?;
        tracing::trace!(target: targets::EXTRACT, %name, "parsed set body");
        expansion.sets.push((name, set));

        if split.post.trim().is_empty() {
            continue;
        }
        let post = doc.parse_fragment(split.post)?;
        for node in doc.children(post)?.to_vec() {
            doc.detach(node)?;
            doc.restamp(node, source)?;
            match set_definition(doc, node) {
                Some(next) => {
                    pending.push_back(next);
                    doc.destroy(node)?;
                }
                None => expansion.trailing.push(node),
            }
        }
        doc.destroy(post)?;
    }
    Ok(())
}

/// Name and value of a declaration that defines a set.
fn set_definition(doc: &Document, node: NodeId) -> Option<(String, String)> {
    let decl = doc.as_declaration(node)?;
    let name = set_name(&decl.prop)?;
    is_set_body(&decl.value).then(|| (name.to_owned(), decl.value.clone()))
}

/// Move a parsed fragment's children into a new, detached set rule.
pub(crate) fn build_set(
    doc: &mut Document,
    name: &str,
    fragment: NodeId,
    source: Option<SourceLocation>,
) -> Result<NodeId> {
    let fragment_raws = doc.raws(fragment)?.clone();
    let set = doc.create(
        NodeKind::rule(format!("--{name}")),
        Raws {
            semicolon: fragment_raws.semicolon,
            after: fragment_raws.after,
            ..Default::default()
        },
        source,
    );
    for child in doc.children(fragment)?.to_vec() {
        doc.append(set, child)?;
    }
    doc.destroy(fragment)?;
    Ok(set)
}

/// Remove the comment directly before `node`, if there is one.
fn remove_comment_before(doc: &mut Document, node: NodeId) -> Result<()> {
    if let Some(prev) = doc.prev(node)? {
        if doc.as_comment(prev).is_some() {
            doc.remove(prev)?;
        }
    }
    Ok(())
}

/// Check if `scope` already has a child equivalent to `node`.
fn has_matching_child(doc: &Document, scope: NodeId, node: NodeId) -> Result<bool> {
    let kind = doc.kind(node)?;
    for &child in doc.children(scope)? {
        let same = match (doc.kind(child)?, kind) {
            (NodeKind::Declaration(a), NodeKind::Declaration(b)) => a.prop == b.prop,
            (NodeKind::Rule(a), NodeKind::Rule(b)) => a.selector == b.selector,
            (NodeKind::AtRule(a), NodeKind::AtRule(b)) => {
                a.name == b.name && a.params == b.params
            }
            (NodeKind::Comment(a), NodeKind::Comment(b)) => a.text == b.text,
            _ => false,
        };
        if same {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Tidy a scope after a definition has been taken out of it.
///
/// An empty scope is removed. Otherwise the scope's last child is terminated
/// and the closing brace goes on its own line, unless that child is a rule
/// that carries its own `;`.
fn settle_scope(doc: &mut Document, scope: NodeId) -> Result<()> {
    let Some(last) = doc.last_child(scope)? else {
        tracing::debug!(target: targets::EXTRACT, "removing emptied scope");
        doc.remove(scope)?;
        return Ok(());
    };
    let terminated = doc.as_rule(last).is_some() && doc.raws(last)?.own_semicolon.is_some();
    if !terminated {
        let raws = doc.raws_mut(scope)?;
        raws.semicolon = true;
        raws.after = "\n".to_owned();
    }
    Ok(())
}
