//! Replacing `@apply` references with the contents of property sets.

use std::collections::HashSet;
use std::sync::OnceLock;

use css_apply_syntax::{Document, NodeId, NodeKind};
use regex::{NoExpand, Regex};

use crate::diagnostics::WarningKind;
use crate::error::Result;
use crate::logging::targets;
use crate::name::reference_name;
use crate::pass::PropertySets;

/// Name of the at-rule that applies a set.
pub const APPLY: &str = "apply";

static INDENT: OnceLock<Regex> = OnceLock::new();

/// A run of two or more horizontal whitespace characters.
fn indent_pattern() -> &'static Regex {
    INDENT.get_or_init(|| Regex::new(r"[^\S\n\r]{2,}").expect("indent pattern is a valid regex"))
}

impl PropertySets {
    /// Replace one `@apply` in the document with the set it names.
    ///
    /// - Without an enclosing rule the reference is reported and removed.
    /// - A parameter that is not a set name leaves the reference untouched.
    /// - An unknown set is reported and the reference is left in place.
    #[tracing::instrument(skip(self, doc), target = "css_apply::resolve", level = "trace")]
    pub fn resolve(&mut self, doc: &mut Document, apply: NodeId) -> Result<()> {
        let Some(params) = doc
            .as_at_rule(apply)
            .filter(|at_rule| at_rule.name == APPLY)
            .map(|at_rule| at_rule.params.clone())
        else {
            return Ok(());
        };

        if !has_rule_ancestor(doc, apply)? {
            self.diagnostics.warn(
                WarningKind::OrphanedApply,
                "The @apply rule can only be declared inside Rule type nodes.",
                doc.source(apply)?,
            );
            doc.remove(apply)?;
            return Ok(());
        }

        let Some(name) = reference_name(&params) else {
            return Ok(());
        };
        if !self.registry.contains(name) {
            self.diagnostics.warn(
                WarningKind::UnknownSet,
                format!("No custom property set declared for `{name}`."),
                doc.source(apply)?,
            );
            return Ok(());
        }
        self.substitute(doc, apply, name)
    }

    /// Flatten `@apply` inside every registered set.
    ///
    /// Sets are visited in registry order and each referenced set is
    /// flattened before it is copied, so a chain resolves fully whatever the
    /// definition order. Inside a set, references that cannot be resolved are
    /// removed: unknown names and cycles are reported, parameters that are
    /// not set names are dropped silently.
    pub fn resolve_nested(&mut self, doc: &mut Document) -> Result<()> {
        let names: Vec<String> = self.registry.names().map(str::to_owned).collect();
        let mut chain = Vec::new();
        let mut flattened = HashSet::new();
        for name in names {
            self.flatten(doc, &name, &mut chain, &mut flattened)?;
        }
        Ok(())
    }

    fn flatten(
        &mut self,
        doc: &mut Document,
        name: &str,
        chain: &mut Vec<String>,
        flattened: &mut HashSet<String>,
    ) -> Result<()> {
        if flattened.contains(name) {
            return Ok(());
        }
        let Some(set) = self.registry.get(name) else {
            return Ok(());
        };

        chain.push(name.to_owned());
        for apply in doc.at_rules(set, APPLY)? {
            let Some(params) = doc.as_at_rule(apply).map(|at_rule| at_rule.params.clone()) else {
                continue;
            };
            let Some(target) = reference_name(&params).map(str::to_owned) else {
                doc.remove(apply)?;
                continue;
            };

            if chain.contains(&target) {
                let cycle = chain
                    .iter()
                    .chain(std::iter::once(&target))
                    .map(|name| format!("--{name}"))
                    .collect::<Vec<_>>()
                    .join(" -> ");
                self.diagnostics.warn(
                    WarningKind::CircularApply,
                    format!("Circular @apply ignored: {cycle}"),
                    doc.source(apply)?,
                );
                doc.remove(apply)?;
                continue;
            }
            if !self.registry.contains(&target) {
                self.diagnostics.warn(
                    WarningKind::UnknownSet,
                    format!("No custom property set declared for `{target}`."),
                    doc.source(apply)?,
                );
                doc.remove(apply)?;
                continue;
            }

            self.flatten(doc, &target, chain, flattened)?;
            self.substitute(doc, apply, &target)?;
        }
        chain.pop();
        flattened.insert(name.to_owned());
        Ok(())
    }

    /// Put a copy of the set's children where `apply` is.
    fn substitute(&mut self, doc: &mut Document, apply: NodeId, name: &str) -> Result<()> {
        let Some(set) = self.registry.get(name) else {
            return Ok(());
        };
        let copy = doc.deep_clone(set)?;
        clean_indent(doc, copy)?;
        let nodes = doc.children(copy)?.to_vec();
        doc.replace_with(apply, &nodes)?;
        doc.destroy(copy)?;
        tracing::debug!(target: targets::RESOLVE, %name, nodes = nodes.len(), "applied property set");
        Ok(())
    }
}

fn has_rule_ancestor(doc: &Document, node: NodeId) -> Result<bool> {
    let mut current = doc.parent(node)?;
    while let Some(ancestor) = current {
        if matches!(doc.kind(ancestor)?, NodeKind::Rule(_)) {
            return Ok(true);
        }
        current = doc.parent(ancestor)?;
    }
    Ok(false)
}

/// Re-indent the declarations of a copied set for their new home.
///
/// The first run of horizontal whitespace in each declaration's leading
/// whitespace becomes two spaces plus the indentation of its parent, or just
/// two spaces when the parent has none.
fn clean_indent(doc: &mut Document, set: NodeId) -> Result<()> {
    let pattern = indent_pattern();
    for decl in doc.declarations(set)? {
        let Some(parent) = doc.parent(decl)? else {
            continue;
        };
        let replacement = match pattern.find(&doc.raws(parent)?.before) {
            Some(indent) => format!("  {}", indent.as_str()),
            None => "  ".to_owned(),
        };
        let before = pattern
            .replace(&doc.raws(decl)?.before, NoExpand(&replacement))
            .into_owned();
        doc.raws_mut(decl)?.before = before;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ApplyOptions;

    fn run(css: &str) -> (String, PropertySets) {
        let mut doc = Document::parse(css).unwrap();
        let mut sets = PropertySets::new(ApplyOptions::default());
        sets.run(&mut doc).unwrap();
        (doc.to_css(), sets)
    }

    fn flattened(css: &str, name: &str) -> (String, PropertySets) {
        let mut doc = Document::parse(css).unwrap();
        let mut sets = PropertySets::new(ApplyOptions::default());
        sets.prepare(&mut doc).unwrap();
        let body = sets.set_css(&doc, name).unwrap().unwrap();
        (body, sets)
    }

    #[test]
    fn applies_set() {
        let (css, sets) = run(":root {\n  --a: {\n    color: red;\n  }\n}\n.x {\n  @apply --a;\n}\n");
        assert_eq!(css, ".x {\n  color: red;\n}\n");
        assert!(sets.diagnostics().is_empty());
    }

    #[test]
    fn parenthesized_reference() {
        let (css, _) = run(":root {\n  --a: {\n    color: red;\n  }\n}\n.x {\n  @apply (--a);\n}\n");
        assert_eq!(css, ".x {\n  color: red;\n}\n");
    }

    #[test]
    fn unknown_set_is_left_in_place() {
        let css = ".x {\n  @apply --missing;\n}";
        let (out, sets) = run(css);
        assert_eq!(out, css);
        let warnings = sets.diagnostics().warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::UnknownSet);
        assert_eq!(warnings[0].text, "No custom property set declared for `missing`.");
    }

    #[test]
    fn non_set_parameter_is_ignored() {
        let css = ".x {\n  @apply blaa;\n}";
        let (out, sets) = run(css);
        assert_eq!(out, css);
        assert!(sets.diagnostics().is_empty());
    }

    #[test]
    fn orphaned_reference_is_removed() {
        let (out, sets) = run(":root {\n  --a: {\n    color: red;\n  }\n}\n@media screen {\n  @apply --a;\n}\n");
        assert_eq!(out, "@media screen {\n}\n");
        assert_eq!(sets.diagnostics().count(WarningKind::OrphanedApply), 1);
        assert_eq!(
            sets.diagnostics().warnings()[0].text,
            "The @apply rule can only be declared inside Rule type nodes."
        );
    }

    #[test]
    fn reference_inside_at_rule_inside_rule() {
        let (out, _) = run(":root {\n  --a: {\n    color: red;\n  }\n}\n.x {\n  @media screen {\n    @apply --a;\n  }\n}\n");
        assert_eq!(out, ".x {\n  @media screen {\n  color: red;\n  }\n}\n");
    }

    #[test]
    fn each_use_gets_its_own_copy() {
        let (out, _) = run(":root {\n  --a: {\n    color: red;\n  }\n}\n.x {\n  @apply --a;\n}\n.y {\n  @apply --a;\n}\n");
        assert_eq!(out, ".x {\n  color: red;\n}\n.y {\n  color: red;\n}\n");
    }

    #[test]
    fn nested_reference_is_flattened() {
        let (body, sets) = flattened(
            ":root {\n  --b: {\n    @apply --a;\n    margin: 0;\n  }\n  --a: {\n    color: red;\n  }\n}",
            "b",
        );
        assert_eq!(body, "\n  color: red;\n    margin: 0;");
        assert!(sets.diagnostics().is_empty());
    }

    #[test]
    fn nested_chain_resolves_fully() {
        let (body, _) = flattened(
            ":root {\n  --c: {\n    @apply --b;\n  }\n  --b: {\n    @apply --a;\n  }\n  --a: {\n    color: red;\n  }\n}",
            "c",
        );
        assert_eq!(body, "\n  color: red;");
    }

    #[test]
    fn cycle_is_reported_once_and_removed() {
        let (body, sets) = flattened(
            ":root {\n  --a: {\n    @apply --b;\n    color: red;\n  }\n  --b: {\n    @apply --a;\n    margin: 0;\n  }\n}",
            "a",
        );
        assert_eq!(body, "\n  margin: 0;\n    color: red;");
        let warnings = sets.diagnostics().warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::CircularApply);
        assert_eq!(warnings[0].text, "Circular @apply ignored: --a -> --b -> --a");
    }

    #[test]
    fn self_reference() {
        let (body, sets) = flattened(":root {\n  --a: {\n    @apply --a;\n    color: red;\n  }\n}", "a");
        assert_eq!(body, "\n    color: red;");
        assert_eq!(sets.diagnostics().count(WarningKind::CircularApply), 1);
    }

    #[test]
    fn unknown_nested_reference_is_removed() {
        let (body, sets) = flattened(
            ":root {\n  --a: {\n    @apply --nope;\n    @apply nope;\n    color: red;\n  }\n}",
            "a",
        );
        assert_eq!(body, "\n    color: red;");
        assert_eq!(sets.diagnostics().count(WarningKind::UnknownSet), 1);
    }

    #[test]
    fn indent_follows_parent() {
        let mut doc =
            Document::parse(".x {\n    @media y {\n        color: red;\n    }\n    margin: 0;\n}")
                .unwrap();
        let rule = doc.children(doc.root()).unwrap()[0];
        clean_indent(&mut doc, rule).unwrap();
        assert_eq!(
            doc.to_css(),
            ".x {\n    @media y {\n      color: red;\n    }\n  margin: 0;\n}"
        );
    }
}
