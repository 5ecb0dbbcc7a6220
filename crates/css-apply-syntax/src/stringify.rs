//! Printing a [`Document`] back to CSS text.

use crate::document::{Document, TreeResult};
use crate::node::{NodeId, NodeKind};

impl Document {
    /// Print the whole document.
    pub fn to_css(&self) -> String {
        // The root always exists, so this cannot fail.
        self.stringify(self.root()).unwrap_or_default()
    }

    /// Print a node and its subtree.
    ///
    /// A declaration or blockless at-rule printed on its own gets no
    /// terminating `;`; inside a container it follows the container's rules.
    pub fn stringify(&self, id: NodeId) -> TreeResult<String> {
        let mut out = String::new();
        match self.kind(id)? {
            NodeKind::Root => {
                self.body(id, &mut out)?;
                out.push_str(&self.raws(id)?.after);
            }
            _ => self.write_node(id, false, &mut out)?,
        }
        Ok(out)
    }

    fn write_node(&self, id: NodeId, semicolon: bool, out: &mut String) -> TreeResult<()> {
        let raws = self.raws(id)?;
        match self.kind(id)? {
            NodeKind::Root => {
                self.body(id, out)?;
                out.push_str(&raws.after);
            }
            NodeKind::Declaration(decl) => {
                out.push_str(&decl.prop);
                out.push_str(&raws.between);
                out.push_str(&decl.value);
                if semicolon {
                    out.push_str(&raws.after);
                    out.push(';');
                }
            }
            NodeKind::Comment(comment) => {
                out.push_str("/*");
                out.push_str(&comment.text);
                out.push_str("*/");
            }
            NodeKind::Rule(rule) => {
                out.push_str(&rule.selector);
                self.block(id, out)?;
                if let Some(own) = &raws.own_semicolon {
                    out.push_str(own);
                }
            }
            NodeKind::AtRule(at_rule) => {
                out.push('@');
                out.push_str(&at_rule.name);
                if !at_rule.params.is_empty() {
                    out.push_str(&raws.after_name);
                    out.push_str(&at_rule.params);
                }
                if at_rule.has_block {
                    self.block(id, out)?;
                } else {
                    out.push_str(&raws.between);
                    if semicolon {
                        out.push(';');
                    }
                }
            }
        }
        Ok(())
    }

    fn block(&self, id: NodeId, out: &mut String) -> TreeResult<()> {
        let raws = self.raws(id)?;
        out.push_str(&raws.between);
        out.push('{');
        self.body(id, out)?;
        out.push_str(&raws.after);
        out.push('}');
        Ok(())
    }

    /// Print a container's children.
    ///
    /// Every child but the last non-comment one is terminated; the last one
    /// only when the container's `semicolon` raw says so.
    fn body(&self, id: NodeId, out: &mut String) -> TreeResult<()> {
        let children = self.children(id)?;
        let mut last = children.len().saturating_sub(1);
        while last > 0 && matches!(self.kind(children[last])?, NodeKind::Comment(_)) {
            last -= 1;
        }
        let semicolon = self.raws(id)?.semicolon;

        for (index, &child) in children.iter().enumerate() {
            out.push_str(&self.raws(child)?.before);
            self.write_node(child, index != last || semicolon, out)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::node::{NodeKind, Raws};
    use crate::Document;

    #[test]
    fn prints_built_tree() {
        let mut doc = Document::new();
        let root = doc.root();
        let rule = doc.create(
            NodeKind::rule(".a"),
            Raws {
                between: " ".into(),
                after: "\n".into(),
                semicolon: true,
                ..Default::default()
            },
            None,
        );
        doc.append(root, rule).unwrap();
        for (prop, value) in [("color", "red"), ("margin", "0")] {
            let decl = doc.create(
                NodeKind::declaration(prop, value),
                Raws {
                    before: "\n  ".into(),
                    between: ": ".into(),
                    ..Default::default()
                },
                None,
            );
            doc.append(rule, decl).unwrap();
        }

        assert_eq!(doc.to_css(), ".a {\n  color: red;\n  margin: 0;\n}");
    }

    #[test]
    fn missing_final_semicolon_is_kept() {
        let doc = Document::parse(".a { color: red; margin: 0 }").unwrap();
        assert_eq!(doc.to_css(), ".a { color: red; margin: 0 }");
    }

    #[test]
    fn trailing_comment_does_not_steal_semicolon() {
        let css = ".a {\n  color: red;\n  /* done */\n}";
        let doc = Document::parse(css).unwrap();
        assert_eq!(doc.to_css(), css);
    }

    #[test]
    fn stringify_single_node() {
        let doc = Document::parse(".a { color : red; }").unwrap();
        let rule = doc.children(doc.root()).unwrap()[0];
        let decl = doc.children(rule).unwrap()[0];
        assert_eq!(doc.stringify(decl).unwrap(), "color : red");
        assert_eq!(doc.stringify(rule).unwrap(), ".a { color : red; }");
    }

    #[test]
    fn blockless_at_rule_semicolon() {
        let css = ".a {\n  @apply --x;\n}\n.b {\n  @apply --y\n}";
        let doc = Document::parse(css).unwrap();
        assert_eq!(doc.to_css(), css);
    }
}
