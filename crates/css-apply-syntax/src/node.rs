//! Node types stored in a [`Document`](crate::Document).

use std::fmt;

use slotmap::new_key_type;

new_key_type! {
    /// A stable handle to a node in a [`Document`](crate::Document) arena.
    ///
    /// Handles stay valid while the tree around them is rearranged and become
    /// invalid once the node is removed.
    pub struct NodeId;
}

/// A 1-based position in the parsed source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SourceLocation {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed).
    pub column: u32,
}

impl SourceLocation {
    /// Create a new source location.
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A style rule: `selector { ... }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Raw selector text, trimmed.
    pub selector: String,
}

/// An at-rule: `@name params;` or `@name params { ... }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtRule {
    /// Name without the leading `@`.
    pub name: String,
    /// Raw prelude text, trimmed.
    pub params: String,
    /// Whether the at-rule owns a `{ }` block.
    pub has_block: bool,
}

/// A declaration: `prop: value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Property name as written.
    pub prop: String,
    /// Raw value text, including any `!important` and nested blocks.
    pub value: String,
}

/// A comment: `/* text */`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Everything between `/*` and `*/`.
    pub text: String,
}

/// The kind-specific payload of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Top-level container of a document or fragment.
    Root,
    /// Style rule.
    Rule(Rule),
    /// At-rule.
    AtRule(AtRule),
    /// Declaration.
    Declaration(Declaration),
    /// Comment.
    Comment(Comment),
}

impl NodeKind {
    /// Short type name, used in logs and errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Rule(_) => "rule",
            Self::AtRule(_) => "atrule",
            Self::Declaration(_) => "decl",
            Self::Comment(_) => "comment",
        }
    }

    /// Whether nodes of this kind may hold children.
    pub fn is_container(&self) -> bool {
        match self {
            Self::Root | Self::Rule(_) => true,
            Self::AtRule(at_rule) => at_rule.has_block,
            Self::Declaration(_) | Self::Comment(_) => false,
        }
    }

    /// Build a rule payload.
    pub fn rule(selector: impl Into<String>) -> Self {
        Self::Rule(Rule {
            selector: selector.into(),
        })
    }

    /// Build a declaration payload.
    pub fn declaration(prop: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Declaration(Declaration {
            prop: prop.into(),
            value: value.into(),
        })
    }

    /// Build an at-rule payload.
    pub fn at_rule(name: impl Into<String>, params: impl Into<String>, has_block: bool) -> Self {
        Self::AtRule(AtRule {
            name: name.into(),
            params: params.into(),
            has_block,
        })
    }

    /// Build a comment payload.
    pub fn comment(text: impl Into<String>) -> Self {
        Self::Comment(Comment { text: text.into() })
    }
}

/// Formatting captured around a node so untouched input prints back verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Raws {
    /// Whitespace (and stray semicolons) before the node.
    pub before: String,
    /// Declarations: colon and surrounding whitespace. Rules and at-rules:
    /// whitespace between the prelude and `{` or `;`.
    pub between: String,
    /// At-rules: whitespace between the name and the params.
    pub after_name: String,
    /// Containers: whitespace before the closing `}` (or EOF for a root).
    /// Declarations: whitespace between the value and its `;`.
    pub after: String,
    /// Containers: the last non-comment child is terminated by `;`.
    pub semicolon: bool,
    /// Rules: a free `;` after the closing brace, with its leading whitespace.
    pub own_semicolon: Option<String>,
}

impl Raws {
    /// Raws with only `before` set.
    pub fn with_before(before: impl Into<String>) -> Self {
        Self {
            before: before.into(),
            ..Default::default()
        }
    }
}

/// Arena slot for a single node.
#[derive(Debug, Clone)]
pub struct NodeData {
    /// Kind-specific payload.
    pub kind: NodeKind,
    /// Captured formatting.
    pub raws: Raws,
    /// Where the node came from, if known.
    pub source: Option<SourceLocation>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl NodeData {
    pub(crate) fn new(kind: NodeKind, raws: Raws, source: Option<SourceLocation>) -> Self {
        Self {
            kind,
            raws,
            source,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Parent node, if attached.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child nodes in document order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}
