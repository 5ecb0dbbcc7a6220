//! Arena-backed CSS syntax tree.
//!
//! A [`Document`] owns every node produced while processing one stylesheet:
//! the attached tree under [`Document::root`] as well as detached subtrees
//! such as parsed fragments or cached copies. Nodes are addressed by
//! [`NodeId`] handles into a `SlotMap`, so a subtree can be moved, cloned or
//! dropped without invalidating handles elsewhere in the tree.
//!
//! # Key Operations
//!
//! - [`Document::append`], [`Document::insert_before`], [`Document::insert_after`]
//!   move a node (and its subtree) under a new parent.
//! - [`Document::remove`] detaches a node and drops its subtree from the arena.
//! - [`Document::replace_with`] splices a sequence of nodes in place of one.
//! - [`Document::deep_clone`] copies a subtree into fresh, detached slots.

use std::fmt;

use slotmap::SlotMap;

use crate::logging::targets;
use crate::node::{AtRule, Comment, Declaration, NodeData, NodeId, NodeKind, Raws, Rule, SourceLocation};

/// Errors that can occur during tree operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// The node ID is invalid or the node has been removed.
    InvalidNodeId,
    /// Attempted to insert a node into its own subtree.
    CircularParentage,
    /// The target node cannot hold children.
    NotAContainer {
        /// Type name of the offending node.
        kind: &'static str,
    },
    /// The operation needs the node to have a parent.
    Detached,
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidNodeId => write!(f, "Invalid or removed node ID"),
            Self::CircularParentage => {
                write!(f, "Cannot insert a node into its own subtree")
            }
            Self::NotAContainer { kind } => write!(f, "A {kind} node cannot hold children"),
            Self::Detached => write!(f, "Node has no parent"),
        }
    }
}

impl std::error::Error for TreeError {}

/// Result type for tree operations.
pub type TreeResult<T> = std::result::Result<T, TreeError>;

/// A CSS syntax tree and every detached subtree created alongside it.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: SlotMap<NodeId, NodeData>,
    root: NodeId,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(NodeData::new(NodeKind::Root, Raws::default(), None));
        Self { nodes, root }
    }

    /// The document's root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes in the arena, attached or not.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Check if a node exists in the arena.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Check if a node is part of the tree under [`Document::root`].
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(current_id) = current {
            if current_id == self.root {
                return true;
            }
            current = self.nodes.get(current_id).and_then(|d| d.parent);
        }
        false
    }

    /// Get a node's arena slot.
    pub fn node(&self, id: NodeId) -> TreeResult<&NodeData> {
        self.nodes.get(id).ok_or(TreeError::InvalidNodeId)
    }

    /// Get a node's arena slot mutably.
    pub fn node_mut(&mut self, id: NodeId) -> TreeResult<&mut NodeData> {
        self.nodes.get_mut(id).ok_or(TreeError::InvalidNodeId)
    }

    /// Get a node's payload.
    pub fn kind(&self, id: NodeId) -> TreeResult<&NodeKind> {
        self.node(id).map(|d| &d.kind)
    }

    /// Get a node's payload mutably.
    pub fn kind_mut(&mut self, id: NodeId) -> TreeResult<&mut NodeKind> {
        self.node_mut(id).map(|d| &mut d.kind)
    }

    /// Get a node's captured formatting.
    pub fn raws(&self, id: NodeId) -> TreeResult<&Raws> {
        self.node(id).map(|d| &d.raws)
    }

    /// Get a node's captured formatting mutably.
    pub fn raws_mut(&mut self, id: NodeId) -> TreeResult<&mut Raws> {
        self.node_mut(id).map(|d| &mut d.raws)
    }

    /// Get a node's source location.
    pub fn source(&self, id: NodeId) -> TreeResult<Option<SourceLocation>> {
        self.node(id).map(|d| d.source)
    }

    /// Set a node's source location.
    pub fn set_source(&mut self, id: NodeId, source: Option<SourceLocation>) -> TreeResult<()> {
        self.node_mut(id)?.source = source;
        Ok(())
    }

    /// Set the source location of a node and of every node below it.
    pub fn restamp(&mut self, id: NodeId, source: Option<SourceLocation>) -> TreeResult<()> {
        self.set_source(id, source)?;
        for descendant in self.descendants(id)? {
            self.set_source(descendant, source)?;
        }
        Ok(())
    }

    /// The node as a declaration, if it is one.
    pub fn as_declaration(&self, id: NodeId) -> Option<&Declaration> {
        match self.kind(id).ok()? {
            NodeKind::Declaration(decl) => Some(decl),
            _ => None,
        }
    }

    /// The node as a rule, if it is one.
    pub fn as_rule(&self, id: NodeId) -> Option<&Rule> {
        match self.kind(id).ok()? {
            NodeKind::Rule(rule) => Some(rule),
            _ => None,
        }
    }

    /// The node as an at-rule, if it is one.
    pub fn as_at_rule(&self, id: NodeId) -> Option<&AtRule> {
        match self.kind(id).ok()? {
            NodeKind::AtRule(at_rule) => Some(at_rule),
            _ => None,
        }
    }

    /// The node as a comment, if it is one.
    pub fn as_comment(&self, id: NodeId) -> Option<&Comment> {
        match self.kind(id).ok()? {
            NodeKind::Comment(comment) => Some(comment),
            _ => None,
        }
    }

    /// Whether the node is a root container.
    pub fn is_root_kind(&self, id: NodeId) -> bool {
        matches!(self.kind(id), Ok(NodeKind::Root))
    }

    /// Create a detached node.
    pub fn create(&mut self, kind: NodeKind, raws: Raws, source: Option<SourceLocation>) -> NodeId {
        let type_name = kind.type_name();
        let id = self.nodes.insert(NodeData::new(kind, raws, source));
        tracing::trace!(target: targets::DOCUMENT, ?id, type_name, "created node");
        id
    }

    /// Create a detached, empty root container for a fragment.
    pub fn create_fragment(&mut self) -> NodeId {
        self.create(NodeKind::Root, Raws::default(), None)
    }

    /// Get the parent of a node.
    pub fn parent(&self, id: NodeId) -> TreeResult<Option<NodeId>> {
        self.node(id).map(|d| d.parent)
    }

    /// Get the children of a node.
    pub fn children(&self, id: NodeId) -> TreeResult<&[NodeId]> {
        self.node(id).map(|d| d.children.as_slice())
    }

    /// Position of a node among its siblings.
    pub fn index_of(&self, id: NodeId) -> TreeResult<Option<usize>> {
        let Some(parent) = self.parent(id)? else {
            return Ok(None);
        };
        Ok(self.children(parent)?.iter().position(|&child| child == id))
    }

    /// The sibling directly before a node.
    pub fn prev(&self, id: NodeId) -> TreeResult<Option<NodeId>> {
        let (Some(parent), Some(index)) = (self.parent(id)?, self.index_of(id)?) else {
            return Ok(None);
        };
        if index == 0 {
            return Ok(None);
        }
        Ok(self.children(parent)?.get(index - 1).copied())
    }

    /// The sibling directly after a node.
    pub fn next(&self, id: NodeId) -> TreeResult<Option<NodeId>> {
        let (Some(parent), Some(index)) = (self.parent(id)?, self.index_of(id)?) else {
            return Ok(None);
        };
        Ok(self.children(parent)?.get(index + 1).copied())
    }

    /// The last child of a container.
    pub fn last_child(&self, id: NodeId) -> TreeResult<Option<NodeId>> {
        Ok(self.children(id)?.last().copied())
    }

    /// All nodes below `id` in document (pre-)order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> TreeResult<Vec<NodeId>> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id)?.iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            result.push(current);
            stack.extend(self.children(current)?.iter().rev().copied());
        }
        Ok(result)
    }

    /// Declarations below `id` in document order.
    pub fn declarations(&self, id: NodeId) -> TreeResult<Vec<NodeId>> {
        Ok(self
            .descendants(id)?
            .into_iter()
            .filter(|&node| self.as_declaration(node).is_some())
            .collect())
    }

    /// Rules below `id` in document order.
    pub fn rules(&self, id: NodeId) -> TreeResult<Vec<NodeId>> {
        Ok(self
            .descendants(id)?
            .into_iter()
            .filter(|&node| self.as_rule(node).is_some())
            .collect())
    }

    /// At-rules named `name` below `id` in document order.
    pub fn at_rules(&self, id: NodeId, name: &str) -> TreeResult<Vec<NodeId>> {
        Ok(self
            .descendants(id)?
            .into_iter()
            .filter(|&node| self.as_at_rule(node).is_some_and(|at_rule| at_rule.name == name))
            .collect())
    }

    /// Move `child` to the end of `parent`'s children.
    pub fn append(&mut self, parent: NodeId, child: NodeId) -> TreeResult<()> {
        let index = self.children(parent)?.len();
        self.insert_at(parent, index, child)
    }

    /// Move `node` directly before `anchor`.
    pub fn insert_before(&mut self, anchor: NodeId, node: NodeId) -> TreeResult<()> {
        let parent = self.parent(anchor)?.ok_or(TreeError::Detached)?;
        self.ensure_insertable(parent, node)?;
        self.detach(node)?;
        let index = self.index_of(anchor)?.ok_or(TreeError::Detached)?;
        self.insert_at(parent, index, node)
    }

    /// Move `node` directly after `anchor`.
    pub fn insert_after(&mut self, anchor: NodeId, node: NodeId) -> TreeResult<()> {
        let parent = self.parent(anchor)?.ok_or(TreeError::Detached)?;
        self.ensure_insertable(parent, node)?;
        self.detach(node)?;
        let index = self.index_of(anchor)?.ok_or(TreeError::Detached)?;
        self.insert_at(parent, index + 1, node)
    }

    fn ensure_insertable(&self, parent: NodeId, node: NodeId) -> TreeResult<()> {
        let kind = self.kind(parent)?;
        if !kind.is_container() {
            return Err(TreeError::NotAContainer {
                kind: kind.type_name(),
            });
        }
        if !self.contains(node) {
            return Err(TreeError::InvalidNodeId);
        }
        if self.is_ancestor_of(node, parent) {
            return Err(TreeError::CircularParentage);
        }
        Ok(())
    }

    fn insert_at(&mut self, parent: NodeId, index: usize, node: NodeId) -> TreeResult<()> {
        self.ensure_insertable(parent, node)?;
        self.detach(node)?;
        let children = &mut self.node_mut(parent)?.children;
        let index = index.min(children.len());
        children.insert(index, node);
        self.node_mut(node)?.parent = Some(parent);
        tracing::trace!(target: targets::DOCUMENT, ?node, ?parent, index, "inserted node");
        Ok(())
    }

    /// Check if `potential_ancestor` is `id` or one of its ancestors.
    fn is_ancestor_of(&self, potential_ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(current_id) = current {
            if current_id == potential_ancestor {
                return true;
            }
            current = self.nodes.get(current_id).and_then(|d| d.parent);
        }
        false
    }

    /// Unlink a node from its parent, keeping it (and its subtree) in the arena.
    pub fn detach(&mut self, id: NodeId) -> TreeResult<()> {
        let Some(parent) = self.parent(id)? else {
            return Ok(());
        };
        if let Some(parent_data) = self.nodes.get_mut(parent) {
            parent_data.children.retain(|&child| child != id);
        }
        self.node_mut(id)?.parent = None;
        Ok(())
    }

    /// Remove a node from the tree and drop it and its subtree from the arena.
    ///
    /// Removing the first child of a root hands its leading whitespace to the
    /// new first child, so the document does not gain or lose a blank line.
    #[tracing::instrument(skip(self), target = "css_apply_syntax::document", level = "trace")]
    pub fn remove(&mut self, id: NodeId) -> TreeResult<()> {
        if let Some(parent) = self.parent(id)? {
            if self.is_root_kind(parent) {
                let siblings = self.children(parent)?;
                if siblings.len() > 1 && siblings[0] == id {
                    let next = siblings[1];
                    let before = self.raws(id)?.before.clone();
                    self.raws_mut(next)?.before = before;
                }
            }
        }
        self.detach(id)?;
        self.destroy(id)
    }

    /// Drop a detached subtree from the arena.
    pub fn destroy(&mut self, id: NodeId) -> TreeResult<()> {
        let descendants = self.descendants(id)?;
        self.detach(id)?;
        for descendant in descendants {
            self.nodes.remove(descendant);
        }
        self.nodes.remove(id);
        Ok(())
    }

    /// Put `nodes` in `id`'s place, in order, then remove `id`.
    pub fn replace_with(&mut self, id: NodeId, nodes: &[NodeId]) -> TreeResult<()> {
        for &node in nodes {
            self.insert_before(id, node)?;
        }
        self.remove(id)
    }

    /// Copy a subtree into fresh, detached arena slots.
    ///
    /// The copy shares nothing with the original: later mutation of either
    /// side is invisible to the other.
    pub fn deep_clone(&mut self, id: NodeId) -> TreeResult<NodeId> {
        let data = self.node(id)?;
        let (kind, raws, source) = (data.kind.clone(), data.raws.clone(), data.source);
        let children = data.children.clone();
        let copy = self.create(kind, raws, source);
        for child in children {
            let child_copy = self.deep_clone(child)?;
            self.node_mut(child_copy)?.parent = Some(copy);
            self.node_mut(copy)?.children.push(child_copy);
        }
        Ok(copy)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
