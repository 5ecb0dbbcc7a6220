//! CSS syntax tree for css-apply.
//!
//! This crate provides the tree that property-set resolution operates on:
//!
//! - **Document**: an arena of CSS nodes (root, rules, at-rules, declarations,
//!   comments) addressed by stable [`NodeId`] handles
//! - **Parsing**: CSS text to nodes via the `cssparser` tokenizer, following
//!   PostCSS statement rules so custom property sets survive parsing
//! - **Printing**: nodes back to text, byte-for-byte for untouched input
//! - **Balanced scanning**: splitting text around a `{ }` or `( )` group
//!
//! # Example
//!
//! ```
//! use css_apply_syntax::{Document, NodeKind, Raws};
//!
//! let mut doc = Document::parse(".a {\n  color: red;\n}").unwrap();
//! let rule = doc.children(doc.root()).unwrap()[0];
//!
//! let decl = doc.create(
//!     NodeKind::declaration("margin", "0"),
//!     Raws { before: "\n  ".into(), between: ": ".into(), ..Default::default() },
//!     None,
//! );
//! doc.append(rule, decl).unwrap();
//!
//! assert_eq!(doc.to_css(), ".a {\n  color: red;\n  margin: 0;\n}");
//! ```

pub mod balanced;
pub mod document;
pub mod logging;
pub mod node;
pub mod parser;
mod stringify;

pub use balanced::{balanced, Balanced, Delimiter};
pub use document::{Document, TreeError, TreeResult};
pub use node::{AtRule, Comment, Declaration, NodeData, NodeId, NodeKind, Raws, Rule, SourceLocation};
pub use parser::{parse, ParseError};
