//! Custom property sets and `@apply` for CSS.
//!
//! A property set is a named block of declarations defined inside `:root`
//! and pasted into rules with `@apply`:
//!
//! ```css
//! :root {
//!   --toolbar-theme: {
//!     background-color: hsl(120, 70%, 95%);
//!     border-radius: 4px;
//!   }
//! }
//!
//! .toolbar {
//!   @apply --toolbar-theme;
//! }
//! ```
//!
//! Processing removes the definitions from the stylesheet and replaces each
//! `@apply` with a copy of the set's contents:
//!
//! - **Extraction**: `--name: { ... }` and `--name { ... }` inside `:root`
//!   are moved into a [`SetRegistry`]; a later definition replaces an earlier
//!   one
//! - **Nested resolution**: `@apply` inside a set is flattened before the
//!   set is used anywhere
//! - **Resolution**: each `@apply --name` or `@apply (--name)` inside a rule
//!   is replaced by the set's declarations
//!
//! Nothing about the sets is ever fatal. Misplaced definitions, unknown names
//! and circular references are collected as [`Warning`]s and logged through
//! `tracing` (see [`logging::targets`]).
//!
//! # Example
//!
//! ```
//! use css_apply::{process, ApplyOptions, WarningKind};
//!
//! let css = ".a {\n  @apply --missing;\n}";
//! let processed = process(css, &ApplyOptions::default()).unwrap();
//!
//! assert_eq!(processed.css, css);
//! assert_eq!(processed.warnings[0].kind, WarningKind::UnknownSet);
//! ```

pub mod diagnostics;
pub mod error;
pub mod extract;
pub mod logging;
pub mod name;
pub mod options;
pub mod pass;
pub mod process;
pub mod registry;
pub mod resolve;

pub use diagnostics::{Diagnostics, Warning, WarningKind};
pub use error::{Error, Result};
pub use extract::ROOT_SELECTOR;
pub use name::{reference_name, set_name};
pub use options::ApplyOptions;
pub use pass::PropertySets;
pub use process::{process, process_file, Processed};
pub use registry::SetRegistry;
pub use resolve::APPLY;

/// Commonly used types.
pub mod prelude {
    pub use crate::{
        process, process_file, ApplyOptions, Error, Processed, PropertySets, Result, Warning,
        WarningKind,
    };
    pub use css_apply_syntax::Document;
}
