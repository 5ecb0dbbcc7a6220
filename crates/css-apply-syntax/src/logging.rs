//! Tracing targets for the syntax crate.
//!
//! The tree and the parser log through `tracing`. To see the output, install
//! a subscriber in the host application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("css_apply_syntax=trace")
//!     .init();
//! ```

/// Target names for log filtering.
pub mod targets {
    /// Arena mutations.
    pub const DOCUMENT: &str = "css_apply_syntax::document";
    /// Tokenizing and tree building.
    pub const PARSER: &str = "css_apply_syntax::parser";
}
