//! Tracing targets for property-set resolution.
//!
//! Every diagnostic recorded in [`Diagnostics`](crate::Diagnostics) is also
//! logged at `warn` level. Registrations and substitutions log at `debug`.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem, for
/// example `RUST_LOG=css_apply::resolve=debug`.
pub mod targets {
    /// Set extraction from declarations and rules.
    pub const EXTRACT: &str = "css_apply::extract";
    /// Registry writes.
    pub const REGISTRY: &str = "css_apply::registry";
    /// `@apply` substitution, at use sites and inside sets.
    pub const RESOLVE: &str = "css_apply::resolve";
    /// Whole-document processing.
    pub const PROCESS: &str = "css_apply::process";
}
