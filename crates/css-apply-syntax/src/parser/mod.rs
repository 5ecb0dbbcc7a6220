//! CSS parsing module.

mod css_parser;
mod error;

pub use css_parser::parse;
pub use error::ParseError;
