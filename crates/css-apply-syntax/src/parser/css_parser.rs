//! CSS syntax parser using the `cssparser` tokenizer.
//!
//! This module turns CSS text into [`Document`] nodes while keeping every
//! byte of formatting in [`Raws`], so a document that is not mutated prints
//! back exactly as it was read.
//!
//! Statements are recognized the way PostCSS recognizes them, which is what
//! custom property sets are written against:
//!
//! - an at-keyword starts an at-rule that ends at `;`, at a `{ }` block or at
//!   the end of the enclosing block;
//! - a statement starting with a custom property name (`--x`) that has seen a
//!   `:` swallows `{ }` blocks into its value and only ends at a `;` or at the
//!   end of the enclosing block;
//! - any other statement is a declaration if a `:` was seen before its end,
//!   or a rule when it reaches a `{ }` block.

use cssparser::{ParseError as CssParseError, Parser, ParserInput, SourcePosition, Token};

use crate::document::Document;
use crate::logging::targets;
use crate::node::{NodeId, NodeKind, Raws, SourceLocation};

use super::ParseError;

/// Parse a CSS stylesheet into a new [`Document`].
///
/// # Example
///
/// ```
/// let doc = css_apply_syntax::parse(".a { color: red; }").unwrap();
/// assert_eq!(doc.to_css(), ".a { color: red; }");
/// ```
pub fn parse(css: &str) -> Result<Document, ParseError> {
    let mut document = Document::new();
    let root = document.root();
    parse_into(&mut document, root, css)?;
    Ok(document)
}

impl Document {
    /// Parse a CSS stylesheet into a new document.
    pub fn parse(css: &str) -> Result<Self, ParseError> {
        parse(css)
    }

    /// Parse a CSS fragment into a detached root container owned by this
    /// document and return the container.
    pub fn parse_fragment(&mut self, css: &str) -> Result<NodeId, ParseError> {
        let fragment = self.create_fragment();
        if let Err(err) = parse_into(self, fragment, css) {
            self.destroy(fragment)?;
            return Err(err);
        }
        Ok(fragment)
    }
}

fn parse_into(document: &mut Document, container: NodeId, css: &str) -> Result<(), ParseError> {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let mut builder = TreeBuilder { document };
    builder.parse_body(&mut parser, container)?;
    tracing::trace!(target: targets::PARSER, bytes = css.len(), "parsed css");
    Ok(())
}

/// How a statement ended.
struct Finished {
    /// The statement was terminated by `;`.
    semicolon: bool,
    /// Where whitespace owned by the enclosing container starts again.
    resume: SourcePosition,
}

struct TreeBuilder<'d> {
    document: &'d mut Document,
}

impl TreeBuilder<'_> {
    fn push(
        &mut self,
        container: NodeId,
        kind: NodeKind,
        raws: Raws,
        location: SourceLocation,
    ) -> Result<NodeId, ParseError> {
        let id = self.document.create(kind, raws, Some(location));
        self.document.append(container, id)?;
        Ok(id)
    }

    /// Parse statements until the end of the current block or input.
    fn parse_body<'i>(
        &mut self,
        parser: &mut Parser<'i, '_>,
        container: NodeId,
    ) -> Result<(), ParseError> {
        let mut spaces_start = parser.position();
        let mut semicolon = false;

        loop {
            let start = parser.position();
            let location = location_of(parser);
            let token = match parser.next_including_whitespace_and_comments() {
                Ok(token) => token.clone(),
                Err(_) => break,
            };

            match token {
                Token::WhiteSpace(_) => {}
                Token::Comment(text) => {
                    let before = parser.slice(spaces_start..start).to_owned();
                    self.push(
                        container,
                        NodeKind::comment(text),
                        Raws::with_before(before),
                        location,
                    )?;
                    spaces_start = parser.position();
                }
                Token::Semicolon => {
                    // A free semicolon after a rule belongs to that rule;
                    // anywhere else it stays in the next node's whitespace.
                    if let Some(rule) = self.rule_awaiting_semicolon(container)? {
                        let own = parser.slice(spaces_start..parser.position()).to_owned();
                        self.document.raws_mut(rule)?.own_semicolon = Some(own);
                        spaces_start = parser.position();
                    }
                }
                Token::CloseCurlyBracket => {
                    return Err(ParseError::at("Unexpected }", location));
                }
                Token::AtKeyword(name) => {
                    let before = parser.slice(spaces_start..start).to_owned();
                    let finished =
                        self.parse_at_rule(parser, container, name.to_string(), before, location)?;
                    semicolon = finished.semicolon;
                    spaces_start = finished.resume;
                }
                first => {
                    let before = parser.slice(spaces_start..start).to_owned();
                    let finished =
                        self.parse_statement(parser, container, &first, start, before, location)?;
                    semicolon = finished.semicolon;
                    spaces_start = finished.resume;
                }
            }
        }

        let after = parser.slice_from(spaces_start).to_owned();
        let has_children = !self.document.children(container)?.is_empty();
        let raws = self.document.raws_mut(container)?;
        raws.after = after;
        if has_children {
            raws.semicolon = semicolon;
        }
        Ok(())
    }

    fn rule_awaiting_semicolon(&self, container: NodeId) -> Result<Option<NodeId>, ParseError> {
        let Some(last) = self.document.last_child(container)? else {
            return Ok(None);
        };
        let waiting = self.document.as_rule(last).is_some()
            && self.document.raws(last)?.own_semicolon.is_none();
        Ok(waiting.then_some(last))
    }

    fn parse_at_rule<'i>(
        &mut self,
        parser: &mut Parser<'i, '_>,
        container: NodeId,
        name: String,
        before: String,
        location: SourceLocation,
    ) -> Result<Finished, ParseError> {
        let name_end = parser.position();
        let mut params_start: Option<SourcePosition> = None;
        let mut last_significant = name_end;

        loop {
            let token_start = parser.position();
            let token = match parser.next_including_whitespace_and_comments() {
                Ok(token) => token.clone(),
                Err(_) => {
                    // Ends with the enclosing block; trailing whitespace
                    // belongs to the container.
                    let (after_name, params) =
                        split_params(parser, name_end, params_start, last_significant);
                    let raws = Raws {
                        before,
                        after_name,
                        ..Default::default()
                    };
                    self.push(container, NodeKind::at_rule(name, params, false), raws, location)?;
                    return Ok(Finished {
                        semicolon: false,
                        resume: last_significant,
                    });
                }
            };

            match token {
                Token::WhiteSpace(_) => {}
                Token::Semicolon => {
                    let (after_name, params) =
                        split_params(parser, name_end, params_start, last_significant);
                    let raws = Raws {
                        before,
                        after_name,
                        between: parser.slice(last_significant..token_start).to_owned(),
                        ..Default::default()
                    };
                    self.push(container, NodeKind::at_rule(name, params, false), raws, location)?;
                    return Ok(Finished {
                        semicolon: true,
                        resume: parser.position(),
                    });
                }
                Token::CurlyBracketBlock => {
                    let (after_name, params) =
                        split_params(parser, name_end, params_start, last_significant);
                    let raws = Raws {
                        before,
                        after_name,
                        between: parser.slice(last_significant..token_start).to_owned(),
                        ..Default::default()
                    };
                    let id =
                        self.push(container, NodeKind::at_rule(name, params, true), raws, location)?;
                    self.parse_block(parser, id, location)?;
                    return Ok(Finished {
                        semicolon: false,
                        resume: parser.position(),
                    });
                }
                Token::CloseCurlyBracket => {
                    return Err(ParseError::at("Unexpected }", location_of(parser)));
                }
                other => {
                    params_start.get_or_insert(token_start);
                    if is_block_start(&other) {
                        consume_block(parser);
                    }
                    last_significant = parser.position();
                }
            }
        }
    }

    fn parse_statement<'i>(
        &mut self,
        parser: &mut Parser<'i, '_>,
        container: NodeId,
        first: &Token<'i>,
        start: SourcePosition,
        before: String,
        location: SourceLocation,
    ) -> Result<Finished, ParseError> {
        if matches!(first, Token::CurlyBracketBlock) {
            return self.finish_rule(parser, container, start, start, start, before, location);
        }
        if is_block_start(first) {
            consume_block(parser);
        }

        let custom_property = matches!(first, Token::Ident(name) if name.starts_with("--"));
        let mut last_significant = parser.position();
        let mut colon: Option<(SourcePosition, SourcePosition)> = None;
        let mut value_start: Option<SourcePosition> = None;
        if matches!(first, Token::Colon) {
            colon = Some((start, last_significant));
        }

        loop {
            let token_start = parser.position();
            let token = match parser.next_including_whitespace_and_comments() {
                Ok(token) => token.clone(),
                Err(_) => {
                    let Some(colon) = colon else {
                        return Err(ParseError::at("Unknown word", location));
                    };
                    let declaration = DeclarationSpan {
                        start,
                        colon,
                        value_start,
                        value_end: last_significant,
                    };
                    self.finish_declaration(parser, container, declaration, before, String::new(), location)?;
                    return Ok(Finished {
                        semicolon: false,
                        resume: last_significant,
                    });
                }
            };

            match token {
                Token::WhiteSpace(_) => continue,
                Token::Semicolon => {
                    let Some(colon) = colon else {
                        return Err(ParseError::at("Unknown word", location));
                    };
                    let declaration = DeclarationSpan {
                        start,
                        colon,
                        value_start,
                        value_end: last_significant,
                    };
                    let after = parser.slice(last_significant..token_start).to_owned();
                    self.finish_declaration(parser, container, declaration, before, after, location)?;
                    return Ok(Finished {
                        semicolon: true,
                        resume: parser.position(),
                    });
                }
                Token::CurlyBracketBlock if !(custom_property && colon.is_some()) => {
                    return self.finish_rule(
                        parser,
                        container,
                        start,
                        last_significant,
                        token_start,
                        before,
                        location,
                    );
                }
                Token::CloseCurlyBracket => {
                    return Err(ParseError::at("Unexpected }", location_of(parser)));
                }
                Token::Colon if colon.is_none() => {
                    colon = Some((token_start, parser.position()));
                    last_significant = parser.position();
                    continue;
                }
                _ => {}
            }

            if colon.is_some() && value_start.is_none() {
                value_start = Some(token_start);
            }
            if is_block_start(&token) {
                consume_block(parser);
            }
            last_significant = parser.position();
        }
    }

    fn finish_declaration(
        &mut self,
        parser: &Parser<'_, '_>,
        container: NodeId,
        span: DeclarationSpan,
        before: String,
        after: String,
        location: SourceLocation,
    ) -> Result<NodeId, ParseError> {
        let (colon_start, _) = span.colon;
        let head = parser.slice(span.start..colon_start);
        let prop = head.trim_end();
        let value_start = span.value_start.unwrap_or(span.value_end);
        let mut between = head[prop.len()..].to_owned();
        between.push_str(parser.slice(colon_start..value_start));
        let value = parser.slice(value_start..span.value_end).to_owned();
        let raws = Raws {
            before,
            between,
            after,
            ..Default::default()
        };
        self.push(container, NodeKind::declaration(prop, value), raws, location)
    }

    #[allow(clippy::too_many_arguments)]
    fn finish_rule<'i>(
        &mut self,
        parser: &mut Parser<'i, '_>,
        container: NodeId,
        start: SourcePosition,
        selector_end: SourcePosition,
        block_start: SourcePosition,
        before: String,
        location: SourceLocation,
    ) -> Result<Finished, ParseError> {
        let selector = parser.slice(start..selector_end).to_owned();
        let raws = Raws {
            before,
            between: parser.slice(selector_end..block_start).to_owned(),
            ..Default::default()
        };
        let id = self.push(container, NodeKind::rule(selector), raws, location)?;
        self.parse_block(parser, id, location)?;
        Ok(Finished {
            semicolon: false,
            resume: parser.position(),
        })
    }

    /// Parse the `{ }` block that was just returned by the tokenizer into `container`.
    fn parse_block<'i>(
        &mut self,
        parser: &mut Parser<'i, '_>,
        container: NodeId,
        location: SourceLocation,
    ) -> Result<(), ParseError> {
        let result = parser.parse_nested_block(|nested| {
            Ok::<_, CssParseError<'i, ()>>(self.parse_body(nested, container))
        });
        match result {
            Ok(body) => body,
            Err(err) => Err(ParseError::at(format!("Invalid block: {:?}", err.kind), location)),
        }
    }
}

/// Byte positions of a declaration's pieces.
struct DeclarationSpan {
    start: SourcePosition,
    /// Start and end of the first `:`.
    colon: (SourcePosition, SourcePosition),
    value_start: Option<SourcePosition>,
    value_end: SourcePosition,
}

fn split_params(
    parser: &Parser<'_, '_>,
    name_end: SourcePosition,
    params_start: Option<SourcePosition>,
    params_end: SourcePosition,
) -> (String, String) {
    match params_start {
        Some(params_start) => (
            parser.slice(name_end..params_start).to_owned(),
            parser.slice(params_start..params_end).to_owned(),
        ),
        None => (String::new(), String::new()),
    }
}

fn location_of(parser: &Parser<'_, '_>) -> SourceLocation {
    let location = parser.current_source_location();
    SourceLocation::new(location.line + 1, location.column)
}

fn is_block_start(token: &Token<'_>) -> bool {
    matches!(
        token,
        Token::Function(_)
            | Token::ParenthesisBlock
            | Token::SquareBracketBlock
            | Token::CurlyBracketBlock
    )
}

/// Step over the contents of the block that was just opened, so the parser
/// position ends up after its closing delimiter.
fn consume_block<'i>(parser: &mut Parser<'i, '_>) {
    let _ = parser.parse_nested_block(|nested| {
        while nested.next_including_whitespace_and_comments().is_ok() {}
        Ok::<(), CssParseError<'i, ()>>(())
    });
}
