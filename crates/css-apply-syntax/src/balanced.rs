//! Balanced-delimiter scanning.
//!
//! Finds the first `{ }`, `( )` or `[ ]` group in a piece of CSS text and
//! splits the text around it. Nested groups, strings and comments are
//! respected because the text is tokenized rather than scanned by character.

use cssparser::{ParseError as CssParseError, Parser, ParserInput, Token};

/// The delimiter pair to look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// `{` and `}`.
    Brace,
    /// `(` and `)`, including function calls such as `var(`.
    Paren,
    /// `[` and `]`.
    Bracket,
}

impl Delimiter {
    fn opens(self, token: &Token<'_>) -> bool {
        match self {
            Self::Brace => matches!(token, Token::CurlyBracketBlock),
            Self::Paren => matches!(token, Token::ParenthesisBlock | Token::Function(_)),
            Self::Bracket => matches!(token, Token::SquareBracketBlock),
        }
    }
}

/// Text split around the first balanced group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Balanced<'a> {
    /// Text before the group, including a function name if any.
    pub pre: &'a str,
    /// Text between the delimiters.
    pub body: &'a str,
    /// Text after the closing delimiter.
    pub post: &'a str,
}

/// Split `text` around its first balanced `delimiter` group.
///
/// Returns `None` when there is no such group or when it is never closed.
///
/// ```
/// use css_apply_syntax::{balanced, Delimiter};
///
/// let split = balanced("{ a: { b } } --c: d", Delimiter::Brace).unwrap();
/// assert_eq!(split.body, " a: { b } ");
/// assert_eq!(split.post, " --c: d");
/// ```
pub fn balanced(text: &str, delimiter: Delimiter) -> Option<Balanced<'_>> {
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);
    let origin = parser.position();

    loop {
        let start = parser.position();
        let token = parser.next_including_whitespace_and_comments().ok()?.clone();
        let is_target = delimiter.opens(&token);
        if !is_target && !is_group(&token) {
            continue;
        }

        let open_end = parser.position();
        let body_end = parser
            .parse_nested_block(|nested| {
                while nested.next_including_whitespace_and_comments().is_ok() {}
                Ok::<_, CssParseError<'_, ()>>(nested.position())
            })
            .ok()?;
        let close_end = parser.position();
        if body_end == close_end {
            // Reached the end of input without a closing delimiter.
            return None;
        }
        if is_target {
            return Some(Balanced {
                pre: parser.slice(origin..start),
                body: parser.slice(open_end..body_end),
                post: &text[close_end.byte_index()..],
            });
        }
    }
}

fn is_group(token: &Token<'_>) -> bool {
    matches!(
        token,
        Token::Function(_)
            | Token::ParenthesisBlock
            | Token::SquareBracketBlock
            | Token::CurlyBracketBlock
    )
}
