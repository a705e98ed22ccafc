//! CSS selectors evaluated against a [`Document`].
//!
//! Tokenized with `cssparser`. Supported: type, universal, `#id`, `.class`,
//! attribute selectors with `=`, `~=`, `|=`, `^=`, `$=` and `*=`, the
//! `:not()`, `:first-child`, `:last-child` and `:only-child` pseudo-classes,
//! all four combinators and comma-separated lists.

use std::fmt;

use cssparser::{
    BasicParseErrorKind, ParseError, ParseErrorKind, Parser, ParserInput, ToCss, Token,
};

use super::{Document, NodeId};

/// A parsed selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    alternatives: Vec<Complex>,
}

/// Compounds joined by combinators, left to right.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    compounds: Vec<Compound>,
    /// `combinators[i]` sits between `compounds[i]` and `compounds[i + 1]`
    combinators: Vec<Combinator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
    NextSibling,
    SubsequentSibling,
}

/// A single compound selector such as `a.link[href]:not(.muted)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttributeMatch>,
    pseudos: Vec<Pseudo>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttributeMatch {
    name: String,
    test: Option<(AttributeOp, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttributeOp {
    Equals,
    Includes,
    DashMatch,
    Prefix,
    Suffix,
    Substring,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pseudo {
    FirstChild,
    LastChild,
    OnlyChild,
    Not(Vec<Complex>),
}

/// Errors that can occur when parsing a selector.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("Empty selector")]
    Empty,

    #[error("Unexpected token '{token}' at column {column}")]
    UnexpectedToken { token: String, column: u32 },

    #[error("Unexpected end of selector")]
    UnexpectedEnd,

    #[error("Expected a compound selector at column {0}")]
    MissingCompound(u32),

    #[error("Unsupported pseudo-class ':{0}'")]
    UnsupportedPseudo(String),

    #[error("Invalid selector: {0}")]
    Invalid(String),
}

impl<'i> From<ParseError<'i, SelectorError>> for SelectorError {
    fn from(error: ParseError<'i, SelectorError>) -> Self {
        match error.kind {
            ParseErrorKind::Custom(e) => e,
            ParseErrorKind::Basic(BasicParseErrorKind::UnexpectedToken(token)) => {
                SelectorError::UnexpectedToken {
                    token: token.to_css_string(),
                    column: error.location.column,
                }
            }
            ParseErrorKind::Basic(BasicParseErrorKind::EndOfInput) => SelectorError::UnexpectedEnd,
            ParseErrorKind::Basic(other) => SelectorError::Invalid(format!("{:?}", other)),
        }
    }
}

type ParseResult<'i, T> = Result<T, ParseError<'i, SelectorError>>;

impl Selector {
    /// Parse a selector list.
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let source = input.trim();
        if source.is_empty() {
            return Err(SelectorError::Empty);
        }

        let mut parser_input = ParserInput::new(source);
        let mut parser = Parser::new(&mut parser_input);
        let alternatives = parser.parse_comma_separated(parse_complex)?;

        Ok(Self {
            source: source.to_string(),
            alternatives,
        })
    }

    /// Check whether `node` matches any selector in the list.
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.alternatives.iter().any(|c| c.matches(doc, node))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Complex {
    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.matches_at(doc, node, self.compounds.len() - 1)
    }

    /// Match `compounds[index]` against `node` and the rest of the chain
    /// against its relatives, backtracking over ancestors and siblings.
    fn matches_at(&self, doc: &Document, node: NodeId, index: usize) -> bool {
        if !self.compounds[index].matches(doc, node) {
            return false;
        }
        if index == 0 {
            return true;
        }

        let next = index - 1;
        match self.combinators[next] {
            Combinator::Descendant => {
                let mut cursor = doc.parent(node);
                while let Some(current) = cursor {
                    if self.matches_at(doc, current, next) {
                        return true;
                    }
                    cursor = doc.parent(current);
                }
                false
            }
            Combinator::Child => doc
                .parent(node)
                .is_some_and(|parent| self.matches_at(doc, parent, next)),
            Combinator::NextSibling => doc
                .previous_sibling(node)
                .is_some_and(|sibling| self.matches_at(doc, sibling, next)),
            Combinator::SubsequentSibling => {
                let mut cursor = doc.previous_sibling(node);
                while let Some(current) = cursor {
                    if self.matches_at(doc, current, next) {
                        return true;
                    }
                    cursor = doc.previous_sibling(current);
                }
                false
            }
        }
    }
}

impl Compound {
    fn is_empty(&self) -> bool {
        *self == Compound::default()
    }

    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        if let Some(tag) = &self.tag {
            if !doc.tag(node).eq_ignore_ascii_case(tag) {
                return false;
            }
        }

        if let Some(id) = &self.id {
            if doc.attribute(node, "id") != Some(id.as_str()) {
                return false;
            }
        }

        if !self.classes.iter().all(|c| doc.has_class(node, c)) {
            return false;
        }

        if !self.attributes.iter().all(|attr| attr.matches(doc, node)) {
            return false;
        }

        self.pseudos.iter().all(|pseudo| match pseudo {
            Pseudo::FirstChild => doc.previous_sibling(node).is_none(),
            Pseudo::LastChild => doc.next_sibling(node).is_none(),
            Pseudo::OnlyChild => {
                doc.previous_sibling(node).is_none() && doc.next_sibling(node).is_none()
            }
            Pseudo::Not(list) => !list.iter().any(|c| c.matches(doc, node)),
        })
    }
}

impl AttributeMatch {
    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let Some(actual) = doc.attribute(node, &self.name) else {
            return false;
        };
        let Some((op, expected)) = &self.test else {
            return true;
        };
        let expected = expected.as_str();

        match op {
            AttributeOp::Equals => actual == expected,
            AttributeOp::Includes => actual.split_whitespace().any(|w| w == expected),
            AttributeOp::DashMatch => {
                actual == expected
                    || actual
                        .strip_prefix(expected)
                        .is_some_and(|rest| rest.starts_with('-'))
            }
            AttributeOp::Prefix => !expected.is_empty() && actual.starts_with(expected),
            AttributeOp::Suffix => !expected.is_empty() && actual.ends_with(expected),
            AttributeOp::Substring => !expected.is_empty() && actual.contains(expected),
        }
    }
}

fn parse_complex<'i>(parser: &mut Parser<'i, '_>) -> ParseResult<'i, Complex> {
    parser.skip_whitespace();
    let mut compounds = vec![parse_compound(parser)?];
    let mut combinators = Vec::new();

    loop {
        let mut saw_space = false;
        let combinator = loop {
            let state = parser.state();
            let token = match parser.next_including_whitespace() {
                Ok(token) => token.clone(),
                Err(_) => break None,
            };
            match token {
                Token::WhiteSpace(_) => saw_space = true,
                Token::Delim('>') => break Some(Combinator::Child),
                Token::Delim('+') => break Some(Combinator::NextSibling),
                Token::Delim('~') => break Some(Combinator::SubsequentSibling),
                _ if saw_space => {
                    parser.reset(&state);
                    break Some(Combinator::Descendant);
                }
                token => return Err(parser.new_unexpected_token_error(token)),
            }
        };

        let Some(combinator) = combinator else {
            break;
        };
        parser.skip_whitespace();
        combinators.push(combinator);
        compounds.push(parse_compound(parser)?);
    }

    Ok(Complex {
        compounds,
        combinators,
    })
}

fn parse_compound<'i>(parser: &mut Parser<'i, '_>) -> ParseResult<'i, Compound> {
    let location = parser.current_source_location();
    let mut compound = Compound::default();
    let mut universal = false;

    loop {
        let state = parser.state();
        let token = match parser.next_including_whitespace() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };
        let at_start = compound.is_empty() && !universal;

        match token {
            Token::Ident(name) if at_start => compound.tag = Some(name.to_ascii_lowercase()),
            Token::Delim('*') if at_start => universal = true,
            Token::IDHash(id) => compound.id = Some(id.to_string()),
            Token::Delim('.') => match parser.next_including_whitespace()?.clone() {
                Token::Ident(name) => compound.classes.push(name.to_string()),
                other => return Err(parser.new_unexpected_token_error(other)),
            },
            Token::SquareBracketBlock => {
                let attribute = parser.parse_nested_block(parse_attribute)?;
                compound.attributes.push(attribute);
            }
            Token::Colon => {
                let pseudo = parse_pseudo(parser)?;
                compound.pseudos.push(pseudo);
            }
            _ => {
                parser.reset(&state);
                break;
            }
        }
    }

    if compound.is_empty() && !universal {
        return Err(parser.new_custom_error(SelectorError::MissingCompound(location.column)));
    }
    Ok(compound)
}

fn parse_attribute<'i>(parser: &mut Parser<'i, '_>) -> ParseResult<'i, AttributeMatch> {
    let name = parser.expect_ident()?.to_string();
    if parser.is_exhausted() {
        return Ok(AttributeMatch { name, test: None });
    }

    let op = match parser.next()?.clone() {
        Token::Delim('=') => AttributeOp::Equals,
        Token::IncludeMatch => AttributeOp::Includes,
        Token::DashMatch => AttributeOp::DashMatch,
        Token::PrefixMatch => AttributeOp::Prefix,
        Token::SuffixMatch => AttributeOp::Suffix,
        Token::SubstringMatch => AttributeOp::Substring,
        other => return Err(parser.new_unexpected_token_error(other)),
    };
    let value = parser.expect_ident_or_string()?.to_string();
    parser.expect_exhausted()?;

    Ok(AttributeMatch {
        name,
        test: Some((op, value)),
    })
}

fn parse_pseudo<'i>(parser: &mut Parser<'i, '_>) -> ParseResult<'i, Pseudo> {
    match parser.next_including_whitespace()?.clone() {
        Token::Ident(name) => match name.to_ascii_lowercase().as_str() {
            "first-child" => Ok(Pseudo::FirstChild),
            "last-child" => Ok(Pseudo::LastChild),
            "only-child" => Ok(Pseudo::OnlyChild),
            other => Err(parser.new_custom_error(SelectorError::UnsupportedPseudo(other.to_string()))),
        },
        Token::Function(name) if name.eq_ignore_ascii_case("not") => {
            let list = parser.parse_nested_block(|inner| inner.parse_comma_separated(parse_complex))?;
            Ok(Pseudo::Not(list))
        }
        Token::Function(name) => Err(parser.new_custom_error(SelectorError::UnsupportedPseudo(
            name.to_ascii_lowercase(),
        ))),
        other => Err(parser.new_unexpected_token_error(other)),
    }
}
