use super::lexer::{tokenize, Token};
use super::GrammarSyntaxError;
use logos::Span;
use std::fmt;

/// The largest count a `{min,max}` range may name.
pub const MAX_REPETITIONS: usize = 256;

/// How often a sub-expression may repeat.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Quantifier {
    /// Exactly once (no suffix)
    One,
    /// `?`
    Optional,
    /// `*`
    ZeroOrMore,
    /// `+`
    OneOrMore,
    /// `{min}`, `{min,}` or `{min,max}`
    Range {
        /// Minimum number of repetitions
        min: usize,
        /// Maximum number of repetitions, unbounded when `None`
        max: Option<usize>,
    },
}

impl Quantifier {
    /// The minimum number of repetitions.
    pub fn min(self) -> usize {
        match self {
            Self::One | Self::OneOrMore => 1,
            Self::Optional | Self::ZeroOrMore => 0,
            Self::Range { min, .. } => min,
        }
    }

    /// The maximum number of repetitions, `None` if unbounded.
    pub fn max(self) -> Option<usize> {
        match self {
            Self::One | Self::Optional => Some(1),
            Self::ZeroOrMore | Self::OneOrMore => None,
            Self::Range { max, .. } => max,
        }
    }

    /// True if more than one repetition is allowed.
    pub fn is_repeatable(self) -> bool {
        self.max().map_or(true, |max| max > 1)
    }
}

impl Default for Quantifier {
    fn default() -> Self {
        Self::One
    }
}

impl fmt::Display for Quantifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One => Ok(()),
            Self::Optional => f.write_str("?"),
            Self::ZeroOrMore => f.write_str("*"),
            Self::OneOrMore => f.write_str("+"),
            Self::Range { min, max: None } => write!(f, "{{{},}}", min),
            Self::Range { min, max: Some(max) } if min == max => write!(f, "{{{}}}", min),
            Self::Range { min, max: Some(max) } => write!(f, "{{{},{}}}", min, max),
        }
    }
}

/// A parsed content expression.
///
/// Produced once per expression string by [`parse`] and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContentExpr {
    /// Children that must follow each other in order
    Sequence(Vec<ContentExpr>),
    /// Exactly one of the children
    Alternation(Vec<ContentExpr>),
    /// A parenthesised sub-expression
    Group {
        /// The grouped expression
        body: Box<ContentExpr>,
        /// Repetition of the whole group
        quantifier: Quantifier,
    },
    /// The name of a node type or group
    Reference {
        /// The referenced name
        name: String,
        /// Repetition of the reference
        quantifier: Quantifier,
    },
}

impl ContentExpr {
    /// The empty expression, which matches only empty content.
    pub fn empty() -> Self {
        Self::Sequence(Vec::new())
    }

    /// True if the expression has no references at all.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Sequence(items) | Self::Alternation(items) => items.iter().all(Self::is_empty),
            Self::Group { body, .. } => body.is_empty(),
            Self::Reference { .. } => false,
        }
    }

    /// The quantifier of this expression, `One` for sequences and alternations.
    pub fn quantifier(&self) -> Quantifier {
        match self {
            Self::Group { quantifier, .. } | Self::Reference { quantifier, .. } => *quantifier,
            Self::Sequence(_) | Self::Alternation(_) => Quantifier::One,
        }
    }

    fn quantify(self, quantifier: Quantifier) -> Self {
        match self {
            Self::Reference {
                name,
                quantifier: Quantifier::One,
            } => Self::Reference { name, quantifier },
            Self::Group {
                body,
                quantifier: Quantifier::One,
            } => Self::Group { body, quantifier },
            other => Self::Group {
                body: Box::new(other),
                quantifier,
            },
        }
    }
}

impl fmt::Display for ContentExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequence(items) => write_joined(f, items, " "),
            Self::Alternation(items) => write_joined(f, items, " | "),
            Self::Group { body, quantifier } => write!(f, "({}){}", body, quantifier),
            Self::Reference { name, quantifier } => write!(f, "{}{}", name, quantifier),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[ContentExpr], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        // sequences bind tighter than alternations
        match item {
            ContentExpr::Alternation(_) => write!(f, "({})", item)?,
            ContentExpr::Sequence(_) if sep == " " => write!(f, "({})", item)?,
            _ => write!(f, "{}", item)?,
        }
    }
    Ok(())
}

/// Parse a content expression such as `paragraph (heading | image)* list_item{1,3}`.
///
/// Whitespace only separates tokens. An empty expression parses to an empty
/// sequence.
pub fn parse(expression: &str) -> Result<ContentExpr, GrammarSyntaxError> {
    let tokens = tokenize(expression)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.alternation()?;
    match parser.peek() {
        None => Ok(expr),
        Some((Token::RParen, span)) => Err(GrammarSyntaxError::UnmatchedClose { offset: span.start }),
        Some((token, span)) => Err(GrammarSyntaxError::UnexpectedToken {
            offset: span.start,
            found: token.to_string(),
        }),
    }
}

struct Parser<'src> {
    tokens: Vec<(Token<'src>, Span)>,
    pos: usize,
}

impl<'src> Parser<'src> {
    fn peek(&self) -> Option<(Token<'src>, Span)> {
        self.tokens.get(self.pos).cloned()
    }

    fn next(&mut self) -> Option<(Token<'src>, Span)> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: Token<'_>) -> bool {
        match self.peek() {
            Some((token, _)) if token == expected => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    fn alternation(&mut self) -> Result<ContentExpr, GrammarSyntaxError> {
        let start = self.peek().map(|(_, span)| span.start);
        let first = self.sequence()?;
        if !matches!(self.peek(), Some((Token::Pipe, _))) {
            return Ok(first);
        }
        if first.is_empty_sequence() {
            return Err(GrammarSyntaxError::EmptyAlternative {
                offset: start.unwrap_or(0),
            });
        }

        let mut branches = vec![first];
        while let Some((Token::Pipe, span)) = self.peek() {
            self.pos += 1;
            let branch = self.sequence()?;
            if branch.is_empty_sequence() {
                return Err(GrammarSyntaxError::EmptyAlternative { offset: span.end });
            }
            branches.push(branch);
        }
        Ok(ContentExpr::Alternation(branches))
    }

    fn sequence(&mut self) -> Result<ContentExpr, GrammarSyntaxError> {
        let mut items = Vec::new();
        while let Some((Token::Name(_), _)) | Some((Token::LParen, _)) = self.peek() {
            items.push(self.postfix()?);
        }
        if items.len() == 1 {
            Ok(items.remove(0))
        } else {
            Ok(ContentExpr::Sequence(items))
        }
    }

    fn postfix(&mut self) -> Result<ContentExpr, GrammarSyntaxError> {
        let mut expr = self.atom()?;
        loop {
            let quantifier = match self.peek() {
                Some((Token::Star, _)) => Quantifier::ZeroOrMore,
                Some((Token::Plus, _)) => Quantifier::OneOrMore,
                Some((Token::Question, _)) => Quantifier::Optional,
                Some((Token::LBrace, span)) => {
                    self.pos += 1;
                    let range = self.range(span.start)?;
                    expr = expr.quantify(range);
                    continue;
                }
                _ => return Ok(expr),
            };
            self.pos += 1;
            expr = expr.quantify(quantifier);
        }
    }

    fn range(&mut self, offset: usize) -> Result<Quantifier, GrammarSyntaxError> {
        let min = self.number()?;
        let max = if self.eat(Token::Comma) {
            match self.peek() {
                Some((Token::Number(_), _)) => Some(self.number()?),
                _ => None,
            }
        } else {
            Some(min)
        };
        self.expect(Token::RBrace)?;
        match max {
            Some(max) if max < min || max > MAX_REPETITIONS => {
                Err(GrammarSyntaxError::InvalidRange { offset })
            }
            _ if min > MAX_REPETITIONS => Err(GrammarSyntaxError::InvalidRange { offset }),
            _ => Ok(Quantifier::Range { min, max }),
        }
    }

    fn number(&mut self) -> Result<usize, GrammarSyntaxError> {
        match self.next() {
            Some((Token::Number(n), _)) => Ok(n),
            Some((token, span)) => Err(GrammarSyntaxError::UnexpectedToken {
                offset: span.start,
                found: token.to_string(),
            }),
            None => Err(GrammarSyntaxError::UnexpectedEnd),
        }
    }

    fn expect(&mut self, expected: Token<'_>) -> Result<(), GrammarSyntaxError> {
        match self.next() {
            Some((token, _)) if token == expected => Ok(()),
            Some((token, span)) => Err(GrammarSyntaxError::UnexpectedToken {
                offset: span.start,
                found: token.to_string(),
            }),
            None => Err(GrammarSyntaxError::UnexpectedEnd),
        }
    }

    fn atom(&mut self) -> Result<ContentExpr, GrammarSyntaxError> {
        match self.next() {
            Some((Token::Name(name), _)) => Ok(ContentExpr::Reference {
                name: name.to_owned(),
                quantifier: Quantifier::One,
            }),
            Some((Token::LParen, span)) => {
                let body = self.alternation()?;
                if !self.eat(Token::RParen) {
                    return Err(GrammarSyntaxError::UnclosedGroup { offset: span.start });
                }
                Ok(ContentExpr::Group {
                    body: Box::new(body),
                    quantifier: Quantifier::One,
                })
            }
            Some((token, span)) => Err(GrammarSyntaxError::UnexpectedToken {
                offset: span.start,
                found: token.to_string(),
            }),
            None => Err(GrammarSyntaxError::UnexpectedEnd),
        }
    }
}

impl ContentExpr {
    fn is_empty_sequence(&self) -> bool {
        matches!(self, Self::Sequence(items) if items.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::{parse, ContentExpr, Quantifier};
    use crate::content::GrammarSyntaxError;

    fn r(name: &str, quantifier: Quantifier) -> ContentExpr {
        ContentExpr::Reference {
            name: name.to_owned(),
            quantifier,
        }
    }

    #[test]
    fn test_parse_sequence_and_alternation() {
        assert_eq!(
            parse("paragraph block*").unwrap(),
            ContentExpr::Sequence(vec![
                r("paragraph", Quantifier::One),
                r("block", Quantifier::ZeroOrMore)
            ])
        );
        assert_eq!(
            parse("(text | image)*").unwrap(),
            ContentExpr::Group {
                body: Box::new(ContentExpr::Alternation(vec![
                    r("text", Quantifier::One),
                    r("image", Quantifier::One)
                ])),
                quantifier: Quantifier::ZeroOrMore,
            }
        );
    }

    #[test]
    fn test_stacked_quantifiers_wrap() {
        assert_eq!(
            parse("a+?").unwrap(),
            ContentExpr::Group {
                body: Box::new(r("a", Quantifier::OneOrMore)),
                quantifier: Quantifier::Optional,
            }
        );
    }

    #[test]
    fn test_display_round_trips() {
        for src in &["paragraph block*", "(text | image)*", "a{2,} (b c){1,3} d{2}", "a | b c"] {
            let expr = parse(src).unwrap();
            assert_eq!(&expr.to_string(), src);
            assert_eq!(parse(&expr.to_string()).unwrap(), expr);
        }
    }

    #[test]
    fn test_huge_ranges_are_rejected() {
        assert!(parse("a{256}").is_ok());
        assert!(parse("a{2,256}").is_ok());
        for src in &["a{257}", "a{4000000000}", "a{257,}", "a{1,300}"] {
            assert_eq!(parse(src), Err(GrammarSyntaxError::InvalidRange { offset: 1 }), "{}", src);
        }
    }

    #[test]
    fn test_quantifier_bounds() {
        assert_eq!(Quantifier::OneOrMore.min(), 1);
        assert_eq!(Quantifier::OneOrMore.max(), None);
        assert!(!Quantifier::Optional.is_repeatable());
        assert!(Quantifier::Range { min: 0, max: Some(2) }.is_repeatable());
    }
}
