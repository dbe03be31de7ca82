//! Tokens of the content expression language.
use super::GrammarSyntaxError;
use logos::{Logos, Span};
use std::fmt;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
pub(crate) enum Token<'src> {
    #[regex(r"[A-Za-z_][A-Za-z0-9_-]*", |lex| lex.slice())]
    Name(&'src str),

    #[regex(r"[0-9]+", |lex| lex.slice().parse::<usize>().ok())]
    Number(usize),

    #[token("|")]
    Pipe,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("*")]
    Star,
    #[token("+")]
    Plus,
    #[token("?")]
    Question,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Name(name) => write!(f, "name `{}`", name),
            Token::Number(n) => write!(f, "number `{}`", n),
            Token::Pipe => f.write_str("`|`"),
            Token::LParen => f.write_str("`(`"),
            Token::RParen => f.write_str("`)`"),
            Token::Star => f.write_str("`*`"),
            Token::Plus => f.write_str("`+`"),
            Token::Question => f.write_str("`?`"),
            Token::LBrace => f.write_str("`{`"),
            Token::RBrace => f.write_str("`}`"),
            Token::Comma => f.write_str("`,`"),
        }
    }
}

/// Split an expression into tokens, failing on the first character that does
/// not start a token.
pub(crate) fn tokenize(source: &str) -> Result<Vec<(Token<'_>, Span)>, GrammarSyntaxError> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push((token, lexer.span())),
            Err(()) => {
                return Err(GrammarSyntaxError::UnexpectedCharacter {
                    offset: lexer.span().start,
                    text: lexer.slice().to_owned(),
                })
            }
        }
    }

    Ok(tokens)
}
