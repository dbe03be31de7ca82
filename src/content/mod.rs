//! # Content expressions
//!
//! Node types constrain their children with a small grammar, e.g.
//! `paragraph block*` or `(text | image)*`. This module parses such
//! expressions, resolves them against a table of node types and groups, and
//! flattens the resolved trees into the references that the fitting engine
//! searches.
//!
//! Every node type's content is resolved into a tree of its own. A node
//! expression only names its type; searches that need to look inside it
//! continue in that type's tree.
mod cache;
mod lexer;
mod matcher;
mod parse;
mod resolve;
mod values;

pub use cache::{parse_cached, ExprCache};
pub use matcher::ContentMatcher;
pub use parse::{parse, ContentExpr, Quantifier, MAX_REPETITIONS};
pub use resolve::{
    resolve, resolve_content, Ancestors, Declaration, ExprId, NodeTypeTable, ResolvedExpr,
    ResolvedKind, ResolvedNode,
};
pub use values::{placements, values, LeafRef, Placement, ResolvedTable};

use displaydoc::Display;
use thiserror::Error;

/// A content expression that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum GrammarSyntaxError {
    /// Unrecognized input {text:?} at offset {offset}
    UnexpectedCharacter {
        /// Byte offset of the input
        offset: usize,
        /// The unrecognized input
        text: String,
    },
    /// Unexpected {found} at offset {offset}
    UnexpectedToken {
        /// Byte offset of the token
        offset: usize,
        /// Description of the token
        found: String,
    },
    /// Group opened at offset {offset} is never closed
    UnclosedGroup {
        /// Byte offset of the `(`
        offset: usize,
    },
    /// Unmatched `)` at offset {offset}
    UnmatchedClose {
        /// Byte offset of the `)`
        offset: usize,
    },
    /// Empty alternative at offset {offset}
    EmptyAlternative {
        /// Byte offset where the alternative should start
        offset: usize,
    },
    /// Repetition range at offset {offset} has a maximum below its minimum or is too large
    InvalidRange {
        /// Byte offset of the `{`
        offset: usize,
    },
    /// Unexpected end of expression
    UnexpectedEnd,
}

/// Errors when turning an expression into a resolved tree.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum ContentError {
    /// Invalid syntax: {0}
    Syntax(#[from] GrammarSyntaxError),
    /// `{0}` is neither a node type nor a group
    UnknownTypeReference(String),
    /// Group `{0}` contains itself
    CyclicGrammar(String),
}
