#![warn(missing_docs)]
//! # Fitting content into ProseMirror node types
//!
//! This crate parses ProseMirror content expressions, resolves them against a runtime
//! [`Schema`](model::Schema) and uses the resolved trees to fit arbitrary nodes into a
//! node type, creating the wrapper nodes that its content model requires in between.
//!
//! On top of that, [`commands::wrap_selection`] wraps the selection of an
//! [`EditorState`](state::EditorState) into a chain of node types.
//!
//! ```
//! use prosemirror_fit::fit::fit_into_node;
//! use prosemirror_fit::markdown::{self, helper::*};
//!
//! let schema = markdown::schema().unwrap();
//! let quote = schema.node_type("blockquote").unwrap();
//! let fitted = fit_into_node(quote, None, &[node("hello")]).unwrap();
//! assert_eq!(fitted.node, blockquote(p("hello")));
//! ```

pub mod commands;
pub mod content;
pub(crate) mod de;
pub mod fit;
pub mod markdown;
pub mod model;
pub mod state;
pub mod transform;
pub(crate) mod util;
