//! # The markdown schema
//!
//! This module is derived from the `prosemirror-markdown` schema. It declares the node
//! types as a [`SchemaSpec`](crate::model::SchemaSpec), with typed views on their
//! attributes and builder functions for documents.
mod attrs;
pub mod helper;
mod schema;

pub use attrs::{
    BulletListAttrs, CodeBlockAttrs, HeadingAttrs, ImageAttrs, NodeAttrs, OrderedListAttrs,
};
pub use schema::{schema, schema_spec};
