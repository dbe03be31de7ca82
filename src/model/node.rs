use super::{Fragment, ReplaceError, ResolveErr, ResolvedPos, Schema, Slice, Visit};
use crate::util;
use displaydoc::Display;
use once_cell::sync::Lazy;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::borrow::Cow;
use std::ops::RangeBounds;
use thiserror::Error;

/// The attributes of a node, keyed by name.
pub type Attrs = serde_json::Map<String, serde_json::Value>;

static NO_ATTRS: Lazy<Attrs> = Lazy::new(Attrs::new);

/// Error when slicing a node
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum SliceError {
    /// Could not resolve a position
    Resolve(#[from] ResolveErr),
    /// Range {from}..{to} is reversed
    Reversed {
        /// Start of the range
        from: usize,
        /// End of the range
        to: usize,
    },
}

/// This type represents a node in the tree that makes up a document. So a document is
/// an instance of Node, with children that are also instances of Node.
///
/// Nodes only know the name of their type; look it up with
/// [`Schema::node_type_of`] for anything the type declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A text node
    Text(TextNode),
    /// A node that can't have content
    Leaf(Leaf),
    /// A node with content
    Branch(AttrNode),
}

/// A node with attributes and content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrNode {
    /// Name of the node type
    pub r#type: String,
    /// Attributes
    pub attrs: Attrs,
    /// The content.
    pub content: Fragment,
}

/// A text node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextNode {
    /// The actual text
    pub text: Text,
}

impl TextNode {
    /// Create a new `TextNode` with the given text
    pub fn with_text(&self, text: Text) -> Self {
        TextNode { text }
    }
}

/// A leaf node (just attributes)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    /// Name of the node type
    pub r#type: String,
    /// Attributes
    pub attrs: Attrs,
}

impl Node {
    /// The name of the text node type
    pub const TEXT: &'static str = "text";

    /// Creates a new text node
    pub fn text<A: Into<String>>(text: A) -> Self {
        Node::Text(TextNode {
            text: Text::from(text.into()),
        })
    }

    /// The name of the type of this node.
    pub fn r#type(&self) -> &str {
        match self {
            Node::Text(_) => Self::TEXT,
            Node::Leaf(leaf) => &leaf.r#type,
            Node::Branch(branch) => &branch.r#type,
        }
    }

    /// The attributes of this node, empty for text nodes.
    pub fn attrs(&self) -> &Attrs {
        match self {
            Node::Text(_) => &NO_ATTRS,
            Node::Leaf(leaf) => &leaf.attrs,
            Node::Branch(branch) => &branch.attrs,
        }
    }

    /// A container holding the node's children, `None` for text and leaf nodes.
    pub fn content(&self) -> Option<&Fragment> {
        match self {
            Node::Branch(branch) => Some(&branch.content),
            Node::Text(_) | Node::Leaf(_) => None,
        }
    }

    /// Get the text node if this is one
    pub fn text_node(&self) -> Option<&TextNode> {
        match self {
            Node::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Get the child node at the given index, if it exists.
    pub fn child(&self, index: usize) -> Option<&Node> {
        self.content().and_then(|c| c.child(index))
    }

    /// The first child, if any
    pub fn first_child(&self) -> Option<&Node> {
        self.content().and_then(Fragment::first_child)
    }

    /// The number of children that the node has.
    pub fn child_count(&self) -> usize {
        self.content().map_or(0, Fragment::child_count)
    }

    /// True when this node can't have content.
    pub fn is_leaf(&self) -> bool {
        self.content().is_none()
    }

    /// True when this is a text node.
    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    /// The size of this node, as defined by the integer-based indexing scheme. For text nodes,
    /// this is the amount of UTF-16 code units. For other leaf nodes, it is one. For non-leaf
    /// nodes, it is the size of the content plus two (the start and end token).
    pub fn node_size(&self) -> usize {
        match self {
            Node::Text(text) => text.text.len_utf16(),
            Node::Leaf(_) => 1,
            Node::Branch(branch) => branch.content.size() + 2,
        }
    }

    /// Represents `.content.size` in JS
    pub fn content_size(&self) -> usize {
        self.content().map_or(0, Fragment::size)
    }

    /// Create a new node with the same markup as this node, containing the mapped content.
    /// Text and leaf nodes are returned unchanged.
    pub fn copy<F>(&self, map: F) -> Self
    where
        F: FnOnce(&Fragment) -> Fragment,
    {
        match self {
            Node::Branch(branch) => Node::Branch(AttrNode {
                r#type: branch.r#type.clone(),
                attrs: branch.attrs.clone(),
                content: map(&branch.content),
            }),
            Node::Text(_) | Node::Leaf(_) => self.clone(),
        }
    }

    /// Create a copy of this node with only the content between the given positions.
    pub fn cut<R: RangeBounds<usize>>(&self, range: R) -> Cow<Self> {
        let from = util::from(&range);

        if let Node::Text(text_node) = self {
            let len = text_node.text.len_utf16();
            let to = util::to(&range, len);

            if from == 0 && to == len {
                return Cow::Borrowed(self);
            }
            let (_, rest) = util::split_at_utf16(text_node.text.as_str(), from);
            let (rest, _) = util::split_at_utf16(rest, to.saturating_sub(from));

            Cow::Owned(Node::Text(text_node.with_text(Text::from(rest.to_owned()))))
        } else {
            let content_size = self.content_size();
            let to = util::to(&range, content_size);

            if from == 0 && to == content_size {
                Cow::Borrowed(self)
            } else {
                Cow::Owned(self.copy(|c| c.cut(from..to)))
            }
        }
    }

    /// Concatenates all the text nodes found in this node and its children.
    pub fn text_content(&self) -> String {
        match self {
            Node::Text(text_node) => text_node.text.as_str().to_owned(),
            Node::Leaf(_) => String::new(),
            Node::Branch(branch) => {
                branch
                    .content
                    .text_between(0, branch.content.size(), Some(""), None)
            }
        }
    }

    /// Resolve the given position in the document, returning a struct with information about its
    /// context.
    pub fn resolve(&self, pos: usize) -> Result<ResolvedPos, ResolveErr> {
        ResolvedPos::resolve(self, pos)
    }

    /// Cut out the part of the document between the given positions, and return it as a
    /// `Slice` object.
    ///
    /// With `include_parents`, the slice is open all the way up to this node, otherwise only
    /// up to the deepest node containing both positions.
    pub fn slice<R: RangeBounds<usize>>(
        &self,
        range: R,
        include_parents: bool,
    ) -> Result<Slice, SliceError> {
        let from = util::from(&range);
        let to = util::to(&range, self.content_size());

        if from > to {
            return Err(SliceError::Reversed { from, to });
        }
        if from == to {
            return Ok(Slice::default());
        }

        let rp_from = self.resolve(from)?;
        let rp_to = self.resolve(to)?;
        let depth = if include_parents {
            0
        } else {
            rp_from.shared_depth(to)
        };
        let start = rp_from.start(depth);
        let node = rp_from.node(depth);
        let content = node
            .content()
            .unwrap_or(Fragment::EMPTY_REF)
            .cut(rp_from.pos() - start..rp_to.pos() - start);
        Ok(Slice::new(
            content,
            rp_from.depth() - depth,
            rp_to.depth() - depth,
        ))
    }

    /// Replace the part of the document between the given positions with the given slice.
    ///
    /// The slice must 'fit', meaning its open sides must be able to connect to the
    /// surrounding content, and its content nodes must be valid children for the node
    /// they are placed into. If any of this is violated, an error is returned.
    pub fn replace<R: RangeBounds<usize>>(
        &self,
        schema: &Schema,
        range: R,
        slice: &Slice,
    ) -> Result<Node, ReplaceError> {
        let from = util::from(&range);
        let to = util::to(&range, self.content_size());
        let rp_from = self.resolve(from)?;
        let rp_to = self.resolve(to)?;
        super::replace::replace(schema, &rp_from, &rp_to, slice)
    }

    /// Invoke a callback for all descendant nodes between the given two positions
    /// (relative to the start of this node's content).
    pub fn nodes_between<F>(&self, from: usize, to: usize, mut f: F)
    where
        F: FnMut(&Node, usize) -> Visit,
    {
        if let Some(content) = self.content() {
            content.nodes_between(from, to, &mut f, 0)
        }
    }

    /// Call `f` for every descendant node.
    pub fn descendants<F>(&self, f: F)
    where
        F: FnMut(&Node, usize) -> Visit,
    {
        if let Some(content) = self.content() {
            content.descendants(f)
        }
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Self::text(text)
    }
}

impl Serialize for Node {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", self.r#type())?;
        match self {
            Node::Text(text_node) => {
                map.serialize_entry("text", &text_node.text)?;
            }
            Node::Leaf(leaf) => {
                if !leaf.attrs.is_empty() {
                    map.serialize_entry("attrs", &leaf.attrs)?;
                }
            }
            Node::Branch(branch) => {
                if !branch.attrs.is_empty() {
                    map.serialize_entry("attrs", &branch.attrs)?;
                }
                if branch.content.size() > 0 {
                    map.serialize_entry("content", &branch.content)?;
                }
            }
        }
        map.end()
    }
}

/// A string that stores its length in utf-16
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub struct Text {
    len_utf16: usize,
    content: String,
}

impl Text {
    /// Return the contained string
    pub fn as_str(&self) -> &str {
        &self.content
    }

    /// The length of this string if it were encoded in utf-16
    pub fn len_utf16(&self) -> usize {
        self.len_utf16
    }

    /// Concatenate two strings
    pub fn join(&self, other: &Text) -> Text {
        Text {
            len_utf16: self.len_utf16 + other.len_utf16,
            content: self.content.clone() + &other.content,
        }
    }
}

impl From<String> for Text {
    fn from(src: String) -> Text {
        Text {
            len_utf16: src.encode_utf16().count(),
            content: src,
        }
    }
}

impl Serialize for Text {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.content.serialize(serializer)
    }
}
