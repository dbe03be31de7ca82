//! # Helpers
//!
//! This module contains some functions to create nodes programmatically. The attributes
//! they set match the defaults of [`schema`](super::schema), so a helper without
//! arguments builds the same node as the schema would.
//!
//! See also: <https://github.com/prosemirror/prosemirror-test-builder>
use crate::model::{AttrNode, Attrs, Fragment, Leaf, Node};
use serde_json::Value;

/// Anything that can be the content of a node
pub trait IntoFragment {
    /// Turn this into a fragment
    fn into_fragment(self) -> Fragment;
}

impl IntoFragment for () {
    fn into_fragment(self) -> Fragment {
        Fragment::new()
    }
}

impl IntoFragment for &str {
    fn into_fragment(self) -> Fragment {
        Fragment::from(Node::text(self))
    }
}

impl IntoFragment for Node {
    fn into_fragment(self) -> Fragment {
        Fragment::from(self)
    }
}

impl IntoFragment for Vec<Node> {
    fn into_fragment(self) -> Fragment {
        Fragment::from(self)
    }
}

impl IntoFragment for Fragment {
    fn into_fragment(self) -> Fragment {
        self
    }
}

impl<A: Into<Node>> IntoFragment for (A,) {
    fn into_fragment(self) -> Fragment {
        Fragment::from(vec![self.0.into()])
    }
}

impl<A: Into<Node>, B: Into<Node>> IntoFragment for (A, B) {
    fn into_fragment(self) -> Fragment {
        Fragment::from(vec![self.0.into(), self.1.into()])
    }
}

impl<A: Into<Node>, B: Into<Node>, C: Into<Node>> IntoFragment for (A, B, C) {
    fn into_fragment(self) -> Fragment {
        Fragment::from(vec![self.0.into(), self.1.into(), self.2.into()])
    }
}

fn attrs<const N: usize>(pairs: [(&str, Value); N]) -> Attrs {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_owned(), value))
        .collect()
}

fn branch<A: IntoFragment>(r#type: &str, attrs: Attrs, content: A) -> Node {
    Node::Branch(AttrNode {
        r#type: r#type.to_owned(),
        attrs,
        content: content.into_fragment(),
    })
}

fn leaf(r#type: &str, attrs: Attrs) -> Node {
    Node::Leaf(Leaf {
        r#type: r#type.to_owned(),
        attrs,
    })
}

/// Create a document node.
pub fn doc<A: IntoFragment>(content: A) -> Node {
    branch("doc", Attrs::new(), content)
}

/// Create a heading node.
pub fn h<A: IntoFragment>(level: u8, content: A) -> Node {
    branch("heading", attrs([("level", level.into())]), content)
}

/// Create a heading (level 1) node.
pub fn h1<A: IntoFragment>(content: A) -> Node {
    h(1, content)
}

/// Create a heading (level 2) node.
pub fn h2<A: IntoFragment>(content: A) -> Node {
    h(2, content)
}

/// Create a paragraph node.
pub fn p<A: IntoFragment>(content: A) -> Node {
    branch("paragraph", Attrs::new(), content)
}

/// Create a list item node.
pub fn li<A: IntoFragment>(content: A) -> Node {
    branch("list_item", Attrs::new(), content)
}

/// Create a Bullet list node.
pub fn ul<A: IntoFragment>(content: A) -> Node {
    branch("bullet_list", attrs([("tight", false.into())]), content)
}

/// Create an ordered list node, counting from 1.
pub fn ol<A: IntoFragment>(content: A) -> Node {
    branch(
        "ordered_list",
        attrs([("order", 1.into()), ("tight", false.into())]),
        content,
    )
}

/// Create a code block node.
pub fn code_block<A: IntoFragment>(params: &str, content: A) -> Node {
    branch("code_block", attrs([("params", params.into())]), content)
}

/// Create a blockquote node.
pub fn blockquote<A: IntoFragment>(content: A) -> Node {
    branch("blockquote", Attrs::new(), content)
}

/// Create a horizontal rule.
pub fn hr() -> Node {
    leaf("horizontal_rule", Attrs::new())
}

/// Create a hard break.
pub fn br() -> Node {
    leaf("hard_break", Attrs::new())
}

/// Create an image without alt text or title.
pub fn img(src: &str) -> Node {
    leaf(
        "image",
        attrs([("src", src.into()), ("alt", "".into()), ("title", "".into())]),
    )
}

/// Create a node.
pub fn node<A: Into<Node>>(src: A) -> Node {
    src.into()
}
