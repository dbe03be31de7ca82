use super::{Index, Node};
use crate::util;
use displaydoc::Display;
use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::ops::RangeBounds;
use thiserror::Error;

/// What to do after visiting a node in a traversal.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Visit {
    /// Descend into the children of this node
    Continue,
    /// Don't descend into this node, but keep going with its siblings
    SkipChildren,
    /// End the traversal
    Stop,
}

/// Error when looking up a position in a fragment
#[derive(Debug, Copy, Clone, PartialEq, Eq, Display, Error)]
pub enum IndexError {
    /// Position {pos} is outside of a fragment of size {size}
    OutOfBounds {
        /// The requested position
        pos: usize,
        /// The size of the fragment
        size: usize,
    },
}

/// A fragment represents a node's collection of child nodes.
///
/// Like nodes, fragments are persistent data structures, and you should not mutate them or their
/// content. Rather, you create new instances whenever needed. The API tries to make this easy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    inner: Vec<Node>,
    size: usize,
}

impl Fragment {
    /// An empty fragment
    pub const EMPTY: Self = Fragment {
        inner: Vec::new(),
        size: 0,
    };
    /// Reference to an empty fragment
    pub const EMPTY_REF: &'static Self = &Self::EMPTY;

    /// Create a new empty fragment
    pub fn new() -> Self {
        Self::default()
    }

    /// The size of the fragment, which is the total of the size of its content nodes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Get a slice to all child nodes
    pub fn children(&self) -> &[Node] {
        &self.inner[..]
    }

    /// The first child of the fragment wrapped in `Some`, or `None` if it is empty.
    pub fn first_child(&self) -> Option<&Node> {
        self.inner.first()
    }

    /// The last child of the fragment wrapped in `Some`, or `None` if it is empty.
    pub fn last_child(&self) -> Option<&Node> {
        self.inner.last()
    }

    /// The number of child nodes in this fragment.
    pub fn child_count(&self) -> usize {
        self.inner.len()
    }

    /// Create a new fragment containing the combined content of this fragment and the other.
    ///
    /// A text node at the end of this fragment is merged with a text node at the start of
    /// the other one.
    pub fn append(mut self, mut other: Self) -> Self {
        let first = match other.inner.first() {
            Some(first) => first,
            None => return self,
        };
        let last = match self.inner.last_mut() {
            Some(last) => last,
            None => return other,
        };
        if let (Node::Text(n1), Node::Text(n2)) = (&*last, first) {
            *last = Node::Text(n1.with_text(n1.text.join(&n2.text)));
            other.inner.remove(0);
        }
        self.inner.append(&mut other.inner);
        self.size += other.size;
        self
    }

    /// Cut out the sub-fragment between the two given positions.
    pub fn cut<R: RangeBounds<usize>>(&self, range: R) -> Self {
        let from = util::from(&range);
        let to = util::to(&range, self.size);

        if from == 0 && to == self.size {
            return self.clone();
        }

        let mut result = vec![];
        let mut size = 0;
        if to > from {
            let mut pos = 0;
            for child in &self.inner {
                if pos >= to {
                    break;
                }
                let end = pos + child.node_size();
                if end > from {
                    let new_child = if pos < from || end > to {
                        if let Node::Text(node) = child {
                            let len = node.text.len_utf16();
                            let start = from.saturating_sub(pos);
                            let end = usize::min(len, to - pos);
                            child.cut(start..end)
                        } else {
                            let t = pos + 1;
                            let start = from.saturating_sub(t);
                            let end = usize::min(child.content_size(), to.saturating_sub(t));
                            child.cut(start..end)
                        }
                        .into_owned()
                    } else {
                        child.clone()
                    };
                    size += new_child.node_size();
                    result.push(new_child);
                }
                pos = end;
            }
        }
        Fragment {
            inner: result,
            size,
        }
    }

    /// Invoke a callback for all descendant nodes between the given two positions (relative to
    /// start of this fragment). `node_start` is added to every reported position.
    pub fn nodes_between<F>(&self, from: usize, to: usize, f: &mut F, node_start: usize)
    where
        F: FnMut(&Node, usize) -> Visit,
    {
        self.walk(from, to, f, node_start);
    }

    /// Call `f` for every descendant node, in pre-order, with its position relative to the
    /// start of this fragment.
    pub fn descendants<F>(&self, mut f: F)
    where
        F: FnMut(&Node, usize) -> Visit,
    {
        self.walk(0, self.size, &mut f, 0);
    }

    /// Returns false when the traversal was stopped.
    fn walk<F>(&self, from: usize, to: usize, f: &mut F, node_start: usize) -> bool
    where
        F: FnMut(&Node, usize) -> Visit,
    {
        let mut pos = 0;
        for child in &self.inner {
            if pos >= to {
                break;
            }
            let end = pos + child.node_size();
            if end > from {
                match f(child, node_start + pos) {
                    Visit::Stop => return false,
                    Visit::SkipChildren => {}
                    Visit::Continue => {
                        if let Some(content) = child.content() {
                            let start = pos + 1;
                            let inner_to = usize::min(content.size(), to.saturating_sub(start));
                            if !content.walk(
                                from.saturating_sub(start),
                                inner_to,
                                f,
                                node_start + start,
                            ) {
                                return false;
                            }
                        }
                    }
                }
            }
            pos = end;
        }
        true
    }

    /// Get all text between positions from and to. When `block_separator` is given, it will be
    /// inserted whenever a new non-leaf node is started. When `leaf_text` is given, it'll be
    /// inserted for every non-text leaf node encountered.
    pub fn text_between(
        &self,
        from: usize,
        to: usize,
        block_separator: Option<&str>,
        leaf_text: Option<&str>,
    ) -> String {
        let mut text = String::new();
        let mut separated = true;
        self.nodes_between(
            from,
            to,
            &mut |node, pos| {
                match node {
                    Node::Text(txt_node) => {
                        let txt = txt_node.text.as_str();
                        let skip = from.saturating_sub(pos);
                        let rest = util::split_at_utf16(txt, skip).1;
                        let slice = util::split_at_utf16(rest, (to - pos).saturating_sub(skip)).0;
                        text.push_str(slice);
                        separated = block_separator.is_none();
                    }
                    Node::Leaf(_) => {
                        if let Some(leaf_text) = leaf_text {
                            text.push_str(leaf_text);
                        }
                        separated = block_separator.is_none();
                    }
                    Node::Branch(_) => {
                        if !separated {
                            text.push_str(block_separator.unwrap_or(""));
                            separated = true;
                        }
                    }
                }
                Visit::Continue
            },
            0,
        );
        text
    }

    /// Create a new fragment in which the node at the given index is replaced by the given node.
    ///
    /// Returns the fragment unchanged if the index is out of range.
    pub fn replace_child(&self, index: usize, node: Node) -> Cow<Self> {
        let current = match self.inner.get(index) {
            Some(current) => current,
            None => return Cow::Borrowed(self),
        };

        if *current == node {
            Cow::Borrowed(self)
        } else {
            let size = self.size + node.node_size() - current.node_size();
            let mut copy = self.inner.clone();
            copy[index] = node;
            Cow::Owned(Fragment { inner: copy, size })
        }
    }

    /// Get the child node at the given index, if it exists.
    pub fn child(&self, index: usize) -> Option<&Node> {
        self.inner.get(index)
    }

    /// Get the child node at the given index, if it exists.
    pub fn maybe_child(&self, index: usize) -> Option<&Node> {
        self.inner.get(index)
    }

    /// Find the index and inner offset corresponding to a given relative position in this
    /// fragment. With `round`, a position inside a child is rounded up to the end of it.
    pub fn find_index(&self, pos: usize, round: bool) -> Result<Index, IndexError> {
        let len = self.inner.len();
        match pos {
            0 => Ok(Index::new(0, pos)),
            p if p == self.size => Ok(Index::new(len, pos)),
            p if p > self.size => Err(IndexError::OutOfBounds {
                pos,
                size: self.size,
            }),
            p => {
                let mut cur_pos = 0;
                for (i, cur) in self.inner.iter().enumerate() {
                    let end = cur_pos + cur.node_size();
                    if end >= p {
                        if (end == p) || round {
                            return Ok(Index::new(i + 1, end));
                        } else {
                            return Ok(Index::new(i, cur_pos));
                        }
                    }
                    cur_pos = end;
                }
                Err(IndexError::OutOfBounds {
                    pos,
                    size: self.size,
                })
            }
        }
    }

    pub(crate) fn push(&mut self, node: Node) {
        self.size += node.node_size();
        self.inner.push(node);
    }
}

impl Serialize for Fragment {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.inner.serialize(serializer)
    }
}

impl From<Vec<Node>> for Fragment {
    fn from(src: Vec<Node>) -> Fragment {
        let size = src.iter().map(Node::node_size).sum::<usize>();
        Fragment { inner: src, size }
    }
}

impl From<Node> for Fragment {
    fn from(node: Node) -> Fragment {
        Fragment::from(vec![node])
    }
}

impl From<Fragment> for Vec<Node> {
    fn from(src: Fragment) -> Vec<Node> {
        src.inner
    }
}

impl std::iter::FromIterator<Node> for Fragment {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        iter.into_iter().fold(Fragment::new(), |mut acc, node| {
            acc.push(node);
            acc
        })
    }
}

impl<'a> IntoIterator for &'a Fragment {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}
