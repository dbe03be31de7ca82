use super::{Fragment, Node, NodeType, ResolveErr, ResolvedPos, Schema};
use crate::util::EitherOrBoth;
use displaydoc::Display;
use serde::Serialize;
use std::borrow::Cow;
use thiserror::Error;

/// A slice of a fragment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Slice {
    /// The slice's content.
    pub content: Fragment,
    /// The open depth at the start.
    pub open_start: usize,
    /// The open depth at the end.
    pub open_end: usize,
}

impl Slice {
    /// Create a slice. When specifying a non-zero open depth, you must
    /// make sure that there are nodes of at least that depth at the
    /// appropriate side of the fragment, i.e. if the fragment is an empty
    /// paragraph node, `open_start` and `open_end` can't be greater than 1.
    ///
    /// It is not necessary for the content of open nodes to conform to
    /// the schema's content constraints, though it should be a valid
    /// start/end/middle for such a node, depending on which sides are
    /// open.
    pub fn new(content: Fragment, open_start: usize, open_end: usize) -> Slice {
        Slice {
            content,
            open_start,
            open_end,
        }
    }

    /// The size this slice would add when inserted into a document.
    pub fn size(&self) -> usize {
        self.content.size().saturating_sub(self.open_start + self.open_end)
    }
}

/// An error that can occur when replacing a slice
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum ReplaceError {
    /// Inserted content deeper than insertion position
    InsertTooDeep,
    /// Inconsistent open depths
    InconsistentOpenDepths {
        /// Depth at the start
        from_depth: usize,
        /// How many nodes are "open" at the start
        open_start: usize,
        /// Depth at the end
        to_depth: usize,
        /// How many nodes are "open" at the end
        open_end: usize,
    },
    /// Could not resolve an index
    Resolve(#[from] ResolveErr),
    /// Cannot join {0} onto {1}
    CannotJoin(String, String),
    /// Invalid content for node {0}
    InvalidContent(String),
    /// Node type {0} is not part of the schema
    UnknownNodeType(String),
}

pub(crate) fn replace(
    schema: &Schema,
    rp_from: &ResolvedPos,
    rp_to: &ResolvedPos,
    slice: &Slice,
) -> Result<Node, ReplaceError> {
    if slice.open_start > rp_from.depth() {
        Err(ReplaceError::InsertTooDeep)
    } else if Some(rp_from.depth() - slice.open_start) != rp_to.depth().checked_sub(slice.open_end) {
        Err(ReplaceError::InconsistentOpenDepths {
            from_depth: rp_from.depth(),
            open_start: slice.open_start,
            to_depth: rp_to.depth(),
            open_end: slice.open_end,
        })
    } else {
        Replacer { schema }.outer(rp_from, rp_to, slice, 0)
    }
}

struct Replacer<'s> {
    schema: &'s Schema,
}

type Range<'b, 'a> = EitherOrBoth<&'b ResolvedPos<'a>, &'b ResolvedPos<'a>>;

impl<'s> Replacer<'s> {
    fn node_type(&self, node: &Node) -> Result<NodeType<'s>, ReplaceError> {
        self.schema
            .node_type_of(node)
            .ok_or_else(|| ReplaceError::UnknownNodeType(node.r#type().to_owned()))
    }

    fn outer(
        &self,
        rp_from: &ResolvedPos,
        rp_to: &ResolvedPos,
        slice: &Slice,
        depth: usize,
    ) -> Result<Node, ReplaceError> {
        let index = rp_from.index(depth);
        let node = rp_from.node(depth);
        if index == rp_to.index(depth) && depth < rp_from.depth() - slice.open_start {
            // both ends are in the same child and no open node is reached yet
            let inner = self.outer(rp_from, rp_to, slice, depth + 1)?;
            Ok(node.copy(|c| c.replace_child(index, inner).into_owned()))
        } else if slice.content.size() == 0 {
            let content = self.two_way(rp_from, rp_to, depth)?;
            self.close(node, content)
        } else if slice.open_start == 0
            && slice.open_end == 0
            && rp_from.depth() == depth
            && rp_to.depth() == depth
        {
            // Simple, flat case
            let parent = rp_from.parent();
            let content = parent.content().unwrap_or(Fragment::EMPTY_REF);

            let new_content = content
                .cut(0..rp_from.parent_offset())
                .append(slice.content.clone())
                .append(content.cut(rp_to.parent_offset()..));
            self.close(parent, new_content)
        } else {
            let (n, start, end) = prepare_slice_for_replace(slice, rp_from);
            let rp_start = n.resolve(start)?;
            let rp_end = n.resolve(end)?;
            let content = self.three_way(rp_from, &rp_start, &rp_end, rp_to, depth)?;
            self.close(node, content)
        }
    }

    fn check_join(&self, main: &Node, sub: &Node) -> Result<(), ReplaceError> {
        let sub_type = self.node_type(sub)?;
        let main_type = self.node_type(main)?;
        if sub_type.compatible_content(main_type) {
            Ok(())
        } else {
            Err(ReplaceError::CannotJoin(
                sub_type.name().to_owned(),
                main_type.name().to_owned(),
            ))
        }
    }

    fn joinable<'a>(
        &self,
        rp_before: &ResolvedPos<'a>,
        rp_after: &ResolvedPos<'a>,
        depth: usize,
    ) -> Result<&'a Node, ReplaceError> {
        let node = rp_before.node(depth);
        self.check_join(node, rp_after.node(depth))?;
        Ok(node)
    }

    fn close(&self, node: &Node, content: Fragment) -> Result<Node, ReplaceError> {
        let node_type = self.node_type(node)?;
        if node_type.valid_content(&content) {
            Ok(node.copy(|_| content))
        } else {
            Err(ReplaceError::InvalidContent(node_type.name().to_owned()))
        }
    }

    fn three_way(
        &self,
        rp_from: &ResolvedPos,
        rp_start: &ResolvedPos,
        rp_end: &ResolvedPos,
        rp_to: &ResolvedPos,
        depth: usize,
    ) -> Result<Fragment, ReplaceError> {
        let open_start = if rp_from.depth() > depth {
            Some(self.joinable(rp_from, rp_start, depth + 1)?)
        } else {
            None
        };
        let open_end = if rp_to.depth() > depth {
            Some(self.joinable(rp_end, rp_to, depth + 1)?)
        } else {
            None
        };

        let mut content = Vec::new();
        add_range(Range::Right(rp_from), depth, &mut content);
        match (open_start, open_end) {
            (Some(os), Some(oe)) if rp_start.index(depth) == rp_end.index(depth) => {
                self.check_join(os, oe)?;
                let inner = self.three_way(rp_from, rp_start, rp_end, rp_to, depth + 1)?;
                let closed = self.close(os, inner)?;
                add_node(Cow::Owned(closed), &mut content)
            }
            _ => {
                if let Some(os) = open_start {
                    let inner = self.two_way(rp_from, rp_start, depth + 1)?;
                    let closed = self.close(os, inner)?;
                    add_node(Cow::Owned(closed), &mut content);
                }
                add_range(Range::Both(rp_start, rp_end), depth, &mut content);
                if let Some(oe) = open_end {
                    let inner = self.two_way(rp_end, rp_to, depth + 1)?;
                    let closed = self.close(oe, inner)?;
                    add_node(Cow::Owned(closed), &mut content);
                }
            }
        }
        add_range(Range::Left(rp_to), depth, &mut content);
        Ok(Fragment::from(content))
    }

    fn two_way(
        &self,
        rp_from: &ResolvedPos,
        rp_to: &ResolvedPos,
        depth: usize,
    ) -> Result<Fragment, ReplaceError> {
        let mut content = Vec::new();
        add_range(Range::Right(rp_from), depth, &mut content);
        if rp_from.depth() > depth {
            let r#type = self.joinable(rp_from, rp_to, depth + 1)?;
            let inner = self.two_way(rp_from, rp_to, depth + 1)?;
            let child = self.close(r#type, inner)?;
            add_node(Cow::Owned(child), &mut content);
        }
        add_range(Range::Left(rp_to), depth, &mut content);
        Ok(Fragment::from(content))
    }
}

fn add_node(child: Cow<Node>, target: &mut Vec<Node>) {
    if let Some(Node::Text(last)) = target.last() {
        if let Node::Text(c_text) = child.as_ref() {
            let joined = Node::Text(c_text.with_text(last.text.join(&c_text.text)));
            if let Some(slot) = target.last_mut() {
                *slot = joined;
            }
            return;
        }
    }
    target.push(child.into_owned());
}

fn add_range(range: Range, depth: usize, target: &mut Vec<Node>) {
    let node = range.right_or_left().node(depth);
    let mut start_index = 0;

    let end_index = if let Some(rp_end) = range.right() {
        rp_end.index(depth)
    } else {
        node.child_count()
    };

    if let Some(rp_start) = range.left() {
        start_index = rp_start.index(depth);
        if rp_start.depth() > depth {
            start_index += 1;
        } else if rp_start.text_offset() > 0 {
            if let Some(after) = rp_start.node_after() {
                add_node(after, target);
            }
            start_index += 1;
        }
    }
    for i in start_index..end_index {
        if let Some(child) = node.child(i) {
            add_node(Cow::Borrowed(child), target);
        }
    }
    if let Some(rp_end) = range.right() {
        if rp_end.depth() == depth && rp_end.text_offset() > 0 {
            if let Some(before) = rp_end.node_before() {
                add_node(before, target);
            }
        }
    }
}

fn prepare_slice_for_replace(slice: &Slice, rp_along: &ResolvedPos) -> (Node, usize, usize) {
    let extra = rp_along.depth() - slice.open_start;
    let parent = rp_along.node(extra);
    let mut node = parent.copy(|_| slice.content.clone());
    for i in (0..extra).rev() {
        node = rp_along.node(i).copy(|_| Fragment::from(node));
    }

    let start = slice.open_start + extra;
    let end = node.content_size() - slice.open_end - extra;
    (node, start, end)
}
