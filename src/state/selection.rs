use crate::model::{Node, ResolvedPos, Schema, Slice, SliceError};
use crate::transform::{Assoc, StepMap};
use serde::Serialize;

/// Which way to search for a selection
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    /// Towards the start of the document
    Backward,
    /// Towards the end of the document
    Forward,
}

/// The selected part of a document
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Selection {
    /// A cursor or range in inline content. `anchor` stays put when extending, `head` moves.
    Text {
        /// The fixed side
        anchor: usize,
        /// The moving side
        head: usize,
    },
    /// A single selected node
    Node {
        /// Position before the node
        from: usize,
        /// Position after the node
        to: usize,
    },
    /// A cursor between two blocks where no text cursor can go
    Gap {
        /// The position of the cursor
        pos: usize,
    },
}

impl Selection {
    /// A collapsed text selection
    pub fn cursor(pos: usize) -> Self {
        Selection::Text {
            anchor: pos,
            head: pos,
        }
    }

    /// Select the node after `pos`. Returns `None` if there is no such node.
    pub fn node(doc: &Node, pos: usize) -> Option<Self> {
        let rp = doc.resolve(pos).ok()?;
        let node = rp.node_after()?;
        Some(Selection::Node {
            from: pos,
            to: pos + node.node_size(),
        })
    }

    /// The lower bound of the selection
    pub fn from(&self) -> usize {
        match *self {
            Selection::Text { anchor, head } => anchor.min(head),
            Selection::Node { from, .. } => from,
            Selection::Gap { pos } => pos,
        }
    }

    /// The upper bound of the selection
    pub fn to(&self) -> usize {
        match *self {
            Selection::Text { anchor, head } => anchor.max(head),
            Selection::Node { to, .. } => to,
            Selection::Gap { pos } => pos,
        }
    }

    /// True if the selection covers no content
    pub fn is_empty(&self) -> bool {
        self.from() == self.to()
    }

    /// True for a gap cursor
    pub fn is_gap_cursor(&self) -> bool {
        matches!(self, Selection::Gap { .. })
    }

    /// The selected content, open up to the document
    pub fn content(&self, doc: &Node) -> Result<Slice, SliceError> {
        doc.slice(self.from()..self.to(), true)
    }

    /// Map the selection through a replace. Selections that don't survive the change are
    /// replaced with the nearest valid one.
    pub fn map(&self, schema: &Schema, doc: &Node, map: &StepMap) -> Selection {
        let mapped = match *self {
            Selection::Text { anchor, head } => {
                let anchor = map.map(anchor, Assoc::After);
                let head = map.map(head, Assoc::After);
                if is_text_pos(schema, doc, anchor) && is_text_pos(schema, doc, head) {
                    return Selection::Text { anchor, head };
                }
                head
            }
            Selection::Node { from, to } => {
                let new_from = map.map(from, Assoc::After);
                let new_to = map.map(to, Assoc::Before);
                let size = doc
                    .resolve(new_from)
                    .ok()
                    .and_then(|rp| rp.node_after().map(|n| n.node_size()));
                if new_to > new_from && size == Some(new_to - new_from) {
                    return Selection::Node {
                        from: new_from,
                        to: new_to,
                    };
                }
                new_from
            }
            Selection::Gap { pos } => {
                let pos = map.map(pos, Assoc::After);
                if doc.resolve(pos).map_or(false, |rp| is_gap_pos(schema, &rp)) {
                    return Selection::Gap { pos };
                }
                pos
            }
        };
        match doc.resolve(mapped.min(doc.content_size())) {
            Ok(rp) => Selection::near(schema, &rp, Direction::Forward),
            Err(_) => Selection::at_start(schema, doc),
        }
    }

    /// Find a valid cursor or node selection starting at `rp`, looking in the given
    /// direction. With `text_only`, only text selections are returned.
    pub fn find_from(
        schema: &Schema,
        rp: &ResolvedPos,
        dir: Direction,
        text_only: bool,
    ) -> Option<Selection> {
        if has_inline_content(schema, rp.parent()) {
            return Some(Selection::cursor(rp.pos()));
        }
        let finder = Finder { schema, dir, text_only };
        if let Some(found) = finder.find_in(rp.parent(), rp.pos(), rp.index(rp.depth())) {
            return Some(found);
        }
        for depth in (0..rp.depth()).rev() {
            let found = match dir {
                Direction::Backward => rp
                    .before(depth + 1)
                    .and_then(|pos| finder.find_in(rp.node(depth), pos, rp.index(depth))),
                Direction::Forward => rp
                    .after(depth + 1)
                    .and_then(|pos| finder.find_in(rp.node(depth), pos, rp.index(depth) + 1)),
            };
            if found.is_some() {
                return found;
            }
        }
        None
    }

    /// The valid selection closest to `rp`, preferring the `bias` direction. Falls back to
    /// a gap cursor at `rp` when the document has no selectable position at all.
    pub fn near(schema: &Schema, rp: &ResolvedPos, bias: Direction) -> Selection {
        let other = match bias {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        };
        Self::find_from(schema, rp, bias, false)
            .or_else(|| Self::find_from(schema, rp, other, false))
            .unwrap_or(Selection::Gap { pos: rp.pos() })
    }

    /// The first valid selection in the document
    pub fn at_start(schema: &Schema, doc: &Node) -> Selection {
        match doc.resolve(0) {
            Ok(rp) => Self::find_from(schema, &rp, Direction::Forward, false)
                .unwrap_or(Selection::Gap { pos: 0 }),
            Err(_) => Selection::Gap { pos: 0 },
        }
    }
}

struct Finder<'s> {
    schema: &'s Schema,
    dir: Direction,
    text_only: bool,
}

impl Finder<'_> {
    fn find_in(&self, node: &Node, pos: usize, index: usize) -> Option<Selection> {
        if has_inline_content(self.schema, node) {
            return Some(Selection::cursor(pos));
        }
        let children = node.content()?.children();
        match self.dir {
            Direction::Forward => {
                let mut pos = pos;
                for child in children.iter().skip(index) {
                    if let Some(found) = self.visit(child, pos) {
                        return Some(found);
                    }
                    pos += child.node_size();
                }
            }
            Direction::Backward => {
                let mut pos = pos;
                for child in children[..index.min(children.len())].iter().rev() {
                    if let Some(found) = self.visit(child, pos) {
                        return Some(found);
                    }
                    pos = pos.saturating_sub(child.node_size());
                }
            }
        }
        None
    }

    /// `pos` is the side of `child` we come from.
    fn visit(&self, child: &Node, pos: usize) -> Option<Selection> {
        if !is_atom(self.schema, child) {
            match self.dir {
                Direction::Forward => self.find_in(child, pos + 1, 0),
                Direction::Backward => self.find_in(child, pos - 1, child.child_count()),
            }
        } else if !self.text_only && is_selectable(self.schema, child) {
            let from = match self.dir {
                Direction::Forward => pos,
                Direction::Backward => pos - child.node_size(),
            };
            Some(Selection::Node {
                from,
                to: from + child.node_size(),
            })
        } else {
            None
        }
    }
}

fn has_inline_content(schema: &Schema, node: &Node) -> bool {
    schema
        .node_type_of(node)
        .map_or(false, |t| t.inline_content())
}

fn is_atom(schema: &Schema, node: &Node) -> bool {
    node.is_leaf() || schema.node_type_of(node).map_or(true, |t| t.is_atom())
}

fn is_selectable(schema: &Schema, node: &Node) -> bool {
    !node.is_text() && schema.node_type_of(node).map_or(false, |t| t.spec().selectable)
}

fn is_text_pos(schema: &Schema, doc: &Node, pos: usize) -> bool {
    doc.resolve(pos)
        .map_or(false, |rp| has_inline_content(schema, rp.parent()))
}

/// A gap cursor may sit in block content where neither side offers a cursor position.
fn is_gap_pos(schema: &Schema, rp: &ResolvedPos) -> bool {
    !has_inline_content(schema, rp.parent())
        && closed_before(schema, rp)
        && closed_after(schema, rp)
}

fn closed_before(schema: &Schema, rp: &ResolvedPos) -> bool {
    for depth in (0..=rp.depth()).rev() {
        let index = rp.index(depth);
        if index == 0 {
            continue;
        }
        let mut before = rp.node(depth).child(index - 1);
        while let Some(node) = before {
            if is_atom(schema, node) || (node.child_count() == 0 && !has_inline_content(schema, node)) {
                return true;
            }
            if has_inline_content(schema, node) {
                return false;
            }
            before = node.content().and_then(|c| c.last_child());
        }
        return true;
    }
    true
}

fn closed_after(schema: &Schema, rp: &ResolvedPos) -> bool {
    for depth in (0..=rp.depth()).rev() {
        let index = rp.index_after(depth);
        let parent = rp.node(depth);
        if index == parent.child_count() {
            continue;
        }
        let mut after = parent.child(index);
        while let Some(node) = after {
            if is_atom(schema, node) || (node.child_count() == 0 && !has_inline_content(schema, node)) {
                return true;
            }
            if has_inline_content(schema, node) {
                return false;
            }
            after = node.first_child();
        }
        return true;
    }
    true
}
