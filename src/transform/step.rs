use crate::model::{Node, ReplaceError, ResolveErr, Schema, Slice};
use derive_new::new;
use displaydoc::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A span within a document
#[derive(Copy, Clone, Debug, Deserialize, Serialize, PartialEq, Eq, new)]
pub struct Span {
    /// Start of the span
    pub from: usize,
    /// End of the span
    pub to: usize,
}

/// Different ways a step application can fail
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum StepError {
    /// Structure replace would overwrite content
    WouldOverwrite,
    /// Invalid indices
    Resolve(#[from] ResolveErr),
    /// Invalid replace
    Replace(#[from] ReplaceError),
}

/// The result of applying a step. Contains either a
/// new document or a failure value.
pub type StepResult = Result<Node, StepError>;

/// Replace some part of the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceStep {
    /// The affected span
    #[serde(flatten)]
    pub span: Span,
    /// The slice to replace the current content with
    pub slice: Slice,
    /// Whether this is a structural change
    pub structure: bool,
}

impl ReplaceStep {
    /// Create a step that replaces `from..to` with the slice
    pub fn new(from: usize, to: usize, slice: Slice) -> Self {
        Self {
            span: Span::new(from, to),
            slice,
            structure: false,
        }
    }

    /// Applies this step to the given document, returning a result
    /// object that either indicates failure, if the step can not be
    /// applied to this document, or indicates success by containing a
    /// transformed document.
    pub fn apply(&self, schema: &Schema, doc: &Node) -> StepResult {
        let from = self.span.from;
        let to = self.span.to;
        if self.structure && content_between(doc, from, to)? {
            Err(StepError::WouldOverwrite)
        } else {
            let node = doc.replace(schema, from..to, &self.slice)?;
            Ok(node)
        }
    }

    /// The position map of this step
    pub fn get_map(&self) -> StepMap {
        StepMap::new(
            self.span.from,
            self.span.to - self.span.from,
            self.slice.size(),
        )
    }
}

/// Which side of a replaced range a position sticks to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Assoc {
    /// Stay before inserted content
    Before,
    /// Move after inserted content
    After,
}

/// Maps positions in the document before a replace to positions after it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, new)]
pub struct StepMap {
    /// Start of the replaced range
    pub start: usize,
    /// Size of the replaced range
    pub old_size: usize,
    /// Size of the inserted content
    pub new_size: usize,
}

impl StepMap {
    /// Map a position. Positions inside the replaced range move to its start or end;
    /// positions at an edge move out of the range, and `assoc` decides for empty ranges.
    pub fn map(&self, pos: usize, assoc: Assoc) -> usize {
        let end = self.start + self.old_size;
        if pos < self.start {
            return pos;
        }
        if pos > end {
            return pos - self.old_size + self.new_size;
        }
        let side = if self.old_size == 0 {
            assoc
        } else if pos == self.start {
            Assoc::Before
        } else if pos == end {
            Assoc::After
        } else {
            assoc
        };
        match side {
            Assoc::Before => self.start,
            Assoc::After => self.start + self.new_size,
        }
    }
}

pub(crate) fn content_between(doc: &Node, from: usize, to: usize) -> Result<bool, ResolveErr> {
    let rp_from = doc.resolve(from)?;
    let mut dist = to - from;
    let mut depth = rp_from.depth();
    while dist > 0 && depth > 0 && rp_from.index_after(depth) == rp_from.node(depth).child_count() {
        depth -= 1;
        dist -= 1;
    }
    if dist > 0 {
        let mut next = rp_from.node(depth).child(rp_from.index_after(depth));
        while dist > 0 {
            match next {
                Some(c) => {
                    if c.is_leaf() {
                        return Ok(true);
                    } else {
                        next = c.first_child();
                        dist -= 1;
                    }
                }
                None => {
                    return Ok(true);
                }
            }
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::{Assoc, ReplaceStep, StepError, StepMap};
    use crate::markdown::{self, helper::*};
    use crate::model::{Fragment, Slice};

    #[test]
    fn test_map_positions() {
        let map = StepMap::new(4, 2, 5);
        assert_eq!(map.map(2, Assoc::After), 2);
        assert_eq!(map.map(4, Assoc::After), 4);
        assert_eq!(map.map(5, Assoc::Before), 4);
        assert_eq!(map.map(5, Assoc::After), 9);
        assert_eq!(map.map(6, Assoc::Before), 9);
        assert_eq!(map.map(8, Assoc::Before), 11);

        let insert = StepMap::new(3, 0, 2);
        assert_eq!(insert.map(3, Assoc::Before), 3);
        assert_eq!(insert.map(3, Assoc::After), 5);
    }

    #[test]
    fn test_apply() {
        let schema = markdown::schema().unwrap();
        let d1 = doc(p("Hello World!"));
        let step = ReplaceStep::new(1, 6, Slice::new(Fragment::from(node("Bye")), 0, 0));
        assert_eq!(step.apply(&schema, &d1), Ok(doc(p("Bye World!"))));
        assert_eq!(step.get_map(), StepMap::new(1, 5, 3));
    }

    #[test]
    fn test_structure_step_refuses_to_overwrite() {
        let schema = markdown::schema().unwrap();
        let d1 = doc((p("a"), p("b")));
        let mut step = ReplaceStep::new(2, 5, Slice::default());
        step.structure = true;
        assert_eq!(step.apply(&schema, &d1), Err(StepError::WouldOverwrite));
    }

    #[test]
    fn test_serialize() {
        let step = ReplaceStep::new(986, 986, Slice::new(Fragment::from(node("!")), 0, 0));
        assert_eq!(
            serde_json::to_string(&step).unwrap(),
            r#"{"from":986,"to":986,"slice":{"content":[{"type":"text","text":"!"}],"openStart":0,"openEnd":0},"structure":false}"#
        );
    }
}
