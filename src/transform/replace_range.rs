use super::{ReplaceStep, StepError};
use crate::model::{Fragment, Node, ResolveErr, ResolvedPos, Schema, Slice};
use tracing::trace;

/// Build a step that replaces `from..to` with `node`.
///
/// The node is placed as deep as possible: starting at the depth both positions share, each
/// shallower depth is tried until the replace fits. At a given depth, ancestors that the range
/// covers from their start (or up to their end) are replaced as a whole, the others are split
/// around the node.
pub fn replace_range_with(
    schema: &Schema,
    doc: &Node,
    from: usize,
    to: usize,
    node: Node,
) -> Result<ReplaceStep, StepError> {
    let rp_from = doc.resolve(from)?;
    let rp_to = doc.resolve(to)?;
    let shared = rp_from.shared_depth(to);

    let mut last_error = None;
    for depth in (0..=shared).rev() {
        let (start, open_start) = widen_start(&rp_from, depth);
        let (end, open_end) = widen_end(&rp_to, depth);

        let mut content = Vec::with_capacity(3);
        if open_start > 0 {
            content.push(open_chain(&rp_from, depth, open_start));
        }
        content.push(node.clone());
        if open_end > 0 {
            content.push(open_chain(&rp_to, depth, open_end));
        }
        let slice = Slice::new(Fragment::from(content), open_start, open_end);

        let step = ReplaceStep::new(start, end, slice);
        match step.apply(schema, doc) {
            Ok(_) => {
                trace!(depth, from = start, to = end, "range replaced");
                return Ok(step);
            }
            Err(e) => {
                trace!(depth, error = %e, "replace does not fit, trying a shallower depth");
                last_error = Some(e);
            }
        }
    }
    Err(last_error.unwrap_or(StepError::Resolve(ResolveErr::RangeError { pos: from })))
}

/// Moves the start out of every ancestor below `depth` it is at the start of. Returns the new
/// position and how many ancestors below `depth` still enclose it.
fn widen_start(rp: &ResolvedPos, depth: usize) -> (usize, usize) {
    let mut pos = rp.pos();
    let mut d = rp.depth();
    while d > depth && pos == rp.start(d) {
        pos = rp.before(d).unwrap_or(pos);
        d -= 1;
    }
    (pos, d.saturating_sub(depth))
}

fn widen_end(rp: &ResolvedPos, depth: usize) -> (usize, usize) {
    let mut pos = rp.pos();
    let mut d = rp.depth();
    while d > depth && pos == rp.end(d) {
        pos = rp.after(d).unwrap_or(pos);
        d -= 1;
    }
    (pos, d.saturating_sub(depth))
}

/// Empty copies of the ancestors from `depth + 1` down `open` levels, nested in each other.
fn open_chain(rp: &ResolvedPos, depth: usize, open: usize) -> Node {
    let innermost = rp.node(depth + open).copy(|_| Fragment::new());
    (depth + 1..depth + open)
        .rev()
        .fold(innermost, |inner, d| rp.node(d).copy(|_| Fragment::from(inner)))
}
