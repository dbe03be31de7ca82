//! # Fitting content into a node type
//!
//! Given a target [`NodeType`] and a flat list of candidate nodes, find for every candidate
//! a place in the target's content model and synthesize the wrapper nodes between the
//! target and the candidate.
//!
//! Placement is greedy. Each candidate goes to the node expression of its type that is
//! nested least deeply in the resolved content model, the leftmost one on ties. The
//! result is not checked against the content model again, so a grammar whose first
//! match can't be completed yields an invalid node.
use crate::content::placements;
use crate::model::{Attrs, Fragment, Node, NodeType, Visit};
use std::collections::HashMap;
use tracing::{debug, trace};

mod fill;

pub use fill::fill_node;

/// The outcome of [`fit_into_node`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fitted {
    /// The new node
    pub node: Node,
    /// Candidate subtrees that could not be placed anywhere
    pub dropped: Vec<Node>,
}

/// Nest a chain of nodes, outermost first, by making each node the only child of the one
/// before it. Returns `None` for an empty chain.
pub fn nest_nodes(nodes: Vec<Node>) -> Option<Node> {
    nodes
        .into_iter()
        .rev()
        .reduce(|inner, outer| outer.copy(|_| Fragment::from(inner)))
}

/// Build a node of `node_type` whose content holds the candidates, each wrapped in the
/// nodes its place in the content model requires.
///
/// Candidates are visited in pre-order. A candidate that finds a place is taken as a whole,
/// otherwise its children are tried. When nothing can be placed, the node is created with
/// [`fill_node`] instead.
///
/// Returns `None` only for the text type, which can't be a target.
pub fn fit_into_node(
    node_type: NodeType<'_>,
    attrs: Option<&Attrs>,
    candidates: &[Node],
) -> Option<Fitted> {
    if node_type.resolved_content().is_none() {
        let node = fill_node(node_type, attrs)?;
        return Some(Fitted {
            node,
            dropped: candidates.to_vec(),
        });
    }

    let schema = node_type.schema();
    // the leftmost-outermost node expression per type
    let places: HashMap<String, Vec<String>> = placements(node_type.name(), schema)
        .into_iter()
        .map(|place| (place.type_name, place.ancestor_path))
        .collect();

    let fragment = Fragment::from(candidates.to_vec());
    let mut content = Vec::new();
    let mut placed = Vec::new();
    fragment.descendants(|candidate, pos| {
        let path = match places.get(candidate.r#type()) {
            Some(path) => path,
            None => return Visit::Continue,
        };
        let mut chain: Vec<Node> = path
            .iter()
            .filter_map(|name| schema.node_type(name))
            .map(|wrapper| wrapper.create(None, Fragment::new()))
            .collect();
        chain.push(candidate.clone());
        trace!(r#type = candidate.r#type(), pos, ?path, "placed candidate");
        content.extend(nest_nodes(chain));
        placed.push(pos..pos + candidate.node_size());
        Visit::SkipChildren
    });

    let mut dropped = Vec::new();
    collect_dropped(&fragment, 0, &placed, &mut dropped);
    if !dropped.is_empty() {
        debug!(
            target_type = node_type.name(),
            count = dropped.len(),
            "candidates without a place were dropped"
        );
    }

    let node = if content.is_empty() {
        fill_node(node_type, attrs)?
    } else {
        node_type.create(attrs, Fragment::from(content))
    };
    Some(Fitted { node, dropped })
}

/// Pushes the outermost subtrees of `fragment` that contain no placed range.
fn collect_dropped(
    fragment: &Fragment,
    start: usize,
    placed: &[std::ops::Range<usize>],
    dropped: &mut Vec<Node>,
) {
    let mut pos = start;
    for child in fragment.children() {
        let end = pos + child.node_size();
        if placed.iter().any(|r| r.start == pos && r.end == end) {
            // placed as a whole
        } else if placed.iter().any(|r| r.start >= pos && r.end <= end) {
            if let Some(content) = child.content() {
                collect_dropped(content, pos + 1, placed, dropped);
            }
        } else {
            dropped.push(child.clone());
        }
        pos = end;
    }
}

#[cfg(test)]
mod tests {
    use super::{fit_into_node, nest_nodes};
    use crate::markdown::{self, helper::*};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_nest_nodes() {
        assert_eq!(nest_nodes(vec![]), None);
        assert_eq!(
            nest_nodes(vec![blockquote(()), p(()), node("a")]),
            Some(blockquote(p("a")))
        );
    }

    #[test]
    fn test_valid_child_is_kept() {
        let schema = markdown::schema().unwrap();
        let quote = schema.node_type("blockquote").unwrap();
        let fitted = fit_into_node(quote, None, &[p("one"), h(2, "two")]).unwrap();
        assert_eq!(fitted.node, blockquote((p("one"), h(2, "two"))));
        assert!(fitted.dropped.is_empty());
    }

    #[test]
    fn test_text_gets_wrapped() {
        let schema = markdown::schema().unwrap();
        let quote = schema.node_type("blockquote").unwrap();
        let fitted = fit_into_node(quote, None, &[node("hello")]).unwrap();
        assert_eq!(fitted.node, blockquote(p("hello")));
    }

    #[test]
    fn test_text_is_no_target() {
        let schema = markdown::schema().unwrap();
        let text = schema.node_type("text").unwrap();
        assert_eq!(fit_into_node(text, None, &[node("a")]), None);
    }

    #[test]
    fn test_looks_into_unplaced_candidates() {
        let schema = markdown::schema().unwrap();
        let item = schema.node_type("code_block").unwrap();
        let fitted = fit_into_node(item, None, &[p(("a", img("b.png"))), hr()]).unwrap();
        assert_eq!(fitted.node, code_block("", "a"));
        assert_eq!(fitted.dropped, vec![img("b.png"), hr()]);
    }
}
