use super::CommandError;
use crate::fit::fit_into_node;
use crate::model::{Attrs, Node, NodeType, Slice, Visit};
use crate::state::{Command, Dispatch, Direction, EditorState, Selection, Transaction};
use tracing::{debug, trace};

/// Wrap the selection into a chain of node types, outermost first.
///
/// See [`WrapSelection`] for how the range and the content are chosen.
pub fn wrap_selection<I, S>(types: I, attrs: Option<Attrs>, replace_only: bool) -> WrapSelection
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    WrapSelection {
        types: types.into_iter().map(Into::into).collect(),
        attrs,
        replace_only,
    }
}

/// Replaces the selection with new nodes built from the selected content.
///
/// - A non-empty selection is replaced as it is.
/// - With an empty selection, the whole block around the cursor is replaced if the
///   outermost type is a block type that can have content. Gap cursors are exempt.
/// - Otherwise, the new node is inserted at the cursor.
///
/// The innermost type gets the selected top-level nodes fitted into it, unless
/// `replace_only` is set, and the given attributes. Each enclosing type is fitted around
/// the node inside it. Afterwards, the selection is moved into the new node.
#[derive(Debug, Clone, PartialEq)]
pub struct WrapSelection {
    types: Vec<String>,
    attrs: Option<Attrs>,
    replace_only: bool,
}

impl WrapSelection {
    /// Build the transaction this command would dispatch.
    pub fn transaction(&self, state: &EditorState) -> Result<Transaction, CommandError> {
        let schema = state.schema();
        let types = self
            .types
            .iter()
            .map(|name| {
                schema
                    .node_type(name)
                    .ok_or_else(|| CommandError::UnknownNodeType(name.clone()))
            })
            .collect::<Result<Vec<NodeType>, _>>()?;
        let outermost = *types.first().ok_or(CommandError::EmptyTypeChain)?;

        let doc = state.doc();
        let selection = state.selection();
        let (from, to, slice) = if !selection.is_empty() {
            (selection.from(), selection.to(), selection.content(doc)?)
        } else if outermost.is_block() && !outermost.is_leaf() && !selection.is_gap_cursor() {
            let rp = doc.resolve(selection.from()).map_err(|e| CommandError::Slice(e.into()))?;
            match (rp.before(rp.depth()), rp.after(rp.depth())) {
                (Some(from), Some(to)) if rp.pos() > 0 => (from, to, doc.slice(from..to, true)?),
                _ => (rp.pos(), rp.pos(), Slice::default()),
            }
        } else {
            (selection.from(), selection.from(), Slice::default())
        };

        let candidates: Vec<Node> = if self.replace_only {
            Vec::new()
        } else {
            slice.content.children().to_vec()
        };

        let mut wrapped: Option<Node> = None;
        for node_type in types.iter().rev() {
            let fitted = match wrapped.take() {
                None => fit_into_node(*node_type, self.attrs.as_ref(), &candidates),
                Some(inner) => fit_into_node(*node_type, None, &[inner]),
            }
            .ok_or_else(|| CommandError::InvalidTarget(node_type.name().to_owned()))?;
            if !fitted.dropped.is_empty() {
                debug!(
                    r#type = node_type.name(),
                    dropped = fitted.dropped.len(),
                    "selected content did not fit"
                );
            }
            wrapped = Some(fitted.node);
        }
        let node = wrapped.ok_or(CommandError::EmptyTypeChain)?;

        let mut tr = state.tr();
        tr.replace_range_with(from, to, node.clone())?;

        let mut nearest: Option<usize> = None;
        tr.doc().descendants(|candidate, pos| {
            if *candidate == node && nearest.map_or(true, |n| pos.abs_diff(from) < n.abs_diff(from)) {
                nearest = Some(pos);
            }
            Visit::Continue
        });
        let inside = nearest.and_then(|start| {
            let end = start + node.node_size();
            let rp = tr.doc().resolve(start).ok()?;
            Selection::find_from(schema, &rp, Direction::Forward, false)
                .filter(|sel| sel.from() >= start && sel.to() <= end)
        });
        match inside {
            Some(sel) => {
                trace!(from = sel.from(), to = sel.to(), "selection moved into the new node");
                tr.set_selection(sel);
            }
            None => trace!("new node has no selectable position, keeping the mapped selection"),
        }
        Ok(tr)
    }
}

impl Command for WrapSelection {
    fn run(&self, state: &EditorState, dispatch: Option<Dispatch<'_>>) -> bool {
        let result = self.transaction(state).and_then(|tr| match dispatch {
            Some(dispatch) => {
                if dispatch(tr) {
                    Ok(())
                } else {
                    Err(CommandError::Rejected)
                }
            }
            None => Ok(()),
        });
        match result {
            Ok(()) => true,
            Err(error) => {
                debug!(types = ?self.types, %error, "wrap failed");
                false
            }
        }
    }
}
