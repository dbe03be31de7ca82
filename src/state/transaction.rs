use super::Selection;
use crate::model::{Node, Schema};
use crate::transform::{self, Assoc, ReplaceStep, StepError, StepMap};
use derivative::Derivative;
use std::sync::Arc;
use tracing::trace;

/// A set of changes to an [`EditorState`](super::EditorState), built up step by step.
///
/// The selection is mapped through every step unless it was set explicitly.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct Transaction {
    #[derivative(Debug = "ignore")]
    schema: Arc<Schema>,
    doc: Node,
    selection: Selection,
    steps: Vec<ReplaceStep>,
    maps: Vec<StepMap>,
    selection_set: bool,
}

impl Transaction {
    pub(crate) fn new(schema: Arc<Schema>, doc: Node, selection: Selection) -> Self {
        Self {
            schema,
            doc,
            selection,
            steps: Vec::new(),
            maps: Vec::new(),
            selection_set: false,
        }
    }

    /// The schema of the document
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// The document after all steps so far
    pub fn doc(&self) -> &Node {
        &self.doc
    }

    /// The selection after all steps so far
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// The steps in this transaction
    pub fn steps(&self) -> &[ReplaceStep] {
        &self.steps
    }

    /// True if the document was changed
    pub fn doc_changed(&self) -> bool {
        !self.steps.is_empty()
    }

    /// True if [`Transaction::set_selection`] was called
    pub fn selection_set(&self) -> bool {
        self.selection_set
    }

    /// Map a position in the starting document through all steps
    pub fn map(&self, pos: usize, assoc: Assoc) -> usize {
        self.maps.iter().fold(pos, |pos, map| map.map(pos, assoc))
    }

    /// Apply a step, mapping the selection through it
    pub fn step(&mut self, step: ReplaceStep) -> Result<&mut Self, StepError> {
        let doc = step.apply(&self.schema, &self.doc)?;
        let map = step.get_map();
        if !self.selection_set {
            self.selection = self.selection.map(&self.schema, &doc, &map);
        }
        trace!(from = step.span.from, to = step.span.to, "step applied");
        self.doc = doc;
        self.steps.push(step);
        self.maps.push(map);
        Ok(self)
    }

    /// Replace `from..to` with `node`, placing it as deep as it fits.
    /// See [`transform::replace_range_with`].
    pub fn replace_range_with(&mut self, from: usize, to: usize, node: Node) -> Result<&mut Self, StepError> {
        let step = transform::replace_range_with(&self.schema, &self.doc, from, to, node)?;
        self.step(step)
    }

    /// Replace the selection. Later steps no longer map it.
    pub fn set_selection(&mut self, selection: Selection) -> &mut Self {
        self.selection = selection;
        self.selection_set = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use crate::markdown::{self, helper::*};
    use crate::state::{EditorState, Selection};
    use crate::transform::Assoc;
    use std::sync::Arc;

    #[test]
    fn test_replace_maps_selection() {
        let schema = Arc::new(markdown::schema().unwrap());
        let state = EditorState::new(schema, doc(p("hello")))
            .with_selection(Selection::cursor(4));
        let mut tr = state.tr();
        tr.replace_range_with(1, 1, img("a.png")).unwrap();
        assert_eq!(tr.doc(), &doc(p((img("a.png"), "hello"))));
        assert_eq!(tr.selection(), Selection::cursor(5));
        assert_eq!(tr.map(4, Assoc::After), 5);
        assert!(!tr.selection_set());

        tr.set_selection(Selection::cursor(1));
        let next = state.apply(tr);
        assert_eq!(next.selection(), Selection::cursor(1));
        assert_eq!(next.doc(), &doc(p((img("a.png"), "hello"))));
    }
}
