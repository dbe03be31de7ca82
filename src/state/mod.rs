//! # Editor state
//!
//! An [`EditorState`] holds a document and a selection. Changes are made through a
//! [`Transaction`] and applied with [`EditorState::apply`]. A [`Command`] inspects a
//! state and optionally dispatches a transaction.
use crate::model::{Node, Schema};
use derivative::Derivative;
use std::sync::Arc;

mod selection;
mod transaction;

pub use selection::{Direction, Selection};
pub use transaction::Transaction;

/// A document with a selection
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct EditorState {
    #[derivative(Debug = "ignore")]
    schema: Arc<Schema>,
    doc: Node,
    selection: Selection,
}

impl EditorState {
    /// Create a state with the selection at the start of the document
    pub fn new(schema: Arc<Schema>, doc: Node) -> Self {
        let selection = Selection::at_start(&schema, &doc);
        Self {
            schema,
            doc,
            selection,
        }
    }

    /// Replace the selection
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    /// The schema of the document
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// The current document
    pub fn doc(&self) -> &Node {
        &self.doc
    }

    /// The current selection
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Start a transaction on this state
    pub fn tr(&self) -> Transaction {
        Transaction::new(self.schema.clone(), self.doc.clone(), self.selection)
    }

    /// The state after the transaction
    pub fn apply(&self, tr: Transaction) -> EditorState {
        EditorState {
            schema: self.schema.clone(),
            doc: tr.doc().clone(),
            selection: tr.selection(),
        }
    }
}

/// Receives the transaction a command produced. Returns false to reject it.
pub type Dispatch<'a> = &'a mut dyn FnMut(Transaction) -> bool;

/// An editing command.
///
/// Without a dispatch function, `run` only reports whether the command applies.
pub trait Command {
    /// Run the command against `state`
    fn run(&self, state: &EditorState, dispatch: Option<Dispatch<'_>>) -> bool;
}

impl<F> Command for F
where
    F: Fn(&EditorState, Option<Dispatch<'_>>) -> bool,
{
    fn run(&self, state: &EditorState, dispatch: Option<Dispatch<'_>>) -> bool {
        self(state, dispatch)
    }
}

/// Runs commands in order until one of them applies.
pub struct Chain(Vec<Box<dyn Command>>);

/// Combine commands so that the first one that applies wins
pub fn chain_commands(commands: Vec<Box<dyn Command>>) -> Chain {
    Chain(commands)
}

impl Command for Chain {
    fn run(&self, state: &EditorState, mut dispatch: Option<Dispatch<'_>>) -> bool {
        for command in &self.0 {
            let d = match dispatch.as_mut() {
                Some(d) => Some(&mut **d as Dispatch<'_>),
                None => None,
            };
            if command.run(state, d) {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::{chain_commands, Command, Dispatch, EditorState, Selection, Transaction};
    use crate::markdown::{self, helper::*};
    use std::sync::Arc;

    #[test]
    fn test_starts_at_first_selectable() {
        let schema = Arc::new(markdown::schema().unwrap());
        let state = EditorState::new(schema, doc((hr(), blockquote(p("a")))));
        assert_eq!(state.selection(), Selection::Node { from: 0, to: 1 });
    }

    fn never(_: &EditorState, _: Option<Dispatch<'_>>) -> bool {
        false
    }

    fn select_end(state: &EditorState, dispatch: Option<Dispatch<'_>>) -> bool {
        if let Some(dispatch) = dispatch {
            let mut tr = state.tr();
            tr.set_selection(Selection::cursor(state.doc().content_size() - 1));
            dispatch(tr);
        }
        true
    }

    #[test]
    fn test_chain_stops_at_first_match() {
        let schema = Arc::new(markdown::schema().unwrap());
        let state = EditorState::new(schema, doc(p("abc")));
        let commands: Vec<Box<dyn Command>> = vec![Box::new(never), Box::new(select_end)];
        let chain = chain_commands(commands);
        assert!(chain.run(&state, None));

        let mut result: Option<Transaction> = None;
        let mut dispatch = |tr: Transaction| {
            result = Some(tr);
            true
        };
        assert!(chain.run(&state, Some(&mut dispatch)));
        assert_eq!(result.map(|tr| tr.selection()), Some(Selection::cursor(4)));
    }
}
