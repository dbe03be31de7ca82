use pretty_assertions::assert_eq;
use prosemirror_fit::commands::{wrap_selection, CommandError};
use prosemirror_fit::markdown::{self, helper::*};
use prosemirror_fit::model::{Fragment, Node, NodeSpec, Schema, SchemaSpec, Visit};
use prosemirror_fit::state::{Command, EditorState, Selection, Transaction};
use std::sync::Arc;

fn state(doc: Node, selection: Selection) -> EditorState {
    let schema = Arc::new(markdown::schema().unwrap());
    EditorState::new(schema, doc).with_selection(selection)
}

fn run(command: &impl Command, state: &EditorState) -> Option<EditorState> {
    let mut result: Option<Transaction> = None;
    let mut dispatch = |tr: Transaction| {
        result = Some(tr);
        true
    };
    if command.run(state, Some(&mut dispatch)) {
        result.map(|tr| state.apply(tr))
    } else {
        None
    }
}

fn count(doc: &Node, r#type: &str) -> usize {
    let mut n = 0;
    doc.descendants(|node, _| {
        if node.r#type() == r#type {
            n += 1;
        }
        Visit::Continue
    });
    n
}

#[test]
fn selected_text_moves_into_a_quote() {
    let before = state(doc(p("hello world")), Selection::Text { anchor: 1, head: 6 });
    let after = run(&wrap_selection(["blockquote"], None, false), &before).unwrap();

    assert_eq!(after.doc(), &doc((blockquote(p("hello")), p(" world"))));
    assert_eq!(count(after.doc(), "blockquote"), 1);

    // the quote spans 0..9
    let selection = after.selection();
    assert!(selection.from() > 0 && selection.to() < 9);
    assert_eq!(selection, Selection::cursor(2));
}

#[test]
fn wraps_a_chain_of_types() {
    let before = state(doc((p("one"), p("two"))), Selection::cursor(7));
    let after = run(&wrap_selection(["bullet_list", "list_item"], None, false), &before).unwrap();

    assert_eq!(after.doc(), &doc((p("one"), ul(li(p("two"))))));
    assert_eq!(after.selection(), Selection::cursor(8));
}

#[test]
fn attributes_apply_to_the_innermost_type() {
    let before = state(doc(p("title")), Selection::cursor(2));
    let attrs = serde_json::json!({"level": 2});
    let wrap = wrap_selection(["blockquote", "heading"], attrs.as_object().cloned(), false);
    let after = run(&wrap, &before).unwrap();

    assert_eq!(after.doc(), &doc(blockquote(h(2, "title"))));
}

#[test]
fn replace_only_discards_the_selection() {
    let before = state(doc(p("hello")), Selection::Text { anchor: 2, head: 4 });
    let after = run(&wrap_selection(["image"], None, true), &before).unwrap();

    assert_eq!(after.doc(), &doc(p(("h", img(""), "lo"))));
    assert_eq!(after.selection(), Selection::cursor(2));
}

#[test]
fn gap_cursor_inserts_at_the_point() {
    let before = state(doc((hr(), hr())), Selection::Gap { pos: 1 });
    let after = run(&wrap_selection(["paragraph"], None, false), &before).unwrap();

    assert_eq!(after.doc(), &doc((hr(), p(()), hr())));
    assert_eq!(after.selection(), Selection::cursor(2));
}

#[test]
fn cursor_at_the_document_start_inserts_there() {
    let before = state(doc(p("hello")), Selection::cursor(0));
    let after = run(&wrap_selection(["blockquote"], None, false), &before).unwrap();

    assert_eq!(after.doc(), &doc((blockquote(p(())), p("hello"))));
    assert_eq!(after.selection(), Selection::cursor(2));
}

#[test]
fn mapped_selection_is_kept_without_a_place_inside() {
    let schema = Arc::new(
        Schema::new(SchemaSpec::new(vec![
            NodeSpec::new("doc").with_content("block+"),
            NodeSpec::new("paragraph").with_content("text*").with_group("block"),
            NodeSpec::new("divider").with_group("block").unselectable(),
            NodeSpec::new("text").as_inline(),
        ]))
        .unwrap(),
    );
    let build = |name: &str, content: Vec<Node>| {
        schema.node_type(name).unwrap().create(None, Fragment::from(content))
    };
    let d = build("doc", vec![build("paragraph", vec![Node::text("abc")])]);
    let before = EditorState::new(schema.clone(), d).with_selection(Selection::Text { anchor: 2, head: 3 });
    let after = run(&wrap_selection(["divider"], None, false), &before).unwrap();

    let expected = build(
        "doc",
        vec![
            build("paragraph", vec![Node::text("a")]),
            build("divider", vec![]),
            build("paragraph", vec![Node::text("c")]),
        ],
    );
    assert_eq!(after.doc(), &expected);
    // the divider spans 3..4 and can't be selected
    assert_eq!(after.selection(), Selection::Text { anchor: 2, head: 5 });
}

#[test]
fn dry_run_does_not_dispatch() {
    let before = state(doc(p("hello")), Selection::cursor(3));
    assert!(wrap_selection(["blockquote"], None, false).run(&before, None));
    assert!(!wrap_selection(["missing"], None, false).run(&before, None));
}

#[test]
fn rejected_dispatch_fails() {
    let before = state(doc(p("hello")), Selection::cursor(3));
    let mut reject = |_: Transaction| false;
    assert!(!wrap_selection(["blockquote"], None, false).run(&before, Some(&mut reject)));
}

#[test]
fn replace_that_cannot_fit_fails() {
    // a list item only fits into lists
    let before = state(doc(p("hello")), Selection::cursor(3));
    let wrap = wrap_selection(["list_item"], None, false);
    assert!(matches!(wrap.transaction(&before), Err(CommandError::Step(_))));
    assert!(!wrap.run(&before, None));
}
