use once_cell::sync::Lazy;
use pretty_assertions::assert_eq;
use prosemirror_fit::markdown::{
    self,
    helper::{blockquote, doc, h1, hr, img, li, p, ul},
};
use prosemirror_fit::model::{
    Fragment, Node, NodeSpec, ReplaceError, Schema, SchemaSpec, Slice,
};
use prosemirror_fit::transform::{replace_range_with, StepError};

static SCHEMA: Lazy<Schema> = Lazy::new(|| markdown::schema().unwrap());

fn place(d: &Node, from: usize, to: usize, node: Node) -> Result<Node, StepError> {
    let step = replace_range_with(&SCHEMA, d, from, to, node)?;
    step.apply(&SCHEMA, d)
}

#[test]
fn block_splits_the_text_around_it() {
    let d = doc(p("hello world"));
    assert_eq!(
        place(&d, 3, 8, blockquote(p("llo w"))),
        Ok(doc((p("he"), blockquote(p("llo w")), p("orld"))))
    );
}

#[test]
fn inline_node_stays_in_the_textblock() {
    let d = doc(blockquote(p("abc")));
    assert_eq!(
        place(&d, 3, 4, img("x.png")),
        Ok(doc(blockquote(p(("a", img("x.png"), "c")))))
    );
}

#[test]
fn falls_back_to_the_closest_depth_that_fits() {
    let d = doc((blockquote(p("one")), p("two")));
    let step = replace_range_with(&SCHEMA, &d, 2, 5, ul(li(p("one")))).unwrap();
    // the paragraph is covered, the quote around it is not
    assert_eq!((step.span.from, step.span.to), (1, 6));
    assert_eq!((step.slice.open_start, step.slice.open_end), (0, 0));
    assert_eq!(
        step.apply(&SCHEMA, &d),
        Ok(doc((blockquote(ul(li(p("one")))), p("two"))))
    );
}

#[test]
fn empty_range_at_a_block_boundary_inserts() {
    let d = doc((p("a"), p("b")));
    assert_eq!(place(&d, 3, 3, hr()), Ok(doc((p("a"), hr(), p("b")))));
}

#[test]
fn fails_when_no_depth_fits() {
    let d = doc(p("hello"));
    assert_eq!(
        place(&d, 0, 7, li(p("hello"))),
        Err(StepError::Replace(ReplaceError::InvalidContent("doc".into())))
    );
}

#[test]
fn selected_content_replaces_itself() {
    let d = doc((p("hello world"), blockquote(p("quoted"))));
    let slice = d.slice(1..6, true).unwrap();
    assert_eq!(slice, Slice::new(Fragment::from(p("hello")), 1, 1));
    assert_eq!(d.replace(&SCHEMA, 1..6, &slice), Ok(d.clone()));

    let across = d.slice(7..17, true).unwrap();
    assert_eq!((across.open_start, across.open_end), (1, 2));
    assert_eq!(d.replace(&SCHEMA, 7..17, &across), Ok(d.clone()));
}

#[test]
fn rejects_content_the_schema_does_not_allow() {
    let d = doc(p("ab"));
    let slice = Slice::new(Fragment::from(hr()), 0, 0);
    assert_eq!(
        d.replace(&SCHEMA, 2..2, &slice),
        Err(ReplaceError::InvalidContent("paragraph".into()))
    );
}

#[test]
fn rejects_types_outside_the_schema() {
    let small = Schema::new(SchemaSpec::new(vec![
        NodeSpec::new("doc").with_content("paragraph*"),
        NodeSpec::new("paragraph").with_content("text*"),
        NodeSpec::new("text").as_inline(),
    ]))
    .unwrap();
    let d = doc(h1("ab"));
    assert_eq!(
        d.replace(&small, 1..2, &Slice::default()),
        Err(ReplaceError::UnknownNodeType("heading".into()))
    );
}

#[test]
fn rejects_joining_incompatible_blocks() {
    let d = doc((p("ab"), blockquote(p("cd"))));
    assert_eq!(
        d.replace(&SCHEMA, 2..6, &Slice::default()),
        Err(ReplaceError::CannotJoin("blockquote".into(), "paragraph".into()))
    );
}
