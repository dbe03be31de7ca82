use pretty_assertions::assert_eq;
use prosemirror_fit::fit::{fill_node, fit_into_node, nest_nodes};
use prosemirror_fit::markdown::{self, helper::*};
use prosemirror_fit::model::{Fragment, Node, NodeSpec, Schema, SchemaSpec};

fn small_schema() -> Schema {
    Schema::new(
        SchemaSpec::new(vec![
            NodeSpec::new("doc").with_content("(quote | list)+"),
            NodeSpec::new("quote").with_content("paragraph+"),
            NodeSpec::new("paragraph").with_content("text*"),
            NodeSpec::new("list").with_content("listItem+"),
            NodeSpec::new("listItem"),
            NodeSpec::new("text").as_inline(),
        ]),
    )
    .unwrap()
}

fn build(schema: &Schema, name: &str, content: Vec<Node>) -> Node {
    schema
        .node_type(name)
        .unwrap()
        .create(None, Fragment::from(content))
}

#[test]
fn text_is_wrapped_in_a_paragraph() {
    let schema = small_schema();
    let quote = schema.node_type("quote").unwrap();
    let fitted = fit_into_node(quote, None, &[Node::text("hello")]).unwrap();

    let paragraph = build(&schema, "paragraph", vec![Node::text("hello")]);
    assert_eq!(fitted.node, build(&schema, "quote", vec![paragraph]));
    assert!(fitted.dropped.is_empty());
    assert!(schema.check(&fitted.node).is_ok());
}

#[test]
fn unplaceable_text_is_dropped() {
    let schema = small_schema();
    let list = schema.node_type("list").unwrap();
    let fitted = fit_into_node(list, None, &[Node::text("x")]).unwrap();

    let item = build(&schema, "listItem", vec![]);
    assert_eq!(fitted.node, build(&schema, "list", vec![item]));
    assert_eq!(fitted.dropped, vec![Node::text("x")]);
    assert_eq!(fitted.node, fill_node(list, None).unwrap());
}

#[test]
fn valid_children_are_kept_as_they_are() {
    let schema = markdown::schema().unwrap();
    for (target, child) in [
        ("doc", p("a")),
        ("doc", h(3, "b")),
        ("blockquote", ul(li(p("c")))),
        ("list_item", p("d")),
        ("paragraph", node("e")),
        ("heading", img("f.png")),
    ] {
        let node_type = schema.node_type(target).unwrap();
        let fitted = fit_into_node(node_type, None, &[child.clone()]).unwrap();
        assert_eq!(fitted.node.child_count(), 1, "{}", target);
        assert_eq!(fitted.node.first_child(), Some(&child), "{}", target);
        assert!(fitted.dropped.is_empty());
    }
}

#[test]
fn empty_candidates_fall_back_to_filling() {
    let schema = markdown::schema().unwrap();
    for node_type in schema.node_types().filter(|t| !t.is_text()) {
        let fitted = fit_into_node(node_type, None, &[]).unwrap();
        assert_eq!(Some(&fitted.node), fill_node(node_type, None).as_ref(), "{}", node_type);
        assert!(schema.check(&fitted.node).is_ok(), "{}", node_type);
    }
}

#[test]
fn attrs_go_to_the_target() {
    let schema = markdown::schema().unwrap();
    let heading = schema.node_type("heading").unwrap();
    let attrs = serde_json::json!({"level": 4, "unknown": true});
    let fitted = fit_into_node(heading, attrs.as_object(), &[p("title")]).unwrap();
    assert_eq!(fitted.node, h(4, "title"));
    assert!(fitted.dropped.is_empty());
}

#[test]
fn candidates_keep_their_order() {
    let schema = markdown::schema().unwrap();
    let quote = schema.node_type("blockquote").unwrap();
    let fitted = fit_into_node(quote, None, &[node("one"), hr(), li(p("two"))]).unwrap();
    // ordered_list is declared before bullet_list
    assert_eq!(fitted.node, blockquote((p("one"), hr(), ol(li(p("two"))))));
    assert!(schema.check(&fitted.node).is_ok());
}

#[test]
fn items_are_wrapped_for_a_document() {
    let schema = markdown::schema().unwrap();
    let fitted = fit_into_node(schema.top_node_type(), None, &[li(p("a")), node("b")]).unwrap();
    assert_eq!(fitted.node, doc((ol(li(p("a"))), p("b"))));
}

#[test]
fn nesting_builds_a_chain() {
    let chain = vec![ul(()), li(()), p(()), node("deep")];
    assert_eq!(nest_nodes(chain), Some(ul(li(p("deep")))));
    assert_eq!(nest_nodes(vec![hr()]), Some(hr()));
}

#[test]
fn first_match_is_taken_even_if_it_cannot_be_completed() {
    let schema = Schema::new(SchemaSpec::new(vec![
        NodeSpec::new("doc").with_content("pair | single"),
        NodeSpec::new("pair").with_content("a b"),
        NodeSpec::new("single").with_content("a"),
        NodeSpec::new("a"),
        NodeSpec::new("b"),
    ]))
    .unwrap();
    let a = build(&schema, "a", vec![]);
    let fitted = fit_into_node(schema.top_node_type(), None, &[a.clone()]).unwrap();

    // `pair` comes first, and is used even though it also needs a `b`
    let pair = build(&schema, "pair", vec![a]);
    assert_eq!(fitted.node, build(&schema, "doc", vec![pair]));
    assert!(schema.check(&fitted.node).is_err());
}
