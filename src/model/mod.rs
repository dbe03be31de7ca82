//! # The document model
//!
//! Documents are trees of [`Node`]s whose types come from a runtime [`Schema`].
//! Positions, slices and the replace algorithm follow the ProseMirror model.
mod fragment;
mod node;
mod replace;
mod resolved_pos;
mod schema;

pub use fragment::{Fragment, IndexError, Visit};
pub use node::{AttrNode, Attrs, Leaf, Node, SliceError, Text, TextNode};
pub use replace::{ReplaceError, Slice};
pub use resolved_pos::{Index, ResolveErr, ResolvedAncestor, ResolvedPos};
pub use schema::{AttributeSpec, GroupSpec, NodeSpec, NodeType, Schema, SchemaError, SchemaSpec};

#[cfg(test)]
mod tests {
    use super::{Index, IndexError, Node, ResolvedPos, Visit};
    use crate::markdown::{self, helper::*, ImageAttrs, NodeAttrs};
    use std::ops::Deref;

    #[test]
    fn test_null_string() {
        assert_eq!(
            serde_json::from_str::<ImageAttrs>(r#"{"src": "", "alt": null}"#).unwrap(),
            ImageAttrs {
                src: String::new(),
                title: String::new(),
                alt: String::new()
            }
        );
    }

    #[test]
    fn test_deserialize_text() {
        let schema = markdown::schema().unwrap();
        assert_eq!(
            schema
                .node_from_json(r#"{"type": "text", "text": "Foo"}"#)
                .unwrap(),
            Node::text("Foo"),
        );
    }

    #[test]
    fn test_json_round_trip() {
        let schema = markdown::schema().unwrap();
        let d = doc((h(2, "Title"), ul(li(p("item")))));
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(schema.node_from_json(&json).unwrap(), d);
        assert!(json.starts_with(r#"{"type":"doc","content":[{"type":"heading","attrs":{"level":2}"#));
    }

    #[test]
    fn test_attrs_are_read_back() {
        let img = img("cat.png");
        let attrs = ImageAttrs::from_attrs(img.attrs()).unwrap();
        assert_eq!(attrs.src, "cat.png");
    }

    #[test]
    fn test_size() {
        assert_eq!(node("Hello").node_size(), 5);
        assert_eq!(node("\u{1F60A}").node_size(), 2);

        let test_3 = p(("Hallo", "Foo"));
        assert_eq!(test_3.node_size(), 10);
        let ct_3 = test_3.content().unwrap();
        assert_eq!(ct_3.find_index(0, false), Ok(Index::new(0, 0)));
        assert_eq!(ct_3.find_index(1, false), Ok(Index::new(0, 0)));
        assert_eq!(ct_3.find_index(2, false), Ok(Index::new(0, 0)));
        assert_eq!(ct_3.find_index(3, false), Ok(Index::new(0, 0)));
        assert_eq!(ct_3.find_index(4, false), Ok(Index::new(0, 0)));
        assert_eq!(ct_3.find_index(5, false), Ok(Index::new(1, 5)));
        assert_eq!(ct_3.find_index(6, false), Ok(Index::new(1, 5)));
        assert_eq!(ct_3.find_index(7, false), Ok(Index::new(1, 5)));
        assert_eq!(ct_3.find_index(8, false), Ok(Index::new(2, 8)));
        assert_eq!(
            ct_3.find_index(9, false),
            Err(IndexError::OutOfBounds { pos: 9, size: 8 })
        );

        let rp = ResolvedPos::resolve(&test_3, 0).unwrap();
        assert_eq!(rp.depth(), 0);
        assert_eq!(rp.parent_offset(), 0);
        assert_eq!(rp.index(0), 0);
    }

    #[test]
    fn test_descendants_can_skip_and_stop() {
        let d = doc((blockquote(p("a")), p("b"), p("c")));
        let mut seen = Vec::new();
        d.descendants(|node, pos| {
            seen.push((node.r#type().to_owned(), pos));
            match node.r#type() {
                "blockquote" => Visit::SkipChildren,
                "text" if node.text_content() == "b" => Visit::Stop,
                _ => Visit::Continue,
            }
        });
        assert_eq!(
            seen,
            vec![
                ("blockquote".to_owned(), 0),
                ("paragraph".to_owned(), 5),
                ("text".to_owned(), 6),
            ]
        );
    }

    #[test]
    fn test_text_merges_on_append() {
        let a = p("ab");
        let joined = a
            .content()
            .unwrap()
            .clone()
            .append(p("cd").content().unwrap().clone());
        assert_eq!(joined.child_count(), 1);
        assert_eq!(joined.size(), 4);
    }

    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    struct Sol<'a> {
        node: &'a Node,
        start: usize,
        end: usize,
    }

    fn sol(node: &Node, start: usize, end: usize) -> Sol {
        Sol { node, start, end }
    }

    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    enum Exp<'a> {
        Node(&'a Node),
        Str(&'static str),
        Null,
    }

    impl<'a> PartialEq<Exp<'a>> for Option<std::borrow::Cow<'a, Node>> {
        fn eq(&self, other: &Exp<'a>) -> bool {
            if let Some(node) = self {
                match other {
                    Exp::Node(exp_node) => node.deref() == *exp_node,
                    Exp::Str(text) => &node.text_content() == text,
                    Exp::Null => false,
                }
            } else {
                *other == Exp::Null
            }
        }
    }

    #[test]
    fn test_resolve() {
        let test_doc = doc((p(("ab",)), blockquote((p(("cd", "ef")),))));
        let _doc = sol(&test_doc, 0, 12);
        let _p1 = sol(test_doc.child(0).unwrap(), 1, 3);
        let _blk = sol(test_doc.child(1).unwrap(), 5, 11);
        let _p2 = sol(_blk.node.child(0).unwrap(), 6, 10);

        let expected = [
            (&[_doc][..], 0, Exp::Null, Exp::Node(_p1.node)),
            (&[_doc, _p1], 0, Exp::Null, Exp::Str("ab")),
            (&[_doc, _p1], 1, Exp::Str("a"), Exp::Str("b")),
            (&[_doc, _p1], 2, Exp::Str("ab"), Exp::Null),
            (&[_doc], 4, Exp::Node(_p1.node), Exp::Node(_blk.node)),
            (&[_doc, _blk], 0, Exp::Null, Exp::Node(_p2.node)),
            (&[_doc, _blk, _p2], 0, Exp::Null, Exp::Str("cd")),
            (&[_doc, _blk, _p2], 1, Exp::Str("c"), Exp::Str("d")),
            (&[_doc, _blk, _p2], 2, Exp::Str("cd"), Exp::Str("ef")),
            (&[_doc, _blk, _p2], 3, Exp::Str("e"), Exp::Str("f")),
            (&[_doc, _blk, _p2], 4, Exp::Str("ef"), Exp::Null),
            (&[_doc, _blk], 6, Exp::Node(_p2.node), Exp::Null),
            (&[_doc], 12, Exp::Node(_blk.node), Exp::Null),
        ];

        for (pos, (path, parent_offset, before, after)) in expected.iter().enumerate() {
            let pos = test_doc.resolve(pos).unwrap();
            assert_eq!(pos.depth(), path.len() - 1);

            for (i, exp_i) in path.iter().enumerate() {
                let act = sol(pos.node(i), pos.start(i), pos.end(i));
                assert_eq!((i, &act), (i, exp_i));
                if i > 0 {
                    assert_eq!(pos.before(i), Some(exp_i.start - 1));
                    assert_eq!(pos.after(i), Some(exp_i.end + 1));
                }
            }
            assert_eq!(pos.parent_offset(), *parent_offset);
            assert_eq!(pos.node_before(), *before);
            assert_eq!(pos.node_after(), *after);
        }
    }
}
