use crate::model::{Attrs, Fragment, Node, NodeType};
use tracing::warn;

/// Create a node of `node_type` with the smallest valid content, filled all the way down.
///
/// Children that [`NodeType::create_and_fill`] adds are filled in turn. A type that can't be
/// filled, because only text could satisfy it, is created empty. So is a type that is
/// already being filled further up.
///
/// Returns `None` for the text type, there is no empty text node.
pub fn fill_node(node_type: NodeType<'_>, attrs: Option<&Attrs>) -> Option<Node> {
    if node_type.is_text() {
        warn!(r#type = node_type.name(), "text can't be created empty");
        return None;
    }
    Some(fill(node_type, attrs, &mut Vec::new()))
}

fn fill<'s>(node_type: NodeType<'s>, attrs: Option<&Attrs>, filling: &mut Vec<&'s str>) -> Node {
    if filling.contains(&node_type.name()) {
        return node_type.create(attrs, Fragment::new());
    }
    let node = match node_type.create_and_fill(attrs) {
        Some(node) => node,
        None => {
            warn!(r#type = node_type.name(), "no valid content can be created, leaving it empty");
            return node_type.create(attrs, Fragment::new());
        }
    };

    let schema = node_type.schema();
    filling.push(node_type.name());
    let filled = node.copy(|content| {
        content
            .children()
            .iter()
            .map(|child| match schema.node_type_of(child) {
                Some(child_type) => fill(child_type, Some(child.attrs()), filling),
                None => child.clone(),
            })
            .collect()
    });
    filling.pop();
    filled
}

#[cfg(test)]
mod tests {
    use super::fill_node;
    use crate::markdown::{self, helper::*};
    use crate::model::{NodeSpec, Schema, SchemaSpec};

    #[test]
    fn test_fills_nested_requirements() {
        let schema = markdown::schema().unwrap();
        let list = schema.node_type("bullet_list").unwrap();
        let filled = fill_node(list, None).unwrap();
        assert_eq!(filled, ul(li(p(()))));
        assert!(schema.check(&filled).is_ok());
    }

    #[test]
    fn test_keeps_given_attrs() {
        let schema = markdown::schema().unwrap();
        let heading = schema.node_type("heading").unwrap();
        let attrs = serde_json::json!({"level": 3});
        let filled = fill_node(heading, attrs.as_object()).unwrap();
        assert_eq!(filled, h(3, ()));
    }

    #[test]
    fn test_required_text_stays_empty() {
        let schema = Schema::new(
            SchemaSpec::new(vec![
                NodeSpec::new("doc").with_content("title"),
                NodeSpec::new("title").with_content("text+"),
                NodeSpec::new("text").as_inline(),
            ]),
        )
        .unwrap();
        let filled = fill_node(schema.top_node_type(), None).unwrap();
        assert_eq!(filled, node_of(&schema, "doc", vec![node_of(&schema, "title", vec![])]));
    }

    #[test]
    fn test_required_cycle_terminates() {
        let schema = Schema::new(SchemaSpec::new(vec![
            NodeSpec::new("doc").with_content("a"),
            NodeSpec::new("a").with_content("b"),
            NodeSpec::new("b").with_content("a"),
        ]))
        .unwrap();
        let filled = fill_node(schema.top_node_type(), None).unwrap();
        assert_eq!(
            filled,
            node_of(
                &schema,
                "doc",
                vec![node_of(&schema, "a", vec![node_of(&schema, "b", vec![node_of(&schema, "a", vec![])])])]
            )
        );
    }

    #[test]
    fn test_text_is_not_filled() {
        let schema = markdown::schema().unwrap();
        let text = schema.node_type("text").unwrap();
        assert_eq!(fill_node(text, None), None);
    }

    fn node_of(schema: &Schema, name: &str, content: Vec<crate::model::Node>) -> crate::model::Node {
        schema
            .node_type(name)
            .unwrap()
            .create(None, content.into())
    }
}
