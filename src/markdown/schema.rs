use crate::model::{NodeSpec, Schema, SchemaError, SchemaSpec};
use serde_json::json;

/// The declaration of the `prosemirror-markdown` node types.
pub fn schema_spec() -> SchemaSpec {
    SchemaSpec::new(vec![
        NodeSpec::new("doc").with_content("block+"),
        NodeSpec::new("paragraph")
            .with_content("inline*")
            .with_group("block"),
        NodeSpec::new("blockquote")
            .with_content("block+")
            .with_group("block"),
        NodeSpec::new("horizontal_rule").with_group("block"),
        NodeSpec::new("heading")
            .with_content("(text | image)*")
            .with_group("block")
            .with_attr("level", json!(1)),
        NodeSpec::new("code_block")
            .with_content("text*")
            .with_group("block")
            .with_attr("params", json!("")),
        NodeSpec::new("ordered_list")
            .with_content("list_item+")
            .with_group("block")
            .with_attr("order", json!(1))
            .with_attr("tight", json!(false)),
        NodeSpec::new("bullet_list")
            .with_content("list_item+")
            .with_group("block")
            .with_attr("tight", json!(false)),
        NodeSpec::new("list_item").with_content("paragraph block*"),
        NodeSpec::new("text").with_group("inline").as_inline(),
        NodeSpec::new("image")
            .with_group("inline")
            .as_inline()
            .with_attr("src", json!(""))
            .with_attr("alt", json!(""))
            .with_attr("title", json!("")),
        NodeSpec::new("hard_break")
            .with_group("inline")
            .as_inline()
            .unselectable(),
    ])
}

/// Load the markdown schema
pub fn schema() -> Result<Schema, SchemaError> {
    Schema::new(schema_spec())
}
