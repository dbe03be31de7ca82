use crate::de;
use crate::model::Attrs;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

/// Typed access to the attributes of a node
pub trait NodeAttrs: Serialize + DeserializeOwned {
    /// Read the attributes from a node
    fn from_attrs(attrs: &Attrs) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(attrs.clone()))
    }

    /// Turn the attributes into the map a node stores
    fn to_attrs(&self) -> Result<Attrs, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Err(<serde_json::Error as serde::ser::Error>::custom(
                "attributes must serialize to an object",
            )),
        }
    }
}

/// Attributes for a heading (i.e. `<h1>`, `<h2>`, ...)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HeadingAttrs {
    /// The level of the heading (i.e. `1` for `<h1>`)
    pub level: u8,
}

/// Attributes for a code block
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CodeBlockAttrs {
    /// The info string after the opening fence
    pub params: String,
}

/// Attributes for a bullet list
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BulletListAttrs {
    /// Items are not separated by blank lines
    pub tight: bool,
}

/// Attributes for an ordered list
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OrderedListAttrs {
    /// Initial value
    pub order: usize,
    /// Items are not separated by blank lines
    pub tight: bool,
}

/// Attributes for an image
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ImageAttrs {
    /// Source URL
    pub src: String,
    /// Alternative text
    #[serde(default, deserialize_with = "de::deserialize_or_default")]
    pub alt: String,
    /// Title (Tooltip)
    #[serde(default, deserialize_with = "de::deserialize_or_default")]
    pub title: String,
}

impl NodeAttrs for HeadingAttrs {}
impl NodeAttrs for CodeBlockAttrs {}
impl NodeAttrs for BulletListAttrs {}
impl NodeAttrs for OrderedListAttrs {}
impl NodeAttrs for ImageAttrs {}
