use super::{AttrNode, Attrs, Fragment, Leaf, Node};
use crate::content::{
    parse_cached, resolve, resolve_content, ContentError, ContentExpr, ContentMatcher,
    Declaration, NodeTypeTable, Quantifier, ResolvedExpr, ResolvedTable,
};
use crate::de;
use displaydoc::Display;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

fn default_top_node() -> String {
    "doc".to_owned()
}

/// The declaration of a schema.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaSpec {
    /// The name of the default top-level node for the schema
    #[serde(default = "default_top_node")]
    pub top_node: String,
    /// The node types in this schema, in order of precedence
    pub nodes: Vec<NodeSpec>,
    /// Explicitly declared groups
    #[serde(default)]
    pub groups: Vec<GroupSpec>,
}

impl SchemaSpec {
    /// Create a declaration with `doc` as its top node.
    pub fn new(nodes: Vec<NodeSpec>) -> Self {
        Self {
            top_node: default_top_node(),
            nodes,
            groups: Vec::new(),
        }
    }

    /// Use another top node type
    pub fn with_top_node(mut self, name: impl Into<String>) -> Self {
        self.top_node = name.into();
        self
    }

    /// Declare a group with its own content expression
    pub fn with_group(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.groups.push(GroupSpec {
            name: name.into(),
            content: content.into(),
        });
        self
    }
}

/// The declaration of a node type.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NodeSpec {
    /// The name of the node type
    pub name: String,
    /// The content expression for this node. Nodes without one can't have content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Space separated groups this node belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Whether this is an inline node
    #[serde(default)]
    pub inline: bool,
    /// Whether this node is a single unit that can't be edited into
    #[serde(default)]
    pub atom: bool,
    /// Whether this node can be the target of a node selection
    #[serde(default = "de::default_true")]
    pub selectable: bool,
    /// The attributes that nodes of this type get
    #[serde(default)]
    pub attrs: BTreeMap<String, AttributeSpec>,
}

impl NodeSpec {
    /// A block node type without content or attributes
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: None,
            group: None,
            inline: false,
            atom: false,
            selectable: true,
            attrs: BTreeMap::new(),
        }
    }

    /// Set the content expression
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Set the groups
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Add an attribute with a default value
    pub fn with_attr(mut self, name: impl Into<String>, default: Value) -> Self {
        self.attrs.insert(name.into(), AttributeSpec { default });
        self
    }

    /// Mark the node type as inline
    pub fn as_inline(mut self) -> Self {
        self.inline = true;
        self
    }

    /// Mark the node type as atom
    pub fn as_atom(mut self) -> Self {
        self.atom = true;
        self
    }

    /// Make nodes of this type unselectable
    pub fn unselectable(mut self) -> Self {
        self.selectable = false;
        self
    }

    /// The group names from the `group` field
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.group.iter().flat_map(|g| g.split_whitespace())
    }
}

/// The declaration of an attribute
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AttributeSpec {
    /// The default value
    #[serde(default)]
    pub default: Value,
}

/// A named content expression
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GroupSpec {
    /// The group name
    pub name: String,
    /// The content expression the group stands for
    pub content: String,
}

/// Errors when loading a schema or reading nodes with it
#[derive(Debug, Display, Error)]
pub enum SchemaError {
    /// `{0}` is declared more than once
    DuplicateName(String),
    /// Invalid content expression for `{name}`: {source}
    Content {
        /// The node type or group with the expression
        name: String,
        /// What is wrong with it
        source: ContentError,
    },
    /// Unknown node type `{0}`
    UnknownNodeType(String),
    /// The top node type `{0}` is not declared
    MissingTopNode(String),
    /// Invalid content for node `{0}`
    InvalidContent(String),
    /// Invalid JSON: {0}
    Json(#[from] serde_json::Error),
}

#[derive(Debug)]
struct TypeData {
    content: Option<Arc<ContentExpr>>,
    resolved: Option<ResolvedExpr>,
    groups: Vec<String>,
    default_attrs: Attrs,
}

/// A set of node types with resolved content expressions.
///
/// Immutable after [`Schema::new`]; share it with an `Arc`.
#[derive(Debug)]
pub struct Schema {
    spec: SchemaSpec,
    types: Vec<TypeData>,
    index: HashMap<String, usize>,
    groups: HashMap<String, Arc<ContentExpr>>,
    top: usize,
}

impl Schema {
    /// Load a schema, parsing and resolving all content expressions.
    pub fn new(spec: SchemaSpec) -> Result<Self, SchemaError> {
        let mut index = HashMap::new();
        for (i, node) in spec.nodes.iter().enumerate() {
            if index.insert(node.name.clone(), i).is_some() {
                return Err(SchemaError::DuplicateName(node.name.clone()));
            }
        }

        let mut groups = HashMap::new();
        for group in &spec.groups {
            if index.contains_key(&group.name) || groups.contains_key(&group.name) {
                return Err(SchemaError::DuplicateName(group.name.clone()));
            }
            let expr = parse_cached(&group.content).map_err(|e| SchemaError::Content {
                name: group.name.clone(),
                source: e.into(),
            })?;
            groups.insert(group.name.clone(), expr);
        }

        // groups without a declaration stand for their members in declaration order
        let mut members: Vec<(String, Vec<ContentExpr>)> = Vec::new();
        for node in &spec.nodes {
            for group in node.groups() {
                if groups.contains_key(group) {
                    continue;
                }
                if index.contains_key(group) {
                    return Err(SchemaError::DuplicateName(group.to_owned()));
                }
                let reference = ContentExpr::Reference {
                    name: node.name.clone(),
                    quantifier: Quantifier::One,
                };
                match members.iter_mut().find(|(name, _)| name == group) {
                    Some((_, refs)) => refs.push(reference),
                    None => members.push((group.to_owned(), vec![reference])),
                }
            }
        }
        for (name, mut refs) in members {
            let body = if refs.len() == 1 {
                refs.remove(0)
            } else {
                ContentExpr::Alternation(refs)
            };
            groups.insert(name, Arc::new(body));
        }

        let mut types = Vec::with_capacity(spec.nodes.len());
        for node in &spec.nodes {
            let content = match &node.content {
                Some(src) => Some(parse_cached(src).map_err(|e| SchemaError::Content {
                    name: node.name.clone(),
                    source: e.into(),
                })?),
                None => None,
            };
            types.push(TypeData {
                content,
                resolved: None,
                groups: node.groups().map(str::to_owned).collect(),
                default_attrs: node
                    .attrs
                    .iter()
                    .map(|(k, v)| (k.clone(), v.default.clone()))
                    .collect(),
            });
        }

        let top = match index.get(&spec.top_node) {
            Some(top) => *top,
            None => return Err(SchemaError::MissingTopNode(spec.top_node.clone())),
        };

        let mut schema = Schema {
            spec,
            types,
            index,
            groups,
            top,
        };

        for i in 0..schema.types.len() {
            let name = &schema.spec.nodes[i].name;
            let resolved = resolve_content(name, &schema).map_err(|source| SchemaError::Content {
                name: name.clone(),
                source,
            })?;
            schema.types[i].resolved = resolved;
        }
        for group in &schema.spec.groups {
            let reference = ContentExpr::Reference {
                name: group.name.clone(),
                quantifier: Quantifier::One,
            };
            resolve(&reference, &schema).map_err(|source| SchemaError::Content {
                name: group.name.clone(),
                source,
            })?;
        }

        debug!(
            types = schema.types.len(),
            groups = schema.groups.len(),
            top = %schema.spec.top_node,
            "schema loaded"
        );
        Ok(schema)
    }

    /// Load a schema from its JSON declaration
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let spec: SchemaSpec = serde_json::from_str(json)?;
        Self::new(spec)
    }

    /// The declaration this schema was loaded from
    pub fn spec(&self) -> &SchemaSpec {
        &self.spec
    }

    /// Look up a node type by name
    pub fn node_type(&self, name: &str) -> Option<NodeType<'_>> {
        self.index.get(name).map(|&index| NodeType {
            schema: self,
            index,
        })
    }

    /// The type of the given node, if it is part of this schema
    pub fn node_type_of(&self, node: &Node) -> Option<NodeType<'_>> {
        self.node_type(node.r#type())
    }

    /// All node types, in declaration order
    pub fn node_types(&self) -> impl Iterator<Item = NodeType<'_>> {
        (0..self.types.len()).map(move |index| NodeType {
            schema: self,
            index,
        })
    }

    /// The type of the default top node
    pub fn top_node_type(&self) -> NodeType<'_> {
        NodeType {
            schema: self,
            index: self.top,
        }
    }

    /// The content expression a group stands for
    pub fn group(&self, name: &str) -> Option<&ContentExpr> {
        self.groups.get(name).map(|g| &**g)
    }

    /// Create a text node
    pub fn text<A: Into<String>>(&self, text: A) -> Node {
        Node::text(text)
    }

    /// Read a node from its JSON representation.
    ///
    /// The content is not validated, use [`Schema::check`] for that.
    pub fn node_from_json(&self, json: &str) -> Result<Node, SchemaError> {
        let parsed: NodeJson = serde_json::from_str(json)?;
        self.build(parsed)
    }

    /// Read a node from a JSON value
    pub fn node_from_value(&self, value: Value) -> Result<Node, SchemaError> {
        let parsed: NodeJson = serde_json::from_value(value)?;
        self.build(parsed)
    }

    fn build(&self, json: NodeJson) -> Result<Node, SchemaError> {
        let node_type = self
            .node_type(&json.r#type)
            .ok_or(SchemaError::UnknownNodeType(json.r#type))?;
        if node_type.is_text() {
            return Ok(Node::text(json.text.unwrap_or_default()));
        }
        let content = json
            .content
            .into_iter()
            .map(|child| self.build(child))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(node_type.create(Some(&json.attrs), Fragment::from(content)))
    }

    /// Check that the node and all of its descendants are valid for this schema.
    pub fn check(&self, node: &Node) -> Result<(), SchemaError> {
        let node_type = self
            .node_type_of(node)
            .ok_or_else(|| SchemaError::UnknownNodeType(node.r#type().to_owned()))?;
        let content = node.content().unwrap_or(Fragment::EMPTY_REF);
        if !node_type.valid_content(content) {
            return Err(SchemaError::InvalidContent(node_type.name().to_owned()));
        }
        for child in content.children() {
            self.check(child)?;
        }
        Ok(())
    }
}

impl ResolvedTable for Schema {
    fn resolved(&self, type_name: &str) -> Option<&ResolvedExpr> {
        self.node_type(type_name).and_then(|t| t.resolved_content())
    }
}

impl NodeTypeTable for Schema {
    fn declaration(&self, name: &str) -> Option<Declaration<'_>> {
        if let Some(&index) = self.index.get(name) {
            return Some(Declaration::Node {
                content: self.types[index].content.as_deref(),
            });
        }
        self.groups.get(name).map(|g| Declaration::Group(g))
    }
}

#[derive(Deserialize)]
struct NodeJson {
    r#type: String,
    #[serde(default, deserialize_with = "de::deserialize_or_default")]
    attrs: Attrs,
    #[serde(default)]
    content: Vec<NodeJson>,
    #[serde(default)]
    text: Option<String>,
}

/// A node type of a [`Schema`].
#[derive(Copy, Clone)]
pub struct NodeType<'s> {
    schema: &'s Schema,
    index: usize,
}

impl<'s> NodeType<'s> {
    fn data(&self) -> &'s TypeData {
        &self.schema.types[self.index]
    }

    /// The schema this type belongs to
    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    /// The name of the node type
    pub fn name(&self) -> &'s str {
        &self.spec().name
    }

    /// The declaration of the node type
    pub fn spec(&self) -> &'s NodeSpec {
        &self.schema.spec.nodes[self.index]
    }

    /// The groups this type belongs to
    pub fn groups(&self) -> &'s [String] {
        &self.data().groups
    }

    /// True if this is the text node type
    pub fn is_text(&self) -> bool {
        self.name() == Node::TEXT
    }

    /// True if this is an inline type
    pub fn is_inline(&self) -> bool {
        self.spec().inline || self.is_text()
    }

    /// True if this is a block type (not inline)
    pub fn is_block(&self) -> bool {
        !self.is_inline()
    }

    /// True for node types that allow no content
    pub fn is_leaf(&self) -> bool {
        self.data().content.as_deref().map_or(true, ContentExpr::is_empty)
    }

    /// True when this node is an atom, i.e. when it does not have directly editable content
    pub fn is_atom(&self) -> bool {
        self.is_leaf() || self.spec().atom
    }

    /// True if this is a block type with inline content
    pub fn is_textblock(&self) -> bool {
        self.is_block() && self.inline_content()
    }

    /// True if this node type has inline content
    pub fn inline_content(&self) -> bool {
        self.matcher()
            .and_then(|m| m.first_types().first().copied())
            .and_then(|name| self.schema.node_type(name))
            .map_or(false, |t| t.is_inline())
    }

    /// The parsed content expression
    pub fn content_expr(&self) -> Option<&'s ContentExpr> {
        self.data().content.as_deref()
    }

    /// The content expression, resolved when the schema was loaded
    pub fn resolved_content(&self) -> Option<&'s ResolvedExpr> {
        self.data().resolved.as_ref()
    }

    fn matcher(&self) -> Option<ContentMatcher<'s>> {
        self.resolved_content().map(ContentMatcher::new)
    }

    /// The declared attributes with their defaults, overridden by the given ones.
    /// Attributes the type does not declare are dropped.
    pub fn compute_attrs(&self, attrs: Option<&Attrs>) -> Attrs {
        let mut out = self.data().default_attrs.clone();
        if let Some(given) = attrs {
            for (key, value) in out.iter_mut() {
                if let Some(v) = given.get(key) {
                    *value = v.clone();
                }
            }
        }
        out
    }

    /// Create a node of this type. The content is not checked.
    ///
    /// Leaf types ignore the content. For the text type, this creates a text node
    /// holding the text of the content.
    pub fn create(&self, attrs: Option<&Attrs>, content: Fragment) -> Node {
        if self.is_text() {
            Node::text(content.text_between(0, content.size(), None, None))
        } else if self.is_leaf() {
            Node::Leaf(Leaf {
                r#type: self.name().to_owned(),
                attrs: self.compute_attrs(attrs),
            })
        } else {
            Node::Branch(AttrNode {
                r#type: self.name().to_owned(),
                attrs: self.compute_attrs(attrs),
                content,
            })
        }
    }

    /// Like [`NodeType::create`], but fails if the content is not valid.
    pub fn create_checked(&self, attrs: Option<&Attrs>, content: Fragment) -> Result<Node, SchemaError> {
        if self.valid_content(&content) {
            Ok(self.create(attrs, content))
        } else {
            Err(SchemaError::InvalidContent(self.name().to_owned()))
        }
    }

    /// Create a node of this type with the smallest valid content.
    ///
    /// Required children are created empty. Returns `None` if valid content would need a
    /// text node.
    pub fn create_and_fill(&self, attrs: Option<&Attrs>) -> Option<Node> {
        if self.is_text() {
            return None;
        }
        let matcher = match self.matcher() {
            Some(matcher) => matcher,
            None => return Some(self.create(attrs, Fragment::new())),
        };
        let schema = self.schema;
        let names = matcher.fill(|name| schema.node_type(name).map_or(false, |t| !t.is_text()))?;
        let content = names
            .iter()
            .filter_map(|name| schema.node_type(name))
            .map(|t| t.create(None, Fragment::new()))
            .collect();
        Some(self.create(attrs, content))
    }

    /// Returns true if the given fragment is valid content for this node type.
    pub fn valid_content(&self, content: &Fragment) -> bool {
        match self.matcher() {
            Some(matcher) => {
                let names: Vec<&str> = content.children().iter().map(Node::r#type).collect();
                matcher.matches(&names)
            }
            None => content.child_count() == 0,
        }
    }

    /// True if both types share a type that may start their content
    pub fn compatible_content(&self, other: NodeType<'_>) -> bool {
        if self.name() == other.name() {
            return true;
        }
        match (self.matcher(), other.matcher()) {
            (Some(a), Some(b)) => {
                let theirs = b.first_types();
                a.first_types().iter().any(|t| theirs.contains(t))
            }
            _ => false,
        }
    }

    /// True if nodes of the named type may be direct children of this type
    pub fn can_contain_type(&self, name: &str) -> bool {
        self.matcher()
            .map_or(false, |m| m.child_types().contains(&name))
    }
}

impl PartialEq for NodeType<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.schema, other.schema) && self.index == other.index
    }
}

impl Eq for NodeType<'_> {}

impl fmt::Debug for NodeType<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeType").field(&self.name()).finish()
    }
}

impl fmt::Display for NodeType<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
