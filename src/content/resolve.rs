use super::{ContentError, ContentExpr, Quantifier};
use std::ops::Index;

/// A table of declared node types and groups that expressions are resolved against.
pub trait NodeTypeTable {
    /// Look up the declaration behind a name used in a content expression.
    fn declaration(&self, name: &str) -> Option<Declaration<'_>>;
}

/// What a name in a content expression refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Declaration<'a> {
    /// A concrete node type, with its content expression if it has one
    Node {
        /// The content expression of the node type
        content: Option<&'a ContentExpr>,
    },
    /// A named sub-expression
    Group(&'a ContentExpr),
}

/// Index of a node in a [`ResolvedExpr`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(usize);

impl ExprId {
    /// The position of the node in the arena, which is also its pre-order position.
    pub fn index(self) -> usize {
        self.0
    }
}

/// The kind of a node in a resolved expression tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedKind {
    /// Children in order
    Sequence,
    /// One of the children
    Alternation,
    /// A parenthesised expression (`name: None`) or a named schema group
    Group {
        /// The group name, for schema groups
        name: Option<String>,
    },
    /// A concrete node type.
    ///
    /// Always a leaf of the tree. The content of the node type is resolved once, in a tree
    /// of its own, and is found by name, see [`placements`](super::placements).
    Node {
        /// Name of the node type
        name: String,
    },
}

/// A node in a resolved expression tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedNode {
    /// What this node stands for
    pub kind: ResolvedKind,
    /// Repetition of this node
    pub quantifier: Quantifier,
    /// The node this one is nested in, `None` for the root
    pub parent: Option<ExprId>,
    /// The nested nodes in expression order
    pub children: Vec<ExprId>,
}

impl ResolvedNode {
    /// The node type name if this is a node expression.
    pub fn node_type(&self) -> Option<&str> {
        match &self.kind {
            ResolvedKind::Node { name } => Some(name),
            _ => None,
        }
    }
}

/// A content expression resolved against a [`NodeTypeTable`].
///
/// The tree owns all of its nodes in an arena; parent links are plain indices
/// into the same arena. Nodes are allocated in pre-order, the root is always
/// the first node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedExpr {
    nodes: Vec<ResolvedNode>,
}

impl ResolvedExpr {
    /// The root node
    pub fn root(&self) -> ExprId {
        ExprId(0)
    }

    /// Number of nodes in the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false, a resolved tree has at least a root
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get a node, `None` if the id belongs to another tree and is out of range.
    pub fn get(&self, id: ExprId) -> Option<&ResolvedNode> {
        self.nodes.get(id.0)
    }

    /// The parent of a node
    pub fn parent(&self, id: ExprId) -> Option<ExprId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// The children of a node
    pub fn children(&self, id: ExprId) -> &[ExprId] {
        self.get(id).map_or(&[], |n| &n.children[..])
    }

    /// Iterate over the ancestors of a node, innermost first.
    pub fn ancestors(&self, id: ExprId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// Iterate over all nodes with their ids, in pre-order.
    pub fn iter(&self) -> impl Iterator<Item = (ExprId, &ResolvedNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (ExprId(i), n))
    }
}

impl Index<ExprId> for ResolvedExpr {
    type Output = ResolvedNode;

    fn index(&self, id: ExprId) -> &ResolvedNode {
        &self.nodes[id.0]
    }
}

/// Iterator over the parent chain of a resolved node.
pub struct Ancestors<'a> {
    tree: &'a ResolvedExpr,
    next: Option<ExprId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = ExprId;

    fn next(&mut self) -> Option<ExprId> {
        let id = self.next?;
        self.next = self.tree.parent(id);
        Some(id)
    }
}

/// Resolve a parsed expression against a table of node types and groups.
///
/// Groups are expanded in place, node types are not.
pub fn resolve<T>(expr: &ContentExpr, table: &T) -> Result<ResolvedExpr, ContentError>
where
    T: NodeTypeTable + ?Sized,
{
    let mut resolver = Resolver::new(table);
    resolver.expr(expr, None)?;
    Ok(resolver.finish())
}

/// Resolve the content expression of a node type.
///
/// Returns `None` for node types without content.
pub fn resolve_content<T>(type_name: &str, table: &T) -> Result<Option<ResolvedExpr>, ContentError>
where
    T: NodeTypeTable + ?Sized,
{
    match table.declaration(type_name) {
        Some(Declaration::Node { content: None }) => Ok(None),
        Some(Declaration::Node {
            content: Some(content),
        }) => {
            let mut resolver = Resolver::new(table);
            resolver.expr(content, None)?;
            Ok(Some(resolver.finish()))
        }
        Some(Declaration::Group(_)) | None => {
            Err(ContentError::UnknownTypeReference(type_name.to_owned()))
        }
    }
}

struct Resolver<'t, T: ?Sized> {
    table: &'t T,
    nodes: Vec<ResolvedNode>,
    /// Groups currently being expanded
    groups: Vec<String>,
}

impl<'t, T: NodeTypeTable + ?Sized> Resolver<'t, T> {
    fn new(table: &'t T) -> Self {
        Self {
            table,
            nodes: Vec::new(),
            groups: Vec::new(),
        }
    }

    fn finish(self) -> ResolvedExpr {
        ResolvedExpr { nodes: self.nodes }
    }

    fn push(&mut self, kind: ResolvedKind, quantifier: Quantifier, parent: Option<ExprId>) -> ExprId {
        let id = ExprId(self.nodes.len());
        self.nodes.push(ResolvedNode {
            kind,
            quantifier,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        id
    }

    fn expr(&mut self, expr: &ContentExpr, parent: Option<ExprId>) -> Result<ExprId, ContentError> {
        match expr {
            ContentExpr::Sequence(items) => {
                let id = self.push(ResolvedKind::Sequence, Quantifier::One, parent);
                for item in items {
                    self.expr(item, Some(id))?;
                }
                Ok(id)
            }
            ContentExpr::Alternation(items) => {
                let id = self.push(ResolvedKind::Alternation, Quantifier::One, parent);
                for item in items {
                    self.expr(item, Some(id))?;
                }
                Ok(id)
            }
            ContentExpr::Group { body, quantifier } => {
                let id = self.push(ResolvedKind::Group { name: None }, *quantifier, parent);
                self.expr(body, Some(id))?;
                Ok(id)
            }
            ContentExpr::Reference { name, quantifier } => {
                self.reference(name, *quantifier, parent)
            }
        }
    }

    fn reference(
        &mut self,
        name: &str,
        quantifier: Quantifier,
        parent: Option<ExprId>,
    ) -> Result<ExprId, ContentError> {
        match self.table.declaration(name) {
            None => Err(ContentError::UnknownTypeReference(name.to_owned())),
            Some(Declaration::Node { .. }) => {
                let kind = ResolvedKind::Node {
                    name: name.to_owned(),
                };
                Ok(self.push(kind, quantifier, parent))
            }
            Some(Declaration::Group(body)) => {
                if self.groups.iter().any(|g| g == name) {
                    return Err(ContentError::CyclicGrammar(name.to_owned()));
                }
                let kind = ResolvedKind::Group {
                    name: Some(name.to_owned()),
                };
                let id = self.push(kind, quantifier, parent);
                self.groups.push(name.to_owned());
                let result = self.expr(body, Some(id));
                self.groups.pop();
                result?;
                Ok(id)
            }
        }
    }
}
