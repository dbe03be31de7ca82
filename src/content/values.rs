use super::{Ancestors, ExprId, ResolvedExpr};
use derive_new::new;
use std::collections::{HashSet, VecDeque};

/// A reference to a node type somewhere in a resolved expression tree.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct LeafRef {
    /// The node expression in the tree
    pub id: ExprId,
    /// Name of the referenced node type
    pub type_name: String,
    /// The enclosing node in the tree
    pub parent: Option<ExprId>,
}

impl LeafRef {
    /// Iterate the raw parent chain of this reference, innermost first.
    pub fn ancestors<'a>(&self, tree: &'a ResolvedExpr) -> Ancestors<'a> {
        tree.ancestors(self.id)
    }
}

/// All node expressions of a resolved tree, pre-order and left to right.
pub fn values(tree: &ResolvedExpr) -> Vec<LeafRef> {
    let mut out = Vec::new();
    let mut stack = vec![tree.root()];
    while let Some(id) = stack.pop() {
        let node = &tree[id];
        if let Some(name) = node.node_type() {
            out.push(LeafRef::new(id, name.to_owned(), node.parent));
        }
        stack.extend(node.children.iter().rev().copied());
    }
    out
}

/// Looks up the resolved content expression of a node type by name.
pub trait ResolvedTable {
    /// The resolved content of `type_name`, `None` for leaf and unknown types.
    fn resolved(&self, type_name: &str) -> Option<&ResolvedExpr>;
}

/// Where a node type can be placed inside the content of another node type.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Placement {
    /// Name of the placed node type
    pub type_name: String,
    /// The node types enclosing the reference, outermost first.
    ///
    /// The type whose content was searched is not part of the path.
    pub ancestor_path: Vec<String>,
}

impl Placement {
    /// Number of node types between the searched type and the reference
    pub fn nesting_depth(&self) -> usize {
        self.ancestor_path.len()
    }
}

/// The leftmost-outermost reference to every node type reachable from the content of
/// `root`, in the order they were found.
///
/// Descending into a node expression continues in the resolved content of its type,
/// looked up in `table`. The search is breadth first, so references are found by
/// nesting depth and, at the same depth, in pre-order of the content models along the
/// path. The content of each type is searched at most once, the first time the type is
/// reached, and never for `root` itself. Node types that occur inside their own content
/// are therefore found without expanding them again.
pub fn placements<T>(root: &str, table: &T) -> Vec<Placement>
where
    T: ResolvedTable + ?Sized,
{
    let mut found = Vec::new();
    let mut seen = HashSet::new();
    let mut expanded = HashSet::new();
    expanded.insert(root.to_owned());

    let mut queue: VecDeque<(&ResolvedExpr, Vec<String>)> = VecDeque::new();
    if let Some(tree) = table.resolved(root) {
        queue.push_back((tree, Vec::new()));
    }
    while let Some((tree, path)) = queue.pop_front() {
        for leaf in values(tree) {
            if seen.insert(leaf.type_name.clone()) {
                found.push(Placement::new(leaf.type_name.clone(), path.clone()));
            }
            if let Some(content) = table.resolved(&leaf.type_name) {
                if expanded.insert(leaf.type_name.clone()) {
                    let mut inner = path.clone();
                    inner.push(leaf.type_name);
                    queue.push_back((content, inner));
                }
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::{placements, values, Placement, ResolvedTable};
    use crate::content::{parse, resolve, ResolvedExpr};
    use std::collections::HashMap;

    struct Table(HashMap<&'static str, ResolvedExpr>);

    impl ResolvedTable for Table {
        fn resolved(&self, type_name: &str) -> Option<&ResolvedExpr> {
            self.0.get(type_name)
        }
    }

    struct Names;

    impl crate::content::NodeTypeTable for Names {
        fn declaration(&self, _: &str) -> Option<crate::content::Declaration<'_>> {
            Some(crate::content::Declaration::Node { content: None })
        }
    }

    fn table(types: &[(&'static str, &str)]) -> Table {
        Table(
            types
                .iter()
                .map(|(name, content)| (*name, resolve(&parse(content).unwrap(), &Names).unwrap()))
                .collect(),
        )
    }

    fn place(name: &str, path: &[&str]) -> Placement {
        Placement::new(name.into(), path.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_values_are_pre_order() {
        let tree = resolve(&parse("a (b | c)* d").unwrap(), &Names).unwrap();
        let names: Vec<_> = values(&tree).into_iter().map(|l| l.type_name).collect();
        assert_eq!(names, ["a", "b", "c", "d"]);
        let d = values(&tree).pop().unwrap();
        assert_eq!(d.ancestors(&tree).last(), Some(tree.root()));
    }

    #[test]
    fn test_empty_model_has_no_values() {
        let tree = resolve(&parse("").unwrap(), &Names).unwrap();
        assert!(values(&tree).is_empty());
    }

    #[test]
    fn test_placements_report_enclosing_types() {
        let t = table(&[("doc", "quote"), ("quote", "paragraph+"), ("paragraph", "text*")]);
        assert_eq!(
            placements("doc", &t),
            [
                place("quote", &[]),
                place("paragraph", &["quote"]),
                place("text", &["quote", "paragraph"]),
            ]
        );
        assert_eq!(placements("paragraph", &t), [place("text", &[])]);
        assert!(placements("text", &t).is_empty());
    }

    #[test]
    fn test_outermost_wins_over_leftmost() {
        let t = table(&[("doc", "box item"), ("box", "item")]);
        assert_eq!(placements("doc", &t), [place("box", &[]), place("item", &[])]);
    }

    #[test]
    fn test_leftmost_wins_at_same_depth() {
        let t = table(&[("doc", "left right"), ("left", "x"), ("right", "y x")]);
        let found = placements("doc", &t);
        assert!(found.contains(&place("x", &["left"])));
        assert!(found.contains(&place("y", &["right"])));
    }

    #[test]
    fn test_own_type_is_found_but_not_expanded() {
        let t = table(&[("quote", "(quote | para)+"), ("para", "text*")]);
        assert_eq!(
            placements("quote", &t),
            [place("quote", &[]), place("para", &[]), place("text", &["para"])]
        );
    }
}
