use super::{ExprId, ResolvedExpr, ResolvedKind};
use std::collections::BTreeSet;

/// Matches sequences of child types against a resolved content expression.
///
/// Node expressions are terminals, so only the direct children of a node are
/// checked.
#[derive(Debug, Copy, Clone)]
pub struct ContentMatcher<'a> {
    tree: &'a ResolvedExpr,
}

type Positions = BTreeSet<usize>;

impl<'a> ContentMatcher<'a> {
    /// Create a matcher for a resolved content expression
    pub fn new(tree: &'a ResolvedExpr) -> Self {
        Self { tree }
    }

    /// True if the sequence of child types is valid content.
    pub fn matches(&self, types: &[&str]) -> bool {
        let start: Positions = std::iter::once(0).collect();
        self.repeat(self.tree.root(), start, types)
            .contains(&types.len())
    }

    /// The shortest sequence of types that makes valid content, choosing the
    /// first alternative on ties.
    ///
    /// Types for which `creatable` returns false can not be used; `None` is
    /// returned when no valid content can be built without them.
    pub fn fill<F>(&self, creatable: F) -> Option<Vec<String>>
    where
        F: Fn(&str) -> bool,
    {
        self.fill_repeat(self.tree.root(), &creatable)
    }

    /// Types that may appear as a direct child, in expression order, without
    /// duplicates.
    pub fn child_types(&self) -> Vec<&'a str> {
        let mut out: Vec<&'a str> = Vec::new();
        for (_, node) in self.tree.iter() {
            if let Some(name) = node.node_type() {
                if !out.contains(&name) {
                    out.push(name);
                }
            }
        }
        out
    }

    /// Types that may appear as the first child.
    pub fn first_types(&self) -> Vec<&'a str> {
        let mut out = Vec::new();
        self.first(self.tree.root(), &mut out);
        out
    }

    /// True if empty content is valid.
    pub fn accepts_empty(&self) -> bool {
        self.matches(&[])
    }

    fn repeat(&self, id: ExprId, start: Positions, types: &[&str]) -> Positions {
        let quantifier = self.tree[id].quantifier;
        let mut current = start;
        for _ in 0..quantifier.min() {
            current = self.once(id, &current, types);
            if current.is_empty() {
                return current;
            }
        }

        let mut result = current.clone();
        let mut count = quantifier.min();
        while quantifier.max().map_or(true, |max| count < max) {
            let next = self.once(id, &current, types);
            let fresh: Positions = next.difference(&result).copied().collect();
            if fresh.is_empty() {
                break;
            }
            result.extend(fresh.iter().copied());
            // bounded repetitions must keep all positions reached after `count` rounds
            current = if quantifier.max().is_some() { next } else { fresh };
            count += 1;
        }
        result
    }

    fn once(&self, id: ExprId, start: &Positions, types: &[&str]) -> Positions {
        let node = &self.tree[id];
        match &node.kind {
            ResolvedKind::Node { name } => start
                .iter()
                .filter(|&&p| types.get(p) == Some(&name.as_str()))
                .map(|p| p + 1)
                .collect(),
            ResolvedKind::Sequence => node
                .children
                .iter()
                .fold(start.clone(), |acc, child| self.repeat(*child, acc, types)),
            ResolvedKind::Alternation => node
                .children
                .iter()
                .flat_map(|child| self.repeat(*child, start.clone(), types))
                .collect(),
            ResolvedKind::Group { .. } => match node.children.first() {
                Some(body) => self.repeat(*body, start.clone(), types),
                None => start.clone(),
            },
        }
    }

    fn fill_repeat<F: Fn(&str) -> bool>(&self, id: ExprId, creatable: &F) -> Option<Vec<String>> {
        let min = self.tree[id].quantifier.min();
        if min == 0 {
            return Some(Vec::new());
        }
        let once = self.fill_once(id, creatable)?;
        Some(std::iter::repeat(once).take(min).flatten().collect())
    }

    fn fill_once<F: Fn(&str) -> bool>(&self, id: ExprId, creatable: &F) -> Option<Vec<String>> {
        let node = &self.tree[id];
        match &node.kind {
            ResolvedKind::Node { name } => {
                if creatable(name) {
                    Some(vec![name.clone()])
                } else {
                    None
                }
            }
            ResolvedKind::Sequence => {
                let mut out = Vec::new();
                for child in &node.children {
                    out.extend(self.fill_repeat(*child, creatable)?);
                }
                Some(out)
            }
            ResolvedKind::Alternation => node
                .children
                .iter()
                .filter_map(|child| self.fill_repeat(*child, creatable))
                .fold(None, |best: Option<Vec<String>>, candidate| match best {
                    Some(b) if b.len() <= candidate.len() => Some(b),
                    _ => Some(candidate),
                }),
            ResolvedKind::Group { .. } => match node.children.first() {
                Some(body) => self.fill_repeat(*body, creatable),
                None => Some(Vec::new()),
            },
        }
    }

    /// Collects the first types of `id` and returns whether it can match nothing.
    fn first(&self, id: ExprId, out: &mut Vec<&'a str>) -> bool {
        let node = &self.tree[id];
        let quantifier = node.quantifier;
        if quantifier.max() == Some(0) {
            return true;
        }
        let nullable = match &node.kind {
            ResolvedKind::Node { name } => {
                if !out.contains(&name.as_str()) {
                    out.push(name);
                }
                false
            }
            ResolvedKind::Sequence => node.children.iter().all(|child| self.first(*child, out)),
            ResolvedKind::Alternation => node
                .children
                .iter()
                .fold(node.children.is_empty(), |acc, child| self.first(*child, out) || acc),
            ResolvedKind::Group { .. } => node
                .children
                .first()
                .map_or(true, |body| self.first(*body, out)),
        };
        nullable || quantifier.min() == 0
    }
}
