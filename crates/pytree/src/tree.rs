use std::{collections::BTreeMap, convert::Infallible, fmt, fmt::Write as _};

use serde::{Deserialize, Serialize};

use crate::TreeError;

/// Classification of a single node while walking a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Leaf,
    Sequence,
    Mapping,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Leaf => f.write_str("leaf"),
            NodeKind::Sequence => f.write_str("sequence"),
            NodeKind::Mapping => f.write_str("mapping"),
        }
    }
}

/// A nested structure of mappings and ordered sequences whose terminals are leaves.
///
/// The serde representation is untagged: a leaf serializes as `T` itself, a
/// sequence as an array and a mapping as an object. When `T` can itself be
/// read from an array or object, the leaf interpretation wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Tree<T> {
    Leaf(T),
    Sequence(Vec<Tree<T>>),
    Mapping(BTreeMap<String, Tree<T>>),
}

impl<T> From<T> for Tree<T> {
    fn from(value: T) -> Self {
        Tree::Leaf(value)
    }
}

impl<T> Tree<T> {
    pub fn leaf(value: T) -> Self {
        Tree::Leaf(value)
    }

    pub fn sequence<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Tree<T>>,
    {
        Tree::Sequence(items.into_iter().collect())
    }

    pub fn mapping<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Tree<T>)>,
    {
        Tree::Mapping(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        )
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Tree::Leaf(_) => NodeKind::Leaf,
            Tree::Sequence(_) => NodeKind::Sequence,
            Tree::Mapping(_) => NodeKind::Mapping,
        }
    }

    pub fn as_leaf(&self) -> Option<&T> {
        match self {
            Tree::Leaf(value) => Some(value),
            _ => None,
        }
    }

    /// Looks up a child of a mapping node.
    pub fn get(&self, key: &str) -> Option<&Tree<T>> {
        match self {
            Tree::Mapping(entries) => entries.get(key),
            _ => None,
        }
    }

    /// Looks up a child of a sequence node.
    pub fn at(&self, index: usize) -> Option<&Tree<T>> {
        match self {
            Tree::Sequence(items) => items.get(index),
            _ => None,
        }
    }

    pub fn num_leaves(&self) -> usize {
        match self {
            Tree::Leaf(_) => 1,
            Tree::Sequence(items) => items.iter().map(Tree::num_leaves).sum(),
            Tree::Mapping(entries) => entries.values().map(Tree::num_leaves).sum(),
        }
    }

    /// Borrows every leaf in traversal order.
    pub fn leaves(&self) -> Vec<&T> {
        let mut out = Vec::with_capacity(self.num_leaves());
        collect_leaves(self, &mut out);
        out
    }

    /// Consumes the tree and returns its leaves in traversal order.
    pub fn into_leaves(self) -> Vec<T> {
        let mut out = Vec::new();
        drain_leaves(self, &mut out);
        out
    }

    /// Applies `f` to every leaf and rebuilds the same nesting around the results.
    pub fn map<U, F>(&self, mut f: F) -> Tree<U>
    where
        F: FnMut(&T) -> U,
    {
        match self.try_map(|leaf| Ok::<U, Infallible>(f(leaf))) {
            Ok(tree) => tree,
            Err(never) => match never {},
        }
    }

    /// Fallible [`Tree::map`]; stops at the first leaf whose transform fails.
    pub fn try_map<U, E, F>(&self, mut f: F) -> Result<Tree<U>, E>
    where
        F: FnMut(&T) -> Result<U, E>,
    {
        try_map_inner(self, &mut f)
    }

    /// Combines two trees of identical structure leaf by leaf.
    pub fn zip_with<U, V, F>(&self, other: &Tree<U>, mut f: F) -> Result<Tree<V>, TreeError>
    where
        F: FnMut(&T, &U) -> V,
    {
        self.try_zip_with(other, |lhs, rhs| Ok::<V, TreeError>(f(lhs, rhs)))
    }

    /// Fallible [`Tree::zip_with`]. Structural disagreements are reported
    /// through `E::from(TreeError)` with the path of the offending node.
    pub fn try_zip_with<U, V, E, F>(&self, other: &Tree<U>, mut f: F) -> Result<Tree<V>, E>
    where
        E: From<TreeError>,
        F: FnMut(&T, &U) -> Result<V, E>,
    {
        let mut path = Vec::new();
        zip_inner(self, other, &mut path, &mut f)
    }

    pub fn same_structure<U>(&self, other: &Tree<U>) -> bool {
        match (self, other) {
            (Tree::Leaf(_), Tree::Leaf(_)) => true,
            (Tree::Sequence(xs), Tree::Sequence(ys)) => {
                xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| x.same_structure(y))
            }
            (Tree::Mapping(xs), Tree::Mapping(ys)) => {
                xs.keys().eq(ys.keys())
                    && xs
                        .values()
                        .zip(ys.values())
                        .all(|(x, y)| x.same_structure(y))
            }
            _ => false,
        }
    }

    /// Places `leaves` into the structure of `self`, in traversal order.
    pub fn unflatten<U, I>(&self, leaves: I) -> Result<Tree<U>, TreeError>
    where
        I: IntoIterator<Item = U>,
    {
        let leaves: Vec<U> = leaves.into_iter().collect();
        let expected = self.num_leaves();
        let found = leaves.len();
        if found != expected {
            return Err(TreeError::LeafCountMismatch { expected, found });
        }
        let mut iter = leaves.into_iter();
        self.try_map(|_| {
            iter.next()
                .ok_or(TreeError::LeafCountMismatch { expected, found })
        })
    }
}

enum Segment<'a> {
    Key(&'a str),
    Index(usize),
}

fn render_path(path: &[Segment<'_>]) -> String {
    let mut out = String::from("$");
    for segment in path {
        match segment {
            Segment::Key(key) => {
                out.push('.');
                out.push_str(key);
            }
            Segment::Index(index) => {
                let _ = write!(out, "[{index}]");
            }
        }
    }
    out
}

fn describe<T>(tree: &Tree<T>) -> String {
    match tree {
        Tree::Leaf(_) => NodeKind::Leaf.to_string(),
        Tree::Sequence(items) => format!("sequence of length {}", items.len()),
        Tree::Mapping(entries) => format!(
            "mapping with keys {:?}",
            entries.keys().collect::<Vec<_>>()
        ),
    }
}

fn collect_leaves<'a, T>(tree: &'a Tree<T>, out: &mut Vec<&'a T>) {
    match tree {
        Tree::Leaf(value) => out.push(value),
        Tree::Sequence(items) => items.iter().for_each(|item| collect_leaves(item, out)),
        Tree::Mapping(entries) => entries.values().for_each(|item| collect_leaves(item, out)),
    }
}

fn drain_leaves<T>(tree: Tree<T>, out: &mut Vec<T>) {
    match tree {
        Tree::Leaf(value) => out.push(value),
        Tree::Sequence(items) => items.into_iter().for_each(|item| drain_leaves(item, out)),
        Tree::Mapping(entries) => entries
            .into_values()
            .for_each(|item| drain_leaves(item, out)),
    }
}

fn try_map_inner<T, U, E, F>(tree: &Tree<T>, f: &mut F) -> Result<Tree<U>, E>
where
    F: FnMut(&T) -> Result<U, E>,
{
    match tree {
        Tree::Leaf(value) => f(value).map(Tree::Leaf),
        Tree::Sequence(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(try_map_inner(item, f)?);
            }
            Ok(Tree::Sequence(out))
        }
        Tree::Mapping(entries) => {
            let mut out = BTreeMap::new();
            for (key, item) in entries {
                out.insert(key.clone(), try_map_inner(item, f)?);
            }
            Ok(Tree::Mapping(out))
        }
    }
}

fn zip_inner<'a, T, U, V, E, F>(
    lhs: &'a Tree<T>,
    rhs: &Tree<U>,
    path: &mut Vec<Segment<'a>>,
    f: &mut F,
) -> Result<Tree<V>, E>
where
    E: From<TreeError>,
    F: FnMut(&T, &U) -> Result<V, E>,
{
    match (lhs, rhs) {
        (Tree::Leaf(a), Tree::Leaf(b)) => f(a, b).map(Tree::Leaf),
        (Tree::Sequence(xs), Tree::Sequence(ys)) if xs.len() == ys.len() => {
            let mut out = Vec::with_capacity(xs.len());
            for (index, (x, y)) in xs.iter().zip(ys).enumerate() {
                path.push(Segment::Index(index));
                out.push(zip_inner(x, y, path, f)?);
                path.pop();
            }
            Ok(Tree::Sequence(out))
        }
        (Tree::Mapping(xs), Tree::Mapping(ys)) if xs.keys().eq(ys.keys()) => {
            let mut out = BTreeMap::new();
            for ((key, x), y) in xs.iter().zip(ys.values()) {
                path.push(Segment::Key(key));
                out.insert(key.clone(), zip_inner(x, y, path, f)?);
                path.pop();
            }
            Ok(Tree::Mapping(out))
        }
        _ => Err(TreeError::StructureMismatch {
            path: render_path(path),
            expected: describe(lhs),
            found: describe(rhs),
        }
        .into()),
    }
}
