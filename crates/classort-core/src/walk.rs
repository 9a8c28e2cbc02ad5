//! Generic walker for loosely-typed trees.
//!
//! The walker does not know any tree format. A node only has to expose a
//! discriminant tag and its named fields through the [`Node`] trait; the
//! walker then finds children by plain field introspection:
//!
//! - an array-valued field is visited element-wise, skipping nulls
//! - a field whose value has a discriminant is visited as a single child
//!
//! `Node` is implemented for [`serde_json::Value`], with the discriminant
//! read from the `type` key, which covers ESTree-, PostCSS- and
//! HTML-parser-shaped trees serialized as JSON.
//!
//! # Traversal Order
//!
//! - **Depth-first, pre-order**: the handler for a node runs before its children
//! - Children are visited in field order, array elements by index
//!
//! For [`serde_json::Value`], field order is source order because this crate
//! enables serde_json's `preserve_order` feature. Without it, object keys
//! iterate alphabetically.
//!
//! # Handlers
//!
//! [`Handlers::all`] runs one callback on every visited node;
//! [`Handlers::by_kind`] dispatches on the discriminant. A handler returns:
//!
//! - `VisitResult::Continue` - traverse into children
//! - `VisitResult::SkipChildren` - skip this node's children
//! - `VisitResult::Stop` - halt traversal immediately
//!
//! # Meta
//!
//! Each handler receives a mutable meta value. The walker gives every child
//! its own copy of the meta as it was after the parent's handler ran, so a
//! handler can scope flags to its descendants without siblings or ancestors
//! ever observing them.
//!
//! # Mutation
//!
//! The walk borrows the tree immutably. To rewrite nodes, record
//! [`AncestorPath::pointer`] for each target during the walk and apply the
//! edits afterwards with [`serde_json::Value::pointer_mut`]; the tree then has
//! a single writer at any time.

use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Discriminant key used by [`serde_json::Value`] nodes.
pub const KIND_KEY: &str = "type";

// ============================================================================
// Node Capability
// ============================================================================

/// Anything the walker can traverse.
pub trait Node: Sized {
    /// The node discriminant, or `None` if this value is not a node.
    fn kind(&self) -> Option<&str>;

    /// Named fields, in a stable order. Empty for scalars.
    fn fields(&self) -> Vec<(&str, &Self)>;

    /// Elements, if this value is an array.
    fn elements(&self) -> Option<&[Self]>;

    /// Returns true for explicit nulls and holes.
    fn is_null(&self) -> bool;
}

impl Node for Value {
    fn kind(&self) -> Option<&str> {
        self.as_object()?.get(KIND_KEY)?.as_str()
    }

    fn fields(&self) -> Vec<(&str, &Self)> {
        match self {
            Value::Object(map) => map.iter().map(|(k, v)| (k.as_str(), v)).collect(),
            _ => Vec::new(),
        }
    }

    fn elements(&self) -> Option<&[Self]> {
        self.as_array().map(Vec::as_slice)
    }

    fn is_null(&self) -> bool {
        Value::is_null(self)
    }
}

// ============================================================================
// Ancestor Paths
// ============================================================================

/// One step from a node up to its parent.
#[derive(Debug)]
pub struct Ancestor<'a, N> {
    /// The parent node.
    pub parent: &'a N,
    /// The parent's field holding the child.
    pub key: &'a str,
    /// The child's index, if the field is an array.
    pub index: Option<usize>,
}

impl<N> Clone for Ancestor<'_, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N> Copy for Ancestor<'_, N> {}

/// The ancestors of a visited node.
///
/// Iteration runs from the nearest ancestor to the root.
#[derive(Debug)]
pub struct AncestorPath<'a, N> {
    // Stored root-first; exposed nearest-first.
    entries: Vec<Ancestor<'a, N>>,
}

impl<'a, N> AncestorPath<'a, N> {
    fn new() -> Self {
        AncestorPath {
            entries: Vec::new(),
        }
    }

    fn push(&mut self, ancestor: Ancestor<'a, N>) {
        self.entries.push(ancestor);
    }

    fn pop(&mut self) {
        self.entries.pop();
    }

    /// Ancestors from nearest to furthest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Ancestor<'a, N>> + '_ {
        self.entries.iter().rev()
    }

    /// The `n`-th ancestor, 0 being the direct parent.
    pub fn get(&self, n: usize) -> Option<&Ancestor<'a, N>> {
        self.entries.len().checked_sub(n + 1).map(|i| &self.entries[i])
    }

    /// The direct parent.
    pub fn nearest(&self) -> Option<&Ancestor<'a, N>> {
        self.entries.last()
    }

    /// The nearest ancestor satisfying `pred`.
    pub fn find<P>(&self, mut pred: P) -> Option<&Ancestor<'a, N>>
    where
        P: FnMut(&Ancestor<'a, N>) -> bool,
    {
        self.iter().find(|a| pred(a))
    }

    /// Depth of the visited node (0 for the root).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when visiting the root.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// RFC 6901 JSON pointer from the root to the visited node.
    pub fn pointer(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push('/');
            out.push_str(&entry.key.replace('~', "~0").replace('/', "~1"));
            if let Some(index) = entry.index {
                out.push('/');
                out.push_str(&index.to_string());
            }
        }
        out
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// What the walker does after a handler returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitResult {
    /// Visit this node's children.
    Continue,
    /// Do not descend into this node.
    SkipChildren,
    /// Halt the whole walk.
    Stop,
}

/// A per-node callback.
pub type Handler<'a, 'h, N, M> =
    Box<dyn FnMut(&'a N, &AncestorPath<'a, N>, &mut M) -> VisitResult + 'h>;

/// Callbacks for a walk: one for every node, or one per discriminant.
pub enum Handlers<'a, 'h, N, M> {
    /// Invoked for every visited node.
    All(Handler<'a, 'h, N, M>),
    /// Invoked for nodes whose discriminant has an entry.
    ByKind(HashMap<String, Handler<'a, 'h, N, M>>),
}

impl<'a, 'h, N, M> Handlers<'a, 'h, N, M> {
    /// One callback for every node.
    pub fn all<F>(f: F) -> Self
    where
        F: FnMut(&'a N, &AncestorPath<'a, N>, &mut M) -> VisitResult + 'h,
    {
        Handlers::All(Box::new(f))
    }

    /// An empty per-kind table; add entries with [`Handlers::on`].
    pub fn by_kind() -> Self {
        Handlers::ByKind(HashMap::new())
    }

    /// Register a callback for `kind`.
    ///
    /// Turns an `All` table into a per-kind table holding only this entry.
    pub fn on<F>(self, kind: impl Into<String>, f: F) -> Self
    where
        F: FnMut(&'a N, &AncestorPath<'a, N>, &mut M) -> VisitResult + 'h,
    {
        let mut table = match self {
            Handlers::ByKind(table) => table,
            Handlers::All(_) => HashMap::new(),
        };
        table.insert(kind.into(), Box::new(f));
        Handlers::ByKind(table)
    }

    fn dispatch(&mut self, node: &'a N, path: &AncestorPath<'a, N>, meta: &mut M) -> VisitResult
    where
        N: Node,
    {
        match self {
            Handlers::All(f) => f(node, path, meta),
            Handlers::ByKind(table) => match node.kind().and_then(|k| table.get_mut(k)) {
                Some(f) => f(node, path, meta),
                None => VisitResult::Continue,
            },
        }
    }
}

// ============================================================================
// Walk
// ============================================================================

/// Walk `root` with a default meta.
pub fn visit<'a, N, M>(root: &'a N, handlers: &mut Handlers<'a, '_, N, M>)
where
    N: Node,
    M: Clone + Default,
{
    visit_with_meta(root, handlers, M::default());
}

/// Walk `root` starting from `meta`.
pub fn visit_with_meta<'a, N, M>(root: &'a N, handlers: &mut Handlers<'a, '_, N, M>, meta: M)
where
    N: Node,
    M: Clone,
{
    let mut path = AncestorPath::new();
    walk(root, &mut path, meta, handlers);
}

/// Returns false once traversal must stop.
fn walk<'a, N, M>(
    node: &'a N,
    path: &mut AncestorPath<'a, N>,
    mut meta: M,
    handlers: &mut Handlers<'a, '_, N, M>,
) -> bool
where
    N: Node,
    M: Clone,
{
    match handlers.dispatch(node, path, &mut meta) {
        VisitResult::Stop => return false,
        VisitResult::SkipChildren => return true,
        VisitResult::Continue => {}
    }

    for (key, child) in node.fields() {
        if let Some(items) = child.elements() {
            for (index, item) in items.iter().enumerate() {
                if item.is_null() {
                    continue;
                }
                path.push(Ancestor {
                    parent: node,
                    key,
                    index: Some(index),
                });
                let keep_going = walk(item, path, meta.clone(), handlers);
                path.pop();
                if !keep_going {
                    return false;
                }
            }
        } else if child.kind().is_some() {
            path.push(Ancestor {
                parent: node,
                key,
                index: None,
            });
            let keep_going = walk(child, path, meta.clone(), handlers);
            path.pop();
            if !keep_going {
                return false;
            }
        }
    }

    true
}

// ============================================================================
// Meta
// ============================================================================

/// A small flag map threaded from parent to child during a walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Meta {
    flags: BTreeMap<String, bool>,
}

impl Meta {
    /// Create an empty meta.
    pub fn new() -> Self {
        Meta::default()
    }

    /// Set a flag.
    pub fn set(&mut self, flag: impl Into<String>, value: bool) {
        self.flags.insert(flag.into(), value);
    }

    /// Read a flag; unset flags are false.
    pub fn is_set(&self, flag: &str) -> bool {
        self.flags.get(flag).copied().unwrap_or(false)
    }
}
