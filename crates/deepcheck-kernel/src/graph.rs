//! Arena snapshot of an object graph.
//!
//! Rust has no runtime reflection, so values are first described into an
//! [`ObjectGraph`] through [`Introspect`](crate::introspect::Introspect).
//! Every node lives in one arena and is addressed by a [`NodeId`]. Values
//! reached through shared pointers are memoised by pointer identity while
//! the snapshot is built, so a cycle in the live values becomes a back-edge
//! to an existing `NodeId` here.
//!
//! ```text
//! live values ──introspect──▶ ObjectGraph { nodes: [Node], roots }
//!                                  │
//!                    NodeRef<'g> (read-only view)
//! ```

use std::any::Any;
use std::fmt;

/// Index of a node in an [`ObjectGraph`].
///
/// Node ids are the identity criterion of the engine: two ids are the same
/// object exactly when they are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(u32::try_from(index).unwrap_or(u32::MAX))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Runtime type identifier used by registries and strict type checking.
///
/// Keys are compared by fully qualified type name, which lets a key be
/// written down in a TOML profile as well as derived from a Rust type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeKey(&'static str);

impl TypeKey {
    /// Key of a Rust type (including `dyn Trait` for declared supertypes).
    pub fn of<T: ?Sized>() -> Self {
        Self(std::any::type_name::<T>())
    }

    /// Key from a fully qualified type name.
    pub fn named(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }

    /// Type name without its module path: `alloc::vec::Vec<i32>` → `Vec<i32>`.
    pub fn short_name(&self) -> String {
        short_type_name(self.0)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub(crate) fn short_type_name(name: &str) -> String {
    let name = name.trim();
    if let Some(rest) = name.strip_prefix("&mut ") {
        return format!("&mut {}", short_type_name(rest));
    }
    if let Some(rest) = name.strip_prefix('&') {
        return format!("&{}", short_type_name(rest));
    }
    if let Some(rest) = name.strip_prefix("dyn ") {
        return format!("dyn {}", short_type_name(rest));
    }
    if let Some(inner) = name.strip_prefix('(').and_then(|n| n.strip_suffix(')')) {
        let parts: Vec<String> = split_top_level(inner, ',')
            .into_iter()
            .filter(|part| !part.is_empty())
            .map(short_type_name)
            .collect();
        return match parts.as_slice() {
            [single] => format!("({single},)"),
            _ => format!("({})", parts.join(", ")),
        };
    }
    if let Some(inner) = name.strip_prefix('[').and_then(|n| n.strip_suffix(']')) {
        return match split_top_level(inner, ';').as_slice() {
            [element, len] => format!("[{}; {len}]", short_type_name(element)),
            _ => format!("[{}]", short_type_name(inner)),
        };
    }
    let (head, generics) = match name.find('<') {
        Some(pos) => name.split_at(pos),
        None => (name, ""),
    };
    let base = head.rsplit("::").next().unwrap_or(head);
    let Some(args) = generics.strip_prefix('<').and_then(|g| g.strip_suffix('>')) else {
        return base.to_string();
    };
    let args: Vec<String> = split_top_level(args, ',').into_iter().map(short_type_name).collect();
    format!("{base}<{}>", args.join(", "))
}

/// Splits on `separator` outside of any `<>`, `()` or `[]` nesting.
fn split_top_level(args: &str, separator: char) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, ch) in args.char_indices() {
        match ch {
            '<' | '(' | '[' => depth += 1,
            '>' | ')' | ']' => depth = depth.saturating_sub(1),
            ch if ch == separator && depth == 0 => {
                out.push(args[start..i].trim());
                start = i + ch.len_utf8();
            }
            _ => {}
        }
    }
    out.push(args[start..].trim());
    out
}

/// Typed value carried by leaves (and optionally by beans).
///
/// Implemented for every `PartialEq + Debug + 'static` type so equality and
/// comparators can work on the concrete value behind a node.
pub trait AnyValue: Any + fmt::Debug {
    fn as_any(&self) -> &dyn Any;

    /// `PartialEq` across the erased type; values of different types are unequal.
    fn eq_dyn(&self, other: &dyn AnyValue) -> bool;
}

impl<T: Any + PartialEq + fmt::Debug> AnyValue for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_dyn(&self, other: &dyn AnyValue) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }
}

/// How a sequence orders its elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequenceKind {
    /// Fixed-size arrays and slices.
    Array,
    /// Ordered collections (`Vec`, `VecDeque`, `BTreeSet`, ...).
    List,
    /// Collections without a meaningful iteration order (`HashSet`).
    Set,
}

impl SequenceKind {
    pub fn is_ordered(self) -> bool {
        !matches!(self, Self::Set)
    }
}

/// Whether a bean member is stored data or computed by a getter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Field,
    Property,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Private,
}

/// A named child of a bean.
#[derive(Debug, Clone)]
pub struct Member {
    pub name: String,
    pub kind: MemberKind,
    pub visibility: Visibility,
    pub node: NodeId,
}

/// An entry of a map node. Keys are path labels, not graph nodes.
#[derive(Debug, Clone)]
pub struct MapEntry {
    pub key: String,
    pub value: NodeId,
}

/// The structural category of a node.
#[derive(Debug)]
pub enum NodeKind {
    /// Absent value (`serde_json::Value::Null`, a dangling `Weak`, ...).
    Null,
    /// Atomic value compared through its payload.
    Leaf,
    Sequence {
        kind: SequenceKind,
        items: Vec<NodeId>,
    },
    Map {
        sorted: bool,
        entries: Vec<MapEntry>,
    },
    Optional(Option<NodeId>),
    /// Compared member by member. `variant` is set for enum values.
    Bean {
        variant: Option<&'static str>,
        members: Vec<Member>,
    },
    /// Reserved while the node's children are being described.
    Pending,
}

/// One node of the arena.
#[derive(Debug)]
pub struct Node {
    pub type_key: TypeKey,
    /// Declared supertypes, nearest first.
    pub lineage: Vec<TypeKey>,
    pub kind: NodeKind,
    pub payload: Option<Box<dyn AnyValue>>,
}

impl Node {
    pub(crate) fn pending(type_key: TypeKey) -> Self {
        Self {
            type_key,
            lineage: Vec::new(),
            kind: NodeKind::Pending,
            payload: None,
        }
    }

    /// Exact type followed by declared supertypes.
    pub fn type_chain(&self) -> impl Iterator<Item = TypeKey> + '_ {
        std::iter::once(self.type_key).chain(self.lineage.iter().copied())
    }

    /// Whether a walk can come back to this node through a cycle.
    pub fn may_cycle(&self) -> bool {
        !matches!(self.kind, NodeKind::Null | NodeKind::Leaf)
    }
}

/// An arena of nodes built from one or more root values.
#[derive(Debug, Default)]
pub struct ObjectGraph {
    pub(crate) nodes: Vec<Node>,
}

impl ObjectGraph {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn get(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { graph: self, id }
    }
}

/// Read-only view of one node, handed to predicates and accessors.
#[derive(Clone, Copy)]
pub struct NodeRef<'g> {
    graph: &'g ObjectGraph,
    id: NodeId,
}

impl<'g> NodeRef<'g> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn graph(&self) -> &'g ObjectGraph {
        self.graph
    }

    pub fn node(&self) -> &'g Node {
        self.graph.node(self.id)
    }

    pub fn kind(&self) -> &'g NodeKind {
        &self.node().kind
    }

    pub fn type_key(&self) -> TypeKey {
        self.node().type_key
    }

    pub fn is_null(&self) -> bool {
        matches!(self.kind(), NodeKind::Null)
    }

    pub fn is_empty_optional(&self) -> bool {
        matches!(self.kind(), NodeKind::Optional(None))
    }

    /// Null, or an optional holding nothing.
    pub fn is_absent(&self) -> bool {
        self.is_null() || self.is_empty_optional()
    }

    pub fn payload(&self) -> Option<&'g dyn AnyValue> {
        self.node().payload.as_deref()
    }

    /// The typed value behind this node, when it carries one of type `T`.
    pub fn downcast<T: Any>(&self) -> Option<&'g T> {
        self.payload()?.as_any().downcast_ref::<T>()
    }

    /// Numeric leaves widened to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        let any = self.payload()?.as_any();
        macro_rules! widen {
            ($($ty:ty),*) => {
                $(if let Some(v) = any.downcast_ref::<$ty>() { return Some(*v as f64); })*
            };
        }
        widen!(f64, f32, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
        None
    }

    pub fn as_str(&self) -> Option<&'g str> {
        self.downcast::<String>().map(String::as_str)
    }

    /// Number of children of a container, `None` for non-containers.
    pub fn len(&self) -> Option<usize> {
        match self.kind() {
            NodeKind::Sequence { items, .. } => Some(items.len()),
            NodeKind::Map { entries, .. } => Some(entries.len()),
            NodeKind::Optional(value) => Some(usize::from(value.is_some())),
            _ => None,
        }
    }

    pub fn child(&self, id: NodeId) -> NodeRef<'g> {
        self.graph.get(id)
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::repr::Representation::default().render(*self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_names_strip_module_paths() {
        assert_eq!(short_type_name("alloc::string::String"), "String");
        assert_eq!(short_type_name("alloc::vec::Vec<i32>"), "Vec<i32>");
        assert_eq!(
            short_type_name("std::collections::hash::map::HashMap<alloc::string::String, app::Book>"),
            "HashMap<String, Book>"
        );
        assert_eq!(short_type_name("f64"), "f64");
    }

    #[test]
    fn short_names_of_tuples_slices_and_references() {
        assert_eq!(short_type_name("(alloc::string::String, i32)"), "(String, i32)");
        assert_eq!(short_type_name("[alloc::vec::Vec<i32>]"), "[Vec<i32>]");
        assert_eq!(short_type_name("[core::option::Option<u8>; 4]"), "[Option<u8>; 4]");
        assert_eq!(short_type_name("&str"), "&str");
        assert_eq!(short_type_name("&mut alloc::vec::Vec<app::Book>"), "&mut Vec<Book>");
        assert_eq!(short_type_name("()"), "()");
        assert_eq!(short_type_name("(i32,)"), "(i32,)");
        assert_eq!(
            short_type_name("alloc::vec::Vec<(app::Key, [alloc::string::String; 2])>"),
            "Vec<(Key, [String; 2])>"
        );
        assert_eq!(short_type_name("dyn app::Shape"), "dyn Shape");
        assert_eq!(
            TypeKey::of::<(String, Vec<i32>)>().short_name(),
            "(String, Vec<i32>)"
        );
    }

    #[test]
    fn payload_equality_is_typed() {
        let a: Box<dyn AnyValue> = Box::new(1i32);
        let b: Box<dyn AnyValue> = Box::new(1i64);
        let c: Box<dyn AnyValue> = Box::new(1i32);
        assert!(!a.eq_dyn(b.as_ref()));
        assert!(a.eq_dyn(c.as_ref()));
    }
}
