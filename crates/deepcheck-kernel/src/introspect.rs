//! Describing live values into an [`ObjectGraph`].
//!
//! A type takes part in recursive comparison by implementing [`Introspect`].
//! Most types only need the [`introspect!`](crate::introspect!) macro, which
//! lists the fields compared member by member:
//!
//! ```
//! use deepcheck_kernel::introspect;
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Author { name: String, born: u16 }
//!
//! introspect!(Author { name, born });
//! ```
//!
//! Hand-written impls use the [`GraphBuilder`] helpers directly, which is how
//! properties (computed getters), private fields, declared supertypes and
//! enum variants are described:
//!
//! ```
//! use deepcheck_kernel::{GraphBuilder, Introspect, NodeId};
//!
//! struct Account { owner: String, pin: u16 }
//!
//! impl Introspect for Account {
//!     fn introspect<'v>(&'v self, graph: &mut GraphBuilder<'v>) -> NodeId {
//!         graph
//!             .bean::<Self>()
//!             .field("owner", &self.owner)
//!             .private_field("pin", &self.pin)
//!             .property("initial", &self.owner.chars().next())
//!             .finish()
//!     }
//! }
//! ```
//!
//! Children of sequences, maps, optionals and bean fields are not described
//! on the call stack: the builder records them as pending work and fills
//! them in from an explicit stack, so arbitrarily deep values snapshot in
//! constant stack space. Values behind an interior-mutability boundary
//! (`RefCell`, `Cell`, an upgraded `Weak`) and properties are described
//! eagerly, since the borrow they are read through does not outlive the call.
//!
//! Shared pointers (`Rc`, `Arc`, `Weak`) are memoised by address and pointee
//! type. The builder keeps a strong clone of every memoised pointer until the
//! graph is finished, so an address cannot be reused by another allocation
//! while it is a memo key.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt::Display;
use std::rc::Rc;
use std::sync::Arc;

use crate::graph::{
    AnyValue, MapEntry, Member, MemberKind, Node, NodeId, NodeKind, NodeRef, ObjectGraph,
    SequenceKind, TypeKey, Visibility,
};

/// A value that can describe itself as a node of an [`ObjectGraph`].
pub trait Introspect {
    /// Adds this value to `graph` and returns the id of its node. Children
    /// handed to the builder are described after this call returns.
    fn introspect<'v>(&'v self, graph: &mut GraphBuilder<'v>) -> NodeId;
}

type Describe<'v> = Box<dyn FnOnce(&mut GraphBuilder<'v>) -> NodeId + 'v>;

/// A child still to be described, and the slot of its parent it fills.
struct Deferred<'v> {
    parent: NodeId,
    slot: usize,
    describe: Describe<'v>,
}

#[derive(Default)]
struct BuildState {
    graph: ObjectGraph,
    memo: HashMap<(usize, &'static str), NodeId>,
    retained: Vec<Box<dyn Any>>,
}

/// Incrementally builds an [`ObjectGraph`] from values borrowed for `'v`.
#[derive(Default)]
pub struct GraphBuilder<'v> {
    state: BuildState,
    pending: Vec<Deferred<'v>>,
}

impl<'v> GraphBuilder<'v> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Describes a root value, including everything reachable from it.
    pub fn add<T: Introspect + ?Sized>(&mut self, value: &'v T) -> NodeId {
        let floor = self.pending.len();
        let root = value.introspect(self);
        while self.pending.len() > floor {
            if let Some(Deferred { parent, slot, describe }) = self.pending.pop() {
                let child = describe(self);
                self.fill(parent, slot, child);
            }
        }
        root
    }

    /// Describes `value` to completion before returning. For values read
    /// through a borrow that ends with the caller (a `RefCell` guard, a copy
    /// out of a `Cell`, a computed property).
    pub fn nested<T: Introspect + ?Sized>(&mut self, value: &T) -> NodeId {
        let mut inner = GraphBuilder {
            state: std::mem::take(&mut self.state),
            pending: Vec::new(),
        };
        let id = inner.add(value);
        self.state = inner.state;
        id
    }

    pub fn finish(self) -> ObjectGraph {
        self.state.graph
    }

    fn next_id(&self) -> NodeId {
        NodeId::from_index(self.state.graph.nodes.len())
    }

    fn reserve(&mut self, type_key: TypeKey) -> NodeId {
        let id = self.next_id();
        self.state.graph.nodes.push(Node::pending(type_key));
        id
    }

    fn complete(&mut self, id: NodeId, kind: NodeKind) {
        self.state.graph.nodes[id.index()].kind = kind;
    }

    fn describe<V: Introspect + ?Sized + 'v>(value: &'v V) -> Describe<'v> {
        Box::new(move |graph: &mut GraphBuilder<'v>| value.introspect(graph))
    }

    /// Queues `jobs` so the first one is described first.
    fn defer(&mut self, parent: NodeId, jobs: Vec<(usize, Describe<'v>)>) {
        self.pending.extend(
            jobs.into_iter()
                .rev()
                .map(|(slot, describe)| Deferred { parent, slot, describe }),
        );
    }

    fn fill(&mut self, parent: NodeId, slot: usize, child: NodeId) {
        match &mut self.state.graph.nodes[parent.index()].kind {
            NodeKind::Sequence { items, .. } => items[slot] = child,
            NodeKind::Map { entries, .. } => entries[slot].value = child,
            NodeKind::Optional(value) => *value = Some(child),
            NodeKind::Bean { members, .. } => members[slot].node = child,
            NodeKind::Null | NodeKind::Leaf | NodeKind::Pending => {
                tracing::warn!(?parent, slot, "described a child for a node without children");
            }
        }
    }

    /// An absent value of the given type.
    pub fn null(&mut self, type_key: TypeKey) -> NodeId {
        let id = self.reserve(type_key);
        self.complete(id, NodeKind::Null);
        id
    }

    /// An atomic value; its payload type is also its node type.
    pub fn leaf<T: AnyValue>(&mut self, value: T) -> NodeId {
        let id = self.reserve(TypeKey::of::<T>());
        let node = &mut self.state.graph.nodes[id.index()];
        node.kind = NodeKind::Leaf;
        node.payload = Some(Box::new(value));
        id
    }

    pub fn sequence<E, I>(&mut self, type_key: TypeKey, kind: SequenceKind, items: I) -> NodeId
    where
        E: Introspect + ?Sized + 'v,
        I: IntoIterator<Item = &'v E>,
    {
        let id = self.reserve(type_key);
        let jobs: Vec<(usize, Describe<'v>)> = items
            .into_iter()
            .enumerate()
            .map(|(slot, item)| (slot, Self::describe(item)))
            .collect();
        let items = vec![id; jobs.len()];
        self.complete(id, NodeKind::Sequence { kind, items });
        self.defer(id, jobs);
        id
    }

    /// A map whose keys become path labels. Unsorted maps are ordered by
    /// label so snapshots of equal maps are identical.
    pub fn map<V, I>(&mut self, type_key: TypeKey, sorted: bool, entries: I) -> NodeId
    where
        V: Introspect + ?Sized + 'v,
        I: IntoIterator<Item = (String, &'v V)>,
    {
        let id = self.reserve(type_key);
        let mut pairs: Vec<(String, &'v V)> = entries.into_iter().collect();
        if !sorted {
            pairs.sort_by(|a, b| a.0.cmp(&b.0));
        }
        let (entries, jobs): (Vec<MapEntry>, Vec<(usize, Describe<'v>)>) = pairs
            .into_iter()
            .enumerate()
            .map(|(slot, (key, value))| (MapEntry { key, value: id }, (slot, Self::describe(value))))
            .unzip();
        self.complete(id, NodeKind::Map { sorted, entries });
        self.defer(id, jobs);
        id
    }

    pub fn optional<V: Introspect + ?Sized + 'v>(&mut self, type_key: TypeKey, value: Option<&'v V>) -> NodeId {
        let id = self.reserve(type_key);
        self.complete(id, NodeKind::Optional(None));
        if let Some(value) = value {
            self.defer(id, vec![(0, Self::describe(value))]);
        }
        id
    }

    /// Starts a bean node for `T`; members are added on the returned builder.
    pub fn bean<T: ?Sized>(&mut self) -> BeanBuilder<'_, 'v> {
        let id = self.reserve(TypeKey::of::<T>());
        BeanBuilder {
            builder: self,
            id,
            lineage: Vec::new(),
            variant: None,
            members: Vec::new(),
            jobs: Vec::new(),
            payload: None,
        }
    }

    /// Describes `inner` once per pointer identity.
    ///
    /// `address` and the pointee type form the memo key; `retain` is a strong
    /// handle kept alive until [`finish`](Self::finish).
    pub fn shared<P, T>(&mut self, address: *const (), retain: P, inner: &'v T) -> NodeId
    where
        P: Any,
        T: Introspect + ?Sized,
    {
        let key = (address as usize, std::any::type_name::<T>());
        if let Some(id) = self.state.memo.get(&key) {
            return *id;
        }
        let reserved = self.next_id();
        self.state.memo.insert(key, reserved);
        self.state.retained.push(Box::new(retain));
        let id = inner.introspect(self);
        if id != reserved {
            self.state.memo.insert(key, id);
        }
        id
    }
}

/// Builder for the members of one bean node.
#[must_use = "a bean is only recorded by `finish`"]
pub struct BeanBuilder<'b, 'v> {
    builder: &'b mut GraphBuilder<'v>,
    id: NodeId,
    lineage: Vec<TypeKey>,
    variant: Option<&'static str>,
    members: Vec<Member>,
    jobs: Vec<(usize, Describe<'v>)>,
    payload: Option<Box<dyn AnyValue>>,
}

impl<'v> BeanBuilder<'_, 'v> {
    fn push(&mut self, name: &str, kind: MemberKind, visibility: Visibility, node: NodeId) -> usize {
        self.members.push(Member {
            name: name.to_string(),
            kind,
            visibility,
            node,
        });
        self.members.len() - 1
    }

    fn stored<V: Introspect + ?Sized + 'v>(mut self, name: &str, visibility: Visibility, value: &'v V) -> Self {
        let id = self.id;
        let slot = self.push(name, MemberKind::Field, visibility, id);
        self.jobs.push((slot, GraphBuilder::<'v>::describe(value)));
        self
    }

    pub fn field<V: Introspect + ?Sized + 'v>(self, name: &str, value: &'v V) -> Self {
        self.stored(name, Visibility::Public, value)
    }

    /// A field hidden from introspection strategies that exclude private members.
    pub fn private_field<V: Introspect + ?Sized + 'v>(self, name: &str, value: &'v V) -> Self {
        self.stored(name, Visibility::Private, value)
    }

    /// A computed value, described immediately. Properties win over fields
    /// of the same name.
    pub fn property<V: Introspect + ?Sized>(mut self, name: &str, value: &V) -> Self {
        let node = self.builder.nested(value);
        self.push(name, MemberKind::Property, Visibility::Public, node);
        self
    }

    /// Declares a supertype; declaration order is resolution order.
    pub fn supertype<S: ?Sized>(mut self) -> Self {
        self.lineage.push(TypeKey::of::<S>());
        self
    }

    /// Attaches the value itself, enabling `PartialEq`-based comparison.
    pub fn payload<T: AnyValue>(mut self, value: T) -> Self {
        self.payload = Some(Box::new(value));
        self
    }

    /// Marks the bean as one variant of an enum.
    pub fn variant(mut self, name: &'static str) -> Self {
        self.variant = Some(name);
        self
    }

    pub fn finish(self) -> NodeId {
        let BeanBuilder {
            builder,
            id,
            lineage,
            variant,
            members,
            jobs,
            payload,
        } = self;
        let node = &mut builder.state.graph.nodes[id.index()];
        node.lineage = lineage;
        node.payload = payload;
        node.kind = NodeKind::Bean { variant, members };
        builder.defer(id, jobs);
        id
    }
}

/// A finished graph together with the roots it was built from.
#[derive(Debug)]
pub struct Snapshot {
    graph: ObjectGraph,
    roots: Vec<NodeId>,
}

impl Snapshot {
    pub fn of<T: Introspect + ?Sized>(value: &T) -> Self {
        let mut builder = GraphBuilder::new();
        let root = builder.add(value);
        Self {
            graph: builder.finish(),
            roots: vec![root],
        }
    }

    /// Snapshots two values into one graph. When both references point at
    /// the same value of the same type they share one root node.
    pub fn of_pair<A, E>(actual: &A, expected: &E) -> Self
    where
        A: Introspect + ?Sized,
        E: Introspect + ?Sized,
    {
        let mut builder = GraphBuilder::new();
        let actual_root = builder.add(actual);
        let same_value = std::ptr::addr_eq(actual as *const A, expected as *const E)
            && std::any::type_name::<A>() == std::any::type_name::<E>();
        let expected_root = if same_value {
            actual_root
        } else {
            builder.add(expected)
        };
        Self {
            graph: builder.finish(),
            roots: vec![actual_root, expected_root],
        }
    }

    pub fn graph(&self) -> &ObjectGraph {
        &self.graph
    }

    pub fn root(&self) -> NodeRef<'_> {
        self.graph.get(self.roots[0])
    }

    pub fn actual(&self) -> NodeRef<'_> {
        self.graph.get(self.roots[0])
    }

    pub fn expected(&self) -> NodeRef<'_> {
        self.graph.get(self.roots[self.roots.len() - 1])
    }
}

/// Implements [`Introspect`] for a struct compared field by field.
///
/// `#[eq]` additionally attaches a clone of the value, so the type can be
/// compared with its own `PartialEq` when overridden equals are in use.
#[macro_export]
macro_rules! introspect {
    (#[eq] $ty:ty { $($field:ident),* $(,)? }) => {
        impl $crate::Introspect for $ty {
            fn introspect<'v>(&'v self, graph: &mut $crate::GraphBuilder<'v>) -> $crate::NodeId {
                graph
                    .bean::<Self>()
                    $(.field(stringify!($field), &self.$field))*
                    .payload(::std::clone::Clone::clone(self))
                    .finish()
            }
        }
    };
    ($ty:ty { $($field:ident),* $(,)? }) => {
        impl $crate::Introspect for $ty {
            fn introspect<'v>(&'v self, graph: &mut $crate::GraphBuilder<'v>) -> $crate::NodeId {
                graph
                    .bean::<Self>()
                    $(.field(stringify!($field), &self.$field))*
                    .finish()
            }
        }
    };
}

macro_rules! leaf_by_copy {
    ($($ty:ty),* $(,)?) => {
        $(impl Introspect for $ty {
            fn introspect<'v>(&'v self, graph: &mut GraphBuilder<'v>) -> NodeId {
                graph.leaf(*self)
            }
        })*
    };
}

leaf_by_copy!(
    bool, char, (), i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
    std::time::Duration,
);

macro_rules! leaf_by_clone {
    ($($ty:ty),* $(,)?) => {
        $(impl Introspect for $ty {
            fn introspect<'v>(&'v self, graph: &mut GraphBuilder<'v>) -> NodeId {
                graph.leaf(self.clone())
            }
        })*
    };
}

leaf_by_clone!(
    String,
    std::path::PathBuf,
    chrono::NaiveDate,
    chrono::NaiveTime,
    chrono::NaiveDateTime,
    chrono::DateTime<chrono::Utc>,
    chrono::DateTime<chrono::FixedOffset>,
    uuid::Uuid,
);

impl Introspect for str {
    fn introspect<'v>(&'v self, graph: &mut GraphBuilder<'v>) -> NodeId {
        graph.leaf(self.to_string())
    }
}

impl<T: Introspect + ?Sized> Introspect for &T {
    fn introspect<'v>(&'v self, graph: &mut GraphBuilder<'v>) -> NodeId {
        (**self).introspect(graph)
    }
}

impl<T: Introspect + ?Sized> Introspect for Box<T> {
    fn introspect<'v>(&'v self, graph: &mut GraphBuilder<'v>) -> NodeId {
        (**self).introspect(graph)
    }
}

impl<T: Introspect + ?Sized + 'static> Introspect for Rc<T> {
    fn introspect<'v>(&'v self, graph: &mut GraphBuilder<'v>) -> NodeId {
        graph.shared(Rc::as_ptr(self).cast::<()>(), Rc::clone(self), &**self)
    }
}

impl<T: Introspect + ?Sized + 'static> Introspect for Arc<T> {
    fn introspect<'v>(&'v self, graph: &mut GraphBuilder<'v>) -> NodeId {
        graph.shared(Arc::as_ptr(self).cast::<()>(), Arc::clone(self), &**self)
    }
}

impl<T: Introspect + 'static> Introspect for std::rc::Weak<T> {
    fn introspect<'v>(&'v self, graph: &mut GraphBuilder<'v>) -> NodeId {
        match self.upgrade() {
            Some(strong) => graph.nested(&strong),
            None => graph.null(TypeKey::of::<Self>()),
        }
    }
}

impl<T: Introspect + 'static> Introspect for std::sync::Weak<T> {
    fn introspect<'v>(&'v self, graph: &mut GraphBuilder<'v>) -> NodeId {
        match self.upgrade() {
            Some(strong) => graph.nested(&strong),
            None => graph.null(TypeKey::of::<Self>()),
        }
    }
}

impl<T: Introspect> Introspect for RefCell<T> {
    fn introspect<'v>(&'v self, graph: &mut GraphBuilder<'v>) -> NodeId {
        match self.try_borrow() {
            Ok(value) => graph.nested(&*value),
            Err(_) => {
                tracing::warn!(
                    type_name = std::any::type_name::<T>(),
                    "value is mutably borrowed while being snapshotted, recording it as null"
                );
                graph.null(TypeKey::of::<T>())
            }
        }
    }
}

impl<T: Introspect + Copy> Introspect for Cell<T> {
    fn introspect<'v>(&'v self, graph: &mut GraphBuilder<'v>) -> NodeId {
        graph.nested(&self.get())
    }
}

impl<T: Introspect> Introspect for Option<T> {
    fn introspect<'v>(&'v self, graph: &mut GraphBuilder<'v>) -> NodeId {
        graph.optional(TypeKey::of::<Self>(), self.as_ref())
    }
}

impl<T: Introspect> Introspect for [T] {
    fn introspect<'v>(&'v self, graph: &mut GraphBuilder<'v>) -> NodeId {
        graph.sequence(TypeKey::of::<Self>(), SequenceKind::Array, self.iter())
    }
}

impl<T: Introspect, const N: usize> Introspect for [T; N] {
    fn introspect<'v>(&'v self, graph: &mut GraphBuilder<'v>) -> NodeId {
        graph.sequence(TypeKey::of::<Self>(), SequenceKind::Array, self.iter())
    }
}

impl<T: Introspect> Introspect for Vec<T> {
    fn introspect<'v>(&'v self, graph: &mut GraphBuilder<'v>) -> NodeId {
        graph.sequence(TypeKey::of::<Self>(), SequenceKind::List, self.iter())
    }
}

impl<T: Introspect> Introspect for VecDeque<T> {
    fn introspect<'v>(&'v self, graph: &mut GraphBuilder<'v>) -> NodeId {
        graph.sequence(TypeKey::of::<Self>(), SequenceKind::List, self.iter())
    }
}

impl<T: Introspect> Introspect for BTreeSet<T> {
    fn introspect<'v>(&'v self, graph: &mut GraphBuilder<'v>) -> NodeId {
        graph.sequence(TypeKey::of::<Self>(), SequenceKind::List, self.iter())
    }
}

impl<T: Introspect, S> Introspect for HashSet<T, S> {
    fn introspect<'v>(&'v self, graph: &mut GraphBuilder<'v>) -> NodeId {
        graph.sequence(TypeKey::of::<Self>(), SequenceKind::Set, self.iter())
    }
}

impl<K: Display, V: Introspect, S> Introspect for HashMap<K, V, S> {
    fn introspect<'v>(&'v self, graph: &mut GraphBuilder<'v>) -> NodeId {
        let entries = self.iter().map(|(key, value)| (key.to_string(), value));
        graph.map(TypeKey::of::<Self>(), false, entries)
    }
}

impl<K: Display, V: Introspect> Introspect for BTreeMap<K, V> {
    fn introspect<'v>(&'v self, graph: &mut GraphBuilder<'v>) -> NodeId {
        let entries = self.iter().map(|(key, value)| (key.to_string(), value));
        graph.map(TypeKey::of::<Self>(), true, entries)
    }
}

impl<T> Introspect for std::ops::Range<T>
where
    T: Introspect + Clone + PartialEq + std::fmt::Debug + 'static,
{
    fn introspect<'v>(&'v self, graph: &mut GraphBuilder<'v>) -> NodeId {
        graph
            .bean::<Self>()
            .field("start", &self.start)
            .field("end", &self.end)
            .payload(self.clone())
            .finish()
    }
}

macro_rules! tuple_beans {
    ($(($($name:ident $idx:tt),+)),* $(,)?) => {
        $(impl<$($name: Introspect),+> Introspect for ($($name,)+) {
            fn introspect<'v>(&'v self, graph: &mut GraphBuilder<'v>) -> NodeId {
                graph
                    .bean::<Self>()
                    $(.field(stringify!($idx), &self.$idx))+
                    .finish()
            }
        })*
    };
}

tuple_beans!((A 0, B 1), (A 0, B 1, C 2), (A 0, B 1, C 2, D 3));
