//! Human-readable rendering of snapshot nodes.

use std::fmt::Write as _;

use crate::graph::{NodeId, NodeKind, NodeRef};

/// Rendering limits. Nested values past `max_depth` render as `...`; a
/// container lists at most `max_items` children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Representation {
    pub max_depth: usize,
    pub max_items: usize,
}

impl Default for Representation {
    fn default() -> Self {
        Self {
            max_depth: 6,
            max_items: 20,
        }
    }
}

impl Representation {
    pub fn render(&self, node: NodeRef<'_>) -> String {
        let mut out = String::new();
        let mut path = Vec::new();
        self.write(&mut out, node, &mut path);
        out
    }

    fn write(&self, out: &mut String, node: NodeRef<'_>, path: &mut Vec<NodeId>) {
        if path.contains(&node.id()) {
            out.push_str("(cycle)");
            return;
        }
        if path.len() > self.max_depth {
            out.push_str("...");
            return;
        }
        path.push(node.id());
        match node.kind() {
            NodeKind::Null => out.push_str("null"),
            NodeKind::Pending => out.push('?'),
            NodeKind::Leaf => match node.payload() {
                Some(payload) => {
                    let _ = write!(out, "{payload:?}");
                }
                None => out.push_str(&node.type_key().short_name()),
            },
            NodeKind::Optional(None) => out.push_str("None"),
            NodeKind::Optional(Some(id)) => {
                out.push_str("Some(");
                self.write(out, node.child(*id), path);
                out.push(')');
            }
            NodeKind::Sequence { items, .. } => {
                out.push('[');
                self.write_list(out, items.iter().map(|id| (None, *id)), node, path);
                out.push(']');
            }
            NodeKind::Map { entries, .. } => {
                out.push('{');
                let items = entries.iter().map(|e| (Some(e.key.as_str()), e.value));
                self.write_list(out, items, node, path);
                out.push('}');
            }
            NodeKind::Bean { variant, members } => {
                let name = match variant {
                    Some(variant) => (*variant).to_string(),
                    None => node.type_key().short_name(),
                };
                out.push_str(&name);
                if !members.is_empty() {
                    out.push_str(" { ");
                    let items = members.iter().map(|m| (Some(m.name.as_str()), m.node));
                    self.write_list(out, items, node, path);
                    out.push_str(" }");
                }
            }
        }
        path.pop();
    }

    fn write_list<'a>(
        &self,
        out: &mut String,
        items: impl ExactSizeIterator<Item = (Option<&'a str>, NodeId)>,
        parent: NodeRef<'_>,
        path: &mut Vec<NodeId>,
    ) {
        let total = items.len();
        for (i, (label, id)) in items.take(self.max_items).enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            if let Some(label) = label {
                out.push_str(label);
                out.push_str(": ");
            }
            self.write(out, parent.child(id), path);
        }
        if total > self.max_items {
            out.push_str(", ...");
        }
    }
}

/// Renders with the default limits.
pub fn represent(node: NodeRef<'_>) -> String {
    Representation::default().render(node)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::rc::Rc;

    use super::*;
    use crate::introspect::{GraphBuilder, Introspect, Snapshot};

    struct Book {
        title: String,
        pages: u32,
        sequel: Option<Box<Book>>,
    }

    impl Introspect for Book {
        fn introspect<'v>(&'v self, graph: &mut GraphBuilder<'v>) -> NodeId {
            graph
                .bean::<Self>()
                .field("title", &self.title)
                .field("pages", &self.pages)
                .field("sequel", &self.sequel)
                .finish()
        }
    }

    struct Node {
        next: RefCell<Option<Rc<Node>>>,
    }

    impl Introspect for Node {
        fn introspect<'v>(&'v self, graph: &mut GraphBuilder<'v>) -> NodeId {
            graph.bean::<Self>().field("next", &self.next).finish()
        }
    }

    #[test]
    fn renders_beans_with_short_type_names() {
        let book = Book {
            title: "Dune".into(),
            pages: 412,
            sequel: None,
        };
        let snapshot = Snapshot::of(&book);
        assert_eq!(
            represent(snapshot.root()),
            r#"Book { title: "Dune", pages: 412, sequel: None }"#
        );
    }

    #[test]
    fn renders_containers() {
        let map = BTreeMap::from([("a", vec![1, 2]), ("b", vec![])]);
        let snapshot = Snapshot::of(&map);
        assert_eq!(represent(snapshot.root()), "{a: [1, 2], b: []}");
    }

    #[test]
    fn truncates_long_sequences() {
        let repr = Representation {
            max_depth: 6,
            max_items: 2,
        };
        let snapshot = Snapshot::of(&vec![1, 2, 3]);
        assert_eq!(repr.render(snapshot.root()), "[1, 2, ...]");
    }

    #[test]
    fn marks_cycles() {
        let node = Rc::new(Node {
            next: RefCell::new(None),
        });
        *node.next.borrow_mut() = Some(Rc::clone(&node));
        let snapshot = Snapshot::of(&node);
        assert_eq!(represent(snapshot.root()), "Node { next: Some((cycle)) }");
        node.next.borrow_mut().take();
    }
}
