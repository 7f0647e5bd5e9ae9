//! Uniform access to members of a snapshot node.
//!
//! Beans expose their properties and fields by name, maps expose their
//! entries by key, optionals expose their content as `value` and sequences
//! expose their items by `[index]`.

use serde::{Deserialize, Serialize};

use crate::error::IntrospectionError;
use crate::graph::{Member, MemberKind, NodeKind, NodeRef, Visibility};
use crate::path::{FieldPath, Segment};

/// Name under which an optional exposes its content.
pub const OPTIONAL_VALUE: &str = "value";

/// Which members introspection is allowed to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct IntrospectionStrategy {
    pub include_private: bool,
}

impl Default for IntrospectionStrategy {
    fn default() -> Self {
        Self {
            include_private: true,
        }
    }
}

impl IntrospectionStrategy {
    pub fn public_only() -> Self {
        Self {
            include_private: false,
        }
    }

    fn allows(&self, member: &Member) -> bool {
        self.include_private || member.visibility == Visibility::Public
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyAccessor {
    strategy: IntrospectionStrategy,
}

impl PropertyAccessor {
    pub fn new(strategy: IntrospectionStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> IntrospectionStrategy {
        self.strategy
    }

    /// Visible members of a bean, one per name. A property shadows a field
    /// of the same name; declaration order is kept.
    pub fn members<'g>(&self, node: NodeRef<'g>) -> Vec<&'g Member> {
        let NodeKind::Bean { members, .. } = node.kind() else {
            return Vec::new();
        };
        let mut visible: Vec<&'g Member> = Vec::with_capacity(members.len());
        for member in members.iter().filter(|m| self.strategy.allows(m)) {
            match visible.iter().position(|seen| seen.name == member.name) {
                Some(pos) if member.kind == MemberKind::Property => visible[pos] = member,
                Some(_) => {}
                None => visible.push(member),
            }
        }
        visible
    }

    /// Looks up one named member. `Ok(None)` means there is nothing to look
    /// into: the node is null or an empty optional.
    pub fn get<'g>(
        &self,
        node: NodeRef<'g>,
        name: &str,
    ) -> Result<Option<NodeRef<'g>>, IntrospectionError> {
        let type_name = || node.type_key().short_name();
        match node.kind() {
            NodeKind::Null => Ok(None),
            NodeKind::Optional(content) if name == OPTIONAL_VALUE => {
                Ok(content.map(|id| node.child(id)))
            }
            NodeKind::Optional(None) => Ok(None),
            NodeKind::Map { entries, .. } => entries
                .iter()
                .find(|entry| entry.key == name)
                .map(|entry| Some(node.child(entry.value)))
                .ok_or_else(|| IntrospectionError::UnknownMember {
                    name: name.to_string(),
                    type_name: type_name(),
                }),
            NodeKind::Bean { members, .. } => {
                if let Some(member) = self.members(node).into_iter().find(|m| m.name == name) {
                    return Ok(Some(node.child(member.node)));
                }
                if members.iter().any(|m| m.name == name) {
                    return Err(IntrospectionError::PrivateMember {
                        name: name.to_string(),
                        type_name: type_name(),
                    });
                }
                Err(IntrospectionError::UnknownMember {
                    name: name.to_string(),
                    type_name: type_name(),
                })
            }
            NodeKind::Optional(Some(_)) => Err(IntrospectionError::UnknownMember {
                name: name.to_string(),
                type_name: type_name(),
            }),
            NodeKind::Leaf | NodeKind::Sequence { .. } | NodeKind::Pending => {
                Err(IntrospectionError::NotNavigable {
                    segment: name.to_string(),
                    type_name: type_name(),
                })
            }
        }
    }

    pub fn get_index<'g>(
        &self,
        node: NodeRef<'g>,
        index: usize,
    ) -> Result<Option<NodeRef<'g>>, IntrospectionError> {
        match node.kind() {
            NodeKind::Null | NodeKind::Optional(None) => Ok(None),
            NodeKind::Sequence { items, .. } => items
                .get(index)
                .map(|id| Some(node.child(*id)))
                .ok_or_else(|| IntrospectionError::IndexOutOfBounds {
                    index,
                    len: items.len(),
                    type_name: node.type_key().short_name(),
                }),
            _ => Err(IntrospectionError::NotNavigable {
                segment: format!("[{index}]"),
                type_name: node.type_key().short_name(),
            }),
        }
    }

    /// Resolves `a.b[0].c` from `root`. A null met on the way (or at the
    /// end) resolves to `Ok(None)`.
    pub fn resolve<'g>(
        &self,
        root: NodeRef<'g>,
        expression: &str,
    ) -> Result<Option<NodeRef<'g>>, IntrospectionError> {
        let path = FieldPath::parse(expression)?;
        self.resolve_path(root, &path)
    }

    pub fn resolve_path<'g>(
        &self,
        root: NodeRef<'g>,
        path: &FieldPath,
    ) -> Result<Option<NodeRef<'g>>, IntrospectionError> {
        let mut current = root;
        for segment in path.segments() {
            let next = match segment {
                Segment::Field(name) | Segment::Key(name) => self.get(current, name)?,
                Segment::Index(index) => self.get_index(current, *index)?,
            };
            match next {
                Some(node) => current = node,
                None => return Ok(None),
            }
        }
        Ok((!current.is_null()).then_some(current))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::introspect::{GraphBuilder, Introspect, Snapshot};
    use crate::graph::NodeId;

    struct Account {
        owner: String,
        pin: u16,
        tags: Vec<String>,
        limits: BTreeMap<String, u32>,
        backup: Option<Box<Account>>,
    }

    impl Introspect for Account {
        fn introspect<'v>(&'v self, graph: &mut GraphBuilder<'v>) -> NodeId {
            graph
                .bean::<Self>()
                .field("owner", &self.owner)
                .private_field("pin", &self.pin)
                .field("tags", &self.tags)
                .field("limits", &self.limits)
                .field("backup", &self.backup)
                .property("owner", &self.owner.to_uppercase())
                .finish()
        }
    }

    fn account() -> Account {
        Account {
            owner: "ann".into(),
            pin: 1234,
            tags: vec!["gold".into(), "eu".into()],
            limits: BTreeMap::from([("atm".to_string(), 500)]),
            backup: Some(Box::new(Account {
                owner: "bob".into(),
                pin: 1,
                tags: Vec::new(),
                limits: BTreeMap::new(),
                backup: None,
            })),
        }
    }

    #[test]
    fn properties_win_over_fields() {
        let snapshot = Snapshot::of(&account());
        let owner = PropertyAccessor::default()
            .get(snapshot.root(), "owner")
            .unwrap()
            .unwrap();
        assert_eq!(owner.as_str(), Some("ANN"));
    }

    #[test]
    fn resolves_nested_paths() {
        let snapshot = Snapshot::of(&account());
        let accessor = PropertyAccessor::default();
        let tag = accessor.resolve(snapshot.root(), "tags[1]").unwrap().unwrap();
        assert_eq!(tag.as_str(), Some("eu"));
        let limit = accessor.resolve(snapshot.root(), "limits.atm").unwrap().unwrap();
        assert_eq!(limit.downcast::<u32>(), Some(&500));
        let nested = accessor
            .resolve(snapshot.root(), "backup.value.tags")
            .unwrap()
            .unwrap();
        assert_eq!(nested.len(), Some(0));
    }

    #[test]
    fn absent_intermediates_resolve_to_none() {
        let snapshot = Snapshot::of(&account());
        let accessor = PropertyAccessor::default();
        let missing = accessor
            .resolve(snapshot.root(), "backup.value.backup.value.owner")
            .unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn unknown_and_private_members_are_errors() {
        let snapshot = Snapshot::of(&account());
        let err = PropertyAccessor::default()
            .get(snapshot.root(), "balance")
            .unwrap_err();
        assert!(matches!(err, IntrospectionError::UnknownMember { .. }));
        assert!(err.to_string().contains("balance"));

        let hidden = PropertyAccessor::new(IntrospectionStrategy::public_only());
        assert!(matches!(
            hidden.get(snapshot.root(), "pin"),
            Err(IntrospectionError::PrivateMember { .. })
        ));
        assert!(PropertyAccessor::default().get(snapshot.root(), "pin").is_ok());
    }

    #[test]
    fn index_errors_carry_bounds() {
        let snapshot = Snapshot::of(&account());
        let err = PropertyAccessor::default()
            .resolve(snapshot.root(), "tags[5]")
            .unwrap_err();
        assert_eq!(
            err,
            IntrospectionError::IndexOutOfBounds {
                index: 5,
                len: 2,
                type_name: "Vec<String>".into(),
            }
        );
    }
}
