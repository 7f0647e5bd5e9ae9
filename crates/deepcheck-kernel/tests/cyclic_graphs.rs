//! Comparison and assertion over graphs with shared and cyclic references.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use deepcheck_kernel::{
    DifferenceKind, GraphBuilder, Introspect, NodeId, RecursiveAssertionConfiguration, RecursiveAssertionDriver,
    RecursiveComparisonConfiguration, determine_differences,
};

struct Person {
    name: String,
    friend: RefCell<Option<Rc<Person>>>,
}

impl Introspect for Person {
    fn introspect<'v>(&'v self, graph: &mut GraphBuilder<'v>) -> NodeId {
        graph
            .bean::<Self>()
            .field("name", &self.name)
            .field("friend", &self.friend)
            .finish()
    }
}

fn person(name: &str) -> Rc<Person> {
    Rc::new(Person {
        name: name.to_string(),
        friend: RefCell::new(None),
    })
}

/// Two people who are each other's friend.
fn pair(first: &str, second: &str) -> (Rc<Person>, Rc<Person>) {
    let a = person(first);
    let b = person(second);
    *a.friend.borrow_mut() = Some(Rc::clone(&b));
    *b.friend.borrow_mut() = Some(Rc::clone(&a));
    (a, b)
}

fn unlink(people: &[&Rc<Person>]) {
    for person in people {
        person.friend.borrow_mut().take();
    }
}

struct Folder {
    name: String,
    parent: RefCell<Weak<Folder>>,
    children: RefCell<Vec<Rc<Folder>>>,
}

impl Introspect for Folder {
    fn introspect<'v>(&'v self, graph: &mut GraphBuilder<'v>) -> NodeId {
        graph
            .bean::<Self>()
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .finish()
    }
}

fn folder(name: &str, children: &[&str]) -> Rc<Folder> {
    let root = Rc::new(Folder {
        name: name.to_string(),
        parent: RefCell::new(Weak::new()),
        children: RefCell::new(Vec::new()),
    });
    for child in children {
        let child = Rc::new(Folder {
            name: child.to_string(),
            parent: RefCell::new(Rc::downgrade(&root)),
            children: RefCell::new(Vec::new()),
        });
        root.children.borrow_mut().push(child);
    }
    root
}

#[test]
fn mutual_friends_compare_equal_and_terminate() {
    let (a, b) = pair("ann", "bob");
    let (c, d) = pair("ann", "bob");
    let config = RecursiveComparisonConfiguration::default();
    let differences = determine_differences(&a, &c, &config).unwrap();
    assert!(differences.is_empty(), "{differences:?}");
    unlink(&[&a, &b, &c, &d]);
}

#[test]
fn divergence_inside_a_cycle_is_reported_once() {
    let (a, b) = pair("ann", "bob");
    let (c, d) = pair("ann", "ben");
    let config = RecursiveComparisonConfiguration::default();
    let differences = determine_differences(&a, &c, &config).unwrap();
    assert_eq!(differences.len(), 1);
    assert_eq!(differences[0].path.render(), "friend.value.name");
    assert_eq!(differences[0].kind, DifferenceKind::ValueMismatch);
    assert_eq!(differences[0].actual.as_deref(), Some("\"bob\""));
    unlink(&[&a, &b, &c, &d]);
}

#[test]
fn self_reference_against_self_reference() {
    let a = person("solo");
    *a.friend.borrow_mut() = Some(Rc::clone(&a));
    let b = person("solo");
    *b.friend.borrow_mut() = Some(Rc::clone(&b));
    let config = RecursiveComparisonConfiguration::default();
    assert!(determine_differences(&a, &b, &config).unwrap().is_empty());
    unlink(&[&a, &b]);
}

#[test]
fn same_instance_is_equal_by_identity() {
    let (a, b) = pair("ann", "bob");
    let config = RecursiveComparisonConfiguration::default();
    assert!(determine_differences(&a, &a, &config).unwrap().is_empty());
    unlink(&[&a, &b]);
}

#[test]
fn back_pointers_through_weak_references() {
    let actual = folder("root", &["docs", "src"]);
    let expected = folder("root", &["docs", "lib"]);
    let config = RecursiveComparisonConfiguration::default();
    let differences = determine_differences(&actual, &expected, &config).unwrap();
    let paths: Vec<String> = differences.iter().map(|d| d.path.render()).collect();
    assert_eq!(paths, vec!["children[1].name"]);
}

#[test]
fn assertion_walk_skips_back_edges() {
    let tree = folder("root", &["docs", "src"]);
    let config = RecursiveAssertionConfiguration::default();
    let failures =
        RecursiveAssertionDriver::new(&config).assert_over_value(&tree, |node| !node.is_null(), "is not null");
    let paths: Vec<String> = failures.iter().map(|f| f.path.render()).collect();
    assert_eq!(paths, vec!["parent"]);
}
