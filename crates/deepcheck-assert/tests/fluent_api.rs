use deepcheck_assert::kernel::{
    CollectionAssertionPolicy, ComparisonProfile, IntrospectionError, RecursiveComparisonConfiguration,
};
use deepcheck_assert::{AssertionError, assert_that, introspect, recursively_equal};
use serde_json::json;

struct Book {
    title: String,
    pages: u32,
}

introspect!(Book { title, pages });

struct Shelf {
    label: String,
    books: Vec<Book>,
    note: Option<String>,
}

introspect!(Shelf { label, books, note });

fn book(title: &str, pages: u32) -> Book {
    Book {
        title: title.into(),
        pages,
    }
}

fn shelf() -> Shelf {
    Shelf {
        label: "classics".into(),
        books: vec![book("Dune", 412), book("Emma", 474)],
        note: None,
    }
}

#[test]
fn equal_values_pass() {
    assert_that(&shelf()).using_recursive_comparison().is_equal_to(&shelf());
    assert!(recursively_equal(&shelf(), &shelf()).is_ok());
}

#[test]
fn failure_carries_the_rendered_report() {
    let error = assert_that(&book("Dune", 412))
        .using_recursive_comparison()
        .try_is_equal_to(&book("Dune", 400))
        .unwrap_err();
    assert!(error.is_failure());
    let message = error.to_string();
    assert!(message.starts_with("Expecting actual:\n  Book { title: \"Dune\", pages: 412 }"));
    assert!(message.contains("found the following 1 difference:"));
    assert!(message.contains("field/property 'pages' differ:\n- actual value  : 412\n- expected value: 400"));
    assert!(message.contains("The recursive comparison was performed with this configuration:"));
}

#[test]
#[should_panic(expected = "field/property 'title' differ")]
fn is_equal_to_panics_on_difference() {
    assert_that(&book("Dune", 412))
        .using_recursive_comparison()
        .is_equal_to(&book("Emma", 412));
}

#[test]
fn description_prefixes_the_message() {
    let error = assert_that(&book("Dune", 412))
        .described_as("library check")
        .using_recursive_comparison()
        .try_is_equal_to(&book("Emma", 412))
        .unwrap_err();
    assert!(error.to_string().starts_with("[library check] Expecting actual:"));
}

#[test]
fn options_refine_the_comparison() {
    let mut moved = shelf();
    moved.books.reverse();
    moved.books[0].pages = 475;

    assert_that(&shelf())
        .using_recursive_comparison()
        .ignoring_collection_order()
        .ignoring_fields(["books.pages"])
        .is_equal_to(&moved);

    let error = assert_that(&shelf())
        .using_recursive_comparison()
        .ignoring_fields(["books.pages"])
        .try_is_equal_to(&moved)
        .unwrap_err();
    assert!(error.to_string().contains("field/property 'books[0].title' differ"));
}

#[test]
fn prepared_configuration_can_be_refined() {
    let config = RecursiveComparisonConfiguration::builder()
        .ignoring_fields(["pages"])
        .build()
        .unwrap();
    assert_that(&book("Dune", 412))
        .using_recursive_comparison_with(&config)
        .is_equal_to(&book("Dune", 1));

    let error = assert_that(&book("Dune", 412))
        .using_recursive_comparison_with(&config)
        .with_collection_policy(CollectionAssertionPolicy::CollectionObjectAndElements)
        .try_is_equal_to(&book("Emma", 1))
        .unwrap_err();
    assert!(error.to_string().contains("collection_object_and_elements"));
}

#[test]
fn is_not_equal_to() {
    assert_that(&book("Dune", 412))
        .using_recursive_comparison()
        .is_not_equal_to(&book("Dune", 400));

    let error = assert_that(&book("Dune", 412))
        .using_recursive_comparison()
        .try_is_not_equal_to(&book("Dune", 412))
        .unwrap_err();
    assert!(error.to_string().contains("not to be equal to:"));
}

#[test]
fn differences_are_available_without_judgement() {
    let differences = assert_that(&json!({"a": 1, "b": 2}))
        .using_recursive_comparison()
        .differences(&json!({"a": 1, "b": 3}))
        .unwrap();
    assert_eq!(differences.len(), 1);
    assert_eq!(differences[0].path.render(), "b");
}

#[test]
fn bad_regex_is_a_configuration_error() {
    let error = assert_that(&book("Dune", 412))
        .using_recursive_comparison()
        .ignoring_fields_matching_regexes(["("])
        .try_is_equal_to(&book("Dune", 412))
        .unwrap_err();
    assert!(matches!(error, AssertionError::Configuration(_)));
    assert!(!error.is_failure());
}

#[test]
fn no_null_fields() {
    let mut annotated = shelf();
    annotated.note = Some("first editions".into());
    assert_that(&annotated).using_recursive_assertion().has_no_null_fields();

    let error = assert_that(&shelf())
        .using_recursive_assertion()
        .try_has_no_null_fields()
        .unwrap_err();
    assert!(error.to_string().contains("- note: None\n"));
    assert_that(&shelf())
        .using_recursive_assertion()
        .ignoring_all_null_fields()
        .has_no_null_fields();

    let document = json!({"name": "Ada", "profile": {"nickname": null, "age": 36}});
    let error = assert_that(&document)
        .using_recursive_assertion()
        .try_has_no_null_fields()
        .unwrap_err();
    let message = error.to_string();
    assert!(message.contains("to satisfy the given assertion recursively (is not null)"));
    assert!(message.contains("- profile.nickname: null\n"));
    assert!(message.contains("The recursive assertion was performed with this configuration:"));

    assert_that(&document)
        .using_recursive_assertion()
        .ignoring_fields(["profile.nickname"])
        .has_no_null_fields();
}

struct Profile {
    nickname: Option<String>,
    tags: Option<Vec<String>>,
}

introspect!(Profile { nickname, tags });

#[test]
fn empty_optionals_are_null_fields() {
    let bare = Profile {
        nickname: None,
        tags: None,
    };
    let error = assert_that(&bare)
        .using_recursive_assertion()
        .try_has_no_null_fields()
        .unwrap_err();
    let message = error.to_string();
    assert!(message.contains("- nickname: None\n- tags: None\n"), "{message}");

    let untagged = Profile {
        nickname: Some("ada".into()),
        tags: Some(Vec::new()),
    };
    let without_nickname = Profile {
        nickname: None,
        tags: Some(Vec::new()),
    };
    let differences = assert_that(&without_nickname)
        .using_recursive_comparison()
        .differences(&Profile {
            nickname: Some("ada".into()),
            tags: None,
        })
        .unwrap();
    let paths: Vec<String> = differences.iter().map(|d| d.path.render()).collect();
    assert_eq!(paths, ["nickname", "tags"]);

    assert_that(&without_nickname)
        .using_recursive_comparison()
        .treating_null_and_empty_iterables_as_equal()
        .ignoring_all_actual_null_fields()
        .is_equal_to(&Profile {
            nickname: Some("ada".into()),
            tags: None,
        });
    assert_that(&untagged)
        .using_recursive_comparison()
        .ignoring_all_expected_null_fields()
        .is_equal_to(&bare);
}

#[test]
fn profile_keeps_strict_type_checking() {
    let profile = ComparisonProfile::from_toml_str(r#"ignored_fields = ["pages"]"#).unwrap();
    let error = assert_that(&json!({"pages": 1, "title": "Dune"}))
        .using_recursive_comparison()
        .with_strict_type_checking()
        .with_profile(profile)
        .try_is_equal_to(&book("Dune", 2))
        .unwrap_err();
    assert!(error.to_string().contains("strict type checking"), "{error}");
}

#[test]
#[should_panic(expected = "- a: -1")]
fn all_fields_satisfy_lists_rejected_fields() {
    let document = json!({"a": -1, "b": {"c": 2}});
    assert_that(&document)
        .using_recursive_assertion()
        .all_fields_satisfy(|node| node.as_f64().is_none_or(|value| value > 0.0));
}

#[test]
fn primitive_fields_can_be_skipped() {
    assert_that(&book("Dune", 0))
        .using_recursive_assertion()
        .ignoring_primitive_fields()
        .all_fields_satisfy(|node| node.as_f64().is_none_or(|value| value > 0.0));
}

#[test]
fn extracting_navigates_paths() {
    let shelf = shelf();
    let title = assert_that(&shelf).extracting("books[1].title").unwrap();
    assert!(title.is_present());
    assert_eq!(title.to_string(), "\"Emma\"");
    title.satisfies(|node| node.as_str() == Some("Emma"), "is Emma");

    let note = assert_that(&shelf).extracting("note.value").unwrap();
    assert!(!note.is_present());
    assert_eq!(note.to_string(), "null");
    let error = note.try_satisfies(|_| true, "anything").unwrap_err();
    assert!(error.to_string().contains("but it was absent"));
}

#[test]
fn extracting_an_unknown_member_fails() {
    let error = assert_that(&shelf()).extracting("books[0].isbn").unwrap_err();
    assert!(matches!(
        error,
        AssertionError::Introspection(IntrospectionError::UnknownMember { .. })
    ));
}

#[test]
fn described_assertion_failure_message() {
    let document = json!({"id": 7, "owner": null});
    let error = assert_that(&document)
        .described_as("audit")
        .using_recursive_assertion()
        .ignoring_fields(["id"])
        .try_has_no_null_fields()
        .unwrap_err();
    insta::assert_snapshot!(
        error.to_string().trim_end(),
        @r###"[audit] Expecting actual:
  {id: 7, owner: null}
to satisfy the given assertion recursively (is not null) but the following fields did not:
- owner: null

The recursive assertion was performed with this configuration:
- the following fields were ignored in the assertion: id
- the assertion did not recurse into types in std::, core::, alloc::
- collections were traversed with the elements_only policy, maps with the map_values_only policy and optionals with the optional_value_only policy"###
    );
}
