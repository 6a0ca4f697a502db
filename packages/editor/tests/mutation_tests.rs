//! Guard and structure tests for individual mutations

mod common;

use common::{child_ids, scenario_form, visibility_reference, validation_target};
use formtree_editor::{
    clone_and_insert, delete, find_usages, insert, move_child, IdGenerator, MutationError,
    DEFAULT_COPY_SUFFIX,
};
use formtree_model::ast::{Element, ElementType};
use std::collections::HashSet;

#[test]
fn test_delete_referenced_element_fails_listing_referrer() {
    let form = scenario_form();

    let err = delete(&form.root, "d").unwrap_err();
    match &err {
        MutationError::ReferencedElement { element, referenced_by } => {
            assert_eq!(element.id, "d");
            let ids: Vec<&str> = referenced_by.iter().map(|s| s.id.as_str()).collect();
            assert_eq!(ids, vec!["f"]);
        }
        other => panic!("Expected ReferencedElement, got {:?}", other),
    }
}

#[test]
fn test_delete_unreferenced_sibling_succeeds() {
    let form = scenario_form();

    let new_root = delete(&form.root, "e").unwrap();
    assert_eq!(child_ids(&new_root, "c"), vec!["d"]);

    // input tree is unchanged
    assert_eq!(child_ids(&form.root, "c"), vec!["d", "e"]);
}

#[test]
fn test_delete_element_referenced_from_sibling_fails() {
    let form = scenario_form();

    // h is referenced by i; both live in g, but deleting h alone would break i
    assert!(matches!(
        delete(&form.root, "h"),
        Err(MutationError::ReferencedElement { .. })
    ));
}

#[test]
fn test_delete_container_with_externally_referenced_child_fails() {
    let form = scenario_form();

    let err = delete(&form.root, "c").unwrap_err();
    match &err {
        MutationError::ChildReferenced { element, children } => {
            assert_eq!(element.id, "c");
            let blocked: Vec<(&str, Vec<&str>)> = children
                .iter()
                .map(|b| {
                    (
                        b.child.id.as_str(),
                        b.referenced_by.iter().map(|s| s.id.as_str()).collect(),
                    )
                })
                .collect();
            assert_eq!(blocked, vec![("d", vec!["f"])]);
        }
        other => panic!("Expected ChildReferenced, got {:?}", other),
    }

    let referrers: Vec<&str> = err.referencing_elements().iter().map(|s| s.id.as_str()).collect();
    assert_eq!(referrers, vec!["f"]);
}

#[test]
fn test_delete_container_with_only_internal_references_succeeds() {
    let form = scenario_form();

    // h is referenced only by i, which is removed along with it
    let new_root = delete(&form.root, "g").unwrap();
    assert!(child_ids(&new_root, "step-2").is_empty());
    assert!(new_root.find("h").is_none());
    assert!(new_root.find("i").is_none());
}

#[test]
fn test_container_referencing_its_own_child_can_be_deleted() {
    let container: Element = serde_json::from_value(serde_json::json!({
        "id": "wrap",
        "type": "container",
        "isVisible": common::visible_when("inner"),
        "children": [{ "id": "inner", "type": "checkbox" }]
    }))
    .unwrap();
    let root = Element::of_type("root", ElementType::Root).with_children(vec![container]);

    let new_root = delete(&root, "wrap").unwrap();
    assert!(child_ids(&new_root, "root").is_empty());
}

#[test]
fn test_container_referenced_by_its_own_child_can_be_deleted() {
    let container: Element = serde_json::from_value(serde_json::json!({
        "id": "wrap",
        "type": "container",
        "children": [
            { "id": "inner", "type": "checkbox", "isVisible": common::visible_when("wrap") }
        ]
    }))
    .unwrap();
    let root = Element::of_type("root", ElementType::Root).with_children(vec![container]);

    let new_root = delete(&root, "wrap").unwrap();
    assert!(child_ids(&new_root, "root").is_empty());
}

#[test]
fn test_container_referenced_from_outside_still_blocked() {
    let container: Element = serde_json::from_value(serde_json::json!({
        "id": "wrap",
        "type": "container",
        "name": "Wrap",
        "children": [
            { "id": "inner", "type": "checkbox", "isVisible": common::visible_when("wrap") }
        ]
    }))
    .unwrap();
    let outside: Element = serde_json::from_value(serde_json::json!({
        "id": "outside",
        "type": "textField",
        "name": "Outside",
        "isVisible": common::visible_when("wrap")
    }))
    .unwrap();
    let root =
        Element::of_type("root", ElementType::Root).with_children(vec![container, outside]);

    let err = delete(&root, "wrap").unwrap_err();
    let referrers: Vec<&str> = err
        .referencing_elements()
        .into_iter()
        .map(|e| e.id.as_str())
        .collect();
    assert_eq!(referrers, vec!["outside"]);
    assert!(matches!(err, MutationError::ReferencedElement { .. }));
}

#[test]
fn test_self_reference_does_not_block_delete() {
    let form = scenario_form();

    let looped = Element::of_type("loop", ElementType::NumberField).with_validation(
        serde_json::from_value(serde_json::json!({
            "kind": "noCode",
            "conditionSet": { "conditions": [{ "type": "greaterThan", "reference": "loop" }] }
        }))
        .unwrap(),
    );

    let root = insert(&form.root, "step-2", 0, looped).unwrap();
    let loop_element = root.find("loop").unwrap();
    assert_eq!(find_usages(loop_element, &root).len(), 1);

    let root = delete(&root, "loop").unwrap();
    assert!(root.find("loop").is_none());
}

#[test]
fn test_failed_delete_leaves_tree_untouched() {
    let form = scenario_form();
    let before = form.root.clone();
    assert!(delete(&form.root, "c").is_err());
    assert_eq!(form.root, before);
}

#[test]
fn test_move_there_and_back_restores_order() {
    let form = scenario_form();
    let original = child_ids(&form.root, "c");

    let moved = move_child(&form.root, "c", 0, 1).unwrap();
    assert_eq!(child_ids(&moved, "c"), vec!["e", "d"]);

    let restored = move_child(&moved, "c", 1, 0).unwrap();
    assert_eq!(child_ids(&restored, "c"), original);
    assert_eq!(restored, form.root);
}

#[test]
fn test_move_out_of_bounds() {
    let form = scenario_form();
    assert!(matches!(
        move_child(&form.root, "c", 0, 2),
        Err(MutationError::IndexOutOfBounds { index: 2, len: 2, .. })
    ));
}

#[test]
fn test_clone_container_rewrites_internal_and_keeps_external_references() {
    let form = scenario_form();
    let mut ids = IdGenerator::for_form(&form);

    let (new_root, created_id) =
        clone_and_insert(&form.root, "step-2", 0, "g", &mut ids, DEFAULT_COPY_SUFFIX).unwrap();

    assert_eq!(child_ids(&new_root, "step-2"), vec!["g".to_string(), created_id.clone()]);

    let copy = new_root.find(&created_id).unwrap();
    assert_eq!(copy.name.as_deref(), Some("G (Copy)"));

    let copied_children = copy.children().unwrap();
    let h_copy = &copied_children[0];
    let i_copy = &copied_children[1];
    assert_ne!(h_copy.id, "h");
    assert_ne!(i_copy.id, "i");

    // internal reference follows the copy
    assert_eq!(visibility_reference(i_copy), Some(h_copy.id.clone()));
    // external reference still points at the original
    assert_eq!(validation_target(i_copy).as_deref(), Some("f"));

    // the original is untouched
    let i = new_root.find("i").unwrap();
    assert_eq!(visibility_reference(i).as_deref(), Some("h"));
}

#[test]
fn test_clone_ids_never_collide_with_existing_tree() {
    let form = scenario_form();
    let mut ids = IdGenerator::for_form(&form);
    let existing: HashSet<String> = form.root.pre_order().map(|e| e.id.clone()).collect();

    let (new_root, created_id) =
        clone_and_insert(&form.root, "root", 1, "step-1", &mut ids, DEFAULT_COPY_SUFFIX).unwrap();

    for element in new_root.find(&created_id).unwrap().pre_order() {
        assert!(!existing.contains(&element.id), "{} collides", element.id);
    }
}
