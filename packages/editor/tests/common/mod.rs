//! Shared fixtures for editor integration tests

#![allow(dead_code)]

use formtree_model::{parse, Element, Form};
use serde_json::{json, Value};

/// Condition set referencing `id` through the `reference` field
pub fn visible_when(id: &str) -> Value {
    json!({
        "kind": "noCode",
        "conditionSet": {
            "operator": "and",
            "conditions": [{ "type": "equals", "reference": id, "value": "yes" }]
        }
    })
}

/// root
/// ├── step-1
/// │   ├── c (container)
/// │   │   ├── d (select)
/// │   │   └── e (textField)
/// │   └── f (textField, visible when d)
/// └── step-2
///     └── g (replicatingContainer)
///         ├── h (select)
///         └── i (textField, visible when h, validated against step-1's f)
pub fn scenario_form() -> Form {
    let source = json!({
        "id": "form-scenario",
        "title": "Scenario",
        "root": {
            "id": "root",
            "type": "root",
            "children": [
                {
                    "id": "step-1",
                    "type": "step",
                    "name": "Step 1",
                    "children": [
                        {
                            "id": "c",
                            "type": "container",
                            "name": "C",
                            "children": [
                                { "id": "d", "type": "select", "name": "D" },
                                { "id": "e", "type": "textField", "name": "E" }
                            ]
                        },
                        { "id": "f", "type": "textField", "name": "F", "isVisible": visible_when("d") }
                    ]
                },
                {
                    "id": "step-2",
                    "type": "step",
                    "name": "Step 2",
                    "children": [
                        {
                            "id": "g",
                            "type": "replicatingContainer",
                            "name": "G",
                            "children": [
                                { "id": "h", "type": "select", "name": "H" },
                                {
                                    "id": "i",
                                    "type": "textField",
                                    "name": "I",
                                    "isVisible": visible_when("h"),
                                    "validate": {
                                        "kind": "noCode",
                                        "conditionSet": {
                                            "operator": "or",
                                            "conditions": [],
                                            "conditionSets": [{
                                                "operator": "and",
                                                "conditions": [{ "type": "notEquals", "target": "f" }]
                                            }]
                                        }
                                    }
                                }
                            ]
                        }
                    ]
                }
            ]
        }
    });

    parse(&source.to_string()).expect("fixture parses")
}

pub fn child_ids(root: &Element, parent_id: &str) -> Vec<String> {
    root.find(parent_id)
        .and_then(|p| p.children())
        .map(|c| c.iter().map(|e| e.id.clone()).collect())
        .unwrap_or_default()
}

/// `reference` of the first condition of an element's visibility rule
pub fn visibility_reference(element: &Element) -> Option<String> {
    let set = element.is_visible.as_ref()?.condition_set.as_ref()?;
    set.conditions.first()?.reference.clone()
}

/// `target` of the first nested condition of an element's validation rule
pub fn validation_target(element: &Element) -> Option<String> {
    let set = element.validate.as_ref()?.condition_set.as_ref()?;
    set.condition_sets.first()?.conditions.first()?.target.clone()
}
