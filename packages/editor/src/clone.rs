//! # Clone Engine
//!
//! Deep-copies a subtree with fresh identifiers and rewrites the
//! conditional-logic references inside the copy.
//!
//! ## Algorithm
//!
//! 1. Copy the subtree, giving every copied element a new id from the
//!    [`IdGenerator`] and recording `old id -> new id`.
//! 2. Walk every condition set of the copy. A `reference` or `target` found in
//!    the map is replaced by the new id; anything else points outside the
//!    subtree and is kept as is.
//! 3. For user-visible duplicates, append the copy suffix to the root's name.
//!
//! The map is complete before any rewrite happens, so a condition may point
//! at an element that comes later in the subtree.

use formtree_common::VisitorMut;
use formtree_model::ast::{Condition, Element};
use formtree_model::IdGenerator;
use std::collections::HashMap;
use std::sync::Arc;

pub const DEFAULT_COPY_SUFFIX: &str = " (Copy)";

/// Result of cloning a subtree
#[derive(Debug, Clone)]
pub struct ClonedSubtree {
    pub element: Element,

    /// Original id -> id of its copy, for exactly the copied elements
    pub id_map: HashMap<String, String>,
}

/// Duplicate a subtree as a user-visible copy, appending `suffix` to its name
pub fn clone_element(source: &Element, ids: &mut IdGenerator, suffix: &str) -> ClonedSubtree {
    clone_subtree(source, ids, Some(suffix))
}

/// Give an externally sourced subtree fresh identifiers without renaming it
pub fn regenerate_ids(source: &Element, ids: &mut IdGenerator) -> ClonedSubtree {
    clone_subtree(source, ids, None)
}

fn clone_subtree(source: &Element, ids: &mut IdGenerator, suffix: Option<&str>) -> ClonedSubtree {
    let mut id_map = HashMap::new();
    let mut element = copy_with_fresh_ids(source, ids, &mut id_map);

    IdRemapper { id_map: &id_map }.visit_element_mut(&mut element);

    if let (Some(suffix), Some(name)) = (suffix, element.name.as_mut()) {
        name.push_str(suffix);
    }

    tracing::debug!(
        "Cloned {} as {} ({} element(s))",
        source.id,
        element.id,
        id_map.len()
    );

    ClonedSubtree { element, id_map }
}

fn copy_with_fresh_ids(
    source: &Element,
    ids: &mut IdGenerator,
    id_map: &mut HashMap<String, String>,
) -> Element {
    let new_id = ids.generate(source.element_type());
    id_map.insert(source.id.clone(), new_id.clone());

    let mut copy = Element {
        id: new_id,
        name: source.name.clone(),
        is_visible: source.is_visible.clone(),
        validate: source.validate.clone(),
        derive_value: source.derive_value.clone(),
        kind: source.kind.clone(),
    };

    // Fresh Arcs: the copy must not share any child with the source
    if let Some(children) = copy.children_mut() {
        *children = children
            .iter()
            .map(|child| Arc::new(copy_with_fresh_ids(child, ids, id_map)))
            .collect();
    }

    copy
}

/// Rewrites condition ids that belong to the copied subtree
struct IdRemapper<'m> {
    id_map: &'m HashMap<String, String>,
}

impl VisitorMut for IdRemapper<'_> {
    fn visit_condition_mut(&mut self, condition: &mut Condition) {
        for field in [&mut condition.reference, &mut condition.target] {
            let mapped = field.as_deref().and_then(|id| self.id_map.get(id)).cloned();
            if let Some(new_id) = mapped {
                *field = Some(new_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formtree_model::ast::{ConditionSet, ConditionalLogic, ElementType};
    use serde_json::json;

    fn visible_when(reference: &str) -> ConditionalLogic {
        ConditionalLogic::no_code(ConditionSet::all(vec![Condition::equals(
            reference,
            json!("yes"),
        )]))
    }

    fn first_reference(element: &Element) -> Option<String> {
        element.is_visible.as_ref()?.condition_set.as_ref()?.conditions[0]
            .reference
            .clone()
    }

    fn group() -> Element {
        Element::of_type("group", ElementType::Container)
            .with_name("Contact")
            .with_children(vec![
                // A refers forward to B inside the subtree
                Element::of_type("a", ElementType::TextField).with_visibility(visible_when("b")),
                Element::of_type("b", ElementType::Select),
                Element::of_type("c", ElementType::TextField)
                    .with_visibility(visible_when("outside")),
            ])
    }

    #[test]
    fn test_every_copied_element_gets_new_id() {
        let mut ids = IdGenerator::new("form");
        let source = group();
        let cloned = clone_element(&source, &mut ids, DEFAULT_COPY_SUFFIX);

        let original: Vec<&str> = source.pre_order().map(|e| e.id.as_str()).collect();
        for element in cloned.element.pre_order() {
            assert!(!original.contains(&element.id.as_str()));
        }
        assert_eq!(cloned.id_map.len(), 4);
        assert_eq!(cloned.element.id, cloned.id_map["group"]);
    }

    #[test]
    fn test_internal_reference_points_at_copy() {
        let mut ids = IdGenerator::new("form");
        let cloned = clone_element(&group(), &mut ids, DEFAULT_COPY_SUFFIX);

        let a_copy = cloned.element.find(&cloned.id_map["a"]).unwrap();
        assert_eq!(first_reference(a_copy), Some(cloned.id_map["b"].clone()));
    }

    #[test]
    fn test_external_reference_is_preserved() {
        let mut ids = IdGenerator::new("form");
        let cloned = clone_element(&group(), &mut ids, DEFAULT_COPY_SUFFIX);

        let c_copy = cloned.element.find(&cloned.id_map["c"]).unwrap();
        assert_eq!(first_reference(c_copy).as_deref(), Some("outside"));
    }

    #[test]
    fn test_source_is_left_untouched() {
        let mut ids = IdGenerator::new("form");
        let source = group();
        let before = source.clone();
        let _ = clone_element(&source, &mut ids, DEFAULT_COPY_SUFFIX);
        assert_eq!(source, before);
    }

    #[test]
    fn test_suffix_only_on_clone_root() {
        let mut ids = IdGenerator::new("form");
        let cloned = clone_element(&group(), &mut ids, DEFAULT_COPY_SUFFIX);
        assert_eq!(cloned.element.name.as_deref(), Some("Contact (Copy)"));

        let regenerated = regenerate_ids(&group(), &mut ids);
        assert_eq!(regenerated.element.name.as_deref(), Some("Contact"));
    }

    #[test]
    fn test_self_reference_follows_the_copy() {
        let mut ids = IdGenerator::new("form");
        let source = Element::of_type("self", ElementType::NumberField)
            .with_validation(ConditionalLogic::no_code(ConditionSet::all(vec![
                Condition::new("greaterThan").with_reference("self").with_target("self"),
            ])));

        let cloned = regenerate_ids(&source, &mut ids);
        let logic = cloned.element.validate.as_ref().unwrap();
        let condition = &logic.condition_set.as_ref().unwrap().conditions[0];
        assert_eq!(condition.reference.as_ref(), Some(&cloned.element.id));
        assert_eq!(condition.target.as_ref(), Some(&cloned.element.id));
    }
}
