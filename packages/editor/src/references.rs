//! # Reference Scanner
//!
//! Discovers which elements depend on a given element through the
//! `reference` and `target` fields of the conditions in their attached
//! conditional logic. Only structural references are tracked; nothing here
//! evaluates a condition.

use formtree_common::Visitor;
use formtree_model::ast::{Condition, Element};
use std::collections::{HashMap, HashSet};

/// An element below a deletion target together with the elements that reference it
#[derive(Debug, Clone)]
pub struct ChildUsages<'a> {
    pub child: &'a Element,
    pub usages: Vec<&'a Element>,
}

/// A condition pointing at an identifier that does not exist in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    pub element_id: String,
    pub missing_id: String,
}

/// Returns true as soon as a condition mentions `id`
struct ReferenceMatcher<'t> {
    id: &'t str,
    found: bool,
}

impl Visitor for ReferenceMatcher<'_> {
    fn visit_condition(&mut self, condition: &Condition) {
        if condition.reference.as_deref() == Some(self.id)
            || condition.target.as_deref() == Some(self.id)
        {
            self.found = true;
        }
    }
}

/// Collects every id mentioned by conditions, first occurrence order
#[derive(Default)]
struct ReferenceCollector {
    ids: Vec<String>,
    seen: HashSet<String>,
}

impl Visitor for ReferenceCollector {
    fn visit_condition(&mut self, condition: &Condition) {
        for id in [&condition.reference, &condition.target].into_iter().flatten() {
            if self.seen.insert(id.clone()) {
                self.ids.push(id.clone());
            }
        }
    }
}

/// Whether the element's own conditional logic mentions `id`
///
/// Children are not inspected.
pub fn references(element: &Element, id: &str) -> bool {
    let mut matcher = ReferenceMatcher { id, found: false };
    for logic in element.logic() {
        matcher.visit_logic(logic);
    }
    matcher.found
}

/// Ids referenced by the element's own conditional logic
pub fn referenced_ids(element: &Element) -> Vec<String> {
    let mut collector = ReferenceCollector::default();
    for logic in element.logic() {
        collector.visit_logic(logic);
    }
    collector.ids
}

/// Every element in `root` whose conditional logic references `target`
///
/// Pre-order; each element appears at most once. `target` itself is included
/// when it references its own id.
pub fn find_usages<'a>(target: &Element, root: &'a Element) -> Vec<&'a Element> {
    let usages: Vec<&Element> = root
        .pre_order()
        .filter(|element| references(element, &target.id))
        .collect();

    tracing::debug!(
        "find_usages: {} referenced by {} element(s)",
        target.id,
        usages.len()
    );

    usages
}

/// Usage lists for every descendant of `target`, children before grandchildren
/// in pre-order
///
/// `root` is scanned once regardless of the size of the subtree.
pub fn find_usages_of_children<'a>(target: &'a Element, root: &'a Element) -> Vec<ChildUsages<'a>> {
    let index = ReferenceIndex::build(root);

    target
        .pre_order()
        .skip(1)
        .map(|child| ChildUsages {
            child,
            usages: index.usages_of(&child.id).to_vec(),
        })
        .collect()
}

/// Conditions in `root` that point at ids missing from the tree
pub fn find_dangling_references(root: &Element) -> Vec<DanglingReference> {
    let known: HashSet<&str> = root.pre_order().map(|e| e.id.as_str()).collect();

    root.pre_order()
        .flat_map(|element| {
            referenced_ids(element)
                .into_iter()
                .filter(|id| !known.contains(id.as_str()))
                .map(|missing_id| DanglingReference {
                    element_id: element.id.clone(),
                    missing_id,
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Reverse reference map: referenced id -> referencing elements
pub struct ReferenceIndex<'a> {
    by_target: HashMap<String, Vec<&'a Element>>,
}

impl<'a> ReferenceIndex<'a> {
    pub fn build(root: &'a Element) -> Self {
        let mut by_target: HashMap<String, Vec<&'a Element>> = HashMap::new();

        for element in root.pre_order() {
            for id in referenced_ids(element) {
                by_target.entry(id).or_default().push(element);
            }
        }

        Self { by_target }
    }

    pub fn usages_of(&self, id: &str) -> &[&'a Element] {
        self.by_target.get(id).map(Vec::as_slice).unwrap_or(&[])
    }
}
