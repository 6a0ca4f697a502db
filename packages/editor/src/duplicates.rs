//! # Duplicate identifiers
//!
//! Advisory checks only. Imported or legacy forms may already contain
//! colliding ids, so a collision is reported for display and never blocks
//! an edit.

use formtree_model::ast::Element;
use std::collections::HashMap;
use thiserror::Error;

/// Non-fatal warning: more than one element shares an id
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Duplicate id '{id}': {count} elements share this identifier")]
pub struct DuplicateIdWarning {
    pub id: String,
    pub count: usize,
}

/// Warn if more than one element in `root` has the id `id`
pub fn check_duplicate_id(root: &Element, id: &str) -> Option<DuplicateIdWarning> {
    let count = root.pre_order().filter(|e| e.id == id).count();

    if count > 1 {
        let warning = DuplicateIdWarning {
            id: id.to_string(),
            count,
        };
        tracing::warn!("{}", warning);
        Some(warning)
    } else {
        None
    }
}

/// Every colliding id in `root`, in order of first appearance
pub fn find_duplicate_ids(root: &Element) -> Vec<DuplicateIdWarning> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();

    for element in root.pre_order() {
        let count = counts.entry(element.id.as_str()).or_insert(0);
        if *count == 0 {
            order.push(element.id.as_str());
        }
        *count += 1;
    }

    order
        .into_iter()
        .filter_map(|id| {
            let count = counts[id];
            (count > 1).then(|| DuplicateIdWarning {
                id: id.to_string(),
                count,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use formtree_model::ast::ElementType;

    fn tree() -> Element {
        Element::of_type("root", ElementType::Root).with_children(vec![
            Element::of_type("a", ElementType::Step).with_children(vec![
                Element::of_type("x", ElementType::TextField),
                Element::of_type("y", ElementType::TextField),
            ]),
            Element::of_type("b", ElementType::Step).with_children(vec![
                Element::of_type("x", ElementType::TextField),
                Element::of_type("y", ElementType::TextField),
                Element::of_type("x", ElementType::TextField),
            ]),
        ])
    }

    #[test]
    fn test_unique_id_has_no_warning() {
        assert_eq!(check_duplicate_id(&tree(), "a"), None);
        assert_eq!(check_duplicate_id(&tree(), "missing"), None);
    }

    #[test]
    fn test_duplicate_id_warning_message() {
        let warning = check_duplicate_id(&tree(), "x").unwrap();
        assert_eq!(warning.count, 3);
        assert_eq!(
            warning.to_string(),
            "Duplicate id 'x': 3 elements share this identifier"
        );
    }

    #[test]
    fn test_find_all_duplicates_in_first_seen_order() {
        let ids: Vec<(String, usize)> = find_duplicate_ids(&tree())
            .into_iter()
            .map(|w| (w.id, w.count))
            .collect();
        assert_eq!(ids, vec![("x".to_string(), 3), ("y".to_string(), 2)]);
    }
}
