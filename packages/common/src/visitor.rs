use formtree_model::ast::*;
use std::sync::Arc;

/// Visitor pattern for traversing form trees immutably
///
/// This trait provides default implementations that walk the entire tree,
/// elements in pre-order and, for each element, its conditional logic before
/// its children. Override specific visit_* methods to perform custom actions.
pub trait Visitor: Sized {
    fn visit_element(&mut self, element: &Element) {
        walk_element(self, element);
    }

    fn visit_logic(&mut self, logic: &ConditionalLogic) {
        walk_logic(self, logic);
    }

    fn visit_condition_set(&mut self, set: &ConditionSet) {
        walk_condition_set(self, set);
    }

    fn visit_condition(&mut self, _condition: &Condition) {
        // Leaf node, no children to walk
    }
}

/// Mutable visitor pattern for transforming form trees
///
/// Children are stored behind `Arc`; walking an element mutably goes through
/// `Arc::make_mut`, so shared subtrees are copied before they are modified
/// and the previous tree version is never touched.
pub trait VisitorMut: Sized {
    fn visit_element_mut(&mut self, element: &mut Element) {
        walk_element_mut(self, element);
    }

    fn visit_logic_mut(&mut self, logic: &mut ConditionalLogic) {
        walk_logic_mut(self, logic);
    }

    fn visit_condition_set_mut(&mut self, set: &mut ConditionSet) {
        walk_condition_set_mut(self, set);
    }

    fn visit_condition_mut(&mut self, _condition: &mut Condition) {
        // Leaf node, no children to walk
    }
}

// Default walk implementations for immutable visitor

pub fn walk_element<V: Visitor>(visitor: &mut V, element: &Element) {
    for logic in element.logic() {
        visitor.visit_logic(logic);
    }

    if let Some(children) = element.children() {
        for child in children {
            visitor.visit_element(child);
        }
    }
}

pub fn walk_logic<V: Visitor>(visitor: &mut V, logic: &ConditionalLogic) {
    if let Some(set) = &logic.condition_set {
        visitor.visit_condition_set(set);
    }
}

pub fn walk_condition_set<V: Visitor>(visitor: &mut V, set: &ConditionSet) {
    for condition in &set.conditions {
        visitor.visit_condition(condition);
    }
    for nested in &set.condition_sets {
        visitor.visit_condition_set(nested);
    }
}

// Default walk implementations for mutable visitor

pub fn walk_element_mut<V: VisitorMut>(visitor: &mut V, element: &mut Element) {
    for logic in element.logic_mut() {
        visitor.visit_logic_mut(logic);
    }

    if let Some(children) = element.children_mut() {
        for child in children {
            visitor.visit_element_mut(Arc::make_mut(child));
        }
    }
}

pub fn walk_logic_mut<V: VisitorMut>(visitor: &mut V, logic: &mut ConditionalLogic) {
    if let Some(set) = &mut logic.condition_set {
        visitor.visit_condition_set_mut(set);
    }
}

pub fn walk_condition_set_mut<V: VisitorMut>(visitor: &mut V, set: &mut ConditionSet) {
    for condition in &mut set.conditions {
        visitor.visit_condition_mut(condition);
    }
    for nested in &mut set.condition_sets {
        visitor.visit_condition_set_mut(nested);
    }
}
