//! # Undo/Redo Stack
//!
//! Tracks mutation history and enables undo/redo operations.
//!
//! ## Design
//!
//! - Trees are immutable values, so each history entry keeps the root before
//!   and after its mutations instead of computing inverse mutations
//! - Snapshots share unchanged subtrees with each other
//! - Undo restores the `before` root, redo restores the `after` root, so a
//!   redone clone keeps the ids it was created with
//! - New mutations clear the redo stack
//! - Supports batched operations (group multiple mutations as one undo step)
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut stack = UndoStack::new();
//! let mut doc = FormDocument::from_source(...)?;
//!
//! stack.apply(mutation, &mut doc)?;
//! stack.undo(&mut doc);
//! stack.redo(&mut doc);
//! ```

use crate::{EditorError, FormDocument, Mutation, MutationResult};
use formtree_model::Element;

/// A group of mutations that should be undone/redone together
#[derive(Debug, Clone)]
pub struct MutationBatch {
    /// The mutations in this batch (in application order)
    pub mutations: Vec<Mutation>,

    /// Root before the first mutation of the batch
    pub before: Element,

    /// Root after the last mutation of the batch
    pub after: Element,

    /// Optional description of this batch
    pub description: Option<String>,
}

/// Undo/redo stack for form editing
#[derive(Debug)]
pub struct UndoStack {
    /// Stack of applied batches (most recent last)
    undo_stack: Vec<MutationBatch>,

    /// Stack of undone batches (most recent last)
    redo_stack: Vec<MutationBatch>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    /// Currently building a batch
    current_batch: Option<PendingBatch>,
}

#[derive(Debug, Default)]
struct PendingBatch {
    mutations: Vec<Mutation>,
    before: Option<Element>,
    after: Option<Element>,
    description: Option<String>,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    /// Create an undo stack with custom max levels
    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            current_batch: None,
        }
    }

    /// Create an undo stack sized by the document's editor options
    pub fn for_document(doc: &FormDocument) -> Self {
        Self::with_max_levels(doc.options().undo_levels)
    }

    /// Apply a mutation and record it for undo
    pub fn apply(
        &mut self,
        mutation: Mutation,
        doc: &mut FormDocument,
    ) -> Result<MutationResult, EditorError> {
        let before = doc.root().clone();
        let result = doc.apply(mutation.clone())?;
        let after = doc.root().clone();

        if let Some(batch) = &mut self.current_batch {
            batch.before.get_or_insert(before);
            batch.after = Some(after);
            batch.mutations.push(mutation);
        } else {
            self.push_batch(MutationBatch {
                mutations: vec![mutation],
                before,
                after,
                description: None,
            });
        }

        Ok(result)
    }

    /// Start a batch of mutations (will be undone/redone together)
    pub fn begin_batch(&mut self) {
        self.current_batch = Some(PendingBatch::default());
    }

    /// End the current batch and push to undo stack
    pub fn end_batch(&mut self) {
        if let Some(batch) = self.current_batch.take() {
            if let (Some(before), Some(after)) = (batch.before, batch.after) {
                self.push_batch(MutationBatch {
                    mutations: batch.mutations,
                    before,
                    after,
                    description: batch.description,
                });
            }
        }
    }

    /// Set description for current batch (if batching)
    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if let Some(batch) = &mut self.current_batch {
            batch.description = Some(description.into());
        }
    }

    /// Push a batch to the undo stack
    fn push_batch(&mut self, batch: MutationBatch) {
        self.undo_stack.push(batch);

        // Trim if exceeded max levels
        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        // Clear redo stack (new action invalidates future)
        self.redo_stack.clear();
    }

    /// Undo the most recent mutation/batch
    pub fn undo(&mut self, doc: &mut FormDocument) -> bool {
        if let Some(batch) = self.undo_stack.pop() {
            doc.replace_root(batch.before.clone());
            self.redo_stack.push(batch);
            true
        } else {
            false // Nothing to undo
        }
    }

    /// Redo the most recently undone mutation/batch
    pub fn redo(&mut self, doc: &mut FormDocument) -> bool {
        if let Some(batch) = self.redo_stack.pop() {
            doc.replace_root(batch.after.clone());
            self.undo_stack.push(batch);
            true
        } else {
            false // Nothing to redo
        }
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Get the number of undo levels available
    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get the number of redo levels available
    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_batch = None;
    }

    /// Get description of the next undo operation
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }

    /// Get description of the next redo operation
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formtree_model::ast::ElementType;
    use std::path::PathBuf;

    fn doc() -> FormDocument {
        let root = Element::of_type("root", ElementType::Root).with_children(vec![
            Element::of_type("a", ElementType::TextField).with_name("A"),
            Element::of_type("b", ElementType::TextField),
            Element::of_type("c", ElementType::TextField),
        ]);
        FormDocument::from_form(
            PathBuf::from("test.json"),
            formtree_model::Form::new("form", "Test", root),
        )
    }

    fn order(doc: &FormDocument) -> Vec<String> {
        doc.root().children().unwrap().iter().map(|c| c.id.clone()).collect()
    }

    fn swap_first_two() -> Mutation {
        Mutation::MoveElement {
            parent_id: "root".to_string(),
            from_index: 0,
            to_index: 1,
        }
    }

    #[test]
    fn test_undo_stack_creation() {
        let stack = UndoStack::new();
        assert_eq!(stack.undo_levels(), 0);
        assert_eq!(stack.redo_levels(), 0);
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_apply_undo_redo() {
        let mut doc = doc();
        let mut stack = UndoStack::new();

        stack.apply(swap_first_two(), &mut doc).unwrap();
        assert_eq!(order(&doc), vec!["b", "a", "c"]);

        assert!(stack.undo(&mut doc));
        assert_eq!(order(&doc), vec!["a", "b", "c"]);
        assert!(stack.can_redo());

        assert!(stack.redo(&mut doc));
        assert_eq!(order(&doc), vec!["b", "a", "c"]);
        assert!(!stack.redo(&mut doc));
    }

    #[test]
    fn test_redo_of_clone_keeps_created_id() {
        let mut doc = doc();
        let mut stack = UndoStack::new();

        let result = stack
            .apply(
                Mutation::CloneElement {
                    parent_id: "root".to_string(),
                    after_index: 0,
                    element_id: "a".to_string(),
                },
                &mut doc,
            )
            .unwrap();
        let created = result.created_id.unwrap();

        stack.undo(&mut doc);
        assert!(doc.root().find(&created).is_none());

        stack.redo(&mut doc);
        assert!(doc.root().find(&created).is_some());
    }

    #[test]
    fn test_batched_mutations() {
        let mut doc = doc();
        let mut stack = UndoStack::new();

        stack.begin_batch();
        stack.set_batch_description("Reorder fields");
        stack.apply(swap_first_two(), &mut doc).unwrap();
        stack
            .apply(
                Mutation::MoveElement {
                    parent_id: "root".to_string(),
                    from_index: 2,
                    to_index: 0,
                },
                &mut doc,
            )
            .unwrap();
        stack.end_batch();

        assert_eq!(order(&doc), vec!["c", "b", "a"]);
        assert_eq!(stack.undo_levels(), 1);
        assert_eq!(stack.undo_description(), Some("Reorder fields"));

        stack.undo(&mut doc);
        assert_eq!(order(&doc), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_failed_mutation_is_not_recorded() {
        let mut doc = doc();
        let mut stack = UndoStack::new();

        let result = stack.apply(
            Mutation::RemoveElement {
                element_id: "missing".to_string(),
            },
            &mut doc,
        );
        assert!(result.is_err());
        assert!(!stack.can_undo());
    }

    #[test]
    fn test_new_mutation_clears_redo() {
        let mut doc = doc();
        let mut stack = UndoStack::new();

        stack.apply(swap_first_two(), &mut doc).unwrap();
        stack.undo(&mut doc);
        assert_eq!(stack.redo_levels(), 1);

        stack.apply(swap_first_two(), &mut doc).unwrap();
        assert_eq!(stack.redo_levels(), 0);
    }

    #[test]
    fn test_max_levels_enforced() {
        let mut doc = doc();
        let mut stack = UndoStack::with_max_levels(2);

        for _ in 0..3 {
            stack.apply(swap_first_two(), &mut doc).unwrap();
        }

        assert_eq!(stack.undo_levels(), 2);
    }
}
