//! # Formtree Editor
//!
//! Tree mutation and referential-integrity engine for form documents.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ model: JSON → Form (element tree), ids      │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: structural mutations                │
//! │  - Reference scanner (who depends on whom)  │
//! │  - Duplicate-id checks (advisory)           │
//! │  - Clone engine (fresh ids, rewritten refs) │
//! │  - Insert / move / drop / remove / clone    │
//! │  - Document handle + undo history           │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ caller: stores the returned tree, saves     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Trees are values**: every mutation returns a new tree and leaves its
//!    input untouched, sharing unchanged subtrees
//! 2. **All or nothing**: a refused mutation reports why and changes nothing
//! 3. **References stay valid**: removal is refused while something outside
//!    the removed subtree still depends on it
//! 4. **Explicit id state**: the identifier generator is passed in, never global
//!
//! ## Usage
//!
//! ```rust,ignore
//! use formtree_editor::{FormDocument, Mutation};
//!
//! let mut doc = FormDocument::load("application.json".into())?;
//!
//! let result = doc.apply(Mutation::CloneElement {
//!     parent_id: "step-1".to_string(),
//!     after_index: 0,
//!     element_id: "address".to_string(),
//! })?;
//!
//! doc.save()?;
//! ```

mod clone;
mod document;
mod duplicates;
mod errors;
mod mutations;
mod options;
mod references;
mod undo_stack;

pub use clone::{clone_element, regenerate_ids, ClonedSubtree, DEFAULT_COPY_SUFFIX};
pub use document::{DocumentStorage, FormDocument};
pub use duplicates::{check_duplicate_id, find_duplicate_ids, DuplicateIdWarning};
pub use errors::EditorError;
pub use mutations::{
    check_removable, clone_and_insert, delete, drop_element, insert, move_child, Applied,
    BlockedChild, ElementSummary, Mutation, MutationError, MutationResult,
};
pub use options::EditorOptions;
pub use references::{
    find_dangling_references, find_usages, find_usages_of_children, referenced_ids, references,
    ChildUsages, DanglingReference, ReferenceIndex,
};
pub use undo_stack::{MutationBatch, UndoStack};

// Re-export model types for convenience
pub use formtree_model::{Element, Form, IdGenerator};
