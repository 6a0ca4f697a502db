//! # Document Handle
//!
//! Core document abstraction for form editing.
//!
//! A FormDocument owns the current version of one form. Documents can be:
//! - **Memory-backed**: Temporary, for testing or in-memory operations
//! - **File-backed**: Editing with disk persistence
//!
//! ## Lifecycle
//!
//! ```text
//! Load → Parse → Edit → Save
//!   ↓      ↓       ↓      ↓
//! File   Form  Mutations File
//! ```
//!
//! Every successful mutation swaps in a new root; a failed one leaves the
//! form and the version number as they were.

use crate::duplicates::{check_duplicate_id, find_duplicate_ids, DuplicateIdWarning};
use crate::references::{find_usages, find_usages_of_children, ChildUsages};
use crate::{EditorError, EditorOptions, Mutation, MutationError, MutationResult};
use formtree_model::{parse, serialize, Element, Form, IdGenerator};
use std::path::PathBuf;

/// Editable form document
#[derive(Debug)]
pub struct FormDocument {
    /// Path to source file (if any)
    pub path: PathBuf,

    /// Current version number (increments on each applied mutation)
    pub version: u64,

    /// Backing storage strategy
    storage: DocumentStorage,

    ids: IdGenerator,

    options: EditorOptions,
}

/// Storage backend for document
#[derive(Debug)]
pub enum DocumentStorage {
    /// In-memory only (for testing, temp docs)
    Memory { form: Form },

    /// File-backed
    File { form: Form, dirty: bool },
}

impl DocumentStorage {
    fn form(&self) -> &Form {
        match self {
            DocumentStorage::Memory { form } => form,
            DocumentStorage::File { form, .. } => form,
        }
    }
}

impl FormDocument {
    /// Create document from JSON source (memory-backed)
    pub fn from_source(path: PathBuf, source: &str) -> Result<Self, EditorError> {
        let form = parse(source)?;
        Ok(Self::from_form(path, form))
    }

    /// Wrap an already parsed form (memory-backed)
    pub fn from_form(path: PathBuf, form: Form) -> Self {
        Self {
            path,
            version: 0,
            ids: IdGenerator::for_form(&form),
            storage: DocumentStorage::Memory { form },
            options: EditorOptions::default(),
        }
    }

    /// Load document from file (file-backed)
    pub fn load(path: PathBuf) -> Result<Self, EditorError> {
        let source = std::fs::read_to_string(&path)?;
        let form = parse(&source)?;

        tracing::debug!("Loaded form {} from {}", form.id, path.display());

        Ok(Self {
            path,
            version: 0,
            ids: IdGenerator::for_form(&form),
            storage: DocumentStorage::File { form, dirty: false },
            options: EditorOptions::default(),
        })
    }

    pub fn with_options(mut self, options: EditorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    /// Get current form
    pub fn form(&self) -> &Form {
        self.storage.form()
    }

    pub fn root(&self) -> &Element {
        &self.form().root
    }

    /// Identifier generator shared by every mutation of this document
    pub fn ids_mut(&mut self) -> &mut IdGenerator {
        &mut self.ids
    }

    /// Apply a mutation
    pub fn apply(&mut self, mutation: Mutation) -> Result<MutationResult, EditorError> {
        let root = &self.storage.form().root;
        let applied = mutation.apply(root, &mut self.ids, &self.options)?;

        if self.options.warn_on_duplicates {
            for warning in find_duplicate_ids(&applied.root) {
                tracing::warn!("{}", warning);
            }
        }

        self.replace_root(applied.root);

        Ok(MutationResult {
            version: self.version,
            created_id: applied.created_id,
        })
    }

    /// Swap in a new root; used by apply and by undo/redo
    pub(crate) fn replace_root(&mut self, root: Element) {
        self.version += 1;

        match &mut self.storage {
            DocumentStorage::Memory { form } => form.root = root,
            DocumentStorage::File { form, dirty } => {
                form.root = root;
                *dirty = true;
            }
        }
    }

    /// Elements whose conditional logic references `id`
    pub fn usages(&self, id: &str) -> Result<Vec<&Element>, MutationError> {
        let target = self
            .root()
            .find(id)
            .ok_or_else(|| MutationError::ElementNotFound(id.to_string()))?;
        Ok(find_usages(target, self.root()))
    }

    /// Usage lists for every descendant of `id`
    pub fn usages_of_children(&self, id: &str) -> Result<Vec<ChildUsages<'_>>, MutationError> {
        let target = self
            .root()
            .find(id)
            .ok_or_else(|| MutationError::ElementNotFound(id.to_string()))?;
        Ok(find_usages_of_children(target, self.root()))
    }

    /// Advisory warning shown next to an element whose id collides
    pub fn duplicate_warning(&self, id: &str) -> Option<DuplicateIdWarning> {
        check_duplicate_id(self.root(), id)
    }

    /// Check if document has unsaved changes
    pub fn is_dirty(&self) -> bool {
        match &self.storage {
            DocumentStorage::File { dirty, .. } => *dirty,
            _ => false,
        }
    }

    /// Save document to disk (if file-backed)
    pub fn save(&mut self) -> Result<(), EditorError> {
        match &mut self.storage {
            DocumentStorage::File { form, dirty } => {
                std::fs::write(&self.path, serialize(form)?)?;
                *dirty = false;
                Ok(())
            }
            _ => Err(EditorError::NotFileBacked),
        }
    }

    /// Write the current form to `path`, regardless of storage
    pub fn save_as(&self, path: &std::path::Path) -> Result<(), EditorError> {
        std::fs::write(path, serialize(self.form())?)?;
        Ok(())
    }
}
