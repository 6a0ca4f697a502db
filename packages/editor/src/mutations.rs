//! # Form Mutations
//!
//! Structural operations on form trees.
//!
//! ## Design Principles
//!
//! 1. **Pure**: every operation takes a tree and returns a new tree; the input
//!    is never modified
//! 2. **Validated**: guards run before anything is built, so a failed
//!    operation leaves no trace (not even consumed identifiers)
//! 3. **Path rebuild**: only the elements on the path from the changed parent
//!    to the root are copied; every other subtree is shared with the previous
//!    version through its `Arc`
//!
//! ## Mutation Semantics
//!
//! ### Insert
//! - Index must satisfy `0 <= index <= len`
//! - No identifier or reference checks; the element is assumed clean
//!
//! ### Move
//! - Reorders within one parent, no identifier or reference changes
//!
//! ### Drop
//! - Relocates an element to any parent at an index
//! - Fails if the new parent is the element itself or one of its descendants
//!
//! ### Remove
//! - Fails if an element outside the removed subtree references the target
//! - For containers, fails if a descendant is referenced from outside the
//!   container being removed
//! - References from inside the subtree (including self-references) never
//!   block removal
//! - Removes the element and all descendants
//!
//! ### Clone
//! - Inserts a renamed deep copy with fresh ids after a given index

use crate::clone::clone_element;
use crate::options::EditorOptions;
use crate::references::{find_usages, find_usages_of_children};
use formtree_model::ast::{Element, ElementType};
use formtree_model::IdGenerator;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Structural mutations sent by the editor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Mutation {
    /// Insert a new, identifier-clean element into a parent at index
    InsertElement {
        parent_id: String,
        index: usize,
        element: Element,
    },

    /// Reorder a child within its parent
    MoveElement {
        parent_id: String,
        from_index: usize,
        to_index: usize,
    },

    /// Relocate an existing element to a (possibly different) parent at index
    DropElement {
        element_id: String,
        new_parent_id: String,
        index: usize,
    },

    /// Remove an element and its descendants
    RemoveElement { element_id: String },

    /// Clone an element and insert the copy after `after_index` in `parent_id`
    CloneElement {
        parent_id: String,
        after_index: usize,
        element_id: String,
    },
}

/// Identity and display data of an element named in an error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSummary {
    pub id: String,
    pub name: Option<String>,
    pub element_type: ElementType,
}

/// A descendant that is referenced from outside the subtree being removed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedChild {
    pub child: ElementSummary,
    pub referenced_by: Vec<ElementSummary>,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Parent not found: {0}")]
    ParentNotFound(String),

    #[error("Element '{0}' cannot have children")]
    NotAContainer(String),

    #[error("Index {index} out of bounds for '{parent_id}' ({len} children)")]
    IndexOutOfBounds {
        parent_id: String,
        index: usize,
        len: usize,
    },

    #[error("Would create cycle: '{element_id}' cannot be placed inside '{parent_id}'")]
    CycleDetected {
        element_id: String,
        parent_id: String,
    },

    #[error("The root element cannot be {0}")]
    RootElement(&'static str),

    #[error("Cannot remove '{element}': referenced by {}", join_titles(.referenced_by))]
    ReferencedElement {
        element: ElementSummary,
        referenced_by: Vec<ElementSummary>,
    },

    #[error("Cannot remove '{element}': {}", describe_blocked(.children))]
    ChildReferenced {
        element: ElementSummary,
        children: Vec<BlockedChild>,
    },
}

impl ElementSummary {
    pub fn of(element: &Element) -> Self {
        Self {
            id: element.id.clone(),
            name: element.name.clone(),
            element_type: element.element_type(),
        }
    }

    pub fn title(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

impl fmt::Display for ElementSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

fn join_titles(elements: &[ElementSummary]) -> String {
    elements
        .iter()
        .map(|e| format!("'{}'", e.title()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe_blocked(children: &[BlockedChild]) -> String {
    children
        .iter()
        .map(|b| {
            format!(
                "'{}' is referenced by {}",
                b.child.title(),
                join_titles(&b.referenced_by)
            )
        })
        .collect::<Vec<_>>()
        .join("; ")
}

impl MutationError {
    /// Elements whose references blocked the operation, for user-facing messages
    pub fn referencing_elements(&self) -> Vec<&ElementSummary> {
        match self {
            MutationError::ReferencedElement { referenced_by, .. } => {
                referenced_by.iter().collect()
            }
            MutationError::ChildReferenced { children, .. } => {
                let mut all: Vec<&ElementSummary> = Vec::new();
                for summary in children.iter().flat_map(|b| b.referenced_by.iter()) {
                    if !all.iter().any(|s| s.id == summary.id) {
                        all.push(summary);
                    }
                }
                all
            }
            _ => Vec::new(),
        }
    }
}

/// Outcome of [`Mutation::apply`]
#[derive(Debug, Clone)]
pub struct Applied {
    /// The new tree
    pub root: Element,

    /// Id of the element created by a clone
    pub created_id: Option<String>,
}

/// Result of applying a mutation to a document
#[derive(Debug, Clone)]
pub struct MutationResult {
    /// New version number
    pub version: u64,

    /// Id of the element created by the mutation, if any
    pub created_id: Option<String>,
}

impl Mutation {
    /// Apply mutation to a tree with validation, returning the new tree
    pub fn apply(
        &self,
        root: &Element,
        ids: &mut IdGenerator,
        options: &EditorOptions,
    ) -> Result<Applied, MutationError> {
        tracing::debug!("Applying {}", self.name());

        let applied = match self {
            Mutation::InsertElement { parent_id, index, element } => {
                let root = insert(root, parent_id, *index, element.clone())?;

                // Later clones must not reissue the inserted ids
                for inserted in element.pre_order() {
                    ids.reserve(&inserted.id);
                }

                Applied {
                    root,
                    created_id: None,
                }
            }

            Mutation::MoveElement { parent_id, from_index, to_index } => Applied {
                root: move_child(root, parent_id, *from_index, *to_index)?,
                created_id: None,
            },

            Mutation::DropElement { element_id, new_parent_id, index } => Applied {
                root: drop_element(root, element_id, new_parent_id, *index)?,
                created_id: None,
            },

            Mutation::RemoveElement { element_id } => Applied {
                root: delete(root, element_id)?,
                created_id: None,
            },

            Mutation::CloneElement { parent_id, after_index, element_id } => {
                let (root, created_id) = clone_and_insert(
                    root,
                    parent_id,
                    *after_index,
                    element_id,
                    ids,
                    &options.copy_suffix,
                )?;
                Applied {
                    root,
                    created_id: Some(created_id),
                }
            }
        };

        tracing::info!("Applied {}", self.name());
        Ok(applied)
    }

    /// Validate without applying
    pub fn validate(&self, root: &Element) -> Result<(), MutationError> {
        match self {
            Mutation::InsertElement { parent_id, index, .. } => {
                validate_insert(root, parent_id, *index).map(|_| ())
            }
            Mutation::MoveElement { parent_id, from_index, to_index } => {
                validate_move(root, parent_id, *from_index, *to_index).map(|_| ())
            }
            Mutation::DropElement { element_id, new_parent_id, index } => {
                validate_drop(root, element_id, new_parent_id, *index).map(|_| ())
            }
            Mutation::RemoveElement { element_id } => validate_delete(root, element_id).map(|_| ()),
            Mutation::CloneElement { parent_id, after_index, element_id } => {
                validate_clone(root, parent_id, *after_index, element_id).map(|_| ())
            }
        }
    }

    /// Get a debug name for this mutation
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::InsertElement { .. } => "insertElement",
            Mutation::MoveElement { .. } => "moveElement",
            Mutation::DropElement { .. } => "dropElement",
            Mutation::RemoveElement { .. } => "removeElement",
            Mutation::CloneElement { .. } => "cloneElement",
        }
    }
}

/// Insert `element` into the children of `parent_id` at `index`
pub fn insert(
    root: &Element,
    parent_id: &str,
    index: usize,
    element: Element,
) -> Result<Element, MutationError> {
    let path = validate_insert(root, parent_id, index)?;
    rebuild(root, &path, |children| {
        children.insert(index, Arc::new(element));
        Ok(())
    })
}

/// Move the child at `from_index` of `parent_id` to `to_index`
pub fn move_child(
    root: &Element,
    parent_id: &str,
    from_index: usize,
    to_index: usize,
) -> Result<Element, MutationError> {
    let path = validate_move(root, parent_id, from_index, to_index)?;
    rebuild(root, &path, |children| {
        let child = children.remove(from_index);
        children.insert(to_index, child);
        Ok(())
    })
}

/// Move an existing element under `new_parent_id` at `index`
///
/// `index` addresses the new parent's children after the element has been
/// taken out of its old position.
pub fn drop_element(
    root: &Element,
    element_id: &str,
    new_parent_id: &str,
    index: usize,
) -> Result<Element, MutationError> {
    let element_path = validate_drop(root, element_id, new_parent_id, index)?;
    let (&old_index, old_parent_path) = element_path
        .split_last()
        .ok_or(MutationError::RootElement("moved"))?;

    let mut taken = None;
    let detached = rebuild(root, old_parent_path, |children| {
        taken = Some(children.remove(old_index));
        Ok(())
    })?;
    let taken = taken.ok_or_else(|| MutationError::ElementNotFound(element_id.to_string()))?;

    let new_parent_path = detached
        .path_to(new_parent_id)
        .ok_or_else(|| MutationError::ParentNotFound(new_parent_id.to_string()))?;
    rebuild(&detached, &new_parent_path, |children| {
        children.insert(index, taken);
        Ok(())
    })
}

/// Remove `target_id` and its subtree, refusing when that would break a reference
pub fn delete(root: &Element, target_id: &str) -> Result<Element, MutationError> {
    let path = validate_delete(root, target_id)?;
    let (&index, parent_path) = path
        .split_last()
        .ok_or(MutationError::RootElement("removed"))?;

    rebuild(root, parent_path, |children| {
        children.remove(index);
        Ok(())
    })
}

/// Clone `target_id` and insert the copy right after `after_index` in `parent_id`
///
/// Returns the new tree and the id of the copy.
pub fn clone_and_insert(
    root: &Element,
    parent_id: &str,
    after_index: usize,
    target_id: &str,
    ids: &mut IdGenerator,
    suffix: &str,
) -> Result<(Element, String), MutationError> {
    let (path, target) = validate_clone(root, parent_id, after_index, target_id)?;

    let cloned = clone_element(target, ids, suffix);
    let created_id = cloned.element.id.clone();

    let new_root = rebuild(root, &path, |children| {
        children.insert(after_index + 1, Arc::new(cloned.element));
        Ok(())
    })?;

    Ok((new_root, created_id))
}

/// Check that removing `target` would not leave a dangling reference
///
/// `target` must be an element of `root`. Only references from elements
/// outside `target`'s subtree count; `target` itself is part of its subtree.
pub fn check_removable(root: &Element, target: &Element) -> Result<(), MutationError> {
    let external: Vec<&Element> = find_usages(target, root)
        .into_iter()
        .filter(|usage| !is_within(target, usage))
        .collect();

    if !external.is_empty() {
        tracing::warn!(
            "Removal of {} blocked by {} referencing element(s)",
            target.id,
            external.len()
        );
        return Err(MutationError::ReferencedElement {
            element: ElementSummary::of(target),
            referenced_by: external.into_iter().map(ElementSummary::of).collect(),
        });
    }

    if target.has_children() {
        let blocked: Vec<BlockedChild> = find_usages_of_children(target, root)
            .into_iter()
            .filter_map(|entry| {
                let outside: Vec<ElementSummary> = entry
                    .usages
                    .iter()
                    .filter(|usage| !is_within(target, usage))
                    .map(|usage| ElementSummary::of(usage))
                    .collect();

                (!outside.is_empty()).then(|| BlockedChild {
                    child: ElementSummary::of(entry.child),
                    referenced_by: outside,
                })
            })
            .collect();

        if !blocked.is_empty() {
            tracing::warn!(
                "Removal of {} blocked: {} descendant(s) referenced from outside",
                target.id,
                blocked.len()
            );
            return Err(MutationError::ChildReferenced {
                element: ElementSummary::of(target),
                children: blocked,
            });
        }
    }

    Ok(())
}

// Guards. Each returns what the build step needs.

fn validate_insert(
    root: &Element,
    parent_id: &str,
    index: usize,
) -> Result<Vec<usize>, MutationError> {
    let (path, parent) = locate_parent(root, parent_id)?;
    check_index(parent, index, child_count(parent))?;
    Ok(path)
}

fn validate_move(
    root: &Element,
    parent_id: &str,
    from_index: usize,
    to_index: usize,
) -> Result<Vec<usize>, MutationError> {
    let (path, parent) = locate_parent(root, parent_id)?;
    let last = child_count(parent).checked_sub(1);
    for index in [from_index, to_index] {
        if last.map_or(true, |last| index > last) {
            return Err(out_of_bounds(parent, index));
        }
    }
    Ok(path)
}

fn validate_drop(
    root: &Element,
    element_id: &str,
    new_parent_id: &str,
    index: usize,
) -> Result<Vec<usize>, MutationError> {
    let element_path = locate(root, element_id)?;
    if element_path.is_empty() {
        return Err(MutationError::RootElement("moved"));
    }
    let element = element_at(root, &element_path)
        .ok_or_else(|| MutationError::ElementNotFound(element_id.to_string()))?;

    let (parent_path, parent) = locate_parent(root, new_parent_id)?;

    if element.contains(new_parent_id) {
        return Err(MutationError::CycleDetected {
            element_id: element_id.to_string(),
            parent_id: new_parent_id.to_string(),
        });
    }

    // Same parent: the element no longer counts once it has been taken out
    let same_parent = element_path[..element_path.len() - 1] == parent_path[..];
    let len = child_count(parent) - usize::from(same_parent);
    check_index(parent, index, len)?;

    Ok(element_path)
}

fn validate_delete(root: &Element, target_id: &str) -> Result<Vec<usize>, MutationError> {
    let path = locate(root, target_id)?;
    if path.is_empty() {
        return Err(MutationError::RootElement("removed"));
    }
    let target = element_at(root, &path)
        .ok_or_else(|| MutationError::ElementNotFound(target_id.to_string()))?;

    check_removable(root, target)?;
    Ok(path)
}

fn validate_clone<'a>(
    root: &'a Element,
    parent_id: &str,
    after_index: usize,
    target_id: &str,
) -> Result<(Vec<usize>, &'a Element), MutationError> {
    let target_path = locate(root, target_id)?;
    if target_path.is_empty() {
        return Err(MutationError::RootElement("cloned"));
    }
    let target = element_at(root, &target_path)
        .ok_or_else(|| MutationError::ElementNotFound(target_id.to_string()))?;

    let (path, parent) = locate_parent(root, parent_id)?;
    if after_index >= child_count(parent) {
        return Err(out_of_bounds(parent, after_index));
    }

    Ok((path, target))
}

// Tree helpers

fn locate(root: &Element, id: &str) -> Result<Vec<usize>, MutationError> {
    root.path_to(id)
        .ok_or_else(|| MutationError::ElementNotFound(id.to_string()))
}

fn locate_parent<'a>(
    root: &'a Element,
    parent_id: &str,
) -> Result<(Vec<usize>, &'a Element), MutationError> {
    let path = root
        .path_to(parent_id)
        .ok_or_else(|| MutationError::ParentNotFound(parent_id.to_string()))?;
    let parent = element_at(root, &path)
        .ok_or_else(|| MutationError::ParentNotFound(parent_id.to_string()))?;

    if !parent.has_children() {
        return Err(MutationError::NotAContainer(parent_id.to_string()));
    }

    Ok((path, parent))
}

fn element_at<'a>(root: &'a Element, path: &[usize]) -> Option<&'a Element> {
    path.iter()
        .try_fold(root, |node, &index| node.children()?.get(index).map(|c| c.as_ref()))
}

fn child_count(parent: &Element) -> usize {
    parent.children().map_or(0, Vec::len)
}

fn check_index(parent: &Element, index: usize, len: usize) -> Result<(), MutationError> {
    if index > len {
        return Err(MutationError::IndexOutOfBounds {
            parent_id: parent.id.clone(),
            index,
            len,
        });
    }
    Ok(())
}

fn out_of_bounds(parent: &Element, index: usize) -> MutationError {
    MutationError::IndexOutOfBounds {
        parent_id: parent.id.clone(),
        index,
        len: child_count(parent),
    }
}

/// Whether `element` is `subtree` or one of its descendants (by identity)
fn is_within(subtree: &Element, element: &Element) -> bool {
    subtree.pre_order().any(|e| std::ptr::eq(e, element))
}

/// Copy the elements along `path` and apply `edit` to the children of the last one
fn rebuild<F>(node: &Element, path: &[usize], edit: F) -> Result<Element, MutationError>
where
    F: FnOnce(&mut Vec<Arc<Element>>) -> Result<(), MutationError>,
{
    let mut copy = node.clone();
    let children = copy
        .children_mut()
        .ok_or_else(|| MutationError::NotAContainer(node.id.clone()))?;

    match path.split_first() {
        None => edit(children)?,
        Some((&index, rest)) => {
            let child = children
                .get(index)
                .ok_or_else(|| MutationError::ElementNotFound(node.id.clone()))?;
            let rebuilt = rebuild(child, rest, edit)?;
            children[index] = Arc::new(rebuilt);
        }
    }

    Ok(copy)
}
