//! The design document store.
//!
//! DESIGN
//! ======
//! `DesignStore` owns at most one active [`Design`], the selected element,
//! a single-element clipboard and a [`History`] of whole-design snapshots.
//! Every successful mutation records a snapshot; a mutation that changes
//! nothing (missing id, empty patch) records nothing. Drags go through
//! [`DesignStore::preview_update`] followed by one [`DesignStore::commit`],
//! so a gesture becomes a single undo step.
//!
//! Saved designs live as one JSON array under [`DESIGNS_KEY`]. Saving upserts
//! by design id.
//!
//! ERROR HANDLING
//! ==============
//! Editing operations need an active design and return
//! [`StoreError::NoActiveDesign`] otherwise. Storage failures, including a
//! corrupt saved collection, surface as [`StoreError::Storage`] and never
//! clobber the stored value.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::consts::{DESIGNS_KEY, HISTORY_CAP, PASTE_OFFSET};
use crate::doc::{CanvasSpec, Design, DesignElement, DesignId, ElementId, ElementPatch, NewElement};
use crate::history::History;
use crate::render::{ExportFormat, ExportManifest, ExportReceipt};
use crate::storage::{KeyValueStorage, StorageError, load_json, save_json};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no active design")]
    NoActiveDesign,
    #[error("design {0} not found")]
    DesignNotFound(DesignId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Direction for a stacking-order change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZMove {
    ToFront,
    ToBack,
    Forward,
    Backward,
}

pub struct DesignStore<S> {
    storage: S,
    current: Option<Design>,
    history: History<Design>,
    selected: Option<ElementId>,
    clipboard: Option<DesignElement>,
}

impl<S: KeyValueStorage> DesignStore<S> {
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self::with_history_cap(storage, HISTORY_CAP)
    }

    #[must_use]
    pub fn with_history_cap(storage: S, cap: usize) -> Self {
        Self { storage, current: None, history: History::new(cap), selected: None, clipboard: None }
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    #[must_use]
    pub fn current(&self) -> Option<&Design> {
        self.current.as_ref()
    }

    /// Elements of the active design in paint order; empty without one.
    #[must_use]
    pub fn elements(&self) -> &[DesignElement] {
        self.current.as_ref().map_or(&[], |d| d.elements.as_slice())
    }

    #[must_use]
    pub fn selection(&self) -> Option<ElementId> {
        self.selected
    }

    #[must_use]
    pub fn clipboard(&self) -> Option<&DesignElement> {
        self.clipboard.as_ref()
    }

    #[must_use]
    pub fn history(&self) -> &History<Design> {
        &self.history
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn design_mut(&mut self) -> Result<&mut Design, StoreError> {
        self.current.as_mut().ok_or(StoreError::NoActiveDesign)
    }

    fn design(&self) -> Result<&Design, StoreError> {
        self.current.as_ref().ok_or(StoreError::NoActiveDesign)
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Start a new empty design on the default canvas.
    pub fn create_blank(&mut self, name: &str) -> &Design {
        self.activate(Design::blank(name))
    }

    /// Make `design` the active design, e.g. one built from a template.
    pub fn open(&mut self, mut design: Design) -> &Design {
        design.normalize();
        self.activate(design)
    }

    /// Make the saved design with `id` the active design.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DesignNotFound`] if no saved design has that id,
    /// leaving the current state unchanged, or a storage error if the saved
    /// collection cannot be read.
    pub fn load(&mut self, id: DesignId) -> Result<&Design, StoreError> {
        let mut design = self
            .saved_designs()?
            .into_iter()
            .find(|d| d.id == id)
            .ok_or(StoreError::DesignNotFound(id))?;
        design.normalize();
        debug!(%id, elements = design.elements.len(), "design loaded");
        Ok(self.activate(design))
    }

    fn activate(&mut self, design: Design) -> &Design {
        self.history.reset(design.clone());
        self.selected = None;
        self.current.insert(design)
    }

    // =========================================================================
    // ELEMENTS
    // =========================================================================

    /// Append a new element above all others and select it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoActiveDesign`] without an active design.
    pub fn add_element(&mut self, new: NewElement) -> Result<DesignElement, StoreError> {
        let design = self.design_mut()?;
        let el = new.into_element(Uuid::new_v4(), design.next_z_index());
        design.elements.push(el.clone());
        self.selected = Some(el.id);
        self.record();
        Ok(el)
    }

    /// Apply `patch` to the element with `id`.
    ///
    /// Returns `Ok(false)`, leaving the design and history untouched, when the
    /// element does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoActiveDesign`] without an active design.
    pub fn update_element(&mut self, id: ElementId, patch: &ElementPatch) -> Result<bool, StoreError> {
        let applied = self.preview_update(id, patch)?;
        if applied {
            self.record();
        }
        Ok(applied)
    }

    /// Apply `patch` without recording a history snapshot. Pair with
    /// [`Self::commit`] once the gesture ends.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoActiveDesign`] without an active design.
    pub fn preview_update(&mut self, id: ElementId, patch: &ElementPatch) -> Result<bool, StoreError> {
        let design = self.design_mut()?;
        let Some(el) = design.element_mut(&id) else {
            return Ok(false);
        };
        patch.apply_to(el);
        Ok(true)
    }

    /// Record the active design if it differs from the latest snapshot.
    /// Returns whether a snapshot was recorded.
    pub fn commit(&mut self) -> bool {
        self.record()
    }

    /// Merge `patch` into the element's style key by key; `null` removes keys.
    ///
    /// Returns `Ok(false)` if the element is missing or `patch` is not an
    /// object.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoActiveDesign`] without an active design.
    pub fn merge_style(&mut self, id: ElementId, patch: &serde_json::Value) -> Result<bool, StoreError> {
        let design = self.design_mut()?;
        let Some(el) = design.element_mut(&id) else {
            return Ok(false);
        };
        let merged = crate::doc::merge_style(&mut el.style, patch);
        if merged {
            self.record();
        }
        Ok(merged)
    }

    /// Remove the element with `id`, clearing the selection if it was selected.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoActiveDesign`] without an active design.
    pub fn delete_element(&mut self, id: ElementId) -> Result<bool, StoreError> {
        let design = self.design_mut()?;
        let Some(idx) = design.position(&id) else {
            return Ok(false);
        };
        design.elements.remove(idx);
        if self.selected == Some(id) {
            self.selected = None;
        }
        self.record();
        Ok(true)
    }

    /// Flip the element's `visible` flag.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoActiveDesign`] without an active design.
    pub fn toggle_visible(&mut self, id: ElementId) -> Result<bool, StoreError> {
        let design = self.design_mut()?;
        let Some(el) = design.element_mut(&id) else {
            return Ok(false);
        };
        el.visible = !el.visible;
        self.record();
        Ok(true)
    }

    /// Select an element, or clear the selection with `None`.
    ///
    /// Selecting a missing id returns `Ok(false)` and keeps the old selection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoActiveDesign`] without an active design.
    pub fn select(&mut self, id: Option<ElementId>) -> Result<bool, StoreError> {
        let design = self.design()?;
        match id {
            Some(id) if design.element(&id).is_none() => Ok(false),
            other => {
                self.selected = other;
                Ok(true)
            }
        }
    }

    /// Copy the selected element to the clipboard.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoActiveDesign`] without an active design.
    pub fn copy_selected(&mut self) -> Result<bool, StoreError> {
        let design = self.design()?;
        let Some(el) = self.selected.and_then(|id| design.element(&id)) else {
            return Ok(false);
        };
        self.clipboard = Some(el.clone());
        Ok(true)
    }

    /// Insert a copy of the clipboard element, offset and with a fresh id,
    /// above all others, and select it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoActiveDesign`] without an active design.
    pub fn paste(&mut self) -> Result<Option<DesignElement>, StoreError> {
        let Some(source) = self.clipboard.clone() else {
            self.design()?;
            return Ok(None);
        };
        let design = self.design_mut()?;
        let el = DesignElement {
            id: Uuid::new_v4(),
            x: source.x + PASTE_OFFSET,
            y: source.y + PASTE_OFFSET,
            z_index: design.next_z_index(),
            ..source
        };
        design.elements.push(el.clone());
        self.selected = Some(el.id);
        self.record();
        Ok(Some(el))
    }

    /// Move an element in the stacking order and renumber `z_index` densely.
    ///
    /// Returns `Ok(false)` when the element is missing or already at the
    /// requested end.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoActiveDesign`] without an active design.
    pub fn reorder(&mut self, id: ElementId, to: ZMove) -> Result<bool, StoreError> {
        let design = self.design_mut()?;
        let Some(from) = design.position(&id) else {
            return Ok(false);
        };
        let last = design.elements.len() - 1;
        let target = match to {
            ZMove::ToFront => last,
            ZMove::ToBack => 0,
            ZMove::Forward => (from + 1).min(last),
            ZMove::Backward => from.saturating_sub(1),
        };
        if target == from {
            return Ok(false);
        }
        let el = design.elements.remove(from);
        design.elements.insert(target, el);
        design.renumber();
        self.record();
        Ok(true)
    }

    // =========================================================================
    // DESIGN METADATA
    // =========================================================================

    /// Replace the canvas metadata. Negative sizes clamp to zero.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoActiveDesign`] without an active design.
    pub fn set_canvas(&mut self, canvas: CanvasSpec) -> Result<(), StoreError> {
        let design = self.design_mut()?;
        design.canvas = CanvasSpec {
            width: canvas.width.max(0.0),
            height: canvas.height.max(0.0),
            ..canvas
        };
        self.record();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`StoreError::NoActiveDesign`] without an active design.
    pub fn rename(&mut self, name: &str) -> Result<(), StoreError> {
        name.clone_into(&mut self.design_mut()?.name);
        self.record();
        Ok(())
    }

    // =========================================================================
    // HISTORY
    // =========================================================================

    fn record(&mut self) -> bool {
        let Some(design) = self.current.as_ref() else {
            return false;
        };
        if self.history.current() == Some(design) {
            return false;
        }
        self.history.record(design.clone());
        true
    }

    /// Step back one snapshot. Uncommitted preview edits are committed first.
    /// Returns `false` at the start of the timeline.
    pub fn undo(&mut self) -> bool {
        self.record();
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        self.current = Some(snapshot.clone());
        self.selected = None;
        true
    }

    /// Step forward one snapshot. Returns `false` at the end of the timeline.
    pub fn redo(&mut self) -> bool {
        if self.record() {
            return false;
        }
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        self.current = Some(snapshot.clone());
        self.selected = None;
        true
    }

    // =========================================================================
    // PERSISTENCE
    // =========================================================================

    /// Upsert the active design into the saved collection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoActiveDesign`] without an active design, or a
    /// storage error if the collection cannot be read or written.
    pub fn save(&mut self) -> Result<(), StoreError> {
        let design = self.design()?.clone();
        let mut saved = self.saved_designs()?;
        match saved.iter_mut().find(|d| d.id == design.id) {
            Some(slot) => *slot = design.clone(),
            None => saved.push(design.clone()),
        }
        save_json(&mut self.storage, DESIGNS_KEY, &saved)?;
        debug!(id = %design.id, total = saved.len(), "design saved");
        Ok(())
    }

    /// All saved designs, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the collection cannot be read or parsed.
    pub fn saved_designs(&self) -> Result<Vec<Design>, StoreError> {
        let saved: Option<Vec<Design>> = load_json(&self.storage, DESIGNS_KEY)?;
        Ok(saved.unwrap_or_default())
    }

    /// Remove a design from the saved collection. The active design, if it
    /// is the same one, stays open.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the collection cannot be read or written.
    pub fn delete_saved(&mut self, id: DesignId) -> Result<bool, StoreError> {
        let mut saved = self.saved_designs()?;
        let before = saved.len();
        saved.retain(|d| d.id != id);
        if saved.len() == before {
            return Ok(false);
        }
        save_json(&mut self.storage, DESIGNS_KEY, &saved)?;
        debug!(%id, "saved design deleted");
        Ok(true)
    }

    /// Acknowledge an export of the visible elements in `format`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoActiveDesign`] without an active design.
    pub fn export(&self, format: ExportFormat) -> Result<ExportReceipt, StoreError> {
        let manifest = ExportManifest::for_design(self.design()?, format);
        debug!(file = %manifest.file_name, elements = manifest.elements.len(), "export accepted");
        Ok(ExportReceipt::accept(manifest))
    }
}
