//! Editor engine: the testable [`EditorCore`] and the browser-facing [`Editor`].
//!
//! DESIGN
//! ======
//! `EditorCore` owns the document store, the account session, the camera and
//! the active pointer gesture. Input handlers translate pointer and keyboard
//! events into store operations and return [`Action`] values telling the
//! host page what changed. Nothing in the core touches the DOM, so it runs
//! natively under `cargo test` over a [`MemoryStorage`](crate::storage::MemoryStorage).
//!
//! `Editor` is a thin `wasm-bindgen` wrapper over `EditorCore<LocalStorage>`
//! that owns the `<canvas>` element. Its API speaks JSON strings; every error
//! becomes a `JsValue` string.
//!
//! ERROR HANDLING
//! ==============
//! Explicit operations (`save`, `export`, `login`, ...) return
//! [`EditorError`]. Pointer and keyboard handlers cannot fail from the host's
//! point of view: a failure there is reported as an [`Action::Notice`].

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use serde::Serialize;
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::camera::{Camera, Point};
use crate::consent::ConsentPreferences;
use crate::consts::{DEFAULT_DESIGN_NAME, GRID_SIZE};
use crate::doc::{CanvasSpec, Design, DesignElement, DesignId, ElementId, ElementPatch, NewElement, ShapeTag};
use crate::geometry::{self, Bounds};
use crate::input::{Button, InputState, Key, Modifiers, Shortcut};
use crate::render::{self, ExportFormat, ExportReceipt, UnknownFormat};
use crate::session::{Session, SessionError, Subscription, UserProfile};
use crate::storage::{KeyValueStorage, LocalStorage, StorageError};
use crate::store::{DesignStore, StoreError, ZMove};

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Format(#[from] UnknownFormat),
    #[error("invalid payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("invalid id: {0}")]
    Id(#[from] uuid::Error),
    #[error("unknown shape: {0}")]
    UnknownShape(String),
}

/// What changed, for the host page to react to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    ElementCreated { element: DesignElement },
    ElementUpdated { element: DesignElement },
    ElementDeleted { id: ElementId },
    SelectionChanged { id: Option<ElementId> },
    DesignReplaced { design: Design },
    SetCursor { cursor: String },
    RenderNeeded,
    Notice { message: String },
}

/// All editor logic that does not depend on the canvas element.
pub struct EditorCore<S> {
    pub store: DesignStore<S>,
    pub session: Session,
    pub camera: Camera,
    pub input: InputState,
    /// Snap dragged elements to the grid (hold Alt to bypass).
    pub snap_to_grid: bool,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub dpr: f64,
}

impl<S: KeyValueStorage> EditorCore<S> {
    /// Restore the session from `storage` and start on a blank design.
    ///
    /// An unreadable stored profile starts the editor signed out.
    pub fn new(storage: S) -> Self {
        let session = Session::restore(&storage).unwrap_or_else(|e| {
            warn!(error = %e, "stored profile unreadable; starting signed out");
            Session::signed_out()
        });
        let mut store = DesignStore::new(storage);
        store.create_blank(DEFAULT_DESIGN_NAME);
        Self {
            store,
            session,
            camera: Camera::default(),
            input: InputState::Idle,
            snap_to_grid: false,
            viewport_width: 0.0,
            viewport_height: 0.0,
            dpr: 1.0,
        }
    }

    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.viewport_width = width_css.max(0.0);
        self.viewport_height = height_css.max(0.0);
        self.dpr = if dpr > 0.0 { dpr } else { 1.0 };
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    #[must_use]
    pub fn design(&self) -> Option<&Design> {
        self.store.current()
    }

    #[must_use]
    pub fn selection(&self) -> Option<ElementId> {
        self.store.selection()
    }

    #[must_use]
    pub fn user(&self) -> Option<&UserProfile> {
        self.session.user()
    }

    /// The rubber-band rectangle while a marquee drag is in progress.
    #[must_use]
    pub fn marquee(&self) -> Option<Bounds> {
        match self.input {
            InputState::Marquee { start, current } => Some(Bounds::from_corners(start, current)),
            _ => None,
        }
    }

    fn element(&self, id: ElementId) -> Option<DesignElement> {
        self.store.current().and_then(|d| d.element(&id)).cloned()
    }

    // =========================================================================
    // DESIGN LIFECYCLE
    // =========================================================================

    pub fn new_design(&mut self, name: &str) -> Vec<Action> {
        let name = if name.trim().is_empty() { DEFAULT_DESIGN_NAME } else { name };
        self.store.create_blank(name);
        self.input = InputState::Idle;
        self.replaced()
    }

    /// Open a design built elsewhere, e.g. from a template.
    pub fn open_design(&mut self, design: Design) -> Vec<Action> {
        self.store.open(design);
        self.input = InputState::Idle;
        self.replaced()
    }

    /// Open a saved design. A missing id falls back to a fresh blank design
    /// and says so.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the saved collection cannot be read.
    pub fn open_saved(&mut self, id: DesignId) -> Result<Vec<Action>, EditorError> {
        self.input = InputState::Idle;
        match self.store.load(id) {
            Ok(_) => Ok(self.replaced()),
            Err(StoreError::DesignNotFound(_)) => {
                warn!(%id, "saved design not found; opening a blank design");
                self.store.create_blank(DEFAULT_DESIGN_NAME);
                let mut actions = self.replaced();
                actions.push(Action::Notice { message: "Design not found. Started a new one.".into() });
                Ok(actions)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn replaced(&self) -> Vec<Action> {
        let mut actions = Vec::with_capacity(3);
        if let Some(design) = self.store.current() {
            actions.push(Action::DesignReplaced { design: design.clone() });
        }
        actions.push(Action::SelectionChanged { id: self.store.selection() });
        actions.push(Action::RenderNeeded);
        actions
    }

    // =========================================================================
    // ELEMENT OPERATIONS
    // =========================================================================

    /// # Errors
    ///
    /// Returns [`EditorError::Store`] without an active design.
    pub fn add_element(&mut self, new: NewElement) -> Result<Vec<Action>, EditorError> {
        let element = self.store.add_element(new)?;
        let id = element.id;
        Ok(vec![
            Action::ElementCreated { element },
            Action::SelectionChanged { id: Some(id) },
            Action::RenderNeeded,
        ])
    }

    /// # Errors
    ///
    /// Returns [`EditorError::Store`] without an active design.
    pub fn add_text(&mut self, content: &str) -> Result<Vec<Action>, EditorError> {
        let content = if content.is_empty() { "Click to edit text" } else { content };
        self.add_element(NewElement::text(content))
    }

    /// # Errors
    ///
    /// Returns [`EditorError::Store`] without an active design.
    pub fn add_image(&mut self, data_ref: &str) -> Result<Vec<Action>, EditorError> {
        self.add_element(NewElement::image(data_ref))
    }

    /// # Errors
    ///
    /// Returns [`EditorError::Store`] without an active design.
    pub fn add_shape(&mut self, tag: ShapeTag) -> Result<Vec<Action>, EditorError> {
        self.add_element(NewElement::shape(tag))
    }

    /// # Errors
    ///
    /// Returns [`EditorError::Store`] without an active design.
    pub fn update_element(&mut self, id: ElementId, patch: &ElementPatch) -> Result<Vec<Action>, EditorError> {
        let applied = self.store.update_element(id, patch)?;
        Ok(self.updated(id, applied))
    }

    /// # Errors
    ///
    /// Returns [`EditorError::Store`] without an active design.
    pub fn merge_style(&mut self, id: ElementId, patch: &serde_json::Value) -> Result<Vec<Action>, EditorError> {
        let applied = self.store.merge_style(id, patch)?;
        Ok(self.updated(id, applied))
    }

    /// # Errors
    ///
    /// Returns [`EditorError::Store`] without an active design.
    pub fn toggle_visible(&mut self, id: ElementId) -> Result<Vec<Action>, EditorError> {
        let applied = self.store.toggle_visible(id)?;
        Ok(self.updated(id, applied))
    }

    fn updated(&self, id: ElementId, applied: bool) -> Vec<Action> {
        match self.element(id) {
            Some(element) if applied => vec![Action::ElementUpdated { element }, Action::RenderNeeded],
            _ => Vec::new(),
        }
    }

    /// # Errors
    ///
    /// Returns [`EditorError::Store`] without an active design.
    pub fn delete_element(&mut self, id: ElementId) -> Result<Vec<Action>, EditorError> {
        let had_selection = self.store.selection();
        if !self.store.delete_element(id)? {
            return Ok(Vec::new());
        }
        let mut actions = vec![Action::ElementDeleted { id }];
        if had_selection != self.store.selection() {
            actions.push(Action::SelectionChanged { id: self.store.selection() });
        }
        actions.push(Action::RenderNeeded);
        Ok(actions)
    }

    /// # Errors
    ///
    /// Returns [`EditorError::Store`] without an active design.
    pub fn reorder(&mut self, id: ElementId, to: ZMove) -> Result<Vec<Action>, EditorError> {
        if !self.store.reorder(id, to)? {
            return Ok(Vec::new());
        }
        Ok(self.replaced_keep_selection())
    }

    /// # Errors
    ///
    /// Returns [`EditorError::Store`] without an active design.
    pub fn set_canvas(&mut self, canvas: CanvasSpec) -> Result<Vec<Action>, EditorError> {
        self.store.set_canvas(canvas)?;
        Ok(self.replaced_keep_selection())
    }

    /// # Errors
    ///
    /// Returns [`EditorError::Store`] without an active design.
    pub fn rename(&mut self, name: &str) -> Result<Vec<Action>, EditorError> {
        self.store.rename(name)?;
        Ok(self.replaced_keep_selection())
    }

    fn replaced_keep_selection(&self) -> Vec<Action> {
        let mut actions = Vec::with_capacity(2);
        if let Some(design) = self.store.current() {
            actions.push(Action::DesignReplaced { design: design.clone() });
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// # Errors
    ///
    /// Returns [`EditorError::Store`] without an active design.
    pub fn select(&mut self, id: Option<ElementId>) -> Result<Vec<Action>, EditorError> {
        let before = self.store.selection();
        self.store.select(id)?;
        Ok(self.selection_delta(before))
    }

    fn selection_delta(&self, before: Option<ElementId>) -> Vec<Action> {
        let now = self.store.selection();
        if now == before {
            Vec::new()
        } else {
            vec![Action::SelectionChanged { id: now }, Action::RenderNeeded]
        }
    }

    // =========================================================================
    // HISTORY / CLIPBOARD
    // =========================================================================

    pub fn undo(&mut self) -> Vec<Action> {
        self.input = InputState::Idle;
        if self.store.undo() { self.replaced() } else { Vec::new() }
    }

    pub fn redo(&mut self) -> Vec<Action> {
        self.input = InputState::Idle;
        if self.store.redo() { self.replaced() } else { Vec::new() }
    }

    /// # Errors
    ///
    /// Returns [`EditorError::Store`] without an active design.
    pub fn copy(&mut self) -> Result<Vec<Action>, EditorError> {
        self.store.copy_selected()?;
        Ok(Vec::new())
    }

    /// # Errors
    ///
    /// Returns [`EditorError::Store`] without an active design.
    pub fn paste(&mut self) -> Result<Vec<Action>, EditorError> {
        let Some(element) = self.store.paste()? else {
            return Ok(Vec::new());
        };
        let id = element.id;
        Ok(vec![
            Action::ElementCreated { element },
            Action::SelectionChanged { id: Some(id) },
            Action::RenderNeeded,
        ])
    }

    // =========================================================================
    // PERSISTENCE / EXPORT
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if there is no active design or storage fails.
    pub fn save(&mut self) -> Result<Vec<Action>, EditorError> {
        self.store.save()?;
        Ok(vec![Action::Notice { message: "Design saved".into() }])
    }

    /// # Errors
    ///
    /// Returns a storage error if the saved collection cannot be read.
    pub fn saved_designs(&self) -> Result<Vec<Design>, EditorError> {
        Ok(self.store.saved_designs()?)
    }

    /// # Errors
    ///
    /// Returns a storage error if the saved collection cannot be updated.
    pub fn delete_saved(&mut self, id: DesignId) -> Result<bool, EditorError> {
        Ok(self.store.delete_saved(id)?)
    }

    /// # Errors
    ///
    /// Returns [`EditorError::Format`] for an unsupported format name, or a
    /// store error without an active design.
    pub fn export(&self, format: &str) -> Result<ExportReceipt, EditorError> {
        let format: ExportFormat = format.parse()?;
        Ok(self.store.export(format)?)
    }

    // =========================================================================
    // ACCOUNT / CONSENT
    // =========================================================================

    /// # Errors
    ///
    /// Returns a validation or storage error.
    pub fn login(&mut self, email: &str) -> Result<UserProfile, EditorError> {
        Ok(self.session.login(self.store.storage_mut(), email)?.clone())
    }

    /// # Errors
    ///
    /// Returns a validation or storage error.
    pub fn register(&mut self, email: &str, name: &str) -> Result<UserProfile, EditorError> {
        Ok(self.session.register(self.store.storage_mut(), email, name)?.clone())
    }

    /// # Errors
    ///
    /// Returns a storage error if the stored profile cannot be removed.
    pub fn logout(&mut self) -> Result<(), EditorError> {
        Ok(self.session.logout(self.store.storage_mut())?)
    }

    /// # Errors
    ///
    /// Returns [`SessionError::SignedOut`] or a storage error.
    pub fn upgrade(&mut self, plan: Subscription) -> Result<UserProfile, EditorError> {
        Ok(self.session.upgrade(self.store.storage_mut(), plan)?.clone())
    }

    /// # Errors
    ///
    /// Returns a storage error if the stored flags cannot be read.
    pub fn consent(&self) -> Result<Option<ConsentPreferences>, EditorError> {
        Ok(ConsentPreferences::load(self.store.storage())?)
    }

    /// # Errors
    ///
    /// Returns a storage error if the flags cannot be written.
    pub fn set_consent(&mut self, prefs: ConsentPreferences) -> Result<ConsentPreferences, EditorError> {
        Ok(prefs.save(self.store.storage_mut())?)
    }

    // =========================================================================
    // POINTER INPUT
    // =========================================================================

    pub fn on_pointer_down(&mut self, screen: Point, button: Button, _mods: Modifiers) -> Vec<Action> {
        if button == Button::Middle {
            self.input = InputState::Panning { last_screen: screen };
            return vec![Action::SetCursor { cursor: "grabbing".into() }];
        }
        if button != Button::Primary {
            return Vec::new();
        }

        let world = self.camera.screen_to_world(screen);
        let before = self.store.selection();
        let hit = geometry::hit_test(world, self.store.elements());
        let result = match hit.and_then(|id| self.element(id)) {
            Some(el) => {
                self.input = InputState::DraggingElement {
                    id: el.id,
                    grab_dx: world.x - el.x,
                    grab_dy: world.y - el.y,
                    moved: false,
                };
                self.store.select(Some(el.id))
            }
            None => {
                self.input = InputState::Marquee { start: world, current: world };
                self.store.select(None)
            }
        };
        if let Err(e) = result {
            self.input = InputState::Idle;
            return notice(&e);
        }

        let mut actions = self.selection_delta(before);
        if matches!(self.input, InputState::DraggingElement { .. }) {
            actions.push(Action::SetCursor { cursor: "grabbing".into() });
        }
        actions
    }

    pub fn on_pointer_move(&mut self, screen: Point, mods: Modifiers) -> Vec<Action> {
        match self.input {
            InputState::Idle => {
                let world = self.camera.screen_to_world(screen);
                let cursor = if geometry::hit_test(world, self.store.elements()).is_some() { "move" } else { "default" };
                vec![Action::SetCursor { cursor: cursor.into() }]
            }
            InputState::Panning { last_screen } => {
                self.camera.pan_x += screen.x - last_screen.x;
                self.camera.pan_y += screen.y - last_screen.y;
                self.input = InputState::Panning { last_screen: screen };
                vec![Action::RenderNeeded]
            }
            InputState::DraggingElement { id, grab_dx, grab_dy, .. } => {
                let world = self.camera.screen_to_world(screen);
                let mut x = world.x - grab_dx;
                let mut y = world.y - grab_dy;
                if self.snap_to_grid && !mods.alt {
                    x = geometry::snap_to_grid(x, GRID_SIZE);
                    y = geometry::snap_to_grid(y, GRID_SIZE);
                }
                self.input = InputState::DraggingElement { id, grab_dx, grab_dy, moved: true };
                match self.store.preview_update(id, &ElementPatch::position(x, y)) {
                    Ok(applied) => self.updated(id, applied),
                    Err(e) => notice(&e),
                }
            }
            InputState::Marquee { start, .. } => {
                let current = self.camera.screen_to_world(screen);
                self.input = InputState::Marquee { start, current };
                vec![Action::RenderNeeded]
            }
        }
    }

    pub fn on_pointer_up(&mut self, screen: Point, _button: Button, _mods: Modifiers) -> Vec<Action> {
        let gesture = std::mem::take(&mut self.input);
        match gesture {
            InputState::Idle => Vec::new(),
            InputState::Panning { .. } => vec![Action::SetCursor { cursor: "default".into() }],
            InputState::DraggingElement { id, moved, .. } => {
                let mut actions = vec![Action::SetCursor { cursor: "move".into() }];
                if moved && self.store.commit() {
                    debug!(%id, "drag committed");
                    actions.push(Action::RenderNeeded);
                }
                actions
            }
            InputState::Marquee { start, .. } => {
                let end = self.camera.screen_to_world(screen);
                let before = self.store.selection();
                // Single selection: the topmost element inside the rectangle wins.
                let picked = geometry::elements_in_marquee(start, end, self.store.elements()).last().copied();
                if let Err(e) = self.store.select(picked) {
                    return notice(&e);
                }
                let mut actions = self.selection_delta(before);
                if !actions.contains(&Action::RenderNeeded) {
                    actions.push(Action::RenderNeeded);
                }
                actions
            }
        }
    }

    /// Ctrl/Cmd + wheel zooms around the pointer; plain wheel pans.
    pub fn on_wheel(&mut self, screen: Point, delta: (f64, f64), mods: Modifiers) -> Vec<Action> {
        let (dx, dy) = delta;
        if mods.command() {
            if dy < 0.0 {
                self.camera.zoom_in(screen);
            } else if dy > 0.0 {
                self.camera.zoom_out(screen);
            }
        } else {
            self.camera.pan_x -= dx;
            self.camera.pan_y -= dy;
        }
        vec![Action::RenderNeeded]
    }

    // =========================================================================
    // KEYBOARD INPUT
    // =========================================================================

    pub fn on_key_down(&mut self, key: &Key, mods: Modifiers) -> Vec<Action> {
        let Some(shortcut) = Shortcut::from_key(key, mods) else {
            return Vec::new();
        };
        let result = match shortcut {
            Shortcut::Undo => Ok(self.undo()),
            Shortcut::Redo => Ok(self.redo()),
            Shortcut::Copy => self.copy(),
            Shortcut::Paste => self.paste(),
            Shortcut::Save => self.save(),
            Shortcut::Delete => match self.store.selection() {
                Some(id) => self.delete_element(id),
                None => Ok(Vec::new()),
            },
            Shortcut::Deselect => {
                self.input = InputState::Idle;
                self.select(None)
            }
            Shortcut::ZoomIn | Shortcut::ZoomOut => {
                let center = Point::new(self.viewport_width / 2.0, self.viewport_height / 2.0);
                if shortcut == Shortcut::ZoomIn {
                    self.camera.zoom_in(center);
                } else {
                    self.camera.zoom_out(center);
                }
                Ok(vec![Action::RenderNeeded])
            }
        };
        result.unwrap_or_else(|e| notice(&e))
    }
}

fn notice(err: &dyn std::error::Error) -> Vec<Action> {
    warn!(error = %err, "editor operation failed");
    vec![Action::Notice { message: err.to_string() }]
}

// =============================================================================
// BROWSER BINDING
// =============================================================================

fn js_err(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(js_err)
}

fn parse_id(raw: &str) -> Result<uuid::Uuid, JsValue> {
    uuid::Uuid::parse_str(raw).map_err(js_err)
}

fn parse_mods(raw: &str) -> Modifiers {
    serde_json::from_str(raw).unwrap_or_default()
}

/// The editor as seen from the host page.
#[wasm_bindgen]
pub struct Editor {
    canvas: HtmlCanvasElement,
    core: EditorCore<LocalStorage>,
}

#[wasm_bindgen]
impl Editor {
    /// Bind to `canvas` and the window's `localStorage`.
    ///
    /// # Errors
    ///
    /// Fails when `localStorage` is unavailable.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement) -> Result<Editor, JsValue> {
        let storage = LocalStorage::open().map_err(js_err)?;
        Ok(Self { canvas, core: EditorCore::new(storage) })
    }

    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.core.set_viewport(width_css, height_css, dpr);
    }

    pub fn set_snap_to_grid(&mut self, enabled: bool) {
        self.core.snap_to_grid = enabled;
    }

    /// Draw the current state to the canvas.
    ///
    /// # Errors
    ///
    /// Fails if the 2D context cannot be obtained or a draw call fails.
    pub fn render(&self) -> Result<(), JsValue> {
        let Some(design) = self.core.design() else {
            return Ok(());
        };
        let ctx = self
            .canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| JsValue::from_str("unexpected context type"))?;
        render::draw(
            &ctx,
            design,
            &self.core.camera,
            self.core.selection(),
            self.core.marquee(),
            (self.core.viewport_width, self.core.viewport_height),
            self.core.dpr,
        )
    }

    // --- Queries ---

    /// # Errors
    ///
    /// Fails only if serialization fails.
    pub fn design_json(&self) -> Result<String, JsValue> {
        to_json(&self.core.design())
    }

    #[must_use]
    pub fn selection(&self) -> Option<String> {
        self.core.selection().map(|id| id.to_string())
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.core.store.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.core.store.can_redo()
    }

    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.core.camera.zoom
    }

    // --- Design lifecycle ---

    /// # Errors
    ///
    /// Fails only if serialization fails.
    pub fn new_design(&mut self, name: &str) -> Result<String, JsValue> {
        to_json(&self.core.new_design(name))
    }

    /// # Errors
    ///
    /// Fails on malformed design JSON.
    pub fn open_design(&mut self, design_json: &str) -> Result<String, JsValue> {
        let design: Design = serde_json::from_str(design_json).map_err(js_err)?;
        to_json(&self.core.open_design(design))
    }

    /// # Errors
    ///
    /// Fails on a malformed id or unreadable storage.
    pub fn open_saved(&mut self, id: &str) -> Result<String, JsValue> {
        let actions = self.core.open_saved(parse_id(id)?).map_err(js_err)?;
        to_json(&actions)
    }

    // --- Elements ---

    /// # Errors
    ///
    /// Fails without an active design.
    pub fn add_text(&mut self, content: &str) -> Result<String, JsValue> {
        to_json(&self.core.add_text(content).map_err(js_err)?)
    }

    /// # Errors
    ///
    /// Fails without an active design.
    pub fn add_image(&mut self, data_ref: &str) -> Result<String, JsValue> {
        to_json(&self.core.add_image(data_ref).map_err(js_err)?)
    }

    /// # Errors
    ///
    /// Fails on an unknown shape name or without an active design.
    pub fn add_shape(&mut self, shape: &str) -> Result<String, JsValue> {
        let tag = ShapeTag::from_name(shape).ok_or_else(|| js_err(EditorError::UnknownShape(shape.into())))?;
        to_json(&self.core.add_shape(tag).map_err(js_err)?)
    }

    /// # Errors
    ///
    /// Fails on a malformed id or patch.
    pub fn update_element(&mut self, id: &str, patch_json: &str) -> Result<String, JsValue> {
        let patch: ElementPatch = serde_json::from_str(patch_json).map_err(js_err)?;
        to_json(&self.core.update_element(parse_id(id)?, &patch).map_err(js_err)?)
    }

    /// # Errors
    ///
    /// Fails on a malformed id or patch.
    pub fn merge_style(&mut self, id: &str, patch_json: &str) -> Result<String, JsValue> {
        let patch: serde_json::Value = serde_json::from_str(patch_json).map_err(js_err)?;
        to_json(&self.core.merge_style(parse_id(id)?, &patch).map_err(js_err)?)
    }

    /// # Errors
    ///
    /// Fails on a malformed id.
    pub fn toggle_visible(&mut self, id: &str) -> Result<String, JsValue> {
        to_json(&self.core.toggle_visible(parse_id(id)?).map_err(js_err)?)
    }

    /// # Errors
    ///
    /// Fails on a malformed id.
    pub fn delete_element(&mut self, id: &str) -> Result<String, JsValue> {
        to_json(&self.core.delete_element(parse_id(id)?).map_err(js_err)?)
    }

    /// `to` is one of `to_front`, `to_back`, `forward`, `backward`.
    ///
    /// # Errors
    ///
    /// Fails on a malformed id or direction.
    pub fn reorder(&mut self, id: &str, to: &str) -> Result<String, JsValue> {
        let to: ZMove = serde_json::from_value(serde_json::Value::String(to.to_owned())).map_err(js_err)?;
        to_json(&self.core.reorder(parse_id(id)?, to).map_err(js_err)?)
    }

    /// # Errors
    ///
    /// Fails on malformed canvas JSON.
    pub fn set_canvas(&mut self, canvas_json: &str) -> Result<String, JsValue> {
        let canvas: CanvasSpec = serde_json::from_str(canvas_json).map_err(js_err)?;
        to_json(&self.core.set_canvas(canvas).map_err(js_err)?)
    }

    /// # Errors
    ///
    /// Fails without an active design.
    pub fn rename(&mut self, name: &str) -> Result<String, JsValue> {
        to_json(&self.core.rename(name).map_err(js_err)?)
    }

    // --- History / clipboard ---

    /// # Errors
    ///
    /// Fails only if serialization fails.
    pub fn undo(&mut self) -> Result<String, JsValue> {
        to_json(&self.core.undo())
    }

    /// # Errors
    ///
    /// Fails only if serialization fails.
    pub fn redo(&mut self) -> Result<String, JsValue> {
        to_json(&self.core.redo())
    }

    /// # Errors
    ///
    /// Fails without an active design.
    pub fn copy(&mut self) -> Result<String, JsValue> {
        to_json(&self.core.copy().map_err(js_err)?)
    }

    /// # Errors
    ///
    /// Fails without an active design.
    pub fn paste(&mut self) -> Result<String, JsValue> {
        to_json(&self.core.paste().map_err(js_err)?)
    }

    // --- Persistence / export ---

    /// # Errors
    ///
    /// Fails if storage rejects the write.
    pub fn save(&mut self) -> Result<String, JsValue> {
        to_json(&self.core.save().map_err(js_err)?)
    }

    /// # Errors
    ///
    /// Fails if the saved collection cannot be read.
    pub fn saved_designs_json(&self) -> Result<String, JsValue> {
        to_json(&self.core.saved_designs().map_err(js_err)?)
    }

    /// # Errors
    ///
    /// Fails on a malformed id or unwritable storage.
    pub fn delete_saved(&mut self, id: &str) -> Result<bool, JsValue> {
        self.core.delete_saved(parse_id(id)?).map_err(js_err)
    }

    /// Returns the export receipt as JSON.
    ///
    /// # Errors
    ///
    /// Fails on an unsupported format.
    pub fn export(&self, format: &str) -> Result<String, JsValue> {
        to_json(&self.core.export(format).map_err(js_err)?)
    }

    // --- Account / consent ---

    /// # Errors
    ///
    /// Fails only if serialization fails.
    pub fn user_json(&self) -> Result<String, JsValue> {
        to_json(&self.core.user())
    }

    /// # Errors
    ///
    /// Fails on an invalid email or unwritable storage.
    pub fn login(&mut self, email: &str) -> Result<String, JsValue> {
        to_json(&self.core.login(email).map_err(js_err)?)
    }

    /// # Errors
    ///
    /// Fails on invalid input or unwritable storage.
    pub fn register(&mut self, email: &str, name: &str) -> Result<String, JsValue> {
        to_json(&self.core.register(email, name).map_err(js_err)?)
    }

    /// # Errors
    ///
    /// Fails if storage rejects the removal.
    pub fn logout(&mut self) -> Result<(), JsValue> {
        self.core.logout().map_err(js_err)
    }

    /// `plan` is one of `free`, `pro`, `enterprise`.
    ///
    /// # Errors
    ///
    /// Fails when signed out, on an unknown plan, or on unwritable storage.
    pub fn upgrade(&mut self, plan: &str) -> Result<String, JsValue> {
        let plan: Subscription =
            serde_json::from_value(serde_json::Value::String(plan.to_owned())).map_err(js_err)?;
        to_json(&self.core.upgrade(plan).map_err(js_err)?)
    }

    /// `null` until the visitor has answered the consent banner.
    ///
    /// # Errors
    ///
    /// Fails if the stored flags cannot be read.
    pub fn consent_json(&self) -> Result<String, JsValue> {
        to_json(&self.core.consent().map_err(js_err)?)
    }

    /// # Errors
    ///
    /// Fails on malformed JSON or unwritable storage.
    pub fn set_consent(&mut self, prefs_json: &str) -> Result<String, JsValue> {
        let prefs: ConsentPreferences = serde_json::from_str(prefs_json).map_err(js_err)?;
        to_json(&self.core.set_consent(prefs).map_err(js_err)?)
    }

    // --- Input events ---
    //
    // `mods_json` is `{"shift":bool,"ctrl":bool,"alt":bool,"meta":bool}`;
    // missing or malformed fields read as not held.

    /// # Errors
    ///
    /// Fails only if serialization fails.
    pub fn on_pointer_down(&mut self, x: f64, y: f64, button: i16, mods_json: &str) -> Result<String, JsValue> {
        to_json(&self.core.on_pointer_down(Point::new(x, y), Button::from_dom(button), parse_mods(mods_json)))
    }

    /// # Errors
    ///
    /// Fails only if serialization fails.
    pub fn on_pointer_move(&mut self, x: f64, y: f64, mods_json: &str) -> Result<String, JsValue> {
        to_json(&self.core.on_pointer_move(Point::new(x, y), parse_mods(mods_json)))
    }

    /// # Errors
    ///
    /// Fails only if serialization fails.
    pub fn on_pointer_up(&mut self, x: f64, y: f64, button: i16, mods_json: &str) -> Result<String, JsValue> {
        to_json(&self.core.on_pointer_up(Point::new(x, y), Button::from_dom(button), parse_mods(mods_json)))
    }

    /// # Errors
    ///
    /// Fails only if serialization fails.
    pub fn on_wheel(&mut self, x: f64, y: f64, dx: f64, dy: f64, mods_json: &str) -> Result<String, JsValue> {
        to_json(&self.core.on_wheel(Point::new(x, y), (dx, dy), parse_mods(mods_json)))
    }

    /// # Errors
    ///
    /// Fails only if serialization fails.
    pub fn on_key_down(&mut self, key: &str, mods_json: &str) -> Result<String, JsValue> {
        to_json(&self.core.on_key_down(&Key(key.to_owned()), parse_mods(mods_json)))
    }
}
