//! Document model: designs, their elements, and sparse element updates.
//!
//! This module defines what is on the canvas (`Design`, `DesignElement`,
//! `ElementKind`), the payload used to create an element (`NewElement`), the
//! sparse-update type for edits (`ElementPatch`), and a typed accessor for the
//! open-ended `style` JSON bag (`Style`).
//!
//! `Design::elements` is always kept sorted by `z_index`, so the vector order
//! and the explicit integer order agree and a renderer may read either.
//!
//! Patch semantics are shallow: an `ElementPatch` with `style` set replaces
//! the element's whole style object. Key-level style edits go through
//! [`merge_style`] instead.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::{DEFAULT_BACKGROUND, DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH};

/// Unique identifier for an element within a design.
pub type ElementId = Uuid;

/// Unique identifier for a design.
pub type DesignId = Uuid;

/// The kind of a design element. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// Literal text; `content` is the text itself.
    Text,
    /// Raster image; `content` is an image-data reference (usually a data URL).
    Image,
    /// Simple shape; `content` is the shape tag (see [`ShapeTag`]).
    Shape,
}

/// Shape tags understood by the shape presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeTag {
    Rectangle,
    Circle,
}

impl ShapeTag {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rectangle => "rectangle",
            Self::Circle => "circle",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "rectangle" => Some(Self::Rectangle),
            "circle" => Some(Self::Circle),
            _ => None,
        }
    }
}

/// A positioned element as stored in a design and in saved output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignElement {
    /// Unique identifier, assigned at creation.
    pub id: ElementId,
    /// Text, image or shape. Older saves call this `type`.
    #[serde(alias = "type")]
    pub kind: ElementKind,
    /// Left edge in canvas coordinates.
    pub x: f64,
    /// Top edge in canvas coordinates.
    pub y: f64,
    /// Width in canvas units; never negative.
    pub width: f64,
    /// Height in canvas units; never negative.
    pub height: f64,
    /// Clockwise rotation in degrees around the element center.
    #[serde(default)]
    pub rotation: f64,
    /// Opacity in `0.0..=1.0`.
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// Stacking order; lower values are painted beneath higher values.
    #[serde(default)]
    pub z_index: i64,
    /// Kind-dependent payload.
    pub content: String,
    /// Open attribute bag (font, colors, radius, alignment, ...).
    #[serde(default = "empty_style")]
    pub style: serde_json::Value,
    /// Hidden elements stay in the design but are never rendered or exported.
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_opacity() -> f64 {
    1.0
}

fn default_visible() -> bool {
    true
}

fn empty_style() -> serde_json::Value {
    serde_json::json!({})
}

/// Canvas metadata for a design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasSpec {
    pub width: f64,
    pub height: f64,
    pub background_color: String,
}

impl Default for CanvasSpec {
    fn default() -> Self {
        Self {
            width: DEFAULT_CANVAS_WIDTH,
            height: DEFAULT_CANVAS_HEIGHT,
            background_color: DEFAULT_BACKGROUND.to_owned(),
        }
    }
}

/// A design document: canvas metadata plus elements in paint order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Design {
    pub id: DesignId,
    pub name: String,
    /// Elements sorted by `z_index`; later entries paint above earlier ones.
    #[serde(default)]
    pub elements: Vec<DesignElement>,
    #[serde(default)]
    pub canvas: CanvasSpec,
    /// Template this design was started from. Provenance only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

impl Design {
    /// A new design with no elements and the default canvas.
    #[must_use]
    pub fn blank(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            elements: Vec::new(),
            canvas: CanvasSpec::default(),
            template: None,
        }
    }

    #[must_use]
    pub fn element(&self, id: &ElementId) -> Option<&DesignElement> {
        self.elements.iter().find(|el| &el.id == id)
    }

    pub fn element_mut(&mut self, id: &ElementId) -> Option<&mut DesignElement> {
        self.elements.iter_mut().find(|el| &el.id == id)
    }

    /// Index of an element in paint order.
    #[must_use]
    pub fn position(&self, id: &ElementId) -> Option<usize> {
        self.elements.iter().position(|el| &el.id == id)
    }

    /// The `z_index` a newly appended element should take.
    ///
    /// When the top element already sits at `i64::MAX` the elements are
    /// renumbered densely first, so the result always sorts above them.
    #[must_use]
    pub fn next_z_index(&mut self) -> i64 {
        let Some(top) = self.elements.last().map(|el| el.z_index) else {
            return 0;
        };
        if let Some(next) = top.checked_add(1) {
            return next;
        }
        self.renumber();
        i64::try_from(self.elements.len()).unwrap_or(i64::MAX)
    }

    /// Rewrite `z_index` values as `0..len` following the current vector order.
    pub fn renumber(&mut self) {
        for (z, el) in (0_i64..).zip(self.elements.iter_mut()) {
            el.z_index = z;
        }
    }

    /// Restore the structural invariants on a design that came from outside
    /// the store (storage, templates, the host page).
    ///
    /// Elements are stably sorted by `z_index`; tied values are renumbered so
    /// the vector order becomes the explicit order. Repeated element ids get
    /// fresh ids. Designs produced by the store are left untouched.
    pub fn normalize(&mut self) {
        self.elements.sort_by_key(|el| el.z_index);
        let tied = self
            .elements
            .windows(2)
            .any(|pair| pair[0].z_index == pair[1].z_index);
        if tied {
            self.renumber();
        }

        let mut seen = HashSet::with_capacity(self.elements.len());
        for el in &mut self.elements {
            if !seen.insert(el.id) {
                el.id = Uuid::new_v4();
                seen.insert(el.id);
            }
        }
    }
}

/// Everything needed to create an element except its id and stacking order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewElement {
    #[serde(alias = "type")]
    pub kind: ElementKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default)]
    pub content: String,
    #[serde(default = "empty_style")]
    pub style: serde_json::Value,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

impl NewElement {
    /// Bare element of `kind` at the origin with zero size.
    #[must_use]
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            rotation: 0.0,
            opacity: 1.0,
            content: String::new(),
            style: empty_style(),
            visible: true,
        }
    }

    /// Text preset: 200×50 at (100, 100), 24px Inter, black, left aligned.
    #[must_use]
    pub fn text(content: &str) -> Self {
        Self {
            content: content.to_owned(),
            style: serde_json::json!({
                "fontSize": 24,
                "fontFamily": "Inter",
                "color": "#000000",
                "textAlign": "left",
            }),
            ..Self::new(ElementKind::Text)
        }
        .at(100.0, 100.0)
        .sized(200.0, 50.0)
    }

    /// Image preset: 200×150 at (150, 150).
    #[must_use]
    pub fn image(data_ref: &str) -> Self {
        Self { content: data_ref.to_owned(), ..Self::new(ElementKind::Image) }
            .at(150.0, 150.0)
            .sized(200.0, 150.0)
    }

    /// Shape preset: 100×100 at (200, 200), blue fill, circles fully rounded.
    #[must_use]
    pub fn shape(tag: ShapeTag) -> Self {
        let radius = match tag {
            ShapeTag::Rectangle => 0,
            ShapeTag::Circle => 50,
        };
        Self {
            content: tag.as_str().to_owned(),
            style: serde_json::json!({
                "backgroundColor": "#3B82F6",
                "borderRadius": radius,
            }),
            ..Self::new(ElementKind::Shape)
        }
        .at(200.0, 200.0)
        .sized(100.0, 100.0)
    }

    #[must_use]
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    #[must_use]
    pub fn sized(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: serde_json::Value) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Materialize the element with the given id and stacking order.
    #[must_use]
    pub fn into_element(self, id: ElementId, z_index: i64) -> DesignElement {
        DesignElement {
            id,
            kind: self.kind,
            x: self.x,
            y: self.y,
            width: clamp_extent(self.width),
            height: clamp_extent(self.height),
            rotation: self.rotation,
            opacity: clamp_opacity(self.opacity),
            z_index,
            content: self.content,
            style: normalize_style(self.style),
            visible: self.visible,
        }
    }
}

/// Sparse update for an element. Only present fields are applied.
///
/// `kind`, `id` and `z_index` are not patchable. A present `style` replaces
/// the whole style object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
}

impl ElementPatch {
    /// Patch that moves an element to `(x, y)`.
    #[must_use]
    pub fn position(x: f64, y: f64) -> Self {
        Self { x: Some(x), y: Some(y), ..Default::default() }
    }

    /// Patch that resizes an element.
    #[must_use]
    pub fn size(width: f64, height: f64) -> Self {
        Self { width: Some(width), height: Some(height), ..Default::default() }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the present fields to `el`.
    pub fn apply_to(&self, el: &mut DesignElement) {
        if let Some(x) = self.x {
            el.x = x;
        }
        if let Some(y) = self.y {
            el.y = y;
        }
        if let Some(w) = self.width {
            el.width = clamp_extent(w);
        }
        if let Some(h) = self.height {
            el.height = clamp_extent(h);
        }
        if let Some(r) = self.rotation {
            el.rotation = r;
        }
        if let Some(o) = self.opacity {
            el.opacity = clamp_opacity(o);
        }
        if let Some(ref content) = self.content {
            el.content.clone_from(content);
        }
        if let Some(ref style) = self.style {
            el.style = normalize_style(style.clone());
        }
        if let Some(v) = self.visible {
            el.visible = v;
        }
    }
}

/// Merge `patch` into `style` key by key. `null` values delete keys.
///
/// Returns false (leaving `style` untouched) if `patch` is not a JSON object.
pub fn merge_style(style: &mut serde_json::Value, patch: &serde_json::Value) -> bool {
    let Some(incoming) = patch.as_object() else {
        return false;
    };

    if !style.is_object() {
        *style = empty_style();
    }

    if let Some(existing) = style.as_object_mut() {
        for (k, v) in incoming {
            if v.is_null() {
                existing.remove(k);
            } else {
                existing.insert(k.clone(), v.clone());
            }
        }
    }
    true
}

fn clamp_extent(v: f64) -> f64 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

fn clamp_opacity(v: f64) -> f64 {
    if v.is_finite() { v.clamp(0.0, 1.0) } else { 1.0 }
}

fn normalize_style(style: serde_json::Value) -> serde_json::Value {
    if style.is_object() { style } else { empty_style() }
}

/// Typed access to common style fields from a `DesignElement.style` value.
///
/// Keys use the camelCase names the host page writes (`fontSize`,
/// `backgroundColor`, ...).
pub struct Style<'a> {
    value: &'a serde_json::Value,
}

impl<'a> Style<'a> {
    #[must_use]
    pub fn new(value: &'a serde_json::Value) -> Self {
        Self { value }
    }

    fn str_or(&self, key: &str, default: &'a str) -> &'a str {
        self.value
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or(default)
    }

    /// Font size in canvas units. Defaults to `16.0`.
    #[must_use]
    pub fn font_size(&self) -> f64 {
        self.value
            .get("fontSize")
            .and_then(serde_json::Value::as_f64)
            .unwrap_or(16.0)
    }

    /// Font family. Defaults to `"Inter"`.
    #[must_use]
    pub fn font_family(&self) -> &'a str {
        self.str_or("fontFamily", "Inter")
    }

    /// Text color. Defaults to `"#000000"`.
    #[must_use]
    pub fn color(&self) -> &'a str {
        self.str_or("color", "#000000")
    }

    /// Fill color, if any.
    #[must_use]
    pub fn background_color(&self) -> Option<&'a str> {
        self.value.get("backgroundColor").and_then(|v| v.as_str())
    }

    /// Corner radius. Defaults to `0.0`.
    #[must_use]
    pub fn border_radius(&self) -> f64 {
        self.value
            .get("borderRadius")
            .and_then(serde_json::Value::as_f64)
            .unwrap_or(0.0)
    }

    #[must_use]
    pub fn font_weight(&self) -> &'a str {
        self.str_or("fontWeight", "normal")
    }

    #[must_use]
    pub fn font_style(&self) -> &'a str {
        self.str_or("fontStyle", "normal")
    }

    #[must_use]
    pub fn text_decoration(&self) -> &'a str {
        self.str_or("textDecoration", "none")
    }

    #[must_use]
    pub fn text_align(&self) -> &'a str {
        self.str_or("textAlign", "left")
    }
}
