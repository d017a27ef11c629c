//! Rendering: the paint list, the canvas preview and export manifests.
//!
//! [`render_list`] is the single source of truth for what is drawn: visible
//! elements in paint order. Both the on-screen preview ([`draw`]) and export
//! manifests are built from it, so a hidden element can never leak into
//! either.
//!
//! Export stops at the manifest. Turning a manifest into PNG/JPG/PDF bytes is
//! done by the host page; [`ExportReceipt`] acknowledges that the request was
//! well-formed and records what it covers.
//!
//! [`draw`] is the only place that touches
//! [`web_sys::CanvasRenderingContext2d`]. It reads document and camera state
//! and mutates nothing.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::camera::Camera;
use crate::doc::{CanvasSpec, Design, DesignElement, DesignId, ElementId, ElementKind, Style};
use crate::geometry::Bounds;

/// Selection outline color.
const SELECTION_COLOR: &str = "#1E90FF";

/// Selection dash segment length in screen pixels.
const SELECTION_DASH_PX: f64 = 4.0;

/// Visible elements of `design` in paint order (bottom first).
#[must_use]
pub fn render_list(design: &Design) -> Vec<&DesignElement> {
    design.elements.iter().filter(|el| el.visible).collect()
}

// =============================================================
// Export
// =============================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported export format: {0}")]
pub struct UnknownFormat(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Jpg,
    Pdf,
}

impl ExportFormat {
    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpg => "image/jpeg",
            Self::Pdf => "application/pdf",
        }
    }

    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
            Self::Pdf => "pdf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpg),
            "pdf" => Ok(Self::Pdf),
            _ => Err(UnknownFormat(s.to_owned())),
        }
    }
}

/// What an export of a design would contain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportManifest {
    pub design_id: DesignId,
    pub design_name: String,
    pub format: ExportFormat,
    pub mime_type: String,
    /// `<slug of the design name>.<extension>`.
    pub file_name: String,
    pub canvas: CanvasSpec,
    /// Visible elements only, in paint order.
    pub elements: Vec<DesignElement>,
}

impl ExportManifest {
    #[must_use]
    pub fn for_design(design: &Design, format: ExportFormat) -> Self {
        Self {
            design_id: design.id,
            design_name: design.name.clone(),
            format,
            mime_type: format.mime_type().to_owned(),
            file_name: format!("{}.{}", slugify(&design.name), format.extension()),
            canvas: design.canvas.clone(),
            elements: render_list(design).into_iter().cloned().collect(),
        }
    }
}

/// Acknowledgement that an export request was accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportReceipt {
    /// Milliseconds since the Unix epoch.
    pub accepted_at_ms: u64,
    pub manifest: ExportManifest,
}

impl ExportReceipt {
    #[must_use]
    pub fn accept(manifest: ExportManifest) -> Self {
        Self { accepted_at_ms: now_ms(), manifest }
    }
}

/// Lowercase ASCII file stem: runs of anything else collapse to one `-`.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-');
    if slug.is_empty() { "design".to_owned() } else { slug.to_owned() }
}

#[cfg(target_arch = "wasm32")]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn now_ms() -> u64 {
    js_sys::Date::now() as u64
}

#[cfg(not(target_arch = "wasm32"))]
fn now_ms() -> u64 {
    let since_epoch = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    u64::try_from(since_epoch.as_millis()).unwrap_or(u64::MAX)
}

// =============================================================
// Canvas preview
// =============================================================

/// Draw the design preview: background, visible elements, selection outline
/// and the rubber-band rectangle while one is being dragged.
///
/// `viewport` is `(width, height)` in CSS pixels. `dpr` is the device pixel
/// ratio.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails.
pub fn draw(
    ctx: &CanvasRenderingContext2d,
    design: &Design,
    camera: &Camera,
    selected: Option<ElementId>,
    marquee: Option<Bounds>,
    viewport: (f64, f64),
    dpr: f64,
) -> Result<(), JsValue> {
    let (viewport_w, viewport_h) = viewport;
    ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, viewport_w, viewport_h);
    ctx.translate(camera.pan_x, camera.pan_y)?;
    ctx.scale(camera.zoom, camera.zoom)?;

    ctx.set_fill_style_str(&design.canvas.background_color);
    ctx.fill_rect(0.0, 0.0, design.canvas.width, design.canvas.height);

    for el in render_list(design) {
        draw_element(ctx, el)?;
    }

    if let Some(el) = selected.and_then(|id| design.element(&id)) {
        if el.visible {
            draw_selection(ctx, el, camera.zoom)?;
        }
    }

    if let Some(m) = marquee {
        draw_marquee(ctx, m, camera.zoom)?;
    }
    Ok(())
}

fn draw_element(ctx: &CanvasRenderingContext2d, el: &DesignElement) -> Result<(), JsValue> {
    if el.width <= 0.0 || el.height <= 0.0 {
        return Ok(());
    }
    let style = Style::new(&el.style);
    ctx.save();
    ctx.set_global_alpha(el.opacity);
    translate_and_rotate(ctx, el)?;
    match el.kind {
        ElementKind::Text => draw_text(ctx, el, &style)?,
        ElementKind::Shape => draw_shape(ctx, el, &style)?,
        ElementKind::Image => draw_image_frame(ctx, el)?,
    }
    ctx.restore();
    Ok(())
}

fn draw_shape(ctx: &CanvasRenderingContext2d, el: &DesignElement, style: &Style<'_>) -> Result<(), JsValue> {
    let hw = el.width / 2.0;
    let hh = el.height / 2.0;
    ctx.set_fill_style_str(style.background_color().unwrap_or("#3B82F6"));

    if el.content == "circle" {
        ctx.begin_path();
        ctx.ellipse(0.0, 0.0, hw, hh, 0.0, 0.0, 2.0 * PI)?;
        ctx.fill();
        return Ok(());
    }

    // borderRadius is a percentage of the shorter side, as in CSS `50%`.
    let radius = (style.border_radius() / 100.0 * el.width.min(el.height)).clamp(0.0, hw.min(hh));
    if radius <= 0.0 {
        ctx.fill_rect(-hw, -hh, el.width, el.height);
        return Ok(());
    }
    ctx.begin_path();
    ctx.move_to(-hw + radius, -hh);
    ctx.arc_to(hw, -hh, hw, hh, radius)?;
    ctx.arc_to(hw, hh, -hw, hh, radius)?;
    ctx.arc_to(-hw, hh, -hw, -hh, radius)?;
    ctx.arc_to(-hw, -hh, hw, -hh, radius)?;
    ctx.close_path();
    ctx.fill();
    Ok(())
}

/// Images are composited by the host page; the preview marks their frame.
fn draw_image_frame(ctx: &CanvasRenderingContext2d, el: &DesignElement) -> Result<(), JsValue> {
    let hw = el.width / 2.0;
    let hh = el.height / 2.0;
    ctx.set_fill_style_str("#F3F4F6");
    ctx.fill_rect(-hw, -hh, el.width, el.height);
    ctx.set_stroke_style_str("#9CA3AF");
    ctx.set_line_width(1.0);
    ctx.stroke_rect(-hw, -hh, el.width, el.height);
    ctx.begin_path();
    ctx.move_to(-hw, -hh);
    ctx.line_to(hw, hh);
    ctx.move_to(hw, -hh);
    ctx.line_to(-hw, hh);
    ctx.stroke();
    Ok(())
}

fn draw_text(ctx: &CanvasRenderingContext2d, el: &DesignElement, style: &Style<'_>) -> Result<(), JsValue> {
    if el.content.trim().is_empty() {
        return Ok(());
    }
    let hw = el.width / 2.0;
    let hh = el.height / 2.0;
    let font_size = style.font_size().clamp(6.0, 400.0);

    if let Some(fill) = style.background_color() {
        ctx.set_fill_style_str(fill);
        ctx.fill_rect(-hw, -hh, el.width, el.height);
    }

    ctx.set_fill_style_str(style.color());
    ctx.set_text_baseline("top");
    ctx.set_font(&format!(
        "{} {} {font_size}px {}",
        style.font_style(),
        style.font_weight(),
        style.font_family()
    ));
    let (align, x) = match style.text_align() {
        "center" => ("center", 0.0),
        "right" => ("right", hw),
        _ => ("left", -hw),
    };
    ctx.set_text_align(align);

    let line_height = font_size * 1.2;
    let underline = style.text_decoration() == "underline";
    let mut y = -hh;
    for line in wrap_text_lines(ctx, &el.content, el.width.max(1.0)) {
        if y + line_height > hh + line_height * 0.5 {
            break;
        }
        ctx.fill_text(&line, x, y)?;
        if underline {
            let w = measured_text_width(ctx, &line);
            let start = match align {
                "center" => x - w / 2.0,
                "right" => x - w,
                _ => x,
            };
            ctx.set_stroke_style_str(style.color());
            ctx.set_line_width((font_size / 16.0).max(1.0));
            ctx.begin_path();
            ctx.move_to(start, y + font_size);
            ctx.line_to(start + w, y + font_size);
            ctx.stroke();
        }
        y += line_height;
    }
    Ok(())
}

fn wrap_text_lines(ctx: &CanvasRenderingContext2d, text: &str, max_w: f64) -> Vec<String> {
    let mut out = Vec::new();
    for raw_line in text.lines() {
        let mut current = String::new();
        for word in raw_line.split_whitespace() {
            let candidate = if current.is_empty() { word.to_owned() } else { format!("{current} {word}") };
            if current.is_empty() || measured_text_width(ctx, &candidate) <= max_w {
                current = candidate;
            } else {
                out.push(std::mem::replace(&mut current, word.to_owned()));
            }
        }
        out.push(current);
    }
    out
}

fn measured_text_width(ctx: &CanvasRenderingContext2d, text: &str) -> f64 {
    match ctx.measure_text(text) {
        Ok(metrics) => metrics.width(),
        Err(_) => f64::INFINITY,
    }
}

fn draw_selection(ctx: &CanvasRenderingContext2d, el: &DesignElement, zoom: f64) -> Result<(), JsValue> {
    ctx.save();
    translate_and_rotate(ctx, el)?;
    let dash_world = SELECTION_DASH_PX / zoom;
    let dash_array = js_sys::Array::new();
    dash_array.push(&dash_world.into());
    dash_array.push(&dash_world.into());
    ctx.set_line_dash(&dash_array)?;
    ctx.set_stroke_style_str(SELECTION_COLOR);
    ctx.set_line_width(1.0 / zoom);
    ctx.stroke_rect(-el.width / 2.0, -el.height / 2.0, el.width, el.height);
    ctx.set_line_dash(&js_sys::Array::new())?;
    ctx.restore();
    Ok(())
}

fn draw_marquee(ctx: &CanvasRenderingContext2d, m: Bounds, zoom: f64) -> Result<(), JsValue> {
    ctx.save();
    let dash_world = SELECTION_DASH_PX / zoom;
    let dash_array = js_sys::Array::new();
    dash_array.push(&dash_world.into());
    dash_array.push(&dash_world.into());
    ctx.set_line_dash(&dash_array)?;
    ctx.set_stroke_style_str(SELECTION_COLOR);
    ctx.set_fill_style_str("rgba(30, 144, 255, 0.12)");
    ctx.set_line_width(1.0 / zoom);
    ctx.fill_rect(m.left, m.top, m.right - m.left, m.bottom - m.top);
    ctx.stroke_rect(m.left, m.top, m.right - m.left, m.bottom - m.top);
    ctx.set_line_dash(&js_sys::Array::new())?;
    ctx.restore();
    Ok(())
}

/// Translate to the element's center and rotate by its rotation angle.
fn translate_and_rotate(ctx: &CanvasRenderingContext2d, el: &DesignElement) -> Result<(), JsValue> {
    ctx.translate(el.x + el.width / 2.0, el.y + el.height / 2.0)?;
    ctx.rotate(el.rotation.to_radians())?;
    Ok(())
}
