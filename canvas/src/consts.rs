//! Shared defaults for the canvas crate.

// ── Canvas ──────────────────────────────────────────────────────

/// Width of a freshly created blank design, in canvas units.
pub const DEFAULT_CANVAS_WIDTH: f64 = 800.0;

/// Height of a freshly created blank design, in canvas units.
pub const DEFAULT_CANVAS_HEIGHT: f64 = 600.0;

/// Background color of a freshly created blank design.
pub const DEFAULT_BACKGROUND: &str = "#ffffff";

/// Name given to a blank design when the caller does not supply one.
pub const DEFAULT_DESIGN_NAME: &str = "Untitled Design";

/// Padding added past the furthest element when fitting the canvas to content.
pub const CONTENT_MARGIN: f64 = 50.0;

// ── Editing ─────────────────────────────────────────────────────

/// Maximum number of undo steps kept by the history timeline.
pub const HISTORY_CAP: usize = 50;

/// Offset applied to both axes when pasting a copied element.
pub const PASTE_OFFSET: f64 = 20.0;

/// Default grid pitch for snapping.
pub const GRID_SIZE: f64 = 10.0;

/// Zoom limits (1.0 = 100%).
pub const ZOOM_MIN: f64 = 0.25;
pub const ZOOM_MAX: f64 = 2.0;

/// Multiplicative step applied per zoom-in / zoom-out request.
pub const ZOOM_STEP: f64 = 1.25;

// ── Storage keys ────────────────────────────────────────────────

/// Key holding the JSON array of saved designs.
pub const DESIGNS_KEY: &str = "designs";

/// Key holding the signed-in user profile.
pub const USER_KEY: &str = "user";

/// Key holding cookie-consent flags.
pub const CONSENT_KEY: &str = "cookie-consent";
