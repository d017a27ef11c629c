//! Design document store and editor core for the poster studio.
//!
//! This crate is compiled to WebAssembly and runs in the browser, but every
//! piece of logic except the [`engine::Editor`] binding and the
//! [`storage::LocalStorage`] backend is plain Rust and is tested natively.
//! It owns the active design (positioned text/image/shape elements plus
//! canvas metadata), a bounded undo/redo timeline of whole-design snapshots,
//! save/load into a keyed local storage, and the small pieces of account and
//! consent state the editor persists alongside designs.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Testable [`engine::EditorCore`] and the `wasm-bindgen` [`engine::Editor`] |
//! | [`store`] | [`store::DesignStore`]: element CRUD, selection, clipboard, save/load/export |
//! | [`doc`] | Design and element types, sparse patches, typed style access |
//! | [`history`] | Bounded linear undo/redo timeline |
//! | [`storage`] | Key/value storage trait with memory, file and `localStorage` backends |
//! | [`session`] | Mocked account session persisted under the `user` key |
//! | [`consent`] | Cookie-consent flags persisted under the `cookie-consent` key |
//! | [`geometry`] | Bounds, hit-testing, marquee selection, grid snapping |
//! | [`camera`] | Zoom/pan and screen ↔ canvas conversions |
//! | [`input`] | Modifier keys and the pointer gesture state machine |
//! | [`render`] | Paint list and export manifests |
//! | [`consts`] | Shared defaults (canvas size, history depth, storage keys) |

pub mod camera;
pub mod consent;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod geometry;
pub mod history;
pub mod input;
pub mod render;
pub mod session;
pub mod storage;
pub mod store;
