#![allow(clippy::float_cmp)]

use serde_json::json;

use super::*;
use crate::doc::{ElementKind, ShapeTag};
use crate::storage::MemoryStorage;

fn store() -> DesignStore<MemoryStorage> {
    let mut store = DesignStore::new(MemoryStorage::new());
    store.create_blank("Test");
    store
}

fn add_text(store: &mut DesignStore<MemoryStorage>, content: &str) -> ElementId {
    store.add_element(NewElement::text(content)).unwrap().id
}

fn element(store: &DesignStore<MemoryStorage>, id: ElementId) -> DesignElement {
    store.current().unwrap().element(&id).unwrap().clone()
}

// =============================================================
// No active design
// =============================================================

#[test]
fn editing_without_design_fails() {
    let mut store = DesignStore::new(MemoryStorage::new());
    let id = Uuid::new_v4();
    assert!(store.current().is_none());
    assert!(store.elements().is_empty());
    assert!(matches!(store.add_element(NewElement::text("x")), Err(StoreError::NoActiveDesign)));
    assert!(matches!(store.update_element(id, &ElementPatch::default()), Err(StoreError::NoActiveDesign)));
    assert!(matches!(store.delete_element(id), Err(StoreError::NoActiveDesign)));
    assert!(matches!(store.toggle_visible(id), Err(StoreError::NoActiveDesign)));
    assert!(matches!(store.select(None), Err(StoreError::NoActiveDesign)));
    assert!(matches!(store.paste(), Err(StoreError::NoActiveDesign)));
    assert!(matches!(store.save(), Err(StoreError::NoActiveDesign)));
    assert!(matches!(store.export(ExportFormat::Png), Err(StoreError::NoActiveDesign)));
    assert!(!store.undo());
    assert!(!store.redo());
}

// =============================================================
// Lifecycle
// =============================================================

#[test]
fn create_blank_resets_history_and_selection() {
    let mut store = store();
    add_text(&mut store, "a");
    assert!(store.selection().is_some());

    let design = store.create_blank("Fresh").clone();
    assert_eq!(design.name, "Fresh");
    assert!(design.elements.is_empty());
    assert_eq!(design.canvas.width, 800.0);
    assert_eq!(design.canvas.height, 600.0);
    assert_eq!(design.canvas.background_color, "#ffffff");
    assert_eq!(store.history().len(), 1);
    assert_eq!(store.history().index(), 0);
    assert!(store.selection().is_none());
    assert!(!store.can_undo());
}

#[test]
fn open_normalizes_external_design() {
    let mut store = store();
    let mut design = Design::blank("Template");
    let a = NewElement::text("a").into_element(Uuid::new_v4(), 0);
    let b = NewElement::text("b").into_element(Uuid::new_v4(), 0);
    design.elements = vec![a.clone(), b.clone()];
    design.template = Some("sale-flyer".into());

    let opened = store.open(design).clone();
    assert_eq!(opened.template.as_deref(), Some("sale-flyer"));
    let zs: Vec<_> = opened.elements.iter().map(|el| el.z_index).collect();
    assert_eq!(zs, vec![0, 1]);
    assert_eq!(store.history().len(), 1);
}

#[test]
fn blank_design_with_text_element() {
    let mut store = DesignStore::new(MemoryStorage::new());
    store.create_blank("Poster");
    let el = store
        .add_element(NewElement::new(ElementKind::Text).at(100.0, 100.0).sized(200.0, 50.0))
        .unwrap();
    let design = store.current().unwrap();
    assert_eq!(design.elements.len(), 1);
    assert_eq!(design.elements[0].kind, ElementKind::Text);
    assert_eq!((el.x, el.y), (100.0, 100.0));
}

// =============================================================
// Element CRUD
// =============================================================

#[test]
fn add_element_appends_on_top_and_selects() {
    let mut store = store();
    let a = add_text(&mut store, "a");
    let b = store.add_element(NewElement::shape(ShapeTag::Circle)).unwrap();
    assert_eq!(store.elements().len(), 2);
    assert_eq!(store.elements()[1].id, b.id);
    assert_eq!(b.z_index, element(&store, a).z_index + 1);
    assert_eq!(store.selection(), Some(b.id));
    assert_ne!(a, b.id);
}

#[test]
fn add_then_delete_restores_element_list() {
    let mut store = store();
    add_text(&mut store, "keep");
    let before = store.elements().to_vec();
    let id = add_text(&mut store, "drop");
    assert!(store.delete_element(id).unwrap());
    assert_eq!(store.elements(), before.as_slice());
}

#[test]
fn delete_clears_selection_only_when_selected() {
    let mut store = store();
    let a = add_text(&mut store, "a");
    let b = add_text(&mut store, "b");
    assert_eq!(store.selection(), Some(b));
    assert!(store.delete_element(a).unwrap());
    assert_eq!(store.selection(), Some(b));
    assert!(store.delete_element(b).unwrap());
    assert_eq!(store.selection(), None);
}

#[test]
fn delete_missing_returns_false() {
    let mut store = store();
    let len = store.history().len();
    assert!(!store.delete_element(Uuid::new_v4()).unwrap());
    assert_eq!(store.history().len(), len);
}

#[test]
fn update_applies_patch() {
    let mut store = store();
    let id = add_text(&mut store, "a");
    let patch = ElementPatch { content: Some("b".into()), width: Some(-3.0), ..ElementPatch::position(5.0, 6.0) };
    assert!(store.update_element(id, &patch).unwrap());
    let el = element(&store, id);
    assert_eq!((el.x, el.y), (5.0, 6.0));
    assert_eq!(el.width, 0.0);
    assert_eq!(el.content, "b");
    assert_eq!(el.kind, ElementKind::Text);
}

#[test]
fn update_missing_id_leaves_design_unchanged() {
    let mut store = store();
    add_text(&mut store, "a");
    let before = store.current().unwrap().clone();
    let len = store.history().len();
    assert!(!store.update_element(Uuid::new_v4(), &ElementPatch::position(1.0, 1.0)).unwrap());
    assert_eq!(store.current().unwrap(), &before);
    assert_eq!(store.history().len(), len);
}

#[test]
fn update_style_replaces_whole_object() {
    let mut store = store();
    let id = add_text(&mut store, "a");
    let patch = ElementPatch { style: Some(json!({"color": "#ff0000"})), ..Default::default() };
    store.update_element(id, &patch).unwrap();
    assert_eq!(element(&store, id).style, json!({"color": "#ff0000"}));
}

#[test]
fn merge_style_keeps_other_keys() {
    let mut store = store();
    let id = add_text(&mut store, "a");
    assert!(store.merge_style(id, &json!({"color": "#ff0000", "textAlign": null})).unwrap());
    let style = element(&store, id).style;
    assert_eq!(style["color"], "#ff0000");
    assert_eq!(style["fontSize"], 24);
    assert!(style.get("textAlign").is_none());
    assert!(!store.merge_style(id, &json!("bold")).unwrap());
    assert!(!store.merge_style(Uuid::new_v4(), &json!({})).unwrap());
}

#[test]
fn identical_update_records_no_snapshot() {
    let mut store = store();
    let id = add_text(&mut store, "a");
    let el = element(&store, id);
    let len = store.history().len();
    assert!(store.update_element(id, &ElementPatch::position(el.x, el.y)).unwrap());
    assert_eq!(store.history().len(), len);
}

#[test]
fn toggle_visible_flips_only_visibility() {
    let mut store = store();
    let id = add_text(&mut store, "a");
    let before = element(&store, id);
    assert!(store.toggle_visible(id).unwrap());
    let after = element(&store, id);
    assert!(!after.visible);
    assert_eq!(DesignElement { visible: true, ..after }, before);
    assert!(store.toggle_visible(id).unwrap());
    assert!(element(&store, id).visible);
    assert!(!store.toggle_visible(Uuid::new_v4()).unwrap());
}

// =============================================================
// Selection / clipboard
// =============================================================

#[test]
fn select_existing_and_clear() {
    let mut store = store();
    let a = add_text(&mut store, "a");
    add_text(&mut store, "b");
    assert!(store.select(Some(a)).unwrap());
    assert_eq!(store.selection(), Some(a));
    assert!(!store.select(Some(Uuid::new_v4())).unwrap());
    assert_eq!(store.selection(), Some(a));
    assert!(store.select(None).unwrap());
    assert_eq!(store.selection(), None);
}

#[test]
fn copy_without_selection_is_noop() {
    let mut store = store();
    add_text(&mut store, "a");
    store.select(None).unwrap();
    assert!(!store.copy_selected().unwrap());
    assert!(store.clipboard().is_none());
    assert_eq!(store.paste().unwrap(), None);
}

#[test]
fn paste_offsets_copy_with_fresh_id() {
    let mut store = store();
    let id = add_text(&mut store, "a");
    assert!(store.copy_selected().unwrap());
    let pasted = store.paste().unwrap().unwrap();
    let source = element(&store, id);
    assert_ne!(pasted.id, id);
    assert_eq!(pasted.x, source.x + 20.0);
    assert_eq!(pasted.y, source.y + 20.0);
    assert_eq!(pasted.content, source.content);
    assert_eq!(pasted.z_index, source.z_index + 1);
    assert_eq!(store.selection(), Some(pasted.id));
    assert_eq!(store.elements().len(), 2);
}

#[test]
fn clipboard_survives_deleting_the_source() {
    let mut store = store();
    let id = add_text(&mut store, "a");
    store.copy_selected().unwrap();
    store.delete_element(id).unwrap();
    let pasted = store.paste().unwrap().unwrap();
    assert_eq!(pasted.content, "a");
    assert_eq!(store.elements().len(), 1);
}

// =============================================================
// Reorder
// =============================================================

fn order(store: &DesignStore<MemoryStorage>) -> Vec<ElementId> {
    store.elements().iter().map(|el| el.id).collect()
}

#[test]
fn reorder_moves_and_renumbers() {
    let mut store = store();
    let a = add_text(&mut store, "a");
    let b = add_text(&mut store, "b");
    let c = add_text(&mut store, "c");

    assert!(store.reorder(a, ZMove::ToFront).unwrap());
    assert_eq!(order(&store), vec![b, c, a]);
    assert!(store.reorder(a, ZMove::Backward).unwrap());
    assert_eq!(order(&store), vec![b, a, c]);
    assert!(store.reorder(c, ZMove::ToBack).unwrap());
    assert_eq!(order(&store), vec![c, b, a]);
    assert!(store.reorder(c, ZMove::Forward).unwrap());
    assert_eq!(order(&store), vec![b, c, a]);

    let zs: Vec<_> = store.elements().iter().map(|el| el.z_index).collect();
    assert_eq!(zs, vec![0, 1, 2]);
}

#[test]
fn reorder_at_boundary_is_noop() {
    let mut store = store();
    let a = add_text(&mut store, "a");
    let b = add_text(&mut store, "b");
    let len = store.history().len();
    assert!(!store.reorder(b, ZMove::ToFront).unwrap());
    assert!(!store.reorder(b, ZMove::Forward).unwrap());
    assert!(!store.reorder(a, ZMove::ToBack).unwrap());
    assert!(!store.reorder(a, ZMove::Backward).unwrap());
    assert!(!store.reorder(Uuid::new_v4(), ZMove::ToFront).unwrap());
    assert_eq!(store.history().len(), len);
}

// =============================================================
// Metadata
// =============================================================

#[test]
fn set_canvas_and_rename() {
    let mut store = store();
    store
        .set_canvas(CanvasSpec { width: 1080.0, height: -1.0, background_color: "#000000".into() })
        .unwrap();
    store.rename("Launch").unwrap();
    let design = store.current().unwrap();
    assert_eq!(design.canvas.width, 1080.0);
    assert_eq!(design.canvas.height, 0.0);
    assert_eq!(design.canvas.background_color, "#000000");
    assert_eq!(design.name, "Launch");
    assert_eq!(store.history().len(), 3);
}

// =============================================================
// History
// =============================================================

#[test]
fn undo_all_reaches_blank_and_redo_all_restores_latest() {
    let mut store = store();
    let blank = store.current().unwrap().clone();
    let n = 10;
    for i in 0..n {
        add_text(&mut store, &format!("el {i}"));
    }
    let latest = store.current().unwrap().clone();

    for _ in 0..n {
        assert!(store.undo());
    }
    assert_eq!(store.current().unwrap(), &blank);
    assert!(!store.undo());
    assert_eq!(store.current().unwrap(), &blank);

    for _ in 0..n {
        assert!(store.redo());
    }
    assert_eq!(store.current().unwrap(), &latest);
    assert!(!store.redo());
    assert_eq!(store.current().unwrap(), &latest);
}

#[test]
fn full_cap_of_mutations_is_undoable() {
    let mut store = store();
    let blank = store.current().unwrap().clone();
    for i in 0..HISTORY_CAP {
        add_text(&mut store, &format!("el {i}"));
    }
    for _ in 0..HISTORY_CAP {
        assert!(store.undo());
    }
    assert_eq!(store.current().unwrap(), &blank);
}

#[test]
fn history_cap_discards_oldest() {
    let mut store = DesignStore::with_history_cap(MemoryStorage::new(), 3);
    store.create_blank("capped");
    for i in 0..5 {
        add_text(&mut store, &format!("el {i}"));
    }
    let mut undos = 0;
    while store.undo() {
        undos += 1;
    }
    assert_eq!(undos, 3);
    assert_eq!(store.elements().len(), 2);
}

#[test]
fn default_cap_holds_baseline_plus_cap_steps() {
    let mut store = store();
    for i in 0..HISTORY_CAP + 10 {
        store.rename(&format!("name {i}")).unwrap();
    }
    assert_eq!(store.history().len(), HISTORY_CAP + 1);
    let mut undos = 0;
    while store.undo() {
        undos += 1;
    }
    assert_eq!(undos, HISTORY_CAP);
    assert_eq!(store.current().unwrap().name, "name 9");
}

#[test]
fn undo_clears_selection() {
    let mut store = store();
    add_text(&mut store, "a");
    add_text(&mut store, "b");
    assert!(store.selection().is_some());
    assert!(store.undo());
    assert!(store.selection().is_none());
    store.select(Some(store.elements()[0].id)).unwrap();
    assert!(store.redo());
    assert!(store.selection().is_none());
}

#[test]
fn mutation_after_undo_truncates_redo() {
    let mut store = store();
    add_text(&mut store, "a");
    add_text(&mut store, "b");
    store.undo();
    assert!(store.can_redo());
    add_text(&mut store, "c");
    assert!(!store.can_redo());
    assert!(!store.redo());
    let contents: Vec<_> = store.elements().iter().map(|el| el.content.clone()).collect();
    assert_eq!(contents, vec!["a", "c"]);
}

#[test]
fn preview_then_commit_is_one_undo_step() {
    let mut store = store();
    let id = add_text(&mut store, "a");
    let start = element(&store, id);
    let len = store.history().len();

    for step in 1..=5 {
        let offset = f64::from(step) * 10.0;
        store.preview_update(id, &ElementPatch::position(start.x + offset, start.y)).unwrap();
    }
    assert_eq!(store.history().len(), len);
    assert!(store.commit());
    assert!(!store.commit());
    assert_eq!(store.history().len(), len + 1);

    assert!(store.undo());
    assert_eq!(element(&store, id).x, start.x);
}

#[test]
fn undo_commits_pending_preview_first() {
    let mut store = store();
    let id = add_text(&mut store, "a");
    let start = element(&store, id);
    store.preview_update(id, &ElementPatch::position(400.0, 400.0)).unwrap();
    assert!(store.undo());
    assert_eq!(element(&store, id).x, start.x);
    assert!(store.redo());
    assert_eq!(element(&store, id).x, 400.0);
}

// =============================================================
// Persistence
// =============================================================

#[test]
fn save_then_load_round_trips() {
    let mut store = store();
    add_text(&mut store, "a");
    let hidden = add_text(&mut store, "hidden");
    store.toggle_visible(hidden).unwrap();
    store.merge_style(hidden, &json!({"fontWeight": "bold"})).unwrap();
    let saved = store.current().unwrap().clone();
    store.save().unwrap();

    store.create_blank("other");
    let loaded = store.load(saved.id).unwrap().clone();
    assert_eq!(loaded, saved);
    assert!(!loaded.element(&hidden).unwrap().visible);
    assert_eq!(store.history().len(), 1);
    assert!(store.selection().is_none());
}

#[test]
fn save_upserts_by_id() {
    let mut store = store();
    store.save().unwrap();
    add_text(&mut store, "a");
    store.save().unwrap();
    let first = store.current().unwrap().id;
    store.create_blank("second");
    store.save().unwrap();

    let saved = store.saved_designs().unwrap();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved[0].id, first);
    assert_eq!(saved[0].elements.len(), 1);
    assert_eq!(saved[1].name, "second");
}

#[test]
fn load_missing_id_leaves_state_unchanged() {
    let mut store = store();
    add_text(&mut store, "a");
    let before = store.current().unwrap().clone();
    let missing = Uuid::new_v4();
    match store.load(missing) {
        Err(StoreError::DesignNotFound(id)) => assert_eq!(id, missing),
        other => panic!("expected DesignNotFound, got {other:?}"),
    }
    assert_eq!(store.current().unwrap(), &before);
    assert!(store.can_undo());
}

#[test]
fn corrupt_saved_collection_is_an_error() {
    let mut storage = MemoryStorage::new();
    storage.set(DESIGNS_KEY, "{oops").unwrap();
    let mut store = DesignStore::new(storage);
    store.create_blank("x");
    assert!(matches!(store.saved_designs(), Err(StoreError::Storage(StorageError::Corrupt { .. }))));
    assert!(matches!(store.save(), Err(StoreError::Storage(StorageError::Corrupt { .. }))));
    assert_eq!(store.storage().get(DESIGNS_KEY).unwrap().as_deref(), Some("{oops"));
}

#[test]
fn storage_failure_surfaces_on_save() {
    let mut store = DesignStore::new(MemoryStorage::offline());
    store.create_blank("x");
    assert!(matches!(store.save(), Err(StoreError::Storage(StorageError::Unavailable(_)))));
}

#[test]
fn delete_saved_removes_entry() {
    let mut store = store();
    let id = store.current().unwrap().id;
    store.save().unwrap();
    assert!(store.delete_saved(id).unwrap());
    assert!(!store.delete_saved(id).unwrap());
    assert!(store.saved_designs().unwrap().is_empty());
    assert!(store.current().is_some());
}

#[test]
fn loaded_design_is_normalized() {
    let mut design = Design::blank("raw");
    let a = NewElement::text("a").into_element(Uuid::new_v4(), 9);
    let b = NewElement::text("b").into_element(Uuid::new_v4(), 2);
    design.elements = vec![a.clone(), b.clone()];
    let mut storage = MemoryStorage::new();
    save_json(&mut storage, DESIGNS_KEY, &vec![design.clone()]).unwrap();

    let mut store = DesignStore::new(storage);
    let loaded = store.load(design.id).unwrap();
    assert_eq!(loaded.elements[0].id, b.id);
    assert_eq!(loaded.elements[1].id, a.id);
}

#[test]
fn camel_case_saved_layout_loads() {
    let design_id = Uuid::new_v4();
    let el_id = Uuid::new_v4();
    let raw = json!([{
        "id": design_id,
        "name": "Summer Sale",
        "elements": [{
            "id": el_id,
            "type": "text",
            "content": "50% off",
            "x": 100,
            "y": 120,
            "width": 200,
            "height": 50,
            "style": { "fontSize": 32, "color": "#ff0000" }
        }],
        "canvas": { "width": 800, "height": 600, "backgroundColor": "#fef3c7" }
    }]);
    let mut storage = MemoryStorage::new();
    storage.set(DESIGNS_KEY, &raw.to_string()).unwrap();

    let mut store = DesignStore::new(storage);
    let loaded = store.load(design_id).unwrap().clone();
    assert_eq!(loaded.canvas.background_color, "#fef3c7");
    assert_eq!(loaded.elements.len(), 1);
    assert_eq!(loaded.elements[0].kind, ElementKind::Text);
    assert!(loaded.elements[0].visible);

    // Saving alongside it keeps the collection readable.
    store.create_blank("Second");
    store.save().unwrap();
    assert_eq!(store.saved_designs().unwrap().len(), 2);
}

#[test]
fn saved_layout_uses_camel_case_keys() {
    let mut store = store();
    add_text(&mut store, "hi");
    store.save().unwrap();
    let text = store.storage().get(DESIGNS_KEY).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value[0]["canvas"]["backgroundColor"], "#ffffff");
    assert_eq!(value[0]["elements"][0]["zIndex"], 0);
    assert!(value[0]["canvas"].get("background_color").is_none());
}

#[test]
fn add_above_max_z_index_renumbers() {
    let mut store = store();
    let mut design = Design::blank("Edge");
    let low = NewElement::text("low").into_element(Uuid::new_v4(), 3);
    let top = NewElement::text("top").into_element(Uuid::new_v4(), i64::MAX);
    design.elements = vec![low.clone(), top.clone()];
    store.open(design);

    let added = add_text(&mut store, "new");
    let ids: Vec<_> = store.elements().iter().map(|el| el.id).collect();
    assert_eq!(ids, vec![low.id, top.id, added]);
    let zs: Vec<_> = store.elements().iter().map(|el| el.z_index).collect();
    assert_eq!(zs, vec![0, 1, 2]);
}

// =============================================================
// Export
// =============================================================

#[test]
fn export_excludes_hidden_but_design_keeps_them() {
    let mut store = store();
    let shown = add_text(&mut store, "shown");
    let hidden = add_text(&mut store, "hidden");
    store.toggle_visible(hidden).unwrap();

    let receipt = store.export(ExportFormat::Jpg).unwrap();
    let ids: Vec<_> = receipt.manifest.elements.iter().map(|el| el.id).collect();
    assert_eq!(ids, vec![shown]);
    assert_eq!(receipt.manifest.format, ExportFormat::Jpg);
    assert_eq!(store.elements().len(), 2);
}

#[test]
fn export_records_no_history() {
    let mut store = store();
    add_text(&mut store, "a");
    let len = store.history().len();
    store.export(ExportFormat::Pdf).unwrap();
    assert_eq!(store.history().len(), len);
}
