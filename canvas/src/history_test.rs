use super::*;

fn timeline(values: &[i32], cap: usize) -> History<i32> {
    let mut h = History::new(cap);
    let mut iter = values.iter();
    if let Some(first) = iter.next() {
        h.reset(*first);
    }
    for v in iter {
        h.record(*v);
    }
    h
}

#[test]
fn new_history_is_empty() {
    let mut h: History<i32> = History::new(5);
    assert!(h.is_empty());
    assert!(h.current().is_none());
    assert!(!h.can_undo());
    assert!(!h.can_redo());
    assert!(h.undo().is_none());
    assert!(h.redo().is_none());
}

#[test]
fn cap_has_floor_of_one() {
    let h: History<i32> = History::new(0);
    assert_eq!(h.cap(), 1);
}

#[test]
fn record_moves_cursor_to_end() {
    let h = timeline(&[0, 1, 2], 10);
    assert_eq!(h.len(), 3);
    assert_eq!(h.index(), 2);
    assert_eq!(h.current(), Some(&2));
}

#[test]
fn undo_and_redo_walk_the_timeline() {
    let mut h = timeline(&[0, 1, 2], 10);
    assert_eq!(h.undo(), Some(&1));
    assert_eq!(h.undo(), Some(&0));
    assert_eq!(h.undo(), None);
    assert_eq!(h.index(), 0);
    assert_eq!(h.redo(), Some(&1));
    assert_eq!(h.redo(), Some(&2));
    assert_eq!(h.redo(), None);
    assert_eq!(h.index(), 2);
}

#[test]
fn record_after_undo_truncates_future() {
    let mut h = timeline(&[0, 1, 2, 3], 10);
    h.undo();
    h.undo();
    h.record(9);
    assert_eq!(h.len(), 3);
    assert_eq!(h.current(), Some(&9));
    assert!(!h.can_redo());
    assert_eq!(h.undo(), Some(&1));
}

#[test]
fn cap_discards_oldest_snapshots() {
    let mut h = timeline(&[0], 3);
    for v in 1..=5 {
        h.record(v);
    }
    // cap undo steps => cap + 1 snapshots.
    assert_eq!(h.len(), 4);
    assert_eq!(h.current(), Some(&5));
    let mut seen = Vec::new();
    while let Some(v) = h.undo() {
        seen.push(*v);
    }
    assert_eq!(seen, vec![4, 3, 2]);
}

#[test]
fn full_cap_of_undos_reaches_initial() {
    let cap = 50;
    let mut h = timeline(&[0], cap);
    for v in 1..=i32::try_from(cap).unwrap() {
        h.record(v);
    }
    for _ in 0..cap {
        assert!(h.undo().is_some());
    }
    assert_eq!(h.current(), Some(&0));
    assert!(h.undo().is_none());
}

#[test]
fn reset_clears_previous_timeline() {
    let mut h = timeline(&[0, 1, 2], 10);
    h.reset(7);
    assert_eq!(h.len(), 1);
    assert_eq!(h.current(), Some(&7));
    assert!(!h.can_undo());
}

#[test]
fn record_on_empty_timeline_starts_it() {
    let mut h = History::new(3);
    h.record(1);
    assert_eq!(h.len(), 1);
    assert_eq!(h.current(), Some(&1));
}
