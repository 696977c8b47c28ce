use std::cell::Cell;
use std::rc::Rc;

use crate::core::{
    types::{keys, ShortcutKey, NUMLOCK_BIT},
    Keymap, ShortcutError, ShortcutTable,
};

/// Helper: keymap whose single action bumps `counter` by `step`
fn counting_keymap(shortcut: &str, counter: &Rc<Cell<u32>>, step: u32) -> Keymap {
    let counter = Rc::clone(counter);
    Keymap::new()
        .bind(shortcut, "count", move || counter.set(counter.get() + step))
        .unwrap()
}

#[test]
fn test_empty_table() {
    let table = ShortcutTable::new();
    assert!(table.is_empty());
    assert!(table.lookup(&ShortcutKey::bare('m' as u32)).is_none());
}

#[test]
fn test_register_and_lookup() {
    let counter = Rc::new(Cell::new(0));
    let mut table = ShortcutTable::new();

    table.register("viewer", counting_keymap("m", &counter, 1)).unwrap();

    let action = table.lookup(&ShortcutKey::bare('m' as u32)).unwrap();
    action();
    action();
    assert_eq!(counter.get(), 2);
    assert_eq!(table.owner_of(&ShortcutKey::bare('m' as u32)), Some("viewer"));
}

#[test]
fn test_collision_between_owners_keeps_first_binding() {
    let counter = Rc::new(Cell::new(0));
    let mut table = ShortcutTable::new();

    table.register("viewer", counting_keymap("lc-m", &counter, 1)).unwrap();
    let result = table.register("plugin", counting_keymap("lc-m", &counter, 100));

    match result {
        Err(ShortcutError::ShortcutCollision { owner, existing_owner, key }) => {
            assert_eq!(owner, "plugin");
            assert_eq!(existing_owner, "viewer");
            assert_eq!(key, crate::core::parse_shortcut("lc-m").unwrap());
        }
        other => panic!("expected collision, got {:?}", other),
    }

    // Still resolves to the viewer's action
    table.lookup(&crate::core::parse_shortcut("lc-m").unwrap()).unwrap()();
    assert_eq!(counter.get(), 1);
}

#[test]
fn test_failed_registration_is_atomic() {
    let counter = Rc::new(Cell::new(0));
    let mut table = ShortcutTable::new();
    table.register("viewer", counting_keymap("m", &counter, 1)).unwrap();

    // "k" is free but "m" collides: neither may be written
    let plugin_counter = Rc::clone(&counter);
    let keymap = Keymap::new()
        .bind("k", "free key", || {})
        .unwrap()
        .bind("m", "taken key", move || plugin_counter.set(999))
        .unwrap();

    assert!(table.register("plugin", keymap).is_err());
    assert!(table.lookup(&ShortcutKey::bare('k' as u32)).is_none());
    assert_eq!(table.len(), 1);
}

#[test]
fn test_same_owner_may_rebind() {
    let counter = Rc::new(Cell::new(0));
    let mut table = ShortcutTable::new();

    table.register("viewer", counting_keymap("z", &counter, 1)).unwrap();
    table.register("viewer", counting_keymap("z", &counter, 10)).unwrap();

    table.lookup(&ShortcutKey::bare('z' as u32)).unwrap()();
    assert_eq!(counter.get(), 10);
    assert_eq!(table.len(), 1);
}

#[test]
fn test_reserved_keys_are_rejected() {
    let mut table = ShortcutTable::new();

    let escape = Keymap::new().bind(keys::ESCAPE, "nope", || {}).unwrap();
    assert!(matches!(
        table.register("plugin", escape),
        Err(ShortcutError::ReservedShortcut { .. })
    ));

    let quit = Keymap::new().bind("lc-x", "nope", || {}).unwrap();
    assert!(matches!(
        table.register("viewer", quit),
        Err(ShortcutError::ReservedShortcut { .. })
    ));

    assert!(table.is_empty());
}

#[test]
fn test_modifiers_make_distinct_keys() {
    let counter = Rc::new(Cell::new(0));
    let mut table = ShortcutTable::new();

    table.register("viewer", counting_keymap("m", &counter, 1)).unwrap();
    table.register("plugin", counting_keymap("lc-m", &counter, 10)).unwrap();

    assert_eq!(table.len(), 2);
    assert_eq!(table.owner_of(&ShortcutKey::new(0x040 | NUMLOCK_BIT, 'm' as u32)), Some("plugin"));
}

#[test]
fn test_keymap_rebind_replaces() {
    let keymap = Keymap::new()
        .bind("m", "first", || {})
        .unwrap()
        .bind("M", "second", || {})
        .unwrap();

    assert_eq!(keymap.len(), 1);

    let mut table = ShortcutTable::new();
    table.register("viewer", keymap).unwrap();
    assert_eq!(table.bindings()[0].description, "second");
}

#[test]
fn test_bindings_listing_is_sorted() {
    let mut table = ShortcutTable::new();
    table
        .register("zoom-plugin", Keymap::new().bind("a", "a", || {}).unwrap())
        .unwrap();
    table
        .register("viewer", Keymap::new().bind("b", "b", || {}).unwrap().bind("la-c", "c", || {}).unwrap())
        .unwrap();

    let owners: Vec<String> = table.bindings().into_iter().map(|b| b.owner).collect();
    assert_eq!(owners, vec!["viewer", "viewer", "zoom-plugin"]);
}
