use parking_lot::Mutex;
use serde::Deserialize;
use std::sync::Arc;

use keyevents_core::{
    BaseKind, DirectZone, ElementId, EventDescriptor, EventManager, Handler, ListenerRegistry,
    ModifierSet, RawKeyboardEvent, full_key_signature, normalize_key,
};

const ROOT: ElementId = ElementId(0);

fn event_for(descriptor: &EventDescriptor, key: &str) -> RawKeyboardEvent {
    RawKeyboardEvent::with_key(key).modifiers(descriptor.modifiers())
}

#[test]
fn test_documented_examples() {
    let descriptor = EventDescriptor::parse("keydown.enter").unwrap();
    assert_eq!(descriptor.base_kind(), BaseKind::KeyDown);
    assert_eq!(descriptor.full_key(), "enter");

    let descriptor = EventDescriptor::parse("keyup.control.shift.a").unwrap();
    assert_eq!(descriptor.base_kind(), BaseKind::KeyUp);
    assert_eq!(descriptor.full_key(), "control.shift.a");

    assert_eq!(EventDescriptor::parse("mousedown.a"), None);
    assert_eq!(EventDescriptor::parse("keydown."), None);
}

#[test]
fn test_descriptor_matches_event_built_from_its_parts() {
    let names = [
        ("keydown.enter", "Enter"),
        ("keydown.control.shift.enter", "Enter"),
        ("keyup.alt.meta.arrowleft", "ArrowLeft"),
        ("keydown.meta.space", " "),
        ("keydown.shift.dot", "."),
        ("keyup.alt.control.meta.shift.f4", "F4"),
    ];
    for (name, key) in names {
        let descriptor = EventDescriptor::parse(name).unwrap();
        let event = event_for(&descriptor, key);
        assert_eq!(full_key_signature(&event), descriptor.full_key(), "{name}");

        for flag in ModifierSet::all().iter() {
            let flipped = RawKeyboardEvent::with_key(key).modifiers(descriptor.modifiers() ^ flag);
            assert_ne!(
                full_key_signature(&flipped),
                descriptor.full_key(),
                "{name} with {flag:?} flipped"
            );
        }

        let other_key = event_for(&descriptor, "z");
        assert_ne!(full_key_signature(&other_key), descriptor.full_key(), "{name}");
    }
}

#[test]
fn test_legacy_key_identifier_events() {
    let event = RawKeyboardEvent::with_key_identifier("U+0041");
    assert_eq!(normalize_key(&event), "a");

    let event = RawKeyboardEvent::with_key_identifier("U+0041").location(3);
    assert_eq!(normalize_key(&event), "1");

    let event = RawKeyboardEvent::with_key_identifier("U+004B")
        .location(3)
        .modifiers(ModifierSet::SHIFT);
    assert_eq!(full_key_signature(&event), "shift.+");
}

#[test]
fn test_held_modifier_key_is_not_repeated() {
    let event = RawKeyboardEvent::with_key("Shift").modifiers(ModifierSet::SHIFT);
    assert_eq!(full_key_signature(&event), "shift");
}

#[test]
fn test_non_bubbling_listener_ignores_other_targets() -> anyhow::Result<()> {
    let manager = EventManager::with_key_events(ListenerRegistry::new(), Arc::new(DirectZone));
    let fired = Arc::new(Mutex::new(0));
    let handler_fired = Arc::clone(&fired);
    let handler: Handler = Box::new(move |_: &RawKeyboardEvent| *handler_fired.lock() += 1);
    manager.add_event_listener(ROOT, "keydown.control.enter", handler, false)?;

    let event = RawKeyboardEvent::with_key("Enter").modifiers(ModifierSet::CONTROL);
    manager
        .host()
        .dispatch(ROOT, "keydown", &event.clone().target(ElementId(5)));
    assert_eq!(*fired.lock(), 0);

    manager.host().dispatch(ROOT, "keydown", &event.target(ROOT));
    assert_eq!(*fired.lock(), 1);
    Ok(())
}

#[derive(Debug, Deserialize)]
struct Binding {
    event: EventDescriptor,
}

#[test]
fn test_descriptor_from_toml() -> anyhow::Result<()> {
    let binding: Binding = toml::from_str(r#"event = "KeyDown.Shift.Control.S""#)?;
    assert_eq!(binding.event.full_key(), "control.shift.s");
    assert_eq!(binding.event.to_string(), "keydown.control.shift.s");

    let result: Result<Binding, _> = toml::from_str(r#"event = "keydown.ctrl.s""#);
    assert!(
        result
            .unwrap_err()
            .to_string()
            .contains("'keydown.ctrl.s' is not a key event name")
    );
    Ok(())
}
