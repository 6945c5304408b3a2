pub mod event_name;
pub mod keyboard;
pub mod keys;
pub mod manager;
pub mod plugin;

pub use event_name::{BaseKind, EventDescriptor};
pub use keyboard::{
    ElementId, Modifier, ModifierSet, RawKeyboardEvent, full_key_signature, normalize_key,
};
pub use manager::{EventManager, ListenerRegistry};
pub use plugin::{
    Callback, DirectZone, EventManagerPlugin, Handler, KeyEventMatcher, KeyEventsPlugin,
    ListenerHost, Zone,
};
