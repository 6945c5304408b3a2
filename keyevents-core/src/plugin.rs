use anyhow::anyhow;
use log::debug;
use std::sync::Arc;

use crate::{
    event_name::EventDescriptor,
    keyboard::{ElementId, RawKeyboardEvent, full_key_signature},
};

/// User callback for a registered event name.
pub type Handler = Box<dyn Fn(&RawKeyboardEvent) + Send + Sync>;

/// Callback handed to a [`ListenerHost`], run for every event of the attached DOM event name.
pub type Callback = Box<dyn Fn(&RawKeyboardEvent) + Send + Sync>;

/// The execution context handlers must run in.
///
/// Anything a handler changes should be visible to whatever owns the context, whereas attaching
/// listeners happens outside it so that the owner isn't notified needlessly.
pub trait Zone: Send + Sync {
    fn run(&self, f: &mut dyn FnMut());

    fn run_outside(&self, f: &mut dyn FnMut());
}

/// A [`Zone`] with no boundary: both methods call `f` straight away.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectZone;

impl Zone for DirectZone {
    fn run(&self, f: &mut dyn FnMut()) {
        f();
    }

    fn run_outside(&self, f: &mut dyn FnMut()) {
        f();
    }
}

/// Attaches native listeners to elements.
pub trait ListenerHost {
    fn attach(&self, element: ElementId, dom_event_name: &str, callback: Callback);
}

/// One way of interpreting event names. Plugins are tried in turn until one supports a name.
pub trait EventManagerPlugin: Send + Sync {
    fn supports(&self, event_name: &str) -> bool;

    /// Registers `handler` for `event_name` on `element`. Callers must check [`Self::supports`]
    /// first, unsupported names give an error.
    fn add_event_listener(
        &self,
        host: &dyn ListenerHost,
        zone: &Arc<dyn Zone>,
        element: ElementId,
        event_name: &str,
        handler: Handler,
        should_support_bubble: bool,
    ) -> anyhow::Result<()>;
}

/// Decides whether a live event is the one a descriptor was registered for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEventMatcher {
    element: ElementId,
    should_support_bubble: bool,
    full_key: String,
}

impl KeyEventMatcher {
    pub fn new(
        descriptor: &EventDescriptor,
        element: ElementId,
        should_support_bubble: bool,
    ) -> Self {
        Self {
            element,
            should_support_bubble,
            full_key: descriptor.full_key().to_owned(),
        }
    }

    /// Without bubbling the event must have been fired at the element itself.
    pub fn matches(&self, event: &RawKeyboardEvent) -> bool {
        let correct_element = self.should_support_bubble || event.target == Some(self.element);
        correct_element && full_key_signature(event) == self.full_key
    }
}

/// Handles `keydown.<modifiers>.<key>` and `keyup.<modifiers>.<key>` event names.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyEventsPlugin;

impl KeyEventsPlugin {
    pub fn new() -> Self {
        Self
    }

    /// Wraps `handler` so that it only runs, inside `zone`, for events matching `descriptor`.
    pub fn event_callback(
        descriptor: &EventDescriptor,
        element: ElementId,
        should_support_bubble: bool,
        handler: Handler,
        zone: Arc<dyn Zone>,
    ) -> Callback {
        let matcher = KeyEventMatcher::new(descriptor, element, should_support_bubble);
        Box::new(move |event: &RawKeyboardEvent| {
            if matcher.matches(event) {
                zone.run(&mut || handler(event));
            }
        })
    }
}

impl EventManagerPlugin for KeyEventsPlugin {
    fn supports(&self, event_name: &str) -> bool {
        EventDescriptor::supports(event_name)
    }

    fn add_event_listener(
        &self,
        host: &dyn ListenerHost,
        zone: &Arc<dyn Zone>,
        element: ElementId,
        event_name: &str,
        handler: Handler,
        should_support_bubble: bool,
    ) -> anyhow::Result<()> {
        let descriptor = EventDescriptor::parse(event_name)
            .ok_or_else(|| anyhow!("Unsupported key event name '{event_name}'"))?;
        let dom_event_name = descriptor.base_kind().dom_event_name();
        debug!(
            "Listening for {dom_event_name} '{}' on {element:?} (bubble: {should_support_bubble})",
            descriptor.full_key()
        );

        let mut callback = Some(Self::event_callback(
            &descriptor,
            element,
            should_support_bubble,
            handler,
            Arc::clone(zone),
        ));
        zone.run_outside(&mut || {
            if let Some(callback) = callback.take() {
                host.attach(element, dom_event_name, callback);
            }
        });
        Ok(())
    }
}
