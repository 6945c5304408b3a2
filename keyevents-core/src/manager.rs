use anyhow::bail;
use log::{debug, warn};
use parking_lot::Mutex;
use std::sync::Arc;

use crate::{
    keyboard::{ElementId, RawKeyboardEvent},
    plugin::{Callback, EventManagerPlugin, Handler, KeyEventsPlugin, ListenerHost, Zone},
};

/// Routes each event name to the first plugin that supports it.
pub struct EventManager<H> {
    plugins: Vec<Box<dyn EventManagerPlugin>>,
    host: H,
    zone: Arc<dyn Zone>,
}

impl<H: ListenerHost> EventManager<H> {
    /// Plugins are tried in the order given.
    pub fn new(plugins: Vec<Box<dyn EventManagerPlugin>>, host: H, zone: Arc<dyn Zone>) -> Self {
        Self {
            plugins,
            host,
            zone,
        }
    }

    /// Manager with only the key events plugin.
    pub fn with_key_events(host: H, zone: Arc<dyn Zone>) -> Self {
        Self::new(vec![Box::new(KeyEventsPlugin::new())], host, zone)
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn supports(&self, event_name: &str) -> bool {
        self.plugins.iter().any(|plugin| plugin.supports(event_name))
    }

    pub fn add_event_listener(
        &self,
        element: ElementId,
        event_name: &str,
        handler: Handler,
        should_support_bubble: bool,
    ) -> anyhow::Result<()> {
        let Some(plugin) = self.plugins.iter().find(|plugin| plugin.supports(event_name)) else {
            warn!("No plugin supports event '{event_name}'");
            bail!("No plugin supports event '{event_name}'");
        };
        plugin.add_event_listener(
            &self.host,
            &self.zone,
            element,
            event_name,
            handler,
            should_support_bubble,
        )
    }
}

struct Listener {
    element: ElementId,
    dom_event_name: String,
    callback: Arc<Callback>,
}

/// In-memory [`ListenerHost`] that delivers events on demand.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Mutex<Vec<Listener>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.listeners.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs every callback attached to `element` for `dom_event_name`, in attachment order.
    pub fn dispatch(&self, element: ElementId, dom_event_name: &str, event: &RawKeyboardEvent) {
        // Callbacks are cloned out so that handlers may attach further listeners
        let callbacks: Vec<_> = self
            .listeners
            .lock()
            .iter()
            .filter(|listener| {
                listener.element == element && listener.dom_event_name == dom_event_name
            })
            .map(|listener| Arc::clone(&listener.callback))
            .collect();
        debug!(
            "Dispatching {dom_event_name} to {} listener(s) on {element:?}",
            callbacks.len()
        );
        for callback in callbacks {
            callback(event);
        }
    }

    /// Delivers `event` to each element of `path` in turn, starting with the target.
    pub fn dispatch_path(
        &self,
        path: &[ElementId],
        dom_event_name: &str,
        event: &RawKeyboardEvent,
    ) {
        for &element in path {
            self.dispatch(element, dom_event_name, event);
        }
    }
}

impl ListenerHost for ListenerRegistry {
    fn attach(&self, element: ElementId, dom_event_name: &str, callback: Callback) {
        self.listeners.lock().push(Listener {
            element,
            dom_event_name: dom_event_name.to_owned(),
            callback: Arc::new(callback),
        });
    }
}

impl<H: ListenerHost> ListenerHost for Arc<H> {
    fn attach(&self, element: ElementId, dom_event_name: &str, callback: Callback) {
        (**self).attach(element, dom_event_name, callback);
    }
}
