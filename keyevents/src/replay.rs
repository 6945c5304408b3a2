use anyhow::Context;
use log::{debug, info};
use parking_lot::Mutex;
use serde::Deserialize;
use std::{io::BufRead, sync::Arc};

use keyevents_core::{
    BaseKind, DirectZone, ElementId, EventDescriptor, EventManager, Handler, ListenerHost,
    ListenerRegistry, RawKeyboardEvent, full_key_signature, normalize_key,
};

use crate::config::Binding;

/// Actions fired since the queue was last drained.
pub type FiredActions = Arc<Mutex<Vec<String>>>;

/// One line of an event recording.
#[derive(Debug, Deserialize)]
pub struct RecordedEvent {
    #[serde(rename = "type")]
    pub kind: BaseKind,
    /// Elements the event is delivered to, target first. Defaults to just the target.
    #[serde(default)]
    pub path: Option<Vec<ElementId>>,
    #[serde(flatten)]
    pub event: RawKeyboardEvent,
}

impl RecordedEvent {
    pub fn delivery_path(&self) -> Vec<ElementId> {
        match &self.path {
            Some(path) => path.clone(),
            None => vec![self.event.target.unwrap_or_default()],
        }
    }
}

/// Describes how an event name is parsed, e.g. `keydown.Shift.A: keydown shift.a`.
pub fn describe_event_name(event_name: &str) -> String {
    match EventDescriptor::parse(event_name) {
        Some(descriptor) => format!(
            "{event_name}: {} {}",
            descriptor.base_kind(),
            descriptor.full_key()
        ),
        None => format!("{event_name}: unsupported"),
    }
}

/// Reads JSON lines, skipping blank ones, along with their 1-based line numbers.
fn json_lines<T, R>(reader: R) -> impl Iterator<Item = anyhow::Result<(usize, T)>>
where
    T: for<'de> Deserialize<'de>,
    R: BufRead,
{
    reader
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            let line_number = idx + 1;
            let line = match line {
                Ok(line) => line,
                Err(err) => return Some(Err(err.into())),
            };
            if line.trim().is_empty() {
                return None;
            }
            let parsed = serde_json::from_str(&line)
                .with_context(|| format!("Invalid event on line {line_number}"))
                .map(|value| (line_number, value));
            Some(parsed)
        })
}

/// Prints the canonical key and full key of every raw event, one per line.
pub fn normalize_events(reader: impl BufRead) -> anyhow::Result<Vec<String>> {
    json_lines::<RawKeyboardEvent, _>(reader)
        .map(|line| {
            let (_, event) = line?;
            Ok(format!(
                "{}\t{}",
                normalize_key(&event),
                full_key_signature(&event)
            ))
        })
        .collect()
}

pub fn register_bindings<H: ListenerHost>(
    manager: &EventManager<H>,
    bindings: &[Binding],
    fired: &FiredActions,
) -> anyhow::Result<()> {
    for binding in bindings {
        let action = binding.action.clone();
        let fired = Arc::clone(fired);
        let handler: Handler = Box::new(move |_: &RawKeyboardEvent| {
            fired.lock().push(action.clone());
        });
        manager
            .add_event_listener(
                binding.element,
                &binding.event.to_string(),
                handler,
                binding.bubble,
            )
            .with_context(|| format!("Failed to register binding for '{}'", binding.action))?;
    }
    info!("Registered {} binding(s)", bindings.len());
    Ok(())
}

/// Registers `bindings`, then delivers each recorded event and reports the actions it fired as
/// `<line number>: <action>`.
pub fn replay_events(reader: impl BufRead, bindings: &[Binding]) -> anyhow::Result<Vec<String>> {
    let manager = EventManager::with_key_events(ListenerRegistry::new(), Arc::new(DirectZone));
    let fired = FiredActions::default();
    register_bindings(&manager, bindings, &fired)?;

    let mut output = vec![];
    for line in json_lines::<RecordedEvent, _>(reader) {
        let (line_number, recorded) = line?;
        debug!("Replaying line {line_number}: {recorded:?}");
        manager.host().dispatch_path(
            &recorded.delivery_path(),
            recorded.kind.dom_event_name(),
            &recorded.event,
        );
        output.extend(
            fired
                .lock()
                .drain(..)
                .map(|action| format!("{line_number}: {action}")),
        );
    }
    Ok(output)
}
