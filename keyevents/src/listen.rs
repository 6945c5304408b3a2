use crossterm::{
    event::{
        self, Event, KeyCode, KeyEvent, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, terminal,
};
use log::{info, warn};
use std::{
    io::{self, Write},
    sync::Arc,
};

use keyevents_core::{
    BaseKind, DirectZone, ElementId, EventManager, ListenerRegistry, RawKeyboardEvent,
    full_key_signature,
};

use crate::{
    config::Binding,
    replay::{FiredActions, register_bindings},
};

/// Terminal key presses are fired at the root element.
const ROOT: ElementId = ElementId(0);

fn is_exit(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

/// Line printed for a terminal key event: its DOM event name and full key, followed by any
/// actions it fired.
pub fn describe_key_event(kind: BaseKind, full_key: &str, actions: &[String]) -> String {
    if actions.is_empty() {
        format!("{kind} {full_key}")
    } else {
        format!("{kind} {full_key} -> {}", actions.join(", "))
    }
}

/// Dispatches key presses from the terminal to `bindings` until ctrl+c is pressed.
pub fn listen(bindings: &[Binding]) -> anyhow::Result<()> {
    let registry = Arc::new(ListenerRegistry::new());
    let manager = EventManager::with_key_events(Arc::clone(&registry), Arc::new(DirectZone));
    let fired = FiredActions::default();
    register_bindings(&manager, bindings, &fired)?;

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    // Key releases are only reported by terminals supporting the kitty keyboard protocol
    let enhanced = terminal::supports_keyboard_enhancement().unwrap_or(false);
    if enhanced {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    } else {
        warn!("Terminal doesn't report key releases, keyup bindings won't fire");
    }
    info!("Listening for key events (enhanced: {enhanced})");

    let result = run_event_loop(&registry, &fired, &mut stdout);

    if enhanced {
        execute!(stdout, PopKeyboardEnhancementFlags)?;
    }
    terminal::disable_raw_mode()?;
    result
}

fn run_event_loop(
    registry: &ListenerRegistry,
    fired: &FiredActions,
    stdout: &mut impl Write,
) -> anyhow::Result<()> {
    write!(stdout, "Press keys to see their full key, ctrl+c to exit\r\n")?;
    stdout.flush()?;
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if is_exit(&key) {
            return Ok(());
        }

        let kind = BaseKind::from(key.kind);
        let event = RawKeyboardEvent::from(&key).target(ROOT);
        registry.dispatch(ROOT, kind.dom_event_name(), &event);

        let actions: Vec<String> = fired.lock().drain(..).collect();
        let line = describe_key_event(kind, &full_key_signature(&event), &actions);
        write!(stdout, "{line}\r\n")?;
        stdout.flush()?;
    }
}
