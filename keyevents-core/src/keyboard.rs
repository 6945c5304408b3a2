use bitflags::bitflags;
use log::{debug, trace};
use serde::Deserialize;

use crate::keys::{self, DOM_KEY_LOCATION_NUMPAD, UNIDENTIFIED};

/// A modifier key that can be part of an event name.
#[derive(Debug, PartialOrd, Ord, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Modifier {
    Alt,
    Control,
    Meta,
    Shift,
}

impl Modifier {
    /// All modifiers, in the order they appear in full keys.
    pub const ALL: [Modifier; 4] = [
        Modifier::Alt,
        Modifier::Control,
        Modifier::Meta,
        Modifier::Shift,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Modifier::Alt => "alt",
            Modifier::Control => "control",
            Modifier::Meta => "meta",
            Modifier::Shift => "shift",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|modifier| modifier.name() == name)
    }
}

bitflags! {
    /// Set of modifiers, either named in an event name or held during a live event.
    #[derive(Debug, Default, PartialOrd, Ord, PartialEq, Eq, Clone, Copy, Hash)]
    pub struct ModifierSet: u8 {
        const ALT = 0b0000_0001;
        const CONTROL = 0b0000_0010;
        const META = 0b0000_0100;
        const SHIFT = 0b0000_1000;
    }
}

impl From<Modifier> for ModifierSet {
    fn from(modifier: Modifier) -> Self {
        match modifier {
            Modifier::Alt => ModifierSet::ALT,
            Modifier::Control => ModifierSet::CONTROL,
            Modifier::Meta => ModifierSet::META,
            Modifier::Shift => ModifierSet::SHIFT,
        }
    }
}

impl ModifierSet {
    pub fn from_event(event: &RawKeyboardEvent) -> Self {
        let mut result = ModifierSet::empty();
        result.set(ModifierSet::ALT, event.alt_key);
        result.set(ModifierSet::CONTROL, event.ctrl_key);
        result.set(ModifierSet::META, event.meta_key);
        result.set(ModifierSet::SHIFT, event.shift_key);
        result
    }

    pub fn contains_modifier(self, modifier: Modifier) -> bool {
        self.contains(modifier.into())
    }

    /// Modifiers in the set, in full key order.
    pub fn modifiers(self) -> impl Iterator<Item = Modifier> {
        Modifier::ALL
            .into_iter()
            .filter(move |&modifier| self.contains_modifier(modifier))
    }
}

/// Identifies the element a listener is attached to, or that an event was fired at.
#[derive(Debug, Default, PartialOrd, Ord, PartialEq, Eq, Clone, Copy, Hash, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u64);

/// Keyboard event as reported by the host, before any normalization.
///
/// Field names follow the DOM `KeyboardEvent`, so events serialized by a browser
/// deserialize directly.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawKeyboardEvent {
    pub key: Option<String>,
    /// Only set by browsers implementing the 2007 draft of DOM Level 3 Events (old Chrome and
    /// Safari), e.g. `U+0041` or `Left`.
    pub key_identifier: Option<String>,
    pub location: u32,
    pub target: Option<ElementId>,
    pub alt_key: bool,
    pub ctrl_key: bool,
    pub meta_key: bool,
    pub shift_key: bool,
}

impl RawKeyboardEvent {
    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            ..Self::default()
        }
    }

    pub fn with_key_identifier(key_identifier: impl Into<String>) -> Self {
        Self {
            key_identifier: Some(key_identifier.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn location(mut self, location: u32) -> Self {
        self.location = location;
        self
    }

    #[must_use]
    pub fn target(mut self, target: ElementId) -> Self {
        self.target = Some(target);
        self
    }

    #[must_use]
    pub fn modifiers(mut self, modifiers: ModifierSet) -> Self {
        self.alt_key = modifiers.contains(ModifierSet::ALT);
        self.ctrl_key = modifiers.contains(ModifierSet::CONTROL);
        self.meta_key = modifiers.contains(ModifierSet::META);
        self.shift_key = modifiers.contains(ModifierSet::SHIFT);
        self
    }
}

fn decode_key_identifier(key_identifier: &str, location: u32) -> Option<String> {
    let Some(hex) = key_identifier.strip_prefix("U+") else {
        return Some(key_identifier.to_owned());
    };
    let ch = u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)?;
    if location == DOM_KEY_LOCATION_NUMPAD
        && let Some(digit) = keys::numpad_alias(ch)
    {
        debug!("Treating numpad key identifier {key_identifier} as {digit}");
        return Some(digit.to_owned());
    }
    Some(ch.to_string())
}

/// Canonical name of the key pressed in `event`, as used in event names.
///
/// Never fails: events without usable key information give [`UNIDENTIFIED`], and keys without an
/// alias are lower-cased and otherwise passed through.
pub fn normalize_key(event: &RawKeyboardEvent) -> String {
    let key = match event.key.as_deref().filter(|key| !key.is_empty()) {
        Some(key) => key.to_owned(),
        None => event
            .key_identifier
            .as_deref()
            .filter(|id| !id.is_empty())
            .and_then(|id| decode_key_identifier(id, event.location))
            .filter(|key| !key.is_empty())
            .unwrap_or_else(|| UNIDENTIFIED.to_owned()),
    };

    let key = key.to_lowercase();
    match keys::alias(&key) {
        Some(canonical) => canonical.to_owned(),
        None => key,
    }
}

pub(crate) fn join_full_key(modifiers: impl IntoIterator<Item = Modifier>, key: &str) -> String {
    let mut full_key = String::new();
    for modifier in modifiers {
        full_key.push_str(modifier.name());
        full_key.push('.');
    }
    full_key.push_str(key);
    full_key
}

/// Full key of a live event: the held modifiers in canonical order, then the normalized key.
///
/// A modifier is never repeated as the key, so pressing shift gives `shift` rather than
/// `shift.shift`.
pub fn full_key_signature(event: &RawKeyboardEvent) -> String {
    let key = normalize_key(event);
    let held = ModifierSet::from_event(event)
        .modifiers()
        .filter(|modifier| modifier.name() != key);
    let full_key = join_full_key(held, &key);
    trace!("Full key of {event:?} is {full_key}");
    full_key
}

#[cfg(feature = "term")]
mod term {
    use crossterm::event::{
        KeyCode as CKeyCode, KeyEvent as CKeyEvent, KeyEventKind, KeyEventState,
        KeyModifiers as CKeyModifiers, MediaKeyCode as CMediaKeyCode,
        ModifierKeyCode as CModifierKeyCode,
    };

    use super::RawKeyboardEvent;
    use crate::event_name::BaseKind;

    const DOM_KEY_LOCATION_LEFT: u32 = 1;
    const DOM_KEY_LOCATION_RIGHT: u32 = 2;

    impl From<KeyEventKind> for BaseKind {
        fn from(kind: KeyEventKind) -> Self {
            match kind {
                KeyEventKind::Press | KeyEventKind::Repeat => BaseKind::KeyDown,
                KeyEventKind::Release => BaseKind::KeyUp,
            }
        }
    }

    fn media_key(code: CMediaKeyCode) -> Option<&'static str> {
        let key = match code {
            CMediaKeyCode::Play => "MediaPlay",
            CMediaKeyCode::Pause => "MediaPause",
            CMediaKeyCode::PlayPause => "MediaPlayPause",
            CMediaKeyCode::Stop => "MediaStop",
            CMediaKeyCode::FastForward => "MediaFastForward",
            CMediaKeyCode::Rewind => "MediaRewind",
            CMediaKeyCode::TrackNext => "MediaTrackNext",
            CMediaKeyCode::TrackPrevious => "MediaTrackPrevious",
            CMediaKeyCode::Record => "MediaRecord",
            CMediaKeyCode::LowerVolume => "AudioVolumeDown",
            CMediaKeyCode::RaiseVolume => "AudioVolumeUp",
            CMediaKeyCode::MuteVolume => "AudioVolumeMute",
            CMediaKeyCode::Reverse => return None,
        };
        Some(key)
    }

    fn modifier_key(code: CModifierKeyCode) -> (Option<&'static str>, u32) {
        use CModifierKeyCode as M;

        match code {
            M::LeftShift => (Some("Shift"), DOM_KEY_LOCATION_LEFT),
            M::LeftControl => (Some("Control"), DOM_KEY_LOCATION_LEFT),
            M::LeftAlt => (Some("Alt"), DOM_KEY_LOCATION_LEFT),
            M::LeftSuper | M::LeftMeta => (Some("Meta"), DOM_KEY_LOCATION_LEFT),
            M::LeftHyper => (Some("Hyper"), DOM_KEY_LOCATION_LEFT),
            M::RightShift => (Some("Shift"), DOM_KEY_LOCATION_RIGHT),
            M::RightControl => (Some("Control"), DOM_KEY_LOCATION_RIGHT),
            M::RightAlt => (Some("Alt"), DOM_KEY_LOCATION_RIGHT),
            M::RightSuper | M::RightMeta => (Some("Meta"), DOM_KEY_LOCATION_RIGHT),
            M::RightHyper => (Some("Hyper"), DOM_KEY_LOCATION_RIGHT),
            M::IsoLevel3Shift => (Some("AltGraph"), 0),
            M::IsoLevel5Shift => (None, 0),
        }
    }

    /// `key` value and location a browser would report for a crossterm key code.
    fn dom_key(code: CKeyCode) -> (Option<String>, u32) {
        let named = |key: &str| (Some(key.to_owned()), 0);
        match code {
            CKeyCode::Backspace => named("Backspace"),
            CKeyCode::Enter => named("Enter"),
            CKeyCode::Left => named("ArrowLeft"),
            CKeyCode::Right => named("ArrowRight"),
            CKeyCode::Up => named("ArrowUp"),
            CKeyCode::Down => named("ArrowDown"),
            CKeyCode::Home => named("Home"),
            CKeyCode::End => named("End"),
            CKeyCode::PageUp => named("PageUp"),
            CKeyCode::PageDown => named("PageDown"),
            CKeyCode::Tab | CKeyCode::BackTab => named("Tab"),
            CKeyCode::Delete => named("Delete"),
            CKeyCode::Insert => named("Insert"),
            CKeyCode::F(n) => (Some(format!("F{n}")), 0),
            CKeyCode::Char(ch) => (Some(ch.to_string()), 0),
            CKeyCode::Null => (None, 0),
            CKeyCode::Esc => named("Escape"),
            CKeyCode::CapsLock => named("CapsLock"),
            CKeyCode::ScrollLock => named("ScrollLock"),
            CKeyCode::NumLock => named("NumLock"),
            CKeyCode::PrintScreen => named("PrintScreen"),
            CKeyCode::Pause => named("Pause"),
            CKeyCode::Menu => named("ContextMenu"),
            CKeyCode::KeypadBegin => named("Clear"),
            CKeyCode::Media(media) => (media_key(media).map(str::to_owned), 0),
            CKeyCode::Modifier(modifier) => {
                let (key, location) = modifier_key(modifier);
                (key.map(str::to_owned), location)
            }
        }
    }

    impl From<&CKeyEvent> for RawKeyboardEvent {
        fn from(event: &CKeyEvent) -> Self {
            let (key, mut location) = dom_key(event.code);
            if event.state.contains(KeyEventState::KEYPAD) {
                location = crate::keys::DOM_KEY_LOCATION_NUMPAD;
            }
            let modifiers = event.modifiers;
            RawKeyboardEvent {
                key,
                key_identifier: None,
                location,
                target: None,
                alt_key: modifiers.contains(CKeyModifiers::ALT),
                ctrl_key: modifiers.contains(CKeyModifiers::CONTROL),
                meta_key: modifiers.intersects(CKeyModifiers::SUPER | CKeyModifiers::META),
                shift_key: modifiers.contains(CKeyModifiers::SHIFT)
                    || event.code == CKeyCode::BackTab,
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::keyboard::full_key_signature;

        #[test]
        fn test_crossterm_char_with_control() {
            let event = CKeyEvent::new(CKeyCode::Char('s'), CKeyModifiers::CONTROL);
            let raw = RawKeyboardEvent::from(&event);
            assert_eq!(raw.key.as_deref(), Some("s"));
            assert_eq!(full_key_signature(&raw), "control.s");
        }

        #[test]
        fn test_crossterm_back_tab_holds_shift() {
            let event = CKeyEvent::new(CKeyCode::BackTab, CKeyModifiers::NONE);
            let raw = RawKeyboardEvent::from(&event);
            assert_eq!(full_key_signature(&raw), "shift.tab");
        }

        #[test]
        fn test_crossterm_named_keys() {
            let cases = [
                (CKeyCode::Left, "arrowleft"),
                (CKeyCode::Esc, "escape"),
                (CKeyCode::Char(' '), "space"),
                (CKeyCode::Char('.'), "dot"),
                (CKeyCode::F(5), "f5"),
                (CKeyCode::Null, "unidentified"),
            ];
            for (code, expected) in cases {
                let raw = RawKeyboardEvent::from(&CKeyEvent::new(code, CKeyModifiers::NONE));
                assert_eq!(full_key_signature(&raw), expected, "crossterm {code:?}");
            }
        }

        #[test]
        fn test_crossterm_super_is_meta() {
            let event = CKeyEvent::new(CKeyCode::Enter, CKeyModifiers::SUPER);
            let raw = RawKeyboardEvent::from(&event);
            assert!(raw.meta_key);
            assert_eq!(full_key_signature(&raw), "meta.enter");
        }

        #[test]
        fn test_crossterm_event_kind() {
            assert_eq!(BaseKind::from(KeyEventKind::Press), BaseKind::KeyDown);
            assert_eq!(BaseKind::from(KeyEventKind::Repeat), BaseKind::KeyDown);
            assert_eq!(BaseKind::from(KeyEventKind::Release), BaseKind::KeyUp);
        }
    }
}
