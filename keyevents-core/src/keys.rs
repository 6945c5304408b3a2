// Tables used to turn the `key` and `keyIdentifier` values reported by browsers into the names
// used in event names. cf http://www.w3.org/TR/DOM-Level-3-Events-key/

pub const UNIDENTIFIED: &str = "unidentified";

/// `KeyboardEvent.location` value reported for keys on the numeric keypad.
pub const DOM_KEY_LOCATION_NUMPAD: u32 = 3;

/// Lower-cased `key` values and their canonical names.
const KEY_ALIASES: &[(&str, &str)] = &[
    // Readability
    (" ", "space"),
    // `.` is the separator in event names
    (".", "dot"),
    // Cross-browser compatibility
    ("\u{8}", "backspace"),
    ("\t", "tab"),
    ("\u{7f}", "delete"),
    ("\u{1b}", "escape"),
    ("del", "delete"),
    ("esc", "escape"),
    ("left", "arrowleft"),
    ("right", "arrowright"),
    ("up", "arrowup"),
    ("down", "arrowdown"),
    ("menu", "contextmenu"),
    ("scroll", "scrolllock"),
    ("win", "os"),
];

// Chrome reports numeric keypad keys as letters when only `keyIdentifier` is available:
// https://code.google.com/p/chromium/issues/detail?id=155654
const NUMPAD_BUG_ALIASES: &[(char, &str)] = &[
    ('A', "1"),
    ('B', "2"),
    ('C', "3"),
    ('D', "4"),
    ('E', "5"),
    ('F', "6"),
    ('G', "7"),
    ('H', "8"),
    ('I', "9"),
    ('J', "*"),
    ('K', "+"),
    ('M', "-"),
    ('N', "."),
    ('O', "/"),
    ('\u{60}', "0"),
    ('\u{90}', "numlock"),
];

/// Canonical name for an already lower-cased key, if it has one.
pub fn alias(key: &str) -> Option<&'static str> {
    KEY_ALIASES
        .iter()
        .find_map(|&(raw, canonical)| (raw == key).then_some(canonical))
}

/// Key actually pressed when a numpad key was misreported as `ch`.
pub fn numpad_alias(ch: char) -> Option<&'static str> {
    NUMPAD_BUG_ALIASES
        .iter()
        .find_map(|&(raw, canonical)| (raw == ch).then_some(canonical))
}
