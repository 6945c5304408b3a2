use anyhow::anyhow;
use log::trace;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::fmt;

use crate::keyboard::{Modifier, ModifierSet, join_full_key};

/// The DOM event a key event name listens to.
#[derive(Debug, PartialOrd, Ord, PartialEq, Eq, Clone, Copy, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseKind {
    KeyDown,
    KeyUp,
}

impl BaseKind {
    pub fn dom_event_name(self) -> &'static str {
        match self {
            BaseKind::KeyDown => "keydown",
            BaseKind::KeyUp => "keyup",
        }
    }

    fn from_dom_event_name(name: &str) -> Option<Self> {
        match name {
            "keydown" => Some(BaseKind::KeyDown),
            "keyup" => Some(BaseKind::KeyUp),
            _ => None,
        }
    }
}

impl fmt::Display for BaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dom_event_name())
    }
}

/// A parsed key event name such as `keydown.control.shift.enter`.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct EventDescriptor {
    base_kind: BaseKind,
    modifiers: ModifierSet,
    key: String,
    full_key: String,
}

impl EventDescriptor {
    /// Parses `<keydown|keyup>(.<modifier>)*.<key>`, ignoring case.
    ///
    /// Returns `None` rather than an error for anything else, including unknown or repeated
    /// modifiers, so that another plugin can claim the name.
    pub fn parse(event_name: &str) -> Option<Self> {
        let event_name = event_name.to_lowercase();
        let mut parts: Vec<&str> = event_name.split('.').collect();

        let base_kind = BaseKind::from_dom_event_name(parts.remove(0));
        let (Some(base_kind), Some(key)) = (base_kind, parts.pop()) else {
            trace!("{event_name} is not a key event name");
            return None;
        };

        let mut modifiers = ModifierSet::empty();
        for modifier in Modifier::ALL {
            if let Some(pos) = parts.iter().position(|&part| part == modifier.name()) {
                parts.remove(pos);
                modifiers.insert(modifier.into());
            }
        }

        if !parts.is_empty() || key.is_empty() {
            trace!("Rejecting key event name {event_name}, unrecognized parts {parts:?}");
            return None;
        }

        Some(Self {
            base_kind,
            modifiers,
            full_key: join_full_key(modifiers.modifiers(), key),
            key: key.to_owned(),
        })
    }

    pub fn supports(event_name: &str) -> bool {
        Self::parse(event_name).is_some()
    }

    pub fn base_kind(&self) -> BaseKind {
        self.base_kind
    }

    pub fn modifiers(&self) -> ModifierSet {
        self.modifiers
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// The string a live event's full key signature must equal to match.
    pub fn full_key(&self) -> &str {
        &self.full_key
    }
}

impl fmt::Display for EventDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.base_kind, self.full_key)
    }
}

impl std::str::FromStr for EventDescriptor {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            anyhow!("'{s}' is not a key event name, expected e.g. 'keydown.control.shift.enter'")
        })
    }
}

impl<'de> Deserialize<'de> for EventDescriptor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

impl Serialize for EventDescriptor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}
