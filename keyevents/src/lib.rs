pub mod config;
pub mod listen;
pub mod logging;
pub mod replay;

pub use replay::{describe_event_name, normalize_events, replay_events};
