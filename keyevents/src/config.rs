use anyhow::Context;
use etcetera::base_strategy::{BaseStrategy, choose_base_strategy};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use keyevents_core::{ElementId, EventDescriptor};

pub const APP_NAME: &str = "keyevents";

static CONFIG_DIR_OVERRIDE: OnceLock<PathBuf> = OnceLock::new();

pub fn set_config_dir_override(dir: Option<PathBuf>) {
    if let Some(dir) = dir {
        let _ = CONFIG_DIR_OVERRIDE.set(dir);
    }
}

pub fn config_dir() -> anyhow::Result<PathBuf> {
    if let Some(dir) = CONFIG_DIR_OVERRIDE.get() {
        return Ok(dir.clone());
    }
    let strategy = choose_base_strategy().context("Unable to find config directory")?;
    Ok(strategy.config_dir().join(APP_NAME))
}

fn config_file() -> anyhow::Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

#[derive(Debug, Default, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Handlers to register. When several bindings match an event they all fire, in the order
    /// listed.
    #[serde(default)]
    pub bindings: Vec<Binding>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Binding {
    /// Key event name, for instance `keydown.control.shift.enter`.
    pub event: EventDescriptor,
    /// Printed whenever the binding fires.
    pub action: String,
    /// Element the listener is attached to. Defaults to `0`, the root.
    #[serde(default)]
    pub element: ElementId,
    /// Whether events fired at descendants of `element` also trigger the binding. Defaults to
    /// `true`; when `false` the event target must be `element` itself.
    #[serde(default = "default_true")]
    pub bubble: bool,
}

fn default_true() -> bool {
    true
}

/// Loads `config.toml` from the config directory, falling back to the default config if it
/// doesn't exist.
pub fn load_config() -> anyhow::Result<Config> {
    let config_file = config_file()?;
    if fs::exists(&config_file)? {
        load_config_from(&config_file)
    } else {
        Ok(Config::default())
    }
}

pub fn load_config_from(path: &Path) -> anyhow::Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config = toml::from_str(&contents)
        .with_context(|| format!("Invalid config file {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn test_empty_config_file() -> anyhow::Result<()> {
        let config: Config = toml::from_str("")?;
        assert_eq!(config, Config::default());
        assert!(config.bindings.is_empty());
        Ok(())
    }

    #[test]
    fn test_bindings() -> anyhow::Result<()> {
        let config: Config = toml::from_str(indoc! {r#"
            [[bindings]]
            event = "keydown.control.s"
            action = "save"

            [[bindings]]
            event = "keyup.Shift.Alt.Enter"
            action = "submit"
            element = 3
            bubble = false
        "#})?;

        assert_eq!(
            config,
            Config {
                bindings: vec![
                    Binding {
                        event: "keydown.control.s".parse()?,
                        action: "save".to_owned(),
                        element: ElementId(0),
                        bubble: true,
                    },
                    Binding {
                        event: "keyup.alt.shift.enter".parse()?,
                        action: "submit".to_owned(),
                        element: ElementId(3),
                        bubble: false,
                    },
                ],
            }
        );
        Ok(())
    }

    #[test]
    fn test_invalid_event_name_rejected() {
        let result: Result<Config, _> = toml::from_str(indoc! {r#"
            [[bindings]]
            event = "keydown.ctrl.s"
            action = "save"
        "#});
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("'keydown.ctrl.s' is not a key event name")
        );
    }

    #[test]
    fn test_unknown_binding_field_rejected() {
        let result: Result<Config, _> = toml::from_str(indoc! {r#"
            [[bindings]]
            event = "keydown.enter"
            action = "submit"
            target = 1
        "#});
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("unknown field `target`")
        );
    }

    #[test]
    fn test_missing_action_rejected() {
        let result: Result<Config, _> = toml::from_str(indoc! {r#"
            [[bindings]]
            event = "keydown.enter"
        "#});
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("missing field `action`")
        );
    }

    #[test]
    fn test_load_config_from_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            indoc! {r#"
                [[bindings]]
                event = "keydown.escape"
                action = "close"
            "#},
        )?;

        let config = load_config_from(&path)?;
        assert_eq!(config.bindings.len(), 1);
        assert_eq!(config.bindings[0].event.full_key(), "escape");
        assert_eq!(config.bindings[0].action, "close");
        Ok(())
    }

    #[test]
    fn test_load_config_from_invalid_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(&path, "bindings = 1")?;

        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid config file"));
        Ok(())
    }
}
