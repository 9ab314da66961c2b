//! Settings subsystem: dotted-key routing and per-namespace handlers.
//!
//! Keys look like `local.<instance>.<property>`. A [`SettingsRegistry`],
//! built at daemon startup, routes each get/set to the first registered
//! handler that recognizes the key; handlers signal "not mine" with
//! [`SettingsError::UnrecognizedSetting`].

pub mod error;
pub mod handler;
pub mod keys;

use error::SettingsError;

/// One settings namespace. Implementations validate keys and values and
/// perform the read/mutation; errors propagate to the dispatch layer
/// uncaught.
pub trait SettingsHandler: Send {
    /// Template keys this handler answers to, for enumeration/help.
    fn keys(&self) -> Vec<String>;

    fn get(&self, key: &str) -> Result<String, SettingsError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError>;
}

/// Explicit handler registry with daemon-scoped lifetime; replaces any
/// notion of an ambient global settings table.
#[derive(Default)]
pub struct SettingsRegistry {
    handlers: Vec<Box<dyn SettingsHandler>>,
}

impl SettingsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: Box<dyn SettingsHandler>) {
        self.handlers.push(handler);
    }

    /// Union of all handlers' template keys, in registration order.
    pub fn keys(&self) -> Vec<String> {
        self.handlers.iter().flat_map(|h| h.keys()).collect()
    }

    pub fn get(&self, key: &str) -> Result<String, SettingsError> {
        for handler in &self.handlers {
            match handler.get(key) {
                Err(SettingsError::UnrecognizedSetting(_)) => continue,
                outcome => return outcome,
            }
        }
        Err(SettingsError::UnrecognizedSetting(key.to_string()))
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        for handler in &mut self.handlers {
            match handler.set(key, value) {
                Err(SettingsError::UnrecognizedSetting(_)) => continue,
                outcome => return outcome,
            }
        }
        Err(SettingsError::UnrecognizedSetting(key.to_string()))
    }
}
