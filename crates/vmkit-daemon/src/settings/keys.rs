use std::sync::LazyLock;

use regex::Regex;

use super::error::SettingsError;

/// Namespace root for daemon-owned settings keys.
pub const DAEMON_SETTINGS_ROOT: &str = "local";

/// Placeholder used when enumerating instance keys for help text;
/// listing actual instances there would bloat the output.
pub const INSTANCE_PLACEHOLDER: &str = "<instance-name>";

/// Instance-scoped properties addressable through settings keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    Cpus,
    Memory,
    Disk,
}

impl Property {
    pub const ALL: [Property; 3] = [Property::Cpus, Property::Memory, Property::Disk];

    pub fn suffix(self) -> &'static str {
        match self {
            Self::Cpus => "cpus",
            Self::Memory => "memory",
            Self::Disk => "disk",
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.suffix() == suffix)
    }
}

// Anchored `local.<instance>.<property>`. The instance capture is greedy,
// so the property suffix is matched from the right and instance names may
// themselves contain dots.
static KEY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"^{root}\.(?P<instance>.+)\.(?P<property>cpus|memory|disk)$",
        root = regex::escape(DAEMON_SETTINGS_ROOT),
    );
    Regex::new(&pattern).expect("hard-coded key pattern")
});

/// Split a settings key into its (instance, property) parts.
pub fn parse_key(key: &str) -> Result<(String, Property), SettingsError> {
    let unrecognized = || SettingsError::UnrecognizedSetting(key.to_string());
    let caps = KEY_PATTERN.captures(key).ok_or_else(unrecognized)?;
    let property = Property::from_suffix(&caps["property"]).ok_or_else(unrecognized)?;
    Ok((caps["instance"].to_string(), property))
}

/// The fixed template key set exposed for enumeration, one per property.
pub fn template_keys() -> Vec<String> {
    Property::ALL
        .into_iter()
        .map(|p| make_key(INSTANCE_PLACEHOLDER, p))
        .collect()
}

/// Compose the key addressing `property` of `instance`.
pub fn make_key(instance: &str, property: Property) -> String {
    format!("{DAEMON_SETTINGS_ROOT}.{instance}.{}", property.suffix())
}
