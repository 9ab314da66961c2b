use std::fmt;

use thiserror::Error;

/// Which settings entry point the failure occurred in. Determines the
/// operation prefix of instance-level error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Obtain,
    Modify,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Obtain => write!(f, "Cannot obtain instance settings"),
            Self::Modify => write!(f, "Cannot update instance settings"),
        }
    }
}

/// Instance-identity or instance-state precondition that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceFailure {
    NotFound,
    Deleted,
    Preparing,
    WrongState,
}

impl fmt::Display for InstanceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "No such instance"),
            Self::Deleted => write!(f, "Instance is deleted"),
            Self::Preparing => write!(f, "Instance is being prepared"),
            Self::WrongState => write!(f, "Instance must be stopped for modification"),
        }
    }
}

/// Failures surfaced by the settings subsystem. The dispatch layer
/// pattern-matches on these; `Display` gives the user-facing message.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Key does not match any handler's grammar.
    #[error("unrecognized settings key: '{0}'")]
    UnrecognizedSetting(String),

    /// Value failed validation for an otherwise well-formed key.
    #[error("invalid setting '{key}={value}': {reason}")]
    InvalidSetting {
        key: String,
        value: String,
        reason: String,
    },

    /// The addressed instance exists in the wrong partition or state.
    #[error("{operation}; instance: {instance}; reason: {failure}")]
    Instance {
        operation: Operation,
        instance: String,
        failure: InstanceFailure,
    },

    /// A VM handle operation failed while applying an accepted change.
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl SettingsError {
    pub(crate) fn instance(operation: Operation, name: &str, failure: InstanceFailure) -> Self {
        Self::Instance {
            operation,
            instance: name.to_string(),
            failure,
        }
    }

    pub(crate) fn invalid(key: &str, value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_error_message_format() {
        let err = SettingsError::instance(Operation::Modify, "vm1", InstanceFailure::Deleted);
        assert_eq!(
            err.to_string(),
            "Cannot update instance settings; instance: vm1; reason: Instance is deleted"
        );

        let err = SettingsError::instance(Operation::Obtain, "vm2", InstanceFailure::NotFound);
        assert_eq!(
            err.to_string(),
            "Cannot obtain instance settings; instance: vm2; reason: No such instance"
        );
    }

    #[test]
    fn test_invalid_setting_message() {
        let err = SettingsError::invalid("local.vm1.cpus", "zero", "Need a positive decimal integer");
        assert_eq!(
            err.to_string(),
            "invalid setting 'local.vm1.cpus=zero': Need a positive decimal integer"
        );
    }

    #[test]
    fn test_unrecognized_message() {
        let err = SettingsError::UnrecognizedSetting("local.foo".into());
        assert_eq!(err.to_string(), "unrecognized settings key: 'local.foo'");
    }
}
