use thiserror::Error;

use crate::core::types::{Side, UnitId};

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Unit not found: {0}")]
    UnitNotFound(UnitId),

    #[error("Unit {0} is dead")]
    UnitDead(UnitId),

    #[error("No unit template configured for {0:?} side")]
    MissingTemplate(Side),

    #[error("No spawn anchor configured for {0:?} side")]
    MissingSpawnAnchor(Side),

    #[error("{side:?} roster is full ({cap} units)")]
    RosterFull { side: Side, cap: usize },

    #[error("Unit {0} is already on a roster")]
    AlreadyRostered(UnitId),

    #[error("Unit {0} has no skill points to spend")]
    NoSkillPoints(UnitId),

    #[error("No skill selection is currently open")]
    NoActiveSelection,

    #[error("Selection is open for unit {expected}, not {got}")]
    SelectionMismatch { expected: UnitId, got: UnitId },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_unit() {
        let err = SimError::SelectionMismatch {
            expected: UnitId(3),
            got: UnitId(7),
        };
        assert_eq!(err.to_string(), "Selection is open for unit #3, not #7");

        let err = SimError::RosterFull {
            side: Side::Enemy,
            cap: 12,
        };
        assert!(err.to_string().contains("12"));
    }

    #[test]
    fn test_toml_errors_convert() {
        let parsed: std::result::Result<toml::Value, _> = toml::from_str("not = [valid");
        let err: SimError = parsed.unwrap_err().into();
        assert!(matches!(err, SimError::Toml(_)));
    }
}
