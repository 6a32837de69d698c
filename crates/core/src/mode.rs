//! Production vs. test data partition.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Which data partition a document belongs to.
///
/// Stamped as `dataMode` on every stored document and passed explicitly to
/// query construction. There is no process-wide "current mode".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataMode {
    #[default]
    Production,
    Test,
}

impl DataMode {
    pub fn as_str(self) -> &'static str {
        match self {
            DataMode::Production => "production",
            DataMode::Test => "test",
        }
    }
}

impl core::fmt::Display for DataMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for DataMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(DataMode::Production),
            "test" => Ok(DataMode::Test),
            other => Err(DomainError::validation(format!("unknown data mode '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_modes() {
        assert_eq!("production".parse::<DataMode>().unwrap(), DataMode::Production);
        assert_eq!(" Test ".parse::<DataMode>().unwrap(), DataMode::Test);
        assert!("staging".parse::<DataMode>().is_err());
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_value(DataMode::Test).unwrap(), serde_json::json!("test"));
    }
}
