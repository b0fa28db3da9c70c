//! Settings for compiling and solving, loadable from YAML.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub encoding: EncodingConfig,
    pub solver: SolverConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingConfig {
    pub coverage: Coverage,
    /// Emit pairwise clauses forbidding two colors from using edges at the same cell.
    /// Implied by the cell cardinality clauses; kept as propagation aid.
    pub edge_exclusivity: bool,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            coverage: Coverage::default(),
            edge_exclusivity: true,
        }
    }
}

/// Which cells must be covered by some color's path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coverage {
    /// A cell belongs to at most one path; cells may be left empty.
    #[default]
    Partial,
    /// Every cell belongs to exactly one path, as in Flow Free proper.
    Full,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Give up and report an unknown outcome after this many milliseconds.
    pub timeout_ms: Option<u64>,
}

impl SolverConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

impl Settings {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Default settings, but requiring every cell to be covered.
    pub fn full_coverage() -> Self {
        let mut settings = Self::default();
        settings.encoding.coverage = Coverage::Full;
        settings
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{Coverage, Settings};

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert_eq!(settings.encoding.coverage, Coverage::Partial);
        assert!(settings.encoding.edge_exclusivity);
        assert_eq!(settings.solver.timeout(), None);
    }

    #[test]
    fn from_yaml() {
        let settings = Settings::from_yaml_str("encoding:\n  coverage: full\nsolver:\n  timeout_ms: 1500\n").unwrap();
        assert_eq!(settings.encoding.coverage, Coverage::Full);
        assert!(settings.encoding.edge_exclusivity);
        assert_eq!(settings.solver.timeout(), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn rejects_unknown_coverage() {
        assert!(Settings::from_yaml_str("encoding:\n  coverage: most\n").is_err());
    }
}
