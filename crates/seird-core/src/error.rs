use std::path::PathBuf;

use thiserror::Error;

/// Validation and loading failures detected before any simulation work starts.
///
/// Every variant is fatal: values are never clamped into range. Each variant
/// carries a stable machine code (see [`ConfigError::code`]) so callers such
/// as the CLI can branch on it without matching message text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("community list is empty")]
    NoCommunities,

    #[error("duplicate community name `{name}`")]
    DuplicateCommunity { name: String },

    #[error(
        "community `{name}`: density {density} must satisfy 1 <= density < population ({population})"
    )]
    InvalidDensity {
        name: String,
        population: usize,
        density: usize,
    },

    #[error("edge ({from}, {to}) is invalid for a graph of {node_count} nodes")]
    InvalidEdge {
        from: usize,
        to: usize,
        node_count: usize,
    },

    #[error("total_weeks must be greater than zero")]
    ZeroWeeks,

    #[error("initial_infected ({requested}) exceeds node count ({node_count})")]
    TooManyInitialInfected { requested: usize, node_count: usize },

    #[error("{name} must be a probability in [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f64 },

    #[error("incubation_period must be at least one day")]
    ZeroIncubation,

    #[error("mutation_multiplier must be finite and greater than zero, got {value}")]
    InvalidMultiplier { value: f64 },

    #[error("state vector has {states} entries but the graph has {node_count} nodes")]
    StateCountMismatch { states: usize, node_count: usize },

    #[error("unknown region `{0}` (expected one of: bc, vancouver, vancouver-full)")]
    UnknownRegion(String),

    #[error("scenario must set exactly one of `region` or `[[communities]]`")]
    AmbiguousScenario,

    #[error("failed to read {}: {message}", path.display())]
    Read { path: PathBuf, message: String },

    #[error("failed to parse {origin}: {message}")]
    Parse { origin: String, message: String },
}

impl ConfigError {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NoCommunities => "E1001",
            Self::DuplicateCommunity { .. } => "E1002",
            Self::InvalidDensity { .. } => "E1003",
            Self::InvalidEdge { .. } => "E1004",
            Self::ZeroWeeks => "E2001",
            Self::TooManyInitialInfected { .. } => "E2002",
            Self::InvalidProbability { .. } => "E2003",
            Self::ZeroIncubation => "E2004",
            Self::InvalidMultiplier { .. } => "E2005",
            Self::StateCountMismatch { .. } => "E2006",
            Self::UnknownRegion(_) => "E3001",
            Self::AmbiguousScenario => "E3002",
            Self::Read { .. } => "E3003",
            Self::Parse { .. } => "E3004",
        }
    }

    /// Optional remediation hint surfaced next to the error.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        match self {
            Self::NoCommunities | Self::AmbiguousScenario => {
                Some("Pick a preset with `region = \"...\"` or list `[[communities]]`, not both.")
            }
            Self::DuplicateCommunity { .. } => Some("Community names are lookup keys; rename one."),
            Self::InvalidDensity { .. } => {
                Some("Lower `density` or raise `population` for that community.")
            }
            Self::TooManyInitialInfected { .. } => {
                Some("Lower `initial_infected` or use a larger community table.")
            }
            Self::InvalidProbability { .. } => Some("Rates are daily probabilities in [0, 1]."),
            Self::UnknownRegion(_) => Some("Run `seird regions` to list the presets."),
            Self::Read { .. } => Some("Check the path and file permissions."),
            Self::Parse { .. } => Some("Fix the TOML syntax or field types and retry."),
            Self::InvalidEdge { .. }
            | Self::ZeroWeeks
            | Self::ZeroIncubation
            | Self::InvalidMultiplier { .. }
            | Self::StateCountMismatch { .. } => None,
        }
    }
}

/// Reject non-finite values and anything outside `[0, 1]`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidProbability`] naming the offending field.
pub fn check_probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidProbability { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn all_variants() -> Vec<ConfigError> {
        vec![
            ConfigError::NoCommunities,
            ConfigError::DuplicateCommunity { name: "a".into() },
            ConfigError::InvalidDensity {
                name: "a".into(),
                population: 2,
                density: 2,
            },
            ConfigError::InvalidEdge {
                from: 0,
                to: 0,
                node_count: 1,
            },
            ConfigError::ZeroWeeks,
            ConfigError::TooManyInitialInfected {
                requested: 3,
                node_count: 2,
            },
            ConfigError::InvalidProbability {
                name: "recovery_rate",
                value: 2.0,
            },
            ConfigError::ZeroIncubation,
            ConfigError::InvalidMultiplier { value: -1.0 },
            ConfigError::StateCountMismatch {
                states: 3,
                node_count: 4,
            },
            ConfigError::UnknownRegion("atlantis".into()),
            ConfigError::AmbiguousScenario,
            ConfigError::Read {
                path: PathBuf::from("x.toml"),
                message: "gone".into(),
            },
            ConfigError::Parse {
                origin: "x.toml".into(),
                message: "bad".into(),
            },
        ]
    }

    #[test]
    fn all_codes_are_unique() {
        let mut seen = HashSet::new();
        for err in all_variants() {
            assert!(seen.insert(err.code()), "duplicate code {}", err.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        for err in all_variants() {
            let code = err.code();
            assert_eq!(code.len(), 5);
            assert!(code.starts_with('E'));
            assert!(code.chars().skip(1).all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn probability_bounds_are_inclusive() {
        assert!(check_probability("p", 0.0).is_ok());
        assert!(check_probability("p", 1.0).is_ok());
        assert!(check_probability("p", -0.01).is_err());
        assert!(check_probability("p", 1.01).is_err());
        assert!(check_probability("p", f64::NAN).is_err());
    }

    #[test]
    fn density_message_names_the_community() {
        let err = ConfigError::InvalidDensity {
            name: "Kerrisdale".into(),
            population: 3,
            density: 5,
        };
        let text = err.to_string();
        assert!(text.contains("Kerrisdale"));
        assert!(text.contains("population (3)"));
    }
}
