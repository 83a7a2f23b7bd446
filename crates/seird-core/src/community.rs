use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A named population unit that becomes one scale-free subgraph.
///
/// `density` is the preferential-attachment parameter: the number of edges
/// each newly added node attaches with, and the size of the seed clique.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Community {
    /// Unique display name, also the key in the case ledger.
    pub name: String,
    /// Number of nodes to create for this community.
    pub population: usize,
    /// Edges attached per new node; `1 <= density < population`.
    pub density: usize,
}

impl Community {
    #[must_use]
    pub fn new(name: impl Into<String>, population: usize, density: usize) -> Self {
        Self {
            name: name.into(),
            population,
            density,
        }
    }

    /// Check `1 <= density < population`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDensity`] when the bound does not hold.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.density == 0 || self.density >= self.population {
            return Err(ConfigError::InvalidDensity {
                name: self.name.clone(),
                population: self.population,
                density: self.density,
            });
        }
        Ok(())
    }
}

/// Validate an ordered community table.
///
/// # Errors
///
/// Fails on an empty list, a repeated name, or any community whose density
/// is out of range. The first problem in list order is reported.
pub fn validate_communities(communities: &[Community]) -> Result<(), ConfigError> {
    if communities.is_empty() {
        return Err(ConfigError::NoCommunities);
    }

    let mut names = BTreeSet::new();
    for community in communities {
        if !names.insert(community.name.as_str()) {
            return Err(ConfigError::DuplicateCommunity {
                name: community.name.clone(),
            });
        }
        community.validate()?;
    }
    Ok(())
}

/// Sum of populations, i.e. the node count of the composed graph.
#[must_use]
pub fn total_population(communities: &[Community]) -> usize {
    communities
        .iter()
        .fold(0_usize, |acc, c| acc.saturating_add(c.population))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn density_must_be_below_population() {
        assert!(Community::new("a", 10, 9).validate().is_ok());
        assert!(Community::new("a", 10, 10).validate().is_err());
        assert!(Community::new("a", 10, 11).validate().is_err());
    }

    #[test]
    fn zero_density_rejected() {
        let err = Community::new("a", 10, 0).validate().unwrap_err();
        assert_eq!(err.code(), "E1003");
    }

    #[test]
    fn empty_table_rejected() {
        assert_eq!(validate_communities(&[]), Err(ConfigError::NoCommunities));
    }

    #[test]
    fn duplicate_names_rejected() {
        let table = [Community::new("a", 10, 2), Community::new("a", 5, 1)];
        assert_eq!(
            validate_communities(&table),
            Err(ConfigError::DuplicateCommunity { name: "a".into() })
        );
    }

    #[test]
    fn first_bad_community_is_reported() {
        let table = [
            Community::new("ok", 10, 2),
            Community::new("bad", 2, 2),
            Community::new("worse", 1, 0),
        ];
        let err = validate_communities(&table).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDensity { ref name, .. } if name == "bad"));
    }

    #[test]
    fn total_population_sums_table() {
        let table = [Community::new("a", 10, 2), Community::new("b", 7, 1)];
        assert_eq!(total_population(&table), 17);
    }
}
