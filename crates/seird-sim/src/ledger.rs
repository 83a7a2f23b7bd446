use seird_graph::ContactGraph;
use serde::{Deserialize, Serialize};

/// Cumulative cases for one community.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityCases {
    pub community: String,
    pub cumulative_cases: usize,
}

/// Community name → cumulative case count, in community-list order.
///
/// Only `Exposed → Infectious` transitions count, so nodes seeded as
/// `Exposed` show up here once their incubation ends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseLedger {
    entries: Vec<CommunityCases>,
}

impl CaseLedger {
    /// Zeroed ledger with one entry per community of `graph`.
    #[must_use]
    pub fn for_graph(graph: &ContactGraph) -> Self {
        Self {
            entries: graph
                .communities()
                .iter()
                .map(|range| CommunityCases {
                    community: range.name.clone(),
                    cumulative_cases: 0,
                })
                .collect(),
        }
    }

    /// Add one day's cases, indexed like the graph's communities.
    pub fn record(&mut self, cases_by_community: &[usize]) {
        for (entry, &cases) in self.entries.iter_mut().zip(cases_by_community) {
            entry.cumulative_cases += cases;
        }
    }

    #[must_use]
    pub fn get(&self, community: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|entry| entry.community == community)
            .map(|entry| entry.cumulative_cases)
    }

    #[must_use]
    pub fn entries(&self) -> &[CommunityCases] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries
            .iter()
            .map(|entry| (entry.community.as_str(), entry.cumulative_cases))
    }

    /// Cases across every community.
    #[must_use]
    pub fn total(&self) -> usize {
        self.entries.iter().map(|entry| entry.cumulative_cases).sum()
    }
}
