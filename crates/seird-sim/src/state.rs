//! Per-node health state, double-buffered.

use std::fmt;

use rand::Rng;
use rand::seq::index;
use seird_core::ConfigError;
use serde::{Deserialize, Serialize};

/// SEIRD compartment of one node.
///
/// Serialized as its single-letter code so snapshots stay compact.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum HealthState {
    #[default]
    #[serde(rename = "S")]
    Susceptible,
    #[serde(rename = "E")]
    Exposed,
    #[serde(rename = "I")]
    Infectious,
    #[serde(rename = "R")]
    Recovered,
    #[serde(rename = "D")]
    Dead,
}

impl HealthState {
    pub const ALL: [Self; 5] = [
        Self::Susceptible,
        Self::Exposed,
        Self::Infectious,
        Self::Recovered,
        Self::Dead,
    ];

    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::Susceptible => 'S',
            Self::Exposed => 'E',
            Self::Infectious => 'I',
            Self::Recovered => 'R',
            Self::Dead => 'D',
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Susceptible => "susceptible",
            Self::Exposed => "exposed",
            Self::Infectious => "infectious",
            Self::Recovered => "recovered",
            Self::Dead => "dead",
        }
    }

    /// `Recovered` and `Dead` never change again.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Recovered | Self::Dead)
    }

    /// Position along `S → E → I → {R, D}`. Both terminal states share a rank.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Susceptible => 0,
            Self::Exposed => 1,
            Self::Infectious => 2,
            Self::Recovered | Self::Dead => 3,
        }
    }

    /// Whether one simulated day can take a node from `self` to `next`.
    #[must_use]
    pub const fn can_step_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Susceptible, Self::Susceptible | Self::Exposed)
                | (Self::Exposed, Self::Exposed | Self::Infectious)
                | (Self::Infectious, Self::Infectious | Self::Recovered | Self::Dead)
                | (Self::Recovered, Self::Recovered)
                | (Self::Dead, Self::Dead)
        )
    }

    /// Whether any number of days can take a node from `self` to `later`.
    #[must_use]
    pub fn can_reach(self, later: Self) -> bool {
        self == later || (!self.is_terminal() && later.rank() > self.rank())
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of nodes in each state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateCounts {
    pub susceptible: usize,
    pub exposed: usize,
    pub infectious: usize,
    pub recovered: usize,
    pub dead: usize,
}

impl StateCounts {
    #[must_use]
    pub fn from_states(states: &[HealthState]) -> Self {
        let mut counts = Self::default();
        for &state in states {
            counts.add(state);
        }
        counts
    }

    pub const fn add(&mut self, state: HealthState) {
        match state {
            HealthState::Susceptible => self.susceptible += 1,
            HealthState::Exposed => self.exposed += 1,
            HealthState::Infectious => self.infectious += 1,
            HealthState::Recovered => self.recovered += 1,
            HealthState::Dead => self.dead += 1,
        }
    }

    #[must_use]
    pub const fn get(&self, state: HealthState) -> usize {
        match state {
            HealthState::Susceptible => self.susceptible,
            HealthState::Exposed => self.exposed,
            HealthState::Infectious => self.infectious,
            HealthState::Recovered => self.recovered,
            HealthState::Dead => self.dead,
        }
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.susceptible + self.exposed + self.infectious + self.recovered + self.dead
    }

    /// Nodes that have left `Susceptible`.
    #[must_use]
    pub const fn ever_infected(&self) -> usize {
        self.total() - self.susceptible
    }
}

/// Health state and exposure counters for every node.
///
/// Holds two state buffers of the same length. During a day the engine reads
/// `current` (the frozen snapshot) and writes `next`; committing swaps them,
/// so no buffer is allocated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateStore {
    current: Vec<HealthState>,
    next: Vec<HealthState>,
    exposure_days: Vec<u32>,
}

/// Borrowed view the engine works on for one day.
pub(crate) struct DayBuffers<'a> {
    pub frozen: &'a [HealthState],
    pub next: &'a mut [HealthState],
    pub exposure_days: &'a mut [u32],
}

impl StateStore {
    /// All nodes `Susceptible` except `initial_infected` of them, sampled
    /// uniformly without replacement, which start `Exposed`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TooManyInitialInfected`] when the sample is
    /// larger than the population.
    pub fn seeded(
        node_count: usize,
        initial_infected: usize,
        rng: &mut impl Rng,
    ) -> Result<Self, ConfigError> {
        if initial_infected > node_count {
            return Err(ConfigError::TooManyInitialInfected {
                requested: initial_infected,
                node_count,
            });
        }
        let mut states = vec![HealthState::Susceptible; node_count];
        for node in index::sample(rng, node_count, initial_infected).into_iter() {
            states[node] = HealthState::Exposed;
        }
        Ok(Self::from_states(states))
    }

    /// A store with explicit starting states and zeroed exposure counters.
    #[must_use]
    pub fn from_states(states: Vec<HealthState>) -> Self {
        let next = states.clone();
        let exposure_days = vec![0; states.len()];
        Self {
            current: states,
            next,
            exposure_days,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.current.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    #[must_use]
    pub fn state(&self, node: usize) -> Option<HealthState> {
        self.current.get(node).copied()
    }

    /// Current state of every node, indexed by node id.
    #[must_use]
    pub fn states(&self) -> &[HealthState] {
        &self.current
    }

    /// Days `node` has spent `Exposed` so far.
    #[must_use]
    pub fn exposure_days(&self, node: usize) -> Option<u32> {
        self.exposure_days.get(node).copied()
    }

    #[must_use]
    pub fn counts(&self) -> StateCounts {
        StateCounts::from_states(&self.current)
    }

    /// Start a day: `next` becomes a copy of `current`.
    pub(crate) fn begin_day(&mut self) -> DayBuffers<'_> {
        self.next.copy_from_slice(&self.current);
        DayBuffers {
            frozen: &self.current,
            next: &mut self.next,
            exposure_days: &mut self.exposure_days,
        }
    }

    /// Finish a day: the written buffer becomes current.
    pub(crate) fn commit_day(&mut self) {
        std::mem::swap(&mut self.current, &mut self.next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seird_core::DeterministicRng;

    #[test]
    fn seeded_exposes_exactly_the_sample() {
        let mut rng = DeterministicRng::new(1);
        let store = StateStore::seeded(100, 20, &mut rng).expect("seeded");
        let counts = store.counts();
        assert_eq!(counts.exposed, 20);
        assert_eq!(counts.susceptible, 80);
        assert!((0..100).all(|n| store.exposure_days(n) == Some(0)));
    }

    #[test]
    fn seeded_rejects_oversized_sample() {
        let mut rng = DeterministicRng::new(1);
        assert_eq!(
            StateStore::seeded(5, 6, &mut rng).unwrap_err(),
            ConfigError::TooManyInitialInfected {
                requested: 6,
                node_count: 5,
            }
        );
    }

    #[test]
    fn whole_population_can_start_exposed() {
        let mut rng = DeterministicRng::new(2);
        let store = StateStore::seeded(7, 7, &mut rng).expect("seeded");
        assert_eq!(store.counts().exposed, 7);
    }

    #[test]
    fn sample_depends_on_seed() {
        let a = StateStore::seeded(1000, 10, &mut DeterministicRng::new(1)).expect("a");
        let b = StateStore::seeded(1000, 10, &mut DeterministicRng::new(1)).expect("b");
        let c = StateStore::seeded(1000, 10, &mut DeterministicRng::new(2)).expect("c");
        assert_eq!(a, b);
        assert_ne!(a.states(), c.states());
    }

    #[test]
    fn commit_swaps_buffers() {
        let mut store = StateStore::from_states(vec![HealthState::Susceptible; 3]);
        {
            let day = store.begin_day();
            day.next[1] = HealthState::Exposed;
            assert_eq!(day.frozen[1], HealthState::Susceptible);
        }
        assert_eq!(store.state(1), Some(HealthState::Susceptible));
        store.commit_day();
        assert_eq!(store.state(1), Some(HealthState::Exposed));

        // the stale buffer is overwritten on the next day
        let day = store.begin_day();
        assert_eq!(day.next[1], HealthState::Exposed);
    }

    #[test]
    fn terminal_states_only_reach_themselves() {
        for terminal in [HealthState::Recovered, HealthState::Dead] {
            for other in HealthState::ALL {
                assert_eq!(terminal.can_step_to(other), other == terminal);
                assert_eq!(terminal.can_reach(other), other == terminal);
            }
        }
    }

    #[test]
    fn reach_is_forward_only() {
        use HealthState::{Dead, Exposed, Infectious, Recovered, Susceptible};
        assert!(Susceptible.can_reach(Dead));
        assert!(Exposed.can_reach(Recovered));
        assert!(!Infectious.can_reach(Exposed));
        assert!(!Exposed.can_reach(Susceptible));
        assert!(!Susceptible.can_step_to(Infectious));
    }

    #[test]
    fn counts_cover_every_node() {
        use HealthState::{Dead, Exposed, Infectious, Recovered, Susceptible};
        let counts = StateCounts::from_states(&[Susceptible, Exposed, Infectious, Recovered, Dead, Dead]);
        assert_eq!(counts.total(), 6);
        assert_eq!(counts.get(Dead), 2);
        assert_eq!(counts.ever_infected(), 5);
    }

    #[test]
    fn serializes_as_codes() {
        let json = serde_json::to_string(&[HealthState::Susceptible, HealthState::Dead]).expect("json");
        assert_eq!(json, r#"["S","D"]"#);
        for state in HealthState::ALL {
            assert_eq!(
                serde_json::to_string(&state).expect("json"),
                format!("\"{}\"", state.code())
            );
        }
    }
}
