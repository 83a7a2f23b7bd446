use rand::RngCore;
use serde::{Deserialize, Serialize};

const MULTIPLIER: u64 = 6_364_136_223_846_793_005;
const INCREMENT: u64 = 1_442_695_040_888_963_407;
const SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Stream used for building the contact graph.
pub const GRAPH_STREAM: u64 = 0x6772_6170_68;
/// Stream used for sampling the initial exposed set.
pub const SEEDING_STREAM: u64 = 0x7365_6564;
/// Base stream for per-node daily draws.
pub const DAY_STREAM: u64 = 0x6461_79;

/// Tiny deterministic RNG used by the simulator.
///
/// An LCG state step followed by a splitmix-style output mix, so the output
/// is reproducible across platforms and cheap to construct. Implements
/// [`RngCore`], so all of `rand::Rng` is available on top of it.
///
/// Runs never share one sequential stream across nodes: every consumer forks
/// its own stream from the run seed, which keeps results independent of the
/// order in which nodes are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    /// Create a new deterministic RNG from a seed.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            state: seed ^ SEED_SALT,
        }
    }

    /// Independent child stream keyed by `stream`.
    ///
    /// Forking does not advance `self`.
    #[must_use]
    pub const fn fork(&self, stream: u64) -> Self {
        Self::new(mix(self.state ^ mix(stream)))
    }

    /// The stream one node draws from on one simulated day.
    #[must_use]
    pub fn for_node(seed: u64, day: u64, node: usize) -> Self {
        let node = u64::try_from(node).unwrap_or(u64::MAX);
        let day_key = mix(seed ^ mix(DAY_STREAM ^ day));
        Self::new(mix(day_key ^ mix(node.wrapping_add(SEED_SALT))))
    }

    fn step(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(MULTIPLIER)
            .wrapping_add(INCREMENT);
        mix(self.state)
    }
}

impl RngCore for DeterministicRng {
    fn next_u32(&mut self) -> u32 {
        u32::try_from(self.step() >> 32).unwrap_or(u32::MAX)
    }

    fn next_u64(&mut self) -> u64 {
        self.step()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.step().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// A seed from OS entropy, for runs that did not ask for one.
#[must_use]
pub fn entropy_seed() -> u64 {
    rand::random::<u64>()
}

const fn mix(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
