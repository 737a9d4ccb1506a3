use std::collections::VecDeque;

use croupier_shared::Color;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::pockets::Pocket;
use crate::rng::{random_server_seed, ProvablyFairRng};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpinOutcome {
    pub pocket: Pocket,
    pub color: Color,
    pub nonce: u64,
}

impl SpinOutcome {
    pub fn new(pocket: Pocket, nonce: u64) -> Self {
        Self {
            pocket,
            color: pocket.color(),
            nonce,
        }
    }

    pub fn result(&self) -> u8 {
        self.pocket.to_index()
    }
}

/// Anything that can produce the next wheel result for a player.
pub trait SpinSource {
    fn spin(&mut self, client_seed: &str) -> SpinOutcome;
}

pub fn spin_once(rng: &ProvablyFairRng) -> SpinOutcome {
    let pocket = Pocket::from_index(rng.pocket_index()).unwrap_or(Pocket::ZERO);
    SpinOutcome::new(pocket, rng.nonce)
}

/// Convenience: perform a spin creating the RNG from seeds.
pub fn spin_with_seeds(server_seed: &str, client_seed: &str, nonce: u64) -> SpinOutcome {
    let rng = ProvablyFairRng::new(server_seed, client_seed, nonce);
    spin_once(&rng)
}

/// Verify that a given result matches what the RNG would produce for the seeds.
pub fn verify_spin(server_seed: &str, client_seed: &str, nonce: u64, expected: u8) -> bool {
    spin_with_seeds(server_seed, client_seed, nonce).result() == expected
}

/// The live wheel: one secret server seed per process and a running nonce.
pub struct FairWheel {
    server_seed: String,
    nonce: u64,
}

impl FairWheel {
    pub fn new() -> Self {
        Self::with_seed(random_server_seed())
    }

    pub fn with_seed(server_seed: impl Into<String>) -> Self {
        Self {
            server_seed: server_seed.into(),
            nonce: 0,
        }
    }

    pub fn server_seed_hash_hex(&self) -> String {
        crate::rng::derive_hash_hex(self.server_seed.as_bytes())
    }

    /// The secret seed. Only show this once play is over.
    pub fn reveal(&self) -> &str {
        &self.server_seed
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }
}

impl Default for FairWheel {
    fn default() -> Self {
        Self::new()
    }
}

impl SpinSource for FairWheel {
    fn spin(&mut self, client_seed: &str) -> SpinOutcome {
        self.nonce += 1;
        let outcome = spin_with_seeds(&self.server_seed, client_seed, self.nonce);
        debug!(nonce = self.nonce, result = outcome.result(), "wheel spun");
        outcome
    }
}

/// Replays a fixed list of results, cycling when it runs out. Results off the
/// wheel are dropped; an empty script always lands on zero.
pub struct ScriptedWheel {
    results: VecDeque<Pocket>,
    nonce: u64,
}

impl ScriptedWheel {
    pub fn new(results: impl IntoIterator<Item = u8>) -> Self {
        Self {
            results: results.into_iter().filter_map(Pocket::from_index).collect(),
            nonce: 0,
        }
    }
}

impl SpinSource for ScriptedWheel {
    fn spin(&mut self, _client_seed: &str) -> SpinOutcome {
        self.nonce += 1;
        let pocket = match self.results.pop_front() {
            Some(p) => {
                self.results.push_back(p);
                p
            }
            None => Pocket::ZERO,
        };
        SpinOutcome::new(pocket, self.nonce)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spin_deterministic() {
        let out1 = spin_with_seeds("server", "client", 1);
        let out2 = spin_with_seeds("server", "client", 1);
        assert_eq!(out1, out2);
        assert!(verify_spin("server", "client", 1, out1.result()));
    }

    #[test]
    fn fair_wheel_advances_nonce() {
        let mut wheel = FairWheel::with_seed("seed");
        let first = wheel.spin("alice");
        let second = wheel.spin("alice");
        assert_eq!(first.nonce, 1);
        assert_eq!(second.nonce, 2);
        assert_eq!(wheel.nonce(), 2);
        assert!(verify_spin(wheel.reveal(), "alice", 1, first.result()));
        assert!(verify_spin(wheel.reveal(), "alice", 2, second.result()));
    }

    #[test]
    fn scripted_wheel_cycles() {
        let mut wheel = ScriptedWheel::new([5, 40, 0]);
        let results: Vec<u8> = (0..4).map(|_| wheel.spin("x").result()).collect();
        assert_eq!(results, vec![5, 0, 5, 0]);
        assert_eq!(wheel.spin("x").color, Color::Red);
    }
}
