use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::pockets::POCKET_COUNT;

// Provably-fair RNG: server_seed (secret) + client_seed + nonce -> HMAC-SHA256
// -> bytes -> floats in [0,1). Publishing hash(server_seed) before play and the
// seed afterwards lets a player recompute every spin.

pub type HmacSha256 = Hmac<Sha256>;

pub fn derive_hash_hex(input: &[u8]) -> String {
    hex::encode(Sha256::digest(input))
}

pub fn derive_floats(hmac_bytes: &[u8], count: usize) -> Vec<f64> {
    // Successive 4-byte chunks as big-endian u32, scaled into [0,1)
    let mut out = Vec::with_capacity(count);
    let mut buffer = hmac_bytes.to_vec();
    let mut i = 0usize;
    while out.len() < count {
        if i + 4 > buffer.len() {
            // extend deterministically by hashing the previous buffer
            buffer = Sha256::digest(&buffer).to_vec();
            i = 0;
            continue;
        }
        let v = u32::from_be_bytes([buffer[i], buffer[i + 1], buffer[i + 2], buffer[i + 3]]);
        out.push(f64::from(v) / (f64::from(u32::MAX) + 1.0));
        i += 4;
    }
    out
}

/// 32 bytes of OS-seeded randomness, hex encoded.
pub fn random_server_seed() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub struct ProvablyFairRng {
    pub server_seed: String, // secret until revealed
    pub client_seed: String,
    pub nonce: u64,
}

impl ProvablyFairRng {
    pub fn new(server_seed: impl Into<String>, client_seed: impl Into<String>, nonce: u64) -> Self {
        Self {
            server_seed: server_seed.into(),
            client_seed: client_seed.into(),
            nonce,
        }
    }

    pub fn server_seed_hash_hex(&self) -> String {
        derive_hash_hex(self.server_seed.as_bytes())
    }

    pub fn hmac_bytes(&self) -> [u8; 32] {
        let mut mac =
            HmacSha256::new_from_slice(self.server_seed.as_bytes()).expect("HMAC takes keys of any length");
        let msg = format!("{}:{}", self.client_seed, self.nonce);
        mac.update(msg.as_bytes());
        let res = mac.finalize().into_bytes();
        let mut out = [0u8; 32];
        out.copy_from_slice(&res);
        out
    }

    pub fn next_floats(&self, count: usize) -> Vec<f64> {
        derive_floats(&self.hmac_bytes(), count)
    }

    /// Wheel position in `0..POCKET_COUNT`.
    pub fn pocket_index(&self) -> u8 {
        let f = self.next_floats(1)[0];
        // f < 1.0 so the product stays below POCKET_COUNT
        ((f * f64::from(POCKET_COUNT)).floor() as u8).min(POCKET_COUNT - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let rng1 = ProvablyFairRng::new("server", "client", 1);
        let rng2 = ProvablyFairRng::new("server", "client", 1);
        assert_eq!(rng1.server_seed_hash_hex(), rng2.server_seed_hash_hex());
        assert_eq!(rng1.hmac_bytes(), rng2.hmac_bytes());
        assert_eq!(rng1.next_floats(5), rng2.next_floats(5));
        assert_eq!(rng1.pocket_index(), rng2.pocket_index());
    }

    #[test]
    fn floats_extend_past_one_digest() {
        let floats = derive_floats(&[7u8; 32], 20);
        assert_eq!(floats.len(), 20);
        assert!(floats.iter().all(|f| (0.0..1.0).contains(f)));
    }

    #[test]
    fn server_seeds_are_fresh() {
        let a = random_server_seed();
        let b = random_server_seed();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
    }
}
