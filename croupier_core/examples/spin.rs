use croupier_core::{resolve, spin_with_seeds, Bet, BetKind, ProvablyFairRng};

fn main() {
    // Example end-to-end spin and settlement
    let server_seed = "example-server-seed";
    let client_seed = "example-client-seed";
    let nonce = 1u64;
    let rng = ProvablyFairRng::new(server_seed, client_seed, nonce);
    let outcome = spin_with_seeds(server_seed, client_seed, nonce);
    let bet = Bet::new(BetKind::Dozen, 2, 50).expect("valid selection");
    let resolution = resolve(&bet, outcome.result()).expect("result on the wheel");
    println!(
        "server_seed_hash={} result={} {} bet={} multiplier={} net={}",
        rng.server_seed_hash_hex(),
        outcome.result(),
        outcome.color,
        resolution.label,
        resolution.multiplier,
        resolution.net()
    );
}
